// Minimark services
// Services are stateless helpers: input parsing, search, export, URL metadata and settings.

pub mod export;
pub mod input_parser;
pub mod search;
pub mod settings_engine;
pub mod url_metadata;
