// Minimark shared type definitions
// Each submodule defines types used across the cache, the dashboard and the reference server.

pub mod bookmark;
pub mod errors;
pub mod group;
pub mod notification;
pub mod rpc;
pub mod settings;
pub mod temp_id;
