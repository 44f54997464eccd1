//! SQLite storage behind the reference RPC server.
//!
//! ```no_run
//! use minimark::database::Database;
//!
//! let db = Database::open("minimark.db").expect("failed to open database");
//! let conn = db.connection();
//! # let _ = conn;
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
