//! Minimark: optimistic client core for a minimal bookmark manager.
//!
//! This library crate exposes all modules for use by the RPC binary and integration tests.

pub mod app;
pub mod backend;
pub mod cache;
pub mod dashboard;
pub mod database;
pub mod events;
pub mod managers;
pub mod mutations;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;
