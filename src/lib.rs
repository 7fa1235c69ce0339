pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod loader;
pub mod models;
pub mod state;
pub mod sync;
