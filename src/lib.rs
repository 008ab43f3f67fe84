pub mod api;
pub mod config;
pub mod db;
pub mod display;
pub mod error;
pub mod pusher;
pub mod types;
