// Clinic server library
//
// Exposes the router and its building blocks so integration tests can
// drive the whole app without binding a socket.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod openapi;
pub mod services;
pub mod storage;

pub use app::build_router;
pub use config::AppConfig;
