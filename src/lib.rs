#![doc = "The `tasklist` library crate."]
#![doc = ""]
#![doc = "Everything behind the task list API: credential storage, password hashing,"]
#![doc = "bearer tokens, the authorization gate, the owner-scoped task repository,"]
#![doc = "and the actix-web routes that expose them. `main.rs` wires these to Postgres."]

pub mod auth;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod models;
pub mod repository;
pub mod routes;
pub mod security;
pub mod state;
pub mod store;

pub use error::AppError;
pub use state::AppState;
