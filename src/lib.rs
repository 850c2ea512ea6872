// Library crate for integration tests and the `devfinder` binary.

pub mod client;
pub mod config;
pub mod error;
pub mod github;
pub mod procedure;
pub mod profile;
pub mod query;
pub mod render;
pub mod routes;
pub mod server;
pub mod state;
