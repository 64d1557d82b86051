#![warn(clippy::unwrap_used)]

pub mod dataset_rest;
pub mod export_rest;
pub mod extract;
pub mod rest;
pub mod server;
pub mod simulator_rest;
pub mod swagger;

pub use rest::AppState;
pub use server::{router, ApiServer};
pub use swagger::ApiDoc;
