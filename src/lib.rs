pub mod extract;
pub mod gateway;
pub mod languages;
pub mod llm;
pub mod models;
pub mod service;
pub mod session;

pub use service::{AppState, create_app};
pub use models::*;
