/// Zerion vendor integration

pub mod client;
pub mod types;

pub use client::ZerionClient;
