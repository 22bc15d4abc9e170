// Core domain types
pub mod core;

// Service configuration
pub mod config;

// Operation facade and error taxonomy
pub mod api;

// Arena state machine and refresh scheduling
pub mod arena;

// Portfolio snapshot pipeline
pub mod portfolio;

// Synthetic score model
pub mod scoring;

// Real-time update distribution
pub mod transport;

// Zerion vendor client
pub mod zerion;

// Re-export commonly used types for convenience
pub use core::*;
pub use api::{ApiError, ArenaApi};
pub use arena::{LeaderboardArena, RefreshScheduler, TournamentBook};
pub use transport::UpdateBus;
