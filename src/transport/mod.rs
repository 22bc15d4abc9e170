/// Real-time update distribution

pub mod update_bus;

pub use update_bus::{BusStatistics, UpdateBus};
