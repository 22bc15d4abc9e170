/// Service configuration

pub mod settings;

pub use settings::*;
