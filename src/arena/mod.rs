/// Arena state machine: wallet roster, tournaments and refresh scheduling

pub mod leaderboard;
pub mod refresher;
pub mod registry;
pub mod tournaments;

pub use leaderboard::*;
pub use refresher::*;
pub use tournaments::*;
