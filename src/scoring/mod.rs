/// Leaderboard scoring

pub mod scorer;

pub use scorer::{score, ScoreBreakdown};
