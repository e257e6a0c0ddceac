//! Playing tiers, weakest to strongest.

mod boss;
mod inference;
mod random;

pub use boss::BossPlayer;
pub use inference::InferencePlayer;
pub use random::RandomPlayer;
