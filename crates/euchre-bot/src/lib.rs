pub mod bidding;
pub mod eval;
pub mod playing;

pub use bidding::{BidWeights, HeuristicBidder, RandomBidder, TallyBidder};
pub use playing::{BossPlayer, InferencePlayer, RandomPlayer};
