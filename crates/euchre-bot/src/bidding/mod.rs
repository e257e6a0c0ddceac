//! Bidding tiers, weakest to strongest.

mod heuristic;
mod random;
mod tally;

pub use heuristic::{BidWeights, HeuristicBidder};
pub use random::RandomBidder;
pub use tally::TallyBidder;
