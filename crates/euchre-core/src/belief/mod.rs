//! Opponent card inference.
//!
//! One [`Belief`] is held per observing player and hand. It seeds per-seat
//! knowledge from the bidding round and then narrows it with every
//! completed trick: voids from failures to follow, per-suit floors from
//! chosen discards, and single-possible-holder deductions once the floors
//! exclude everyone else.

mod seat_belief;

pub use seat_belief::{Belief, SeatBelief, SuitFloor};
