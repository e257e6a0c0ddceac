use crate::model::rules::Rules;
use crate::model::seat::Seat;
use crate::model::suit::Suit;
use core::fmt;
use serde::{Deserialize, Serialize};

/// A declared bid: trick target plus the suit the bidder wants as trump.
/// `Suit::Trump` here is a genuine no-trump contract, never a placeholder;
/// passing is the absence of a bid. An amount past the hand size is the
/// lone-hand sentinel, where the number only ranks competing lone
/// declarations against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bid {
    pub amount: u8,
    pub suit: Suit,
}

impl Bid {
    pub const fn new(amount: u8, suit: Suit) -> Self {
        Self { amount, suit }
    }

    pub const fn is_no_trump(&self) -> bool {
        self.suit.is_trump()
    }

    pub fn is_lone(&self, rules: &Rules) -> bool {
        rules.is_lone_amount(self.amount)
    }

    /// Points the bidding team plays for: the amount itself, or the fixed
    /// lone value once the amount is a sentinel.
    pub fn stake(&self, rules: &Rules) -> i32 {
        if self.is_lone(rules) {
            rules.lone_points
        } else {
            i32::from(self.amount)
        }
    }

    /// Tricks the bidding team must take. A lone hand requires every trick.
    pub fn tricks_required(&self, rules: &Rules) -> usize {
        if self.is_lone(rules) {
            rules.hand_size()
        } else {
            self.amount as usize
        }
    }
}

impl fmt::Display for Bid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.suit)
    }
}

/// One entry of the bidding round: who acted and what they declared, with
/// `None` recording a pass. The bid history hands these to strategies and
/// the belief engine in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatBid {
    pub seat: Seat,
    pub bid: Option<Bid>,
}

impl SeatBid {
    pub const fn passed(&self) -> bool {
        self.bid.is_none()
    }
}

impl fmt::Display for SeatBid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bid {
            Some(bid) => write!(f, "{}:{bid}", self.seat),
            None => write!(f, "{}:pass", self.seat),
        }
    }
}
