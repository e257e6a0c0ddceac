use core::fmt;

use serde::{Deserialize, Serialize};

/// Suit of a card. `Trump` is the marker suit that trump-suit cards adopt
/// after conversion; before a contract is fixed no card carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Suit {
    Hearts = 0,
    Diamonds = 1,
    Clubs = 2,
    Spades = 3,
    Trump = 4,
}

impl Suit {
    pub const ALL: [Suit; 5] = [
        Suit::Hearts,
        Suit::Diamonds,
        Suit::Clubs,
        Suit::Spades,
        Suit::Trump,
    ];

    /// The four suits cards are printed with. Deck construction and bid
    /// evaluation iterate these; `Trump` only appears post-conversion or as
    /// a no-trump contract marker.
    pub const BASE: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Suit::Hearts),
            1 => Some(Suit::Diamonds),
            2 => Some(Suit::Clubs),
            3 => Some(Suit::Spades),
            4 => Some(Suit::Trump),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn is_trump(self) -> bool {
        matches!(self, Suit::Trump)
    }

    /// Same-colour partner suit, the one whose jack turns into the left
    /// bauer when this suit is trump. Undefined for the trump marker.
    pub const fn left(self) -> Option<Suit> {
        match self {
            Suit::Hearts => Some(Suit::Diamonds),
            Suit::Diamonds => Some(Suit::Hearts),
            Suit::Clubs => Some(Suit::Spades),
            Suit::Spades => Some(Suit::Clubs),
            Suit::Trump => None,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Suit::Hearts => "H",
            Suit::Diamonds => "D",
            Suit::Clubs => "C",
            Suit::Spades => "S",
            Suit::Trump => "T",
        };
        f.write_str(symbol)
    }
}
