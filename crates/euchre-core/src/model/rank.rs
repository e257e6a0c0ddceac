use core::fmt;

use serde::{Deserialize, Serialize};

/// Card rank. The double deck is printed with `Nine..=Ace`; `LeftBauer` and
/// `RightBauer` exist only after trump conversion promotes the two jacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[repr(u8)]
pub enum Rank {
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
    LeftBauer = 15,
    RightBauer = 16,
}

impl Rank {
    /// The printed ranks, low to high, as dealt before any conversion.
    pub const DEALT: [Rank; 6] = [
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            9 => Some(Rank::Nine),
            10 => Some(Rank::Ten),
            11 => Some(Rank::Jack),
            12 => Some(Rank::Queen),
            13 => Some(Rank::King),
            14 => Some(Rank::Ace),
            15 => Some(Rank::LeftBauer),
            16 => Some(Rank::RightBauer),
            _ => None,
        }
    }

    pub const fn value(self) -> u8 {
        self as u8
    }

    pub const fn is_bauer(self) -> bool {
        matches!(self, Rank::LeftBauer | Rank::RightBauer)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
            Rank::LeftBauer => "LB",
            Rank::RightBauer => "RB",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::Rank;

    #[test]
    fn from_value_maps() {
        for rank in Rank::DEALT {
            assert_eq!(Rank::from_value(rank.value()), Some(rank));
        }
        assert_eq!(Rank::from_value(16), Some(Rank::RightBauer));
        assert_eq!(Rank::from_value(8), None);
    }

    #[test]
    fn bauers_outrank_every_dealt_rank() {
        for rank in Rank::DEALT {
            assert!(Rank::LeftBauer > rank);
            assert!(Rank::RightBauer > rank);
        }
        assert!(Rank::RightBauer > Rank::LeftBauer);
    }

    #[test]
    fn display_matches_symbols() {
        assert_eq!(Rank::Ten.to_string(), "10");
        assert_eq!(Rank::LeftBauer.to_string(), "LB");
    }
}
