use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;

/// A card identity. The double deck holds two copies of each identity, so
/// comparisons are by value, never by which physical copy is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub const fn is_trump(self) -> bool {
        self.suit.is_trump()
    }

    /// The card this one becomes once `trump` is declared: trump-suit cards
    /// move to the marker suit, the trump jack becomes the right bauer, the
    /// same-colour jack becomes the left bauer, everything else is
    /// untouched. Identity under a no-trump contract and on already
    /// converted cards, so applying it twice is safe.
    pub fn with_trump(self, trump: Suit) -> Card {
        if trump == Suit::Trump || self.suit == Suit::Trump {
            return self;
        }
        if self.suit == trump {
            let rank = if self.rank == Rank::Jack {
                Rank::RightBauer
            } else {
                self.rank
            };
            return Card::new(rank, Suit::Trump);
        }
        if self.rank == Rank::Jack && trump.left() == Some(self.suit) {
            return Card::new(Rank::LeftBauer, Suit::Trump);
        }
        self
    }

    /// Whether this card takes a trick from `other` when laid later: same
    /// suit and strictly higher, or trump over a plain suit. Equal ranks do
    /// not take over, so the first copy of a twin laid keeps the trick.
    pub fn beats(self, other: Card) -> bool {
        if self.suit == other.suit {
            self.rank > other.rank
        } else {
            self.is_trump()
        }
    }

    fn sort_key(self) -> (u8, u8) {
        (self.suit as u8, self.rank.value())
    }
}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Card {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}
