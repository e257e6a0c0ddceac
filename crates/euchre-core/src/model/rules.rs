use crate::model::rank::Rank;
use crate::model::seat::Seat;
use crate::model::suit::Suit;

/// Immutable rule configuration, passed into engine construction so game
/// instances with different variants never interfere. The standard table is
/// a double deck of 9..A, a four-card kitty, 16 points for a lone hand and
/// 12 hands to a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub deck_copies: usize,
    pub kitty_size: usize,
    pub lone_points: i32,
    pub hands_per_match: usize,
}

impl Rules {
    pub const fn standard() -> Self {
        Self {
            deck_copies: 2,
            kitty_size: 4,
            lone_points: 16,
            hands_per_match: 12,
        }
    }

    pub const fn deck_size(&self) -> usize {
        self.deck_copies * Suit::BASE.len() * Rank::DEALT.len()
    }

    /// Cards per seat after the kitty is set aside. Deck and kitty sizes
    /// must leave a multiple of the seat count.
    pub const fn hand_size(&self) -> usize {
        (self.deck_size() - self.kitty_size) / Seat::COUNT
    }

    /// Smallest bid amount read as a lone-hand declaration.
    pub const fn lone_bid(&self) -> u8 {
        self.hand_size() as u8 + 1
    }

    /// Highest sentinel a lone raise may escalate to when outbidding a
    /// competing lone declaration.
    pub const fn lone_bid_ceiling(&self) -> u8 {
        self.hand_size() as u8 + 6
    }

    pub const fn is_lone_amount(&self, amount: u8) -> bool {
        amount as usize > self.hand_size()
    }

    /// Largest score movement a single hand can produce; bounds the
    /// early-termination check.
    pub const fn max_hand_swing(&self) -> i32 {
        self.lone_points
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::Rules;

    #[test]
    fn standard_table_dimensions() {
        let rules = Rules::standard();
        assert_eq!(rules.deck_size(), 48);
        assert_eq!(rules.hand_size(), 11);
        assert_eq!(rules.lone_bid(), 12);
        assert!(rules.is_lone_amount(12));
        assert!(!rules.is_lone_amount(11));
    }

    #[test]
    fn single_deck_variant_scales_down() {
        let rules = Rules {
            deck_copies: 1,
            kitty_size: 4,
            lone_points: 16,
            hands_per_match: 12,
        };
        assert_eq!(rules.deck_size(), 24);
        assert_eq!(rules.hand_size(), 5);
        assert_eq!(rules.lone_bid(), 6);
    }
}
