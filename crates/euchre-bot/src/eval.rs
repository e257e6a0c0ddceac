//! Card valuation shared by the playing tiers.

use euchre_core::model::card::Card;

/// Discard-order value. Any trump outranks any plain card (doubled rank
/// puts the lowest trump at 18, above a plain ace at 14), so throwaway
/// selection sheds off-suit before touching trump.
pub fn card_value(card: Card) -> u8 {
    if card.suit.is_trump() {
        card.rank.value() * 2
    } else {
        card.rank.value()
    }
}

/// Lowest-value card, ties broken by the canonical card order so equal
/// valuations pick deterministically.
pub fn throwaway(cards: &[Card]) -> Option<Card> {
    cards
        .iter()
        .copied()
        .min_by_key(|c| (card_value(*c), c.suit.index(), c.rank.value()))
}

/// How safe a card is to lead right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossRank {
    /// No unseen card beats it under the trump-relative order.
    Absolute,
    /// Highest left in its own suit, but unseen trump could still ruff.
    SuitHigh,
}

pub fn boss_rank(card: Card, unseen: &[Card]) -> Option<BossRank> {
    if unseen.iter().all(|u| !u.beats(card)) {
        Some(BossRank::Absolute)
    } else if unseen
        .iter()
        .filter(|u| u.suit == card.suit)
        .all(|u| u.rank <= card.rank)
    {
        Some(BossRank::SuitHigh)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{BossRank, boss_rank, card_value, throwaway};
    use euchre_core::model::card::Card;
    use euchre_core::model::rank::Rank;
    use euchre_core::model::suit::Suit;

    fn c(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    #[test]
    fn trump_always_outvalues_plain_cards() {
        assert!(card_value(c(Rank::Nine, Suit::Trump)) > card_value(c(Rank::Ace, Suit::Hearts)));
        assert!(card_value(c(Rank::RightBauer, Suit::Trump)) > card_value(c(Rank::Ace, Suit::Trump)));
    }

    #[test]
    fn throwaway_sheds_offsuit_before_trump() {
        let cards = [
            c(Rank::Nine, Suit::Trump),
            c(Rank::King, Suit::Spades),
            c(Rank::Ten, Suit::Hearts),
        ];
        assert_eq!(throwaway(&cards), Some(c(Rank::Ten, Suit::Hearts)));

        let all_trump = [c(Rank::Ace, Suit::Trump), c(Rank::Nine, Suit::Trump)];
        assert_eq!(throwaway(&all_trump), Some(c(Rank::Nine, Suit::Trump)));
    }

    #[test]
    fn boss_rank_tiers() {
        let unseen = [
            c(Rank::King, Suit::Hearts),
            c(Rank::Queen, Suit::Hearts),
            c(Rank::Nine, Suit::Trump),
        ];
        // Ace of hearts is suit-high but a trump is still out.
        assert_eq!(
            boss_rank(c(Rank::Ace, Suit::Hearts), &unseen),
            Some(BossRank::SuitHigh)
        );
        // The queen loses to the unseen king, so it is not boss at all.
        assert_eq!(boss_rank(c(Rank::Queen, Suit::Hearts), &unseen), None);
        // The right bauer beats everything by definition.
        assert_eq!(
            boss_rank(c(Rank::RightBauer, Suit::Trump), &unseen),
            Some(BossRank::Absolute)
        );
    }

    #[test]
    fn boss_rank_is_absolute_with_no_trump_left() {
        let unseen = [c(Rank::King, Suit::Hearts), c(Rank::Nine, Suit::Clubs)];
        assert_eq!(
            boss_rank(c(Rank::Ace, Suit::Hearts), &unseen),
            Some(BossRank::Absolute)
        );
    }
}
