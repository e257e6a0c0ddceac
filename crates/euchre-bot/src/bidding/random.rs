use euchre_core::model::bid::Bid;
use euchre_core::strategy::{BidContext, BidStrategy};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Baseline chaff: rolls an amount below the hand size and bids it in a
/// random suit from the hand when it happens to be a legal raise, else
/// passes. Never bids no-trump, never goes alone.
pub struct RandomBidder {
    rng: SmallRng,
}

impl RandomBidder {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl BidStrategy for RandomBidder {
    fn bid(&mut self, ctx: &BidContext<'_>) -> Option<Bid> {
        let high = ctx.current_high.map(|b| b.amount).unwrap_or(0);
        let amount = self.rng.gen_range(0..ctx.hand.len() as u8);
        if amount <= high {
            return None;
        }
        let cards = ctx.hand.cards();
        let suit = cards[self.rng.gen_range(0..cards.len())].suit;
        Some(Bid::new(amount, suit))
    }
}

#[cfg(test)]
mod tests {
    use super::RandomBidder;
    use euchre_core::model::bid::Bid;
    use euchre_core::model::card::Card;
    use euchre_core::model::hand::Hand;
    use euchre_core::model::rank::Rank;
    use euchre_core::model::rules::Rules;
    use euchre_core::model::seat::Seat;
    use euchre_core::model::suit::Suit;
    use euchre_core::strategy::{BidContext, BidStrategy};

    fn sample_hand() -> Hand {
        let mut cards = Vec::new();
        for suit in [Suit::Hearts, Suit::Clubs] {
            for rank in [Rank::Nine, Rank::Ten, Rank::Jack, Rank::Queen, Rank::King] {
                cards.push(Card::new(rank, suit));
            }
        }
        cards.push(Card::new(Rank::Ace, Suit::Spades));
        Hand::with_cards(cards)
    }

    fn ctx<'a>(hand: &'a Hand, rules: &'a Rules, high: Option<Bid>) -> BidContext<'a> {
        BidContext {
            seat: Seat::North,
            hand,
            bids: &[],
            current_high: high,
            score_delta: 0,
            hands_remaining: 12,
            rules,
        }
    }

    #[test]
    fn bids_are_always_strict_raises() {
        let hand = sample_hand();
        let rules = Rules::standard();
        let mut bidder = RandomBidder::new(3);
        for high in [None, Some(Bid::new(5, Suit::Hearts))] {
            for _ in 0..200 {
                if let Some(bid) = bidder.bid(&ctx(&hand, &rules, high)) {
                    assert!(bid.amount > high.map(|b| b.amount).unwrap_or(0));
                    assert!(u64::from(bid.amount) < hand.len() as u64);
                }
            }
        }
    }

    #[test]
    fn same_seed_same_decisions() {
        let hand = sample_hand();
        let rules = Rules::standard();
        let run = |seed| {
            let mut bidder = RandomBidder::new(seed);
            (0..32)
                .map(|_| bidder.bid(&ctx(&hand, &rules, None)))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(11), run(11));
    }
}
