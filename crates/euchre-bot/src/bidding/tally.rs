use euchre_core::model::bid::Bid;
use euchre_core::model::rank::Rank;
use euchre_core::model::suit::Suit;
use euchre_core::strategy::{BidContext, BidStrategy};

/// Middle tier: tallies raw trick material per suit and bids the tally.
/// An ace counts toward every suit, a jack also credits its colour-mate
/// (the left-bauer read). No partner model, no no-trump bids; a tally of
/// nine or better goes alone.
#[derive(Debug, Default)]
pub struct TallyBidder;

impl TallyBidder {
    pub fn new() -> Self {
        Self
    }
}

impl BidStrategy for TallyBidder {
    fn bid(&mut self, ctx: &BidContext<'_>) -> Option<Bid> {
        let mut tally = [0u8; 4];
        for card in ctx.hand.iter() {
            if card.rank == Rank::Ace {
                for slot in tally.iter_mut() {
                    *slot += 1;
                }
                continue;
            }
            tally[card.suit.index()] += 1;
            if card.rank == Rank::Jack {
                if let Some(left) = card.suit.left() {
                    tally[left.index()] += 1;
                }
            }
        }

        let (best_index, best) = tally
            .iter()
            .copied()
            .enumerate()
            .max_by_key(|(_, t)| *t)?;
        let suit = Suit::BASE[best_index];
        let high = ctx.current_high.map(|b| b.amount).unwrap_or(0);
        if best <= high {
            return None;
        }
        if best >= 9 {
            return Some(Bid::new(ctx.rules.lone_bid(), suit));
        }
        Some(Bid::new(best.min(ctx.rules.hand_size() as u8), suit))
    }
}
