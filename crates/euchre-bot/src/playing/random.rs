use euchre_core::model::card::Card;
use euchre_core::model::hand::Hand;
use euchre_core::model::trick::Trick;
use euchre_core::strategy::PlayStrategy;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

/// Uniform random legal choice everywhere. The floor every other tier is
/// measured against.
pub struct RandomPlayer {
    rng: SmallRng,
}

impl RandomPlayer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl PlayStrategy for RandomPlayer {
    fn take_kitty(&mut self, hand: &Hand, discard_count: usize) -> Vec<Card> {
        hand.cards()
            .choose_multiple(&mut self.rng, discard_count)
            .copied()
            .collect()
    }

    fn lead(&mut self, hand: &Hand, _unseen: &[Card]) -> Card {
        *hand
            .cards()
            .choose(&mut self.rng)
            .unwrap_or(&hand.cards()[0])
    }

    fn follow(&mut self, hand: &Hand, _unseen: &[Card], trick: &Trick) -> Card {
        let legal = hand.legal_plays(trick.lead_suit());
        *legal.choose(&mut self.rng).unwrap_or(&legal[0])
    }
}
