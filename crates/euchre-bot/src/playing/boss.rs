use crate::eval::{BossRank, boss_rank, throwaway};
use euchre_core::model::card::Card;
use euchre_core::model::hand::Hand;
use euchre_core::model::trick::Trick;
use euchre_core::strategy::PlayStrategy;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

/// Leads boss cards when it has them, wins with a boss card when that
/// actually takes the trick, and otherwise sheds the lowest-value card.
/// Fills the kitty by repeated lowest-value discard.
pub struct BossPlayer {
    rng: SmallRng,
}

impl BossPlayer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

/// Whether laying `card` now would hold the trick. Equal ranks do not take
/// over, so this is a strict-beats check against the current winner.
pub(crate) fn would_win(card: Card, trick: &Trick) -> bool {
    match trick.winning_play() {
        Some(play) => card.beats(play.card),
        None => true,
    }
}

impl PlayStrategy for BossPlayer {
    fn take_kitty(&mut self, hand: &Hand, discard_count: usize) -> Vec<Card> {
        let mut working = hand.cards().to_vec();
        let mut discards = Vec::with_capacity(discard_count);
        for _ in 0..discard_count {
            if let Some(card) = throwaway(&working) {
                if let Some(pos) = working.iter().position(|c| *c == card) {
                    working.remove(pos);
                }
                discards.push(card);
            }
        }
        discards
    }

    fn lead(&mut self, hand: &Hand, unseen: &[Card]) -> Card {
        let mut suit_high = None;
        for &card in hand.cards() {
            match boss_rank(card, unseen) {
                Some(BossRank::Absolute) => return card,
                Some(BossRank::SuitHigh) => suit_high = Some(card),
                None => {}
            }
        }
        suit_high.unwrap_or_else(|| {
            *hand
                .cards()
                .choose(&mut self.rng)
                .unwrap_or(&hand.cards()[0])
        })
    }

    fn follow(&mut self, hand: &Hand, unseen: &[Card], trick: &Trick) -> Card {
        let legal = hand.legal_plays(trick.lead_suit());
        for &card in &legal {
            if boss_rank(card, unseen).is_some() && would_win(card, trick) {
                return card;
            }
        }
        throwaway(&legal).unwrap_or(legal[0])
    }
}
