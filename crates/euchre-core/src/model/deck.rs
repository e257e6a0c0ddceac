use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::rules::Rules;
use crate::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Unshuffled deck for the given rules: `deck_copies` copies of each
    /// printed rank in each base suit.
    pub fn full(rules: &Rules) -> Self {
        let mut cards = Vec::with_capacity(rules.deck_size());
        for _ in 0..rules.deck_copies {
            for suit in Suit::BASE.iter().copied() {
                for rank in Rank::DEALT.iter().copied() {
                    cards.push(Card::new(rank, suit));
                }
            }
        }
        Self { cards }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rules: &Rules, rng: &mut R) -> Self {
        let mut deck = Self::full(rules);
        deck.shuffle_in_place(rng);
        deck
    }

    pub fn shuffled_with_seed(rules: &Rules, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(rules, &mut rng)
    }

    pub fn shuffle_in_place<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

#[cfg(test)]
mod tests {
    use super::Deck;
    use crate::model::rules::Rules;

    #[test]
    fn full_deck_has_two_copies_of_each_identity() {
        let deck = Deck::full(&Rules::standard());
        assert_eq!(deck.cards().len(), 48);
        for card in deck.cards() {
            let copies = deck.cards().iter().filter(|c| **c == *card).count();
            assert_eq!(copies, 2, "expected exactly two copies of {card}");
        }
    }

    #[test]
    fn shuffle_with_seed_is_deterministic() {
        let rules = Rules::standard();
        let deck_a = Deck::shuffled_with_seed(&rules, 42);
        let deck_b = Deck::shuffled_with_seed(&rules, 42);
        assert_eq!(deck_a.cards(), deck_b.cards());
    }

    #[test]
    fn shuffle_with_different_seeds_differs() {
        let rules = Rules::standard();
        let deck_a = Deck::shuffled_with_seed(&rules, 1);
        let deck_b = Deck::shuffled_with_seed(&rules, 2);
        assert_ne!(deck_a.cards(), deck_b.cards());
    }
}
