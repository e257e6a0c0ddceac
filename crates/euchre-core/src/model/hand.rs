use crate::model::card::Card;
use crate::model::suit::Suit;
use std::vec::Vec;

/// Cards held by one seat, kept sorted by suit then rank. The double deck
/// means a hand may hold the same identity twice; removal takes one copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        let mut hand = Self { cards };
        hand.sort();
        hand
    }

    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
        self.sort();
    }

    pub fn remove(&mut self, card: Card) -> bool {
        if let Some(index) = self.cards.iter().position(|&c| c == card) {
            self.cards.remove(index);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn count_suit(&self, suit: Suit) -> usize {
        self.cards.iter().filter(|c| c.suit == suit).count()
    }

    pub fn has_suit(&self, suit: Suit) -> bool {
        self.cards.iter().any(|c| c.suit == suit)
    }

    /// Standard follow-suit rule: cards of the led suit if any are held,
    /// otherwise the whole hand. `None` means this seat is on lead and
    /// unconstrained.
    pub fn legal_plays(&self, lead: Option<Suit>) -> Vec<Card> {
        match lead {
            Some(suit) if self.has_suit(suit) => self
                .cards
                .iter()
                .copied()
                .filter(|c| c.suit == suit)
                .collect(),
            _ => self.cards.clone(),
        }
    }

    /// Rewrites every card through trump conversion and re-sorts. Done once
    /// per hand, right when the contract is fixed.
    pub fn apply_trump(&mut self, trump: Suit) {
        for card in &mut self.cards {
            *card = card.with_trump(trump);
        }
        self.sort();
    }

    fn sort(&mut self) {
        self.cards
            .sort_by(|a, b| a.suit.cmp(&b.suit).then(a.rank.cmp(&b.rank)));
    }
}

#[cfg(test)]
mod tests {
    use super::Hand;
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn add_and_remove_cards() {
        let mut hand = Hand::new();
        let card = Card::new(Rank::Nine, Suit::Clubs);
        hand.add(card);
        assert!(hand.contains(card));
        assert!(hand.remove(card));
        assert!(!hand.contains(card));
    }

    #[test]
    fn remove_takes_a_single_copy_of_twins() {
        let card = Card::new(Rank::King, Suit::Hearts);
        let mut hand = Hand::with_cards(vec![card, card]);
        assert!(hand.remove(card));
        assert!(hand.contains(card));
        assert_eq!(hand.len(), 1);
    }

    #[test]
    fn cards_are_sorted_by_suit_then_rank() {
        let mut hand = Hand::new();
        hand.add(Card::new(Rank::King, Suit::Spades));
        hand.add(Card::new(Rank::Nine, Suit::Hearts));
        hand.add(Card::new(Rank::Ace, Suit::Hearts));
        let ordered: Vec<_> = hand.iter().copied().collect();
        assert_eq!(ordered[0], Card::new(Rank::Nine, Suit::Hearts));
        assert_eq!(ordered[1], Card::new(Rank::Ace, Suit::Hearts));
        assert_eq!(ordered[2], Card::new(Rank::King, Suit::Spades));
    }

    #[test]
    fn legal_plays_follow_the_led_suit() {
        let hand = Hand::with_cards(vec![
            Card::new(Rank::Nine, Suit::Hearts),
            Card::new(Rank::Ace, Suit::Hearts),
            Card::new(Rank::Queen, Suit::Clubs),
        ]);
        let plays = hand.legal_plays(Some(Suit::Hearts));
        assert_eq!(plays.len(), 2);
        assert!(plays.iter().all(|c| c.suit == Suit::Hearts));
    }

    #[test]
    fn legal_plays_fall_back_to_whole_hand_when_void() {
        let hand = Hand::with_cards(vec![
            Card::new(Rank::Nine, Suit::Hearts),
            Card::new(Rank::Queen, Suit::Clubs),
        ]);
        assert_eq!(hand.legal_plays(Some(Suit::Spades)).len(), 2);
        assert_eq!(hand.legal_plays(None).len(), 2);
    }

    #[test]
    fn apply_trump_rewrites_and_regroups() {
        let mut hand = Hand::with_cards(vec![
            Card::new(Rank::Jack, Suit::Hearts),
            Card::new(Rank::Jack, Suit::Diamonds),
            Card::new(Rank::Ace, Suit::Spades),
        ]);
        hand.apply_trump(Suit::Hearts);
        assert!(hand.contains(Card::new(Rank::RightBauer, Suit::Trump)));
        assert!(hand.contains(Card::new(Rank::LeftBauer, Suit::Trump)));
        assert!(hand.contains(Card::new(Rank::Ace, Suit::Spades)));
        // Trump group sorts last.
        assert_eq!(hand.cards()[0], Card::new(Rank::Ace, Suit::Spades));
    }
}
