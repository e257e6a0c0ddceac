//! Decision interfaces the engine drives. A strategy never mutates engine
//! state: it sees read-only views and returns a single decision, which the
//! engine validates before applying.

use crate::model::bid::{Bid, SeatBid};
use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::rules::Rules;
use crate::model::seat::Seat;
use crate::model::suit::Suit;
use crate::model::trick::Trick;

/// Everything a bidder is entitled to see. The hand is unconverted because
/// bidding precedes the trump declaration.
pub struct BidContext<'a> {
    pub seat: Seat,
    pub hand: &'a Hand,
    pub bids: &'a [SeatBid],
    pub current_high: Option<Bid>,
    /// Caller's team score minus the opposing team's score.
    pub score_delta: i32,
    pub hands_remaining: usize,
    pub rules: &'a Rules,
}

/// Bid-or-pass decision. `None` is a pass; a returned bid must strictly
/// exceed the current high amount or the engine aborts the hand.
pub trait BidStrategy: Send {
    fn bid(&mut self, ctx: &BidContext<'_>) -> Option<Bid>;
}

/// Snapshot handed to every active seat when play begins: the contract is
/// fixed and every card in view is trump-converted.
pub struct HandStartView<'a> {
    pub seat: Seat,
    pub trump: Suit,
    pub bids: &'a [SeatBid],
    pub sitting_out: Option<Seat>,
    pub hand: &'a Hand,
    pub rules: &'a Rules,
}

pub trait PlayStrategy: Send {
    /// Called once per hand after the kitty exchange, before the first
    /// trick. Belief-tracking strategies seed their state here.
    fn begin_hand(&mut self, _view: &HandStartView<'_>) {}

    /// Called after every completed trick with the observer's unseen view.
    fn observe_trick(&mut self, _trick: &Trick, _unseen: &[Card]) {}

    /// Must return exactly `discard_count` cards drawn from `hand`.
    fn take_kitty(&mut self, hand: &Hand, discard_count: usize) -> Vec<Card>;

    /// Lone-hand support: the folding partner picks the two cards handed to
    /// the declarer. The conventional order gives bauers first, then
    /// off-suit aces, then trump by rank, then the rest by rank.
    fn give_two_to_partner(&mut self, hand: &Hand, trump: Suit) -> [Card; 2] {
        let mut cards: Vec<Card> = hand.cards().to_vec();
        cards.sort_by_key(|c| std::cmp::Reverse(donation_value(*c)));
        let _ = trump;
        [cards[0], cards[1]]
    }

    fn lead(&mut self, hand: &Hand, unseen: &[Card]) -> Card;

    /// Must return a member of the legal-play set for `trick`'s lead suit.
    fn follow(&mut self, hand: &Hand, unseen: &[Card], trick: &Trick) -> Card;
}

/// Donation priority: right bauer 32, left bauer 30, off-suit ace 29, then
/// trump above 14 by doubled rank so any trump outranks off-suit spot
/// cards, then plain rank.
fn donation_value(card: Card) -> u8 {
    if card.suit.is_trump() {
        card.rank.value() * 2
    } else if card.rank == crate::model::rank::Rank::Ace {
        29
    } else {
        card.rank.value()
    }
}

/// One seat at the table: a bidding strategy paired with a playing
/// strategy, swappable independently of the engine.
pub struct Player {
    pub bidder: Box<dyn BidStrategy>,
    pub player: Box<dyn PlayStrategy>,
}

impl Player {
    pub fn new(bidder: Box<dyn BidStrategy>, player: Box<dyn PlayStrategy>) -> Self {
        Self { bidder, player }
    }
}

#[cfg(test)]
mod tests {
    use super::{Card, Hand, PlayStrategy, Suit, Trick};
    use crate::model::rank::Rank;

    struct FirstLegal;

    impl PlayStrategy for FirstLegal {
        fn take_kitty(&mut self, hand: &Hand, discard_count: usize) -> Vec<Card> {
            hand.cards()[..discard_count].to_vec()
        }

        fn lead(&mut self, hand: &Hand, _unseen: &[Card]) -> Card {
            hand.cards()[0]
        }

        fn follow(&mut self, hand: &Hand, _unseen: &[Card], trick: &Trick) -> Card {
            hand.legal_plays(trick.lead_suit())[0]
        }
    }

    #[test]
    fn default_donation_prefers_bauers_then_offsuit_aces() {
        let mut strat = FirstLegal;
        let hand = Hand::with_cards(vec![
            Card::new(Rank::RightBauer, Suit::Trump),
            Card::new(Rank::Ace, Suit::Trump),
            Card::new(Rank::Ace, Suit::Spades),
            Card::new(Rank::Nine, Suit::Clubs),
        ]);
        let gift = strat.give_two_to_partner(&hand, Suit::Hearts);
        assert_eq!(gift[0], Card::new(Rank::RightBauer, Suit::Trump));
        assert_eq!(gift[1], Card::new(Rank::Ace, Suit::Spades));
    }

    #[test]
    fn default_donation_keeps_trump_over_offsuit_spots() {
        let mut strat = FirstLegal;
        let hand = Hand::with_cards(vec![
            Card::new(Rank::Nine, Suit::Trump),
            Card::new(Rank::King, Suit::Spades),
            Card::new(Rank::Queen, Suit::Diamonds),
        ]);
        let gift = strat.give_two_to_partner(&hand, Suit::Hearts);
        assert_eq!(gift[0], Card::new(Rank::Nine, Suit::Trump));
        assert_eq!(gift[1], Card::new(Rank::King, Suit::Spades));
    }
}
