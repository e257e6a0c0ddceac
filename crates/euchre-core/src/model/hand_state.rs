use crate::model::bid::{Bid, SeatBid};
use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::rules::Rules;
use crate::model::seat::{Seat, Team};
use crate::model::suit::Suit;
use crate::model::trick::Trick;
use std::{array, fmt, vec::Vec};

/// One deal, from shuffle to scoring. The state machine owns every card
/// zone (hands, kitty, out-of-play discards, tricks) and is the only thing
/// allowed to move cards between them; strategies only ever see read-only
/// views. Phase order is `Bidding`, then `LoneDonation` when the contract
/// is lone, then `KittyExchange`, then `Playing` until every trick is done.
#[derive(Debug, Clone)]
pub struct HandState {
    rules: Rules,
    dealer: Seat,
    hands: [Hand; 4],
    kitty: Vec<Card>,
    bids: Vec<SeatBid>,
    contract: Option<Contract>,
    sitting_out: Option<Seat>,
    discards: Vec<Card>,
    known_out_of_play: [Vec<Card>; 4],
    current_trick: Trick,
    trick_history: Vec<Trick>,
    trick_wins: [usize; 2],
    phase: HandPhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contract {
    pub declarer: Seat,
    pub bid: Bid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandPhase {
    Bidding,
    LoneDonation,
    KittyExchange,
    Playing,
    Complete,
    ThrownIn,
}

/// Score movement of a finished hand. Only the bidding team's total moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandScore {
    pub bidding_team: Team,
    pub made: bool,
    pub points: i32,
    pub tricks_taken: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidOutcome {
    Continuing,
    Contracted(Contract),
    ThrownIn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BidError {
    NotInBiddingPhase,
    OutOfTurn { expected: Seat, actual: Seat },
    TooLow { amount: u8, minimum: u8 },
}

impl fmt::Display for BidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BidError::NotInBiddingPhase => write!(f, "bidding is closed"),
            BidError::OutOfTurn { expected, actual } => {
                write!(f, "expected {expected} to bid next but got {actual}")
            }
            BidError::TooLow { amount, minimum } => {
                write!(f, "bid of {amount} must be at least {minimum}")
            }
        }
    }
}

impl std::error::Error for BidError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    NotInDonationPhase,
    NotInExchangePhase,
    CardNotHeld(Card),
    WrongDiscardCount { expected: usize, actual: usize },
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeError::NotInDonationPhase => write!(f, "no lone donation is pending"),
            ExchangeError::NotInExchangePhase => write!(f, "no kitty exchange is pending"),
            ExchangeError::CardNotHeld(card) => {
                write!(f, "{card} is not held by the exchanging seat")
            }
            ExchangeError::WrongDiscardCount { expected, actual } => {
                write!(f, "exchange must discard {expected} cards, got {actual}")
            }
        }
    }
}

impl std::error::Error for ExchangeError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayError {
    NotInPlayPhase,
    CardNotInHand(Card),
    MustFollowSuit(Suit),
    Trick(super::trick::TrickError),
    Accounting(AccountingError),
}

impl fmt::Display for PlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayError::NotInPlayPhase => write!(f, "hand is not in the play phase"),
            PlayError::CardNotInHand(card) => write!(f, "{card} is not in the seat's hand"),
            PlayError::MustFollowSuit(suit) => write!(f, "must follow the led suit {suit}"),
            PlayError::Trick(err) => write!(f, "{err}"),
            PlayError::Accounting(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for PlayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlayError::Trick(err) => Some(err),
            PlayError::Accounting(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AccountingError> for PlayError {
    fn from(err: AccountingError) -> Self {
        PlayError::Accounting(err)
    }
}

/// Card-conservation failure: the zones no longer sum back to the deck.
/// Carries the per-zone counts so the broken state is visible in the error
/// itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountingError {
    pub expected_total: usize,
    pub in_hands: usize,
    pub in_kitty: usize,
    pub played: usize,
    pub set_aside: usize,
    pub mismatched_identity: Option<Card>,
}

impl fmt::Display for AccountingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "card accounting broke: hands={} kitty={} played={} set_aside={} expected_total={}",
            self.in_hands, self.in_kitty, self.played, self.set_aside, self.expected_total
        )?;
        if let Some(card) = self.mismatched_identity {
            write!(f, " (copy count of {card} is off)")?;
        }
        Ok(())
    }
}

impl std::error::Error for AccountingError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Played,
    TrickCompleted { winner: Seat },
}

impl HandState {
    /// Shuffle and deal a fresh hand. Seats receive `rules.hand_size()`
    /// cards round-robin; the remainder is the kitty.
    pub fn deal<R: rand::Rng + ?Sized>(rules: Rules, dealer: Seat, rng: &mut R) -> Self {
        let deck = Deck::shuffled(&rules, rng);
        let mut hands: [Hand; 4] = array::from_fn(|_| Hand::new());
        let dealt = rules.hand_size() * Seat::COUNT;

        for (index, card) in deck.cards().iter().enumerate() {
            if index < dealt {
                hands[index % Seat::COUNT].add(*card);
            }
        }
        let kitty = deck.cards()[dealt..].to_vec();

        Self {
            rules,
            dealer,
            hands,
            kitty,
            bids: Vec::with_capacity(Seat::COUNT),
            contract: None,
            sitting_out: None,
            discards: Vec::new(),
            known_out_of_play: array::from_fn(|_| Vec::new()),
            current_trick: Trick::new(dealer.next()),
            trick_history: Vec::new(),
            trick_wins: [0; 2],
            phase: HandPhase::Bidding,
        }
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn dealer(&self) -> Seat {
        self.dealer
    }

    pub fn phase(&self) -> HandPhase {
        self.phase
    }

    pub fn hand(&self, seat: Seat) -> &Hand {
        &self.hands[seat.index()]
    }

    pub fn kitty(&self) -> &[Card] {
        &self.kitty
    }

    pub fn bids(&self) -> &[SeatBid] {
        &self.bids
    }

    pub fn contract(&self) -> Option<Contract> {
        self.contract
    }

    pub fn sitting_out(&self) -> Option<Seat> {
        self.sitting_out
    }

    pub fn trump(&self) -> Option<Suit> {
        self.contract.map(|c| c.bid.suit)
    }

    pub fn current_trick(&self) -> &Trick {
        &self.current_trick
    }

    pub fn trick_history(&self) -> &[Trick] {
        &self.trick_history
    }

    pub fn tricks_completed(&self) -> usize {
        self.trick_history.len()
    }

    pub fn tricks_won(&self, team: Team) -> usize {
        self.trick_wins[team.index()]
    }

    pub fn high_bid(&self) -> Option<Bid> {
        self.bids.iter().filter_map(|sb| sb.bid).last()
    }

    /// Seat whose bid the engine expects next. Bidding starts left of the
    /// dealer and goes around exactly once.
    pub fn expected_bidder(&self) -> Option<Seat> {
        if self.phase != HandPhase::Bidding || self.bids.len() >= Seat::COUNT {
            return None;
        }
        let mut seat = self.dealer.next();
        for _ in 0..self.bids.len() {
            seat = seat.next();
        }
        Some(seat)
    }

    pub fn submit_bid(&mut self, seat: Seat, bid: Option<Bid>) -> Result<BidOutcome, BidError> {
        if self.phase != HandPhase::Bidding {
            return Err(BidError::NotInBiddingPhase);
        }
        let expected = self.expected_bidder().ok_or(BidError::NotInBiddingPhase)?;
        if expected != seat {
            return Err(BidError::OutOfTurn {
                expected,
                actual: seat,
            });
        }

        if let Some(bid) = bid {
            let minimum = self.high_bid().map(|b| b.amount + 1).unwrap_or(1);
            if bid.amount < minimum {
                return Err(BidError::TooLow {
                    amount: bid.amount,
                    minimum,
                });
            }
        }

        self.bids.push(SeatBid { seat, bid });
        if self.bids.len() < Seat::COUNT {
            return Ok(BidOutcome::Continuing);
        }
        Ok(self.close_bidding())
    }

    fn close_bidding(&mut self) -> BidOutcome {
        // Amounts rise strictly, so the last actual bid is the winner.
        let winner = self
            .bids
            .iter()
            .filter(|sb| sb.bid.is_some())
            .last()
            .copied();

        let Some(SeatBid {
            seat,
            bid: Some(bid),
        }) = winner
        else {
            self.phase = HandPhase::ThrownIn;
            return BidOutcome::ThrownIn;
        };

        let contract = Contract {
            declarer: seat,
            bid,
        };
        self.contract = Some(contract);

        // Every zone converts in the same step; from here on no unconverted
        // card exists in this hand.
        let trump = bid.suit;
        for hand in &mut self.hands {
            hand.apply_trump(trump);
        }
        for card in &mut self.kitty {
            *card = card.with_trump(trump);
        }

        if bid.is_lone(&self.rules) {
            self.sitting_out = Some(seat.partner());
            self.phase = HandPhase::LoneDonation;
        } else {
            self.merge_kitty_into_declarer();
            self.phase = HandPhase::KittyExchange;
        }
        BidOutcome::Contracted(contract)
    }

    fn merge_kitty_into_declarer(&mut self) {
        let declarer = self.contract.expect("contract fixed").declarer;
        for card in self.kitty.drain(..) {
            self.hands[declarer.index()].add(card);
        }
    }

    /// Lone-hand support: the folded partner hands the declarer two cards
    /// and the rest of their hand leaves play.
    pub fn submit_donation(&mut self, cards: [Card; 2]) -> Result<(), ExchangeError> {
        if self.phase != HandPhase::LoneDonation {
            return Err(ExchangeError::NotInDonationPhase);
        }
        let declarer = self.contract.expect("contract fixed").declarer;
        let partner = declarer.partner();

        self.take_from_hand(partner, &cards)?;
        for card in cards {
            self.hands[declarer.index()].add(card);
        }

        // The rest of the partner's hand folds out of play; only the
        // partner knows which cards those were.
        let folded: Vec<Card> = self.hands[partner.index()].cards().to_vec();
        self.hands[partner.index()] = Hand::new();
        self.known_out_of_play[partner.index()].extend(folded.iter().copied());
        self.discards.extend(folded);

        self.merge_kitty_into_declarer();
        self.phase = HandPhase::KittyExchange;
        Ok(())
    }

    /// Number of cards the declarer must discard to get back down to the
    /// hand size.
    pub fn exchange_discard_count(&self) -> Option<usize> {
        if self.phase != HandPhase::KittyExchange {
            return None;
        }
        let declarer = self.contract?.declarer;
        Some(self.hands[declarer.index()].len() - self.rules.hand_size())
    }

    pub fn exchange_kitty(&mut self, discarded: &[Card]) -> Result<(), ExchangeError> {
        if self.phase != HandPhase::KittyExchange {
            return Err(ExchangeError::NotInExchangePhase);
        }
        let declarer = self.contract.expect("contract fixed").declarer;
        let expected = self.exchange_discard_count().unwrap_or(0);
        if discarded.len() != expected {
            return Err(ExchangeError::WrongDiscardCount {
                expected,
                actual: discarded.len(),
            });
        }

        self.take_from_hand(declarer, discarded)?;
        self.known_out_of_play[declarer.index()].extend(discarded.iter().copied());
        self.discards.extend(discarded.iter().copied());

        let leader = declarer;
        self.current_trick = match self.sitting_out {
            Some(folded) => Trick::with_sitting_out(leader, folded),
            None => Trick::new(leader),
        };
        self.phase = HandPhase::Playing;
        Ok(())
    }

    /// Removes `cards` from a seat's hand, validating copy counts before
    /// touching anything so an error leaves the hand intact.
    fn take_from_hand(&mut self, seat: Seat, cards: &[Card]) -> Result<(), ExchangeError> {
        let hand = &self.hands[seat.index()];
        for card in cards {
            let wanted = cards.iter().filter(|c| **c == *card).count();
            let held = hand.iter().filter(|c| **c == *card).count();
            if held < wanted {
                return Err(ExchangeError::CardNotHeld(*card));
            }
        }
        for card in cards {
            let removed = self.hands[seat.index()].remove(*card);
            debug_assert!(removed);
        }
        Ok(())
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, HandPhase::Complete | HandPhase::ThrownIn)
    }

    pub fn play_card(&mut self, seat: Seat, card: Card) -> Result<PlayOutcome, PlayError> {
        if self.phase != HandPhase::Playing {
            return Err(PlayError::NotInPlayPhase);
        }
        if !self.hands[seat.index()].contains(card) {
            return Err(PlayError::CardNotInHand(card));
        }

        if let Some(suit) = self.current_trick.lead_suit() {
            if card.suit != suit && self.hands[seat.index()].has_suit(suit) {
                return Err(PlayError::MustFollowSuit(suit));
            }
        }

        self.current_trick
            .play(seat, card)
            .map_err(PlayError::Trick)?;
        let removed = self.hands[seat.index()].remove(card);
        debug_assert!(removed);

        if !self.current_trick.is_complete() {
            return Ok(PlayOutcome::Played);
        }

        let winner = self.current_trick.winner().expect("winner when complete");
        self.trick_wins[winner.team().index()] += 1;

        let next = match self.sitting_out {
            Some(folded) => Trick::with_sitting_out(winner, folded),
            None => Trick::new(winner),
        };
        let finished = std::mem::replace(&mut self.current_trick, next);
        self.trick_history.push(finished);

        if self.trick_history.len() == self.rules.hand_size() {
            self.phase = HandPhase::Complete;
        }

        self.audit_conservation()?;
        Ok(PlayOutcome::TrickCompleted { winner })
    }

    /// Cards a seat has not seen: the deck minus plays on the table, minus
    /// the seat's own hand, minus out-of-play cards that seat knows about
    /// (its own kitty discards, its own folded cards). Everything else may
    /// sit in another hand or in a hidden discard.
    pub fn unseen_for(&self, seat: Seat) -> Vec<Card> {
        let trump = self.trump().unwrap_or(Suit::Trump);
        let mut unseen: Vec<Card> = Deck::full(&self.rules)
            .cards()
            .iter()
            .map(|c| c.with_trump(trump))
            .collect();

        let remove_one = |card: Card, pool: &mut Vec<Card>| {
            if let Some(index) = pool.iter().position(|c| *c == card) {
                pool.swap_remove(index);
            }
        };

        for trick in self.trick_history.iter().chain([&self.current_trick]) {
            for play in trick.plays() {
                remove_one(play.card, &mut unseen);
            }
        }
        for card in self.hands[seat.index()].iter() {
            remove_one(*card, &mut unseen);
        }
        for card in &self.known_out_of_play[seat.index()] {
            remove_one(*card, &mut unseen);
        }
        unseen.sort();
        unseen
    }

    /// Verifies every copy of every card is in exactly one zone. Runs after
    /// each completed trick; a failure is fatal to the hand.
    fn audit_conservation(&self) -> Result<(), AccountingError> {
        let trump = self.trump().unwrap_or(Suit::Trump);
        let in_hands: usize = self.hands.iter().map(Hand::len).sum();
        let played: usize = self
            .trick_history
            .iter()
            .chain([&self.current_trick])
            .map(|t| t.plays().len())
            .sum();
        let set_aside = self.discards.len();
        let in_kitty = self.kitty.len();
        let expected_total = self.rules.deck_size();

        let report = AccountingError {
            expected_total,
            in_hands,
            in_kitty,
            played,
            set_aside,
            mismatched_identity: None,
        };

        if in_hands + played + set_aside + in_kitty != expected_total {
            return Err(report);
        }

        let mut seen: Vec<Card> = Vec::with_capacity(expected_total);
        for hand in &self.hands {
            seen.extend(hand.iter().copied());
        }
        for trick in self.trick_history.iter().chain([&self.current_trick]) {
            seen.extend(trick.plays().iter().map(|p| p.card));
        }
        seen.extend(self.discards.iter().copied());
        seen.extend(self.kitty.iter().copied());
        seen.sort();

        let mut expected: Vec<Card> = Deck::full(&self.rules)
            .cards()
            .iter()
            .map(|c| c.with_trump(trump))
            .collect();
        expected.sort();

        if let Some(pair) = seen.iter().zip(expected.iter()).find(|(a, b)| a != b) {
            return Err(AccountingError {
                mismatched_identity: Some(*pair.0),
                ..report
            });
        }
        Ok(())
    }

    /// Score movement once every trick is played; `None` before then or on
    /// a thrown-in hand.
    pub fn outcome(&self) -> Option<HandScore> {
        if self.phase != HandPhase::Complete {
            return None;
        }
        let contract = self.contract?;
        let bidding_team = contract.declarer.team();
        Some(score_hand(
            &contract,
            self.tricks_won(bidding_team),
            &self.rules,
        ))
    }
}

/// Pure scoring rule: make the contract and collect the stake, fall short
/// and lose it. Lone hands stake the fixed lone value both ways.
pub fn score_hand(contract: &Contract, tricks_taken: usize, rules: &Rules) -> HandScore {
    let made = tricks_taken >= contract.bid.tricks_required(rules);
    let stake = contract.bid.stake(rules);
    HandScore {
        bidding_team: contract.declarer.team(),
        made,
        points: if made { stake } else { -stake },
        tricks_taken,
    }
}
