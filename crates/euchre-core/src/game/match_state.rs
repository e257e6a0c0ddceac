use crate::model::hand_state::{
    BidError, Contract, ExchangeError, HandPhase, HandScore, HandState, PlayError, PlayOutcome,
};
use crate::model::rules::Rules;
use crate::model::score::ScoreBoard;
use crate::model::seat::Seat;
use crate::strategy::{BidContext, HandStartView, Player};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;

/// A full match: repeated hands with a rotating dealer and accumulated team
/// scores. The match owns the RNG and every hand's canonical state; the
/// four players only ever answer questions.
#[derive(Debug)]
pub struct MatchState {
    rules: Rules,
    scores: ScoreBoard,
    dealer: Seat,
    hands_played: usize,
    rng: StdRng,
    seed: u64,
}

/// One finished (or thrown-in) hand as the match records it.
#[derive(Debug, Clone, Copy)]
pub struct HandRecord {
    pub dealer: Seat,
    pub contract: Option<Contract>,
    pub score: Option<HandScore>,
}

/// Result of a completed match.
#[derive(Debug, Clone)]
pub struct MatchSummary {
    /// Final totals, indexed by [`crate::model::seat::Team`].
    pub scores: [i32; 2],
    pub hands: Vec<HandRecord>,
    pub terminated_early: bool,
    /// Lone hands declared per team.
    pub lone_bids: [usize; 2],
    /// Lone hands that made their contract, per team.
    pub lone_made: [usize; 2],
}

/// Fatal failures: a strategy broke a rule, or the engine's own card
/// accounting did. Nothing here is recoverable; the match aborts so the
/// bug surfaces instead of corrupting the simulation.
#[derive(Debug)]
pub enum EngineError {
    Bid(BidError),
    Exchange(ExchangeError),
    Play(PlayError),
    /// A seat holds cards but the legal-play set came back empty.
    EmptyLegalSet { seat: Seat },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Bid(err) => write!(f, "illegal bid: {err}"),
            EngineError::Exchange(err) => write!(f, "illegal exchange: {err}"),
            EngineError::Play(err) => write!(f, "illegal play: {err}"),
            EngineError::EmptyLegalSet { seat } => {
                write!(f, "{seat} has a non-empty hand but no legal play")
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Bid(err) => Some(err),
            EngineError::Exchange(err) => Some(err),
            EngineError::Play(err) => Some(err),
            EngineError::EmptyLegalSet { .. } => None,
        }
    }
}

impl From<BidError> for EngineError {
    fn from(err: BidError) -> Self {
        EngineError::Bid(err)
    }
}

impl From<ExchangeError> for EngineError {
    fn from(err: ExchangeError) -> Self {
        EngineError::Exchange(err)
    }
}

impl From<PlayError> for EngineError {
    fn from(err: PlayError) -> Self {
        EngineError::Play(err)
    }
}

impl MatchState {
    pub fn new(rules: Rules, first_dealer: Seat) -> Self {
        let seed: u64 = rand::random();
        Self::with_seed(rules, first_dealer, seed)
    }

    pub fn with_seed(rules: Rules, first_dealer: Seat, seed: u64) -> Self {
        Self {
            rules,
            scores: ScoreBoard::new(),
            dealer: first_dealer,
            hands_played: 0,
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn dealer(&self) -> Seat {
        self.dealer
    }

    pub fn hands_played(&self) -> usize {
        self.hands_played
    }

    pub fn hands_remaining(&self) -> usize {
        self.rules.hands_per_match.saturating_sub(self.hands_played)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The trailing team cannot catch up once the gap exceeds what the
    /// remaining hands could swing even as all-lone wins.
    pub fn score_out_of_reach(&self) -> bool {
        self.scores.gap() > self.hands_remaining() as i32 * self.rules.max_hand_swing()
    }

    /// Deals and plays one hand to completion: bidding, exchange, every
    /// trick, scoring, dealer rotation. One illegal decision from any
    /// strategy aborts with the engine's validation error.
    pub fn play_hand(&mut self, players: &mut [Player; 4]) -> Result<HandRecord, EngineError> {
        let mut hand = HandState::deal(self.rules, self.dealer, &mut self.rng);
        let hands_remaining = self.hands_remaining().max(1);

        while let Some(seat) = hand.expected_bidder() {
            let decision = {
                let ctx = BidContext {
                    seat,
                    hand: hand.hand(seat),
                    bids: hand.bids(),
                    current_high: hand.high_bid(),
                    score_delta: self.scores.delta_for(seat),
                    hands_remaining,
                    rules: &self.rules,
                };
                players[seat.index()].bidder.bid(&ctx)
            };
            hand.submit_bid(seat, decision)?;
        }

        if hand.phase() == HandPhase::ThrownIn {
            return Ok(self.finish_hand(&hand));
        }

        let contract = hand.contract().expect("contract fixed after bidding");

        if hand.phase() == HandPhase::LoneDonation {
            let partner = contract.declarer.partner();
            let gift = players[partner.index()]
                .player
                .give_two_to_partner(hand.hand(partner), contract.bid.suit);
            hand.submit_donation(gift)?;
        }

        let discard_count = hand.exchange_discard_count().expect("exchange pending");
        let discards = players[contract.declarer.index()]
            .player
            .take_kitty(hand.hand(contract.declarer), discard_count);
        hand.exchange_kitty(&discards)?;

        for seat in Seat::LOOP {
            if hand.sitting_out() == Some(seat) {
                continue;
            }
            let view = HandStartView {
                seat,
                trump: contract.bid.suit,
                bids: hand.bids(),
                sitting_out: hand.sitting_out(),
                hand: hand.hand(seat),
                rules: &self.rules,
            };
            players[seat.index()].player.begin_hand(&view);
        }

        while !hand.is_over() {
            let seat = hand.current_trick().expected_seat();
            let card = {
                let trick = hand.current_trick();
                let seat_hand = hand.hand(seat);
                if seat_hand.legal_plays(trick.lead_suit()).is_empty() {
                    return Err(EngineError::EmptyLegalSet { seat });
                }
                let unseen = hand.unseen_for(seat);
                if trick.plays().is_empty() {
                    players[seat.index()].player.lead(seat_hand, &unseen)
                } else {
                    players[seat.index()].player.follow(seat_hand, &unseen, trick)
                }
            };

            if let PlayOutcome::TrickCompleted { .. } = hand.play_card(seat, card)? {
                let finished = hand.trick_history().last().expect("trick just completed");
                for observer in Seat::LOOP {
                    if hand.sitting_out() == Some(observer) {
                        continue;
                    }
                    let unseen = hand.unseen_for(observer);
                    players[observer.index()]
                        .player
                        .observe_trick(finished, &unseen);
                }
            }
        }

        Ok(self.finish_hand(&hand))
    }

    fn finish_hand(&mut self, hand: &HandState) -> HandRecord {
        let record = HandRecord {
            dealer: self.dealer,
            contract: hand.contract(),
            score: hand.outcome(),
        };
        if let Some(score) = record.score {
            self.scores.apply(score.bidding_team, score.points);
        }
        self.dealer = self.dealer.next();
        self.hands_played += 1;
        record
    }

    /// Plays hands until the configured count is reached or the score gap
    /// is out of reach. Thrown-in hands count against the budget.
    pub fn play_match(&mut self, players: &mut [Player; 4]) -> Result<MatchSummary, EngineError> {
        let mut hands = Vec::with_capacity(self.hands_remaining());
        let mut lone_bids = [0usize; 2];
        let mut lone_made = [0usize; 2];
        let mut terminated_early = false;

        while self.hands_played < self.rules.hands_per_match {
            if self.score_out_of_reach() {
                terminated_early = true;
                break;
            }
            let record = self.play_hand(players)?;
            if let (Some(contract), Some(score)) = (record.contract, record.score) {
                if contract.bid.is_lone(&self.rules) {
                    let team = contract.declarer.team().index();
                    lone_bids[team] += 1;
                    if score.made {
                        lone_made[team] += 1;
                    }
                }
            }
            hands.push(record);
        }

        Ok(MatchSummary {
            scores: self.scores.totals(),
            hands,
            terminated_early,
            lone_bids,
            lone_made,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{MatchState, Player};
    use crate::model::bid::Bid;
    use crate::model::card::Card;
    use crate::model::hand::Hand;
    use crate::model::rules::Rules;
    use crate::model::seat::{Seat, Team};
    use crate::model::suit::Suit;
    use crate::model::trick::Trick;
    use crate::strategy::{BidContext, BidStrategy, PlayStrategy};

    /// Bids 3 clubs when the table is silent, otherwise passes.
    struct OpenThreeClubs;

    impl BidStrategy for OpenThreeClubs {
        fn bid(&mut self, ctx: &BidContext<'_>) -> Option<Bid> {
            match ctx.current_high {
                None => Some(Bid::new(3, Suit::Clubs)),
                Some(_) => None,
            }
        }
    }

    struct PassForever;

    impl BidStrategy for PassForever {
        fn bid(&mut self, _ctx: &BidContext<'_>) -> Option<Bid> {
            None
        }
    }

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

    fn table(bid_everyone: bool) -> [Player; 4] {
        std::array::from_fn(|_| {
            let bidder: Box<dyn BidStrategy> = if bid_everyone {
                Box::new(OpenThreeClubs)
            } else {
                Box::new(PassForever)
            };
            Player::new(bidder, Box::new(FirstLegal))
        })
    }

    #[test]
    fn one_hand_moves_exactly_the_stake() {
        let mut players = table(true);
        let mut state = MatchState::with_seed(Rules::standard(), Seat::North, 9);
        let record = state.play_hand(&mut players).expect("hand completes");

        let contract = record.contract.expect("east opened the bidding");
        assert_eq!(contract.declarer, Seat::East);
        let score = record.score.expect("hand was scored");
        assert_eq!(score.points.abs(), 3);
        assert_eq!(state.scores().score(Team::EastWest), score.points);
        assert_eq!(state.scores().score(Team::NorthSouth), 0);
        assert_eq!(state.dealer(), Seat::East);
        assert_eq!(state.hands_played(), 1);
    }

    #[test]
    fn all_pass_hands_rotate_the_dealer_and_burn_budget() {
        let mut players = table(false);
        let mut state = MatchState::with_seed(Rules::standard(), Seat::North, 1);
        let record = state.play_hand(&mut players).expect("thrown in");
        assert!(record.contract.is_none());
        assert!(record.score.is_none());
        assert_eq!(state.dealer(), Seat::East);
        assert_eq!(state.hands_played(), 1);
    }

    #[test]
    fn matches_are_deterministic_under_a_seed() {
        let run = || {
            let mut players = table(true);
            let mut state = MatchState::with_seed(Rules::standard(), Seat::North, 77);
            state.play_match(&mut players).expect("match completes")
        };
        let first = run();
        let second = run();
        assert_eq!(first.scores, second.scores);
        assert_eq!(first.hands.len(), second.hands.len());
    }

    #[test]
    fn match_plays_the_configured_number_of_hands() {
        let mut players = table(true);
        let mut state = MatchState::with_seed(Rules::standard(), Seat::North, 5);
        let summary = state.play_match(&mut players).expect("match completes");
        assert!(!summary.terminated_early);
        assert_eq!(summary.hands.len(), 12);
        assert_eq!(
            summary.scores[0] + summary.scores[1],
            summary
                .hands
                .iter()
                .filter_map(|h| h.score.map(|s| s.points))
                .sum::<i32>()
        );
    }

    #[test]
    fn unreachable_gap_terminates_the_match_early() {
        let mut players = table(true);
        let mut state = MatchState::with_seed(Rules::standard(), Seat::North, 5);
        // 200 > 12 hands * 16 points.
        state.scores.apply(Team::NorthSouth, 200);
        let summary = state.play_match(&mut players).expect("match completes");
        assert!(summary.terminated_early);
        assert!(summary.hands.is_empty());
    }
}
