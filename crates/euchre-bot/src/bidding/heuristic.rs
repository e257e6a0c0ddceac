use euchre_core::model::bid::{Bid, SeatBid};
use euchre_core::model::hand::Hand;
use euchre_core::model::rank::Rank;
use euchre_core::model::suit::Suit;
use euchre_core::strategy::{BidContext, BidStrategy};
use tracing::{Level, event};

/// Tunable weights for the heuristic bidder. Defaults are the tuned
/// values; tests pin against them.
#[derive(Debug, Clone, Copy)]
pub struct BidWeights {
    /// Per right bauer (jack of the candidate suit).
    pub right_bauer: f64,
    /// Per king or ace of the candidate suit.
    pub face: f64,
    /// Per other card of the candidate suit.
    pub low_trump: f64,
    /// Per colour-mate jack, a suit-quality signal on top of the card
    /// counting.
    pub left_bauer: f64,
    /// Assumed tricks from a partner nothing is known about.
    pub partner_default: f64,
    /// Estimated lone strength above this goes alone voluntarily.
    pub lone_comfort: f64,
    /// Adjusted bid values below this prefer an indication.
    pub indication_ceiling: f64,
    /// Normal bids must beat both the table high and this floor.
    pub bid_floor: f64,
    /// Fraction of remaining hands that must be lone-sized wins before
    /// the bidder is forced alone.
    pub forced_lone_fraction: f64,
}

impl Default for BidWeights {
    fn default() -> Self {
        Self {
            right_bauer: 1.6,
            face: 0.9,
            low_trump: 0.7,
            left_bauer: 1.25,
            partner_default: 0.5,
            lone_comfort: 9.0,
            indication_ceiling: 6.0,
            bid_floor: 3.0,
            forced_lone_fraction: 0.8,
        }
    }
}

/// Per-suit hand reading: trump strength, bauer holdings, and fixed
/// tricks under no-trump play.
#[derive(Debug, Default, Clone, Copy)]
struct SuitReading {
    trump_score: f64,
    bauer_score: u8,
    fixed_tricks: u8,
}

/// What the table has said so far, from the reading seat's point of view.
#[derive(Debug, Clone)]
struct TableReading {
    partner_bid: Option<Option<Bid>>,
    /// Opponent entries, most recent first. `None` is a pass.
    opponent_bids: Vec<Option<Bid>>,
    /// Whether a small partner bid can be read as a literal indication:
    /// at most two bids preceded it on the table.
    trust_indication: bool,
}

impl TableReading {
    fn from_bids(bids: &[SeatBid], reader: euchre_core::model::seat::Seat) -> Self {
        let partner = reader.partner();
        let partner_bid = bids.iter().find(|sb| sb.seat == partner).map(|sb| sb.bid);
        let opponent_bids: Vec<Option<Bid>> = bids
            .iter()
            .rev()
            .filter(|sb| sb.seat != partner && sb.seat != reader)
            .map(|sb| sb.bid)
            .collect();
        let trust_indication = bids.len() == 2
            || (bids.len() == 3 && bids.last().map_or(false, |sb| sb.bid.is_none()));
        Self {
            partner_bid,
            opponent_bids,
            trust_indication,
        }
    }
}

/// The strongest bidding tier: per-suit trump strength, no-trump fixed
/// tricks, partner and opponent models, lone-hand evaluation, and
/// desperation scaling against the score and remaining hands.
#[derive(Debug, Default)]
pub struct HeuristicBidder {
    weights: BidWeights,
}

impl HeuristicBidder {
    pub fn new() -> Self {
        Self::with_weights(BidWeights::default())
    }

    pub fn with_weights(weights: BidWeights) -> Self {
        Self { weights }
    }

    fn read_suits(&self, hand: &Hand, table: &TableReading) -> [SuitReading; 4] {
        let mut readings = [SuitReading::default(); 4];
        for (i, suit) in Suit::BASE.iter().enumerate() {
            let mut cards: Vec<Rank> = hand
                .iter()
                .filter(|c| c.suit == *suit)
                .map(|c| c.rank)
                .collect();
            cards.sort_unstable_by(|a, b| b.cmp(a));

            let reading = &mut readings[i];
            let left_jacks = suit.left().map_or(0, |left| {
                hand.iter()
                    .filter(|c| c.suit == left && c.rank == Rank::Jack)
                    .count()
            }) as u8;
            reading.trump_score = f64::from(left_jacks) * self.weights.left_bauer;
            reading.bauer_score = left_jacks;
            for rank in &cards {
                match rank {
                    Rank::Jack => {
                        reading.bauer_score += 3;
                        reading.trump_score += self.weights.right_bauer;
                    }
                    Rank::King | Rank::Ace => reading.trump_score += self.weights.face,
                    _ => reading.trump_score += self.weights.low_trump,
                }
            }

            // Ace-ace-king is a safe run unless an opponent claimed four
            // or more in this suit.
            let mut threshold = 3u8;
            for bid in table.opponent_bids.iter().flatten() {
                if bid.suit == *suit && bid.amount >= 4 {
                    threshold = 4;
                }
            }
            let mut fixed = 0u8;
            let mut boss = Rank::Ace.value();
            for rank in &cards {
                if rank.value() == boss || fixed >= threshold {
                    fixed += 1;
                    if fixed % 2 == 0 {
                        boss -= 1;
                    }
                } else {
                    break;
                }
            }
            reading.fixed_tricks = fixed;
        }
        readings
    }

    /// Best normal bid as if the scores were level: suit index 0..3 or 4
    /// for no-trump, with its net trick estimate.
    fn best_bid(&self, readings: &[SuitReading; 4], table: &TableReading) -> (usize, f64) {
        let no_trump_fixed: u8 = readings.iter().map(|r| r.fixed_tricks).sum();
        let mut net = [self.weights.partner_default; 5];

        match table.partner_bid {
            Some(None) => {
                // Partner passed; unless the opponents' bidding claims the
                // missing strength, read it as an empty hand.
                let recent = table.opponent_bids.first().copied().flatten();
                if table.opponent_bids.len() == 1
                    || recent.is_none()
                    || recent.map_or(false, |b| b.amount <= 4)
                {
                    net = [0.0; 5];
                }
            }
            Some(Some(bid)) if bid.suit == Suit::Trump => {
                let amount = f64::from(bid.amount);
                net = [0.25 * amount; 5];
                net[Suit::Trump.index()] = amount - 1.0;
            }
            Some(Some(bid)) => {
                net[bid.suit.index()] = if table.trust_indication && bid.amount <= 3 {
                    f64::from(bid.amount / 2) + 1.5
                } else {
                    f64::from(bid.amount) / 2.0
                };
            }
            None => {}
        }

        for bid in table.opponent_bids.iter().flatten() {
            net[bid.suit.index()] -= f64::from(bid.amount) / 2.0;
            if let Some(left) = bid.suit.left() {
                net[left.index()] -= 1.0;
            }
        }

        net[Suit::Trump.index()] += f64::from(no_trump_fixed);
        for (i, reading) in readings.iter().enumerate() {
            net[i] += reading.trump_score;
            // Off-suit tricks only cash once the trump suit is strong
            // enough to reach them.
            let offsuit = f64::from(no_trump_fixed - reading.fixed_tricks);
            if net[i] > 6.5 {
                net[i] += offsuit;
            } else if net[i] > 4.0 {
                net[i] += offsuit / 2.0;
            }
        }

        best_index(&net)
    }

    /// Encodes bauer holdings as the conventional signal bid.
    fn indicate(&self, readings: &[SuitReading; 4]) -> (u8, Suit) {
        let no_trump_fixed: u8 = readings.iter().map(|r| r.fixed_tricks).sum();
        let (suit_index, best) = readings
            .iter()
            .enumerate()
            .max_by_key(|(_, r)| r.bauer_score)
            .map(|(i, r)| (i, r.bauer_score))
            .unwrap_or((0, 0));
        match best {
            3 => (1, Suit::BASE[suit_index]),
            6 => (2, Suit::BASE[suit_index]),
            4 => (3, Suit::BASE[suit_index]),
            _ => (no_trump_fixed, Suit::Trump),
        }
    }

    /// Lone-hand estimate per suit: eleven is near-certain, nine is a
    /// gamble. Returns suit index 0..3 or 4 for no-trump.
    fn best_lone(&self, readings: &[SuitReading; 4], table: &TableReading) -> (usize, f64) {
        let no_trump_fixed: u8 = readings.iter().map(|r| r.fixed_tricks).sum();
        let mut lone = [0.0f64; 5];
        for (i, reading) in readings.iter().enumerate() {
            lone[i] = f64::from(reading.bauer_score);
        }
        // Half-trick no-trump edge as the tiebreaker.
        lone[Suit::Trump.index()] = f64::from(no_trump_fixed) + 1.5;

        if let Some(Some(bid)) = table.partner_bid {
            if bid.suit == Suit::Trump {
                lone[Suit::Trump.index()] += f64::from(bid.amount.min(2));
            } else {
                let (suit_amount, left_amount) = if table.trust_indication {
                    match bid.amount {
                        3 => (4.0, 4.0),
                        2 => (6.0, 2.0),
                        _ => (3.0, 1.0),
                    }
                } else {
                    (3.0, 1.0)
                };
                lone[bid.suit.index()] += suit_amount;
                if let Some(left) = bid.suit.left() {
                    lone[left.index()] += left_amount;
                }
            }
        }

        for (i, reading) in readings.iter().enumerate() {
            if reading.trump_score < 5.0 {
                lone[i] -= 1.0;
            } else if reading.trump_score > 6.0 {
                lone[i] += reading.trump_score.floor() - 5.0;
            }
            let offsuit = f64::from(no_trump_fixed - reading.fixed_tricks);
            if lone[i] >= 8.0 {
                lone[i] += offsuit;
            } else if lone[i] >= 6.5 {
                lone[i] += offsuit / 2.0;
            }
        }

        best_index(&lone)
    }

    /// A lone declaration that legally outranks the table, or `None` when
    /// the sentinel ceiling is exhausted.
    fn lone_raise(&self, ctx: &BidContext<'_>, suit: Suit) -> Option<Bid> {
        let high = ctx.current_high.map(|b| b.amount).unwrap_or(0);
        let amount = ctx.rules.lone_bid().max(high + 1);
        if amount > ctx.rules.lone_bid_ceiling() {
            return None;
        }
        Some(Bid::new(amount, suit))
    }
}

fn best_index(scores: &[f64; 5]) -> (usize, f64) {
    let mut best = 0;
    for i in 1..scores.len() {
        if scores[i] > scores[best] {
            best = i;
        }
    }
    (best, scores[best])
}

fn suit_for(index: usize) -> Suit {
    if index < 4 { Suit::BASE[index] } else { Suit::Trump }
}

impl BidStrategy for HeuristicBidder {
    fn bid(&mut self, ctx: &BidContext<'_>) -> Option<Bid> {
        let table = TableReading::from_bids(ctx.bids, ctx.seat);
        let readings = self.read_suits(ctx.hand, &table);
        let high = ctx.current_high.map(|b| b.amount).unwrap_or(0);
        let hands_left = ctx.hands_remaining.max(1) as f64;
        let deficit = f64::from((-ctx.score_delta).max(0));

        let (lone_index, lone_score) = self.best_lone(&readings, &table);
        let lone_suit = suit_for(lone_index);

        // Fraction of the remaining hands that would have to be lone-sized
        // wins to close the gap, assuming ordinary hands average five.
        let lone_value = f64::from(ctx.rules.lone_points);
        let lones_needed =
            (deficit - 5.0 * hands_left) / ((lone_value - 5.0) * hands_left).max(1.0);
        if lones_needed > self.weights.forced_lone_fraction {
            if ctx.bids.len() >= 2 {
                event!(target: "euchre::bid", Level::DEBUG, seat = ?ctx.seat, lone_score, "forced lone hand");
                return self.lone_raise(ctx, lone_suit);
            }
            if lone_score > 5.5 {
                event!(target: "euchre::bid", Level::DEBUG, seat = ?ctx.seat, lone_score, "lone over a weak indication");
                return self.lone_raise(ctx, lone_suit);
            }
            // Early seat: signal the emergency to partner instead.
            let (mut amount, suit) = self.indicate(&readings);
            if amount <= high {
                amount = high + 1;
            }
            if amount == 0 || amount > ctx.rules.hand_size() as u8 {
                return None;
            }
            event!(target: "euchre::bid", Level::DEBUG, seat = ?ctx.seat, amount, suit = %suit, "forced indication");
            return Some(Bid::new(amount, suit));
        }

        let (bid_index, bid_score) = self.best_bid(&readings, &table);
        let bid_suit = suit_for(bid_index);
        let desperation = deficit / hands_left;

        if lone_score > self.weights.lone_comfort - desperation / 5.0 {
            event!(target: "euchre::bid", Level::DEBUG, seat = ?ctx.seat, lone_score, suit = %lone_suit, "voluntary lone hand");
            return self.lone_raise(ctx, lone_suit);
        }

        let adjusted = bid_score + desperation / 8.0;
        if adjusted < self.weights.indication_ceiling {
            let (amount, suit) = self.indicate(&readings);
            if amount > high && amount >= 1 && amount <= ctx.rules.hand_size() as u8 {
                event!(target: "euchre::bid", Level::DEBUG, seat = ?ctx.seat, amount, suit = %suit, "indication");
                return Some(Bid::new(amount, suit));
            }
        }
        if adjusted > f64::from(high).max(self.weights.bid_floor) {
            // Raises top out at the hand size; once the table is already
            // there the only legal escalation is a lone sentinel, which was
            // declined above.
            if high >= ctx.rules.hand_size() as u8 {
                return None;
            }
            let amount = (adjusted.round() as u8)
                .max(high + 1)
                .min(ctx.rules.hand_size() as u8);
            event!(target: "euchre::bid", Level::DEBUG, seat = ?ctx.seat, amount, suit = %bid_suit, score = bid_score, "normal raise");
            return Some(Bid::new(amount, bid_suit));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::HeuristicBidder;
    use euchre_core::model::bid::{Bid, SeatBid};
    use euchre_core::model::card::Card;
    use euchre_core::model::hand::Hand;
    use euchre_core::model::rank::Rank;
    use euchre_core::model::rules::Rules;
    use euchre_core::model::seat::Seat;
    use euchre_core::model::suit::Suit;
    use euchre_core::strategy::{BidContext, BidStrategy};

    fn c(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    struct Table {
        hand: Hand,
        bids: Vec<SeatBid>,
        high: Option<Bid>,
        score_delta: i32,
        hands_remaining: usize,
    }

    impl Table {
        fn new(hand: Hand) -> Self {
            Self {
                hand,
                bids: Vec::new(),
                high: None,
                score_delta: 0,
                hands_remaining: 12,
            }
        }

        fn with_bid(mut self, seat: Seat, bid: Option<Bid>) -> Self {
            if let Some(b) = bid {
                if self.high.map_or(true, |h| b.amount > h.amount) {
                    self.high = Some(b);
                }
            }
            self.bids.push(SeatBid { seat, bid });
            self
        }

        fn bid_as(&self, seat: Seat, bidder: &mut HeuristicBidder) -> Option<Bid> {
            let rules = Rules::standard();
            bidder.bid(&BidContext {
                seat,
                hand: &self.hand,
                bids: &self.bids,
                current_high: self.high,
                score_delta: self.score_delta,
                hands_remaining: self.hands_remaining,
                rules: &rules,
            })
        }
    }

    fn strong_hearts() -> Hand {
        Hand::with_cards(vec![
            c(Rank::Jack, Suit::Hearts),
            c(Rank::Jack, Suit::Hearts),
            c(Rank::Jack, Suit::Diamonds),
            c(Rank::Ace, Suit::Hearts),
            c(Rank::King, Suit::Hearts),
            c(Rank::Queen, Suit::Hearts),
            c(Rank::Ten, Suit::Hearts),
            c(Rank::Ace, Suit::Clubs),
            c(Rank::Ace, Suit::Clubs),
            c(Rank::Nine, Suit::Spades),
            c(Rank::Ten, Suit::Spades),
        ])
    }

    fn junk() -> Hand {
        Hand::with_cards(vec![
            c(Rank::Nine, Suit::Hearts),
            c(Rank::Ten, Suit::Hearts),
            c(Rank::Nine, Suit::Diamonds),
            c(Rank::Ten, Suit::Diamonds),
            c(Rank::Queen, Suit::Diamonds),
            c(Rank::Nine, Suit::Clubs),
            c(Rank::Ten, Suit::Clubs),
            c(Rank::Queen, Suit::Clubs),
            c(Rank::Nine, Suit::Spades),
            c(Rank::Ten, Suit::Spades),
            c(Rank::Queen, Suit::Spades),
        ])
    }

    #[test]
    fn strong_suit_gets_a_real_bid() {
        let table = Table::new(strong_hearts())
            .with_bid(Seat::East, None)
            .with_bid(Seat::South, None);
        let bid = table
            .bid_as(Seat::West, &mut HeuristicBidder::new())
            .expect("loaded hearts bid");
        assert_eq!(bid.suit, Suit::Hearts);
        assert!(bid.amount >= 6);
    }

    #[test]
    fn junk_hand_passes() {
        let table = Table::new(junk())
            .with_bid(Seat::East, Some(Bid::new(4, Suit::Clubs)))
            .with_bid(Seat::South, None);
        assert_eq!(table.bid_as(Seat::West, &mut HeuristicBidder::new()), None);
    }

    #[test]
    fn lone_bauer_holding_indicates() {
        // One right bauer in spades and little else: signal 1-spades.
        let hand = Hand::with_cards(vec![
            c(Rank::Jack, Suit::Spades),
            c(Rank::King, Suit::Spades),
            c(Rank::Ten, Suit::Spades),
            c(Rank::Nine, Suit::Hearts),
            c(Rank::Ten, Suit::Hearts),
            c(Rank::Queen, Suit::Hearts),
            c(Rank::Nine, Suit::Diamonds),
            c(Rank::Ten, Suit::Diamonds),
            c(Rank::Nine, Suit::Clubs),
            c(Rank::Ten, Suit::Clubs),
            c(Rank::Queen, Suit::Clubs),
        ]);
        let table = Table::new(hand);
        let bid = table
            .bid_as(Seat::East, &mut HeuristicBidder::new())
            .expect("indication expected");
        assert_eq!(bid, Bid::new(1, Suit::Spades));
    }

    #[test]
    fn desperate_deficit_forces_a_lone_hand() {
        // The same junk that passes in a level game must chase the gap.
        let mut table = Table::new(junk())
            .with_bid(Seat::North, None)
            .with_bid(Seat::East, None);
        table.score_delta = -60;
        table.hands_remaining = 2;
        let rules = Rules::standard();
        let bid = table
            .bid_as(Seat::West, &mut HeuristicBidder::new())
            .expect("must chase the gap");
        assert!(bid.is_lone(&rules));
    }

    #[test]
    fn opponent_claim_suppresses_the_contested_suit() {
        // Solid but not lone-worthy hearts; the opposing seven-heart claim
        // plus the raised floor kills the raise.
        let hand = Hand::with_cards(vec![
            c(Rank::Jack, Suit::Hearts),
            c(Rank::Ace, Suit::Hearts),
            c(Rank::King, Suit::Hearts),
            c(Rank::Queen, Suit::Hearts),
            c(Rank::Ten, Suit::Hearts),
            c(Rank::Nine, Suit::Hearts),
            c(Rank::Nine, Suit::Diamonds),
            c(Rank::Ten, Suit::Diamonds),
            c(Rank::Nine, Suit::Clubs),
            c(Rank::Ten, Suit::Clubs),
            c(Rank::Queen, Suit::Clubs),
        ]);
        let contested = Table::new(hand)
            .with_bid(Seat::South, Some(Bid::new(7, Suit::Hearts)))
            .with_bid(Seat::East, None);
        assert_eq!(
            contested.bid_as(Seat::West, &mut HeuristicBidder::new()),
            None
        );
    }

    #[test]
    fn never_matches_a_high_bid_at_the_hand_size() {
        // Partner already owns the table at eleven; the only legal raise
        // left is a lone sentinel, so anything returned must outrank it.
        let table = Table::new(strong_hearts())
            .with_bid(Seat::East, None)
            .with_bid(Seat::South, Some(Bid::new(11, Suit::Trump)))
            .with_bid(Seat::North, None);
        let rules = Rules::standard();
        if let Some(bid) = table.bid_as(Seat::West, &mut HeuristicBidder::new()) {
            assert!(bid.amount > 11, "{bid} does not beat the standing 11");
            assert!(bid.is_lone(&rules));
        }
    }

    #[test]
    fn trusted_partner_indication_raises_the_estimate() {
        let hand = Hand::with_cards(vec![
            c(Rank::Jack, Suit::Hearts),
            c(Rank::Ace, Suit::Hearts),
            c(Rank::King, Suit::Hearts),
            c(Rank::Queen, Suit::Hearts),
            c(Rank::Ten, Suit::Hearts),
            c(Rank::Nine, Suit::Hearts),
            c(Rank::Ace, Suit::Spades),
            c(Rank::Nine, Suit::Diamonds),
            c(Rank::Ten, Suit::Diamonds),
            c(Rank::Nine, Suit::Clubs),
            c(Rank::Ten, Suit::Clubs),
        ]);
        let quiet = Table::new(hand.clone())
            .with_bid(Seat::West, None)
            .with_bid(Seat::North, None);
        let signalled = Table::new(hand)
            .with_bid(Seat::West, None)
            .with_bid(Seat::North, Some(Bid::new(2, Suit::Hearts)));
        let mut bidder = HeuristicBidder::new();
        let quiet_bid = quiet.bid_as(Seat::South, &mut bidder).expect("bids hearts");
        let signalled_bid = signalled
            .bid_as(Seat::South, &mut bidder)
            .expect("bids hearts harder");
        assert_eq!(signalled_bid.suit, Suit::Hearts);
        assert!(signalled_bid.amount > quiet_bid.amount);
    }
}
