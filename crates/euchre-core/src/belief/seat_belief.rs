use crate::model::bid::SeatBid;
use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::seat::Seat;
use crate::model::suit::Suit;
use crate::model::trick::Trick;
use std::array;

/// Lowest rank a seat could still hold in one suit. Floors only ever move
/// up: a chosen discard proves the seat holds nothing lower, and a card
/// that no longer exists unseen cannot be held by anyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuitFloor {
    AtLeast(Rank),
    Void,
}

impl SuitFloor {
    const OPEN: SuitFloor = SuitFloor::AtLeast(Rank::Nine);

    pub fn admits(self, rank: Rank) -> bool {
        match self {
            SuitFloor::AtLeast(floor) => rank >= floor,
            SuitFloor::Void => false,
        }
    }

    pub fn is_void(self) -> bool {
        matches!(self, SuitFloor::Void)
    }

    fn raise_to(&mut self, rank: Rank) {
        if let SuitFloor::AtLeast(floor) = self {
            if rank > *floor {
                *self = SuitFloor::AtLeast(rank);
            }
        }
    }
}

/// What the observer can say about one other seat's remaining cards. All
/// cards in here are trump-converted, like everything else once the
/// contract is fixed.
#[derive(Debug, Clone)]
pub struct SeatBelief {
    known: Vec<Card>,
    likely: Vec<Card>,
    floors: [SuitFloor; Suit::ALL.len()],
}

impl SeatBelief {
    fn open() -> Self {
        Self {
            known: Vec::new(),
            likely: Vec::new(),
            floors: [SuitFloor::OPEN; Suit::ALL.len()],
        }
    }

    /// A folded seat (lone hands) holds nothing.
    fn folded() -> Self {
        Self {
            known: Vec::new(),
            likely: Vec::new(),
            floors: [SuitFloor::Void; Suit::ALL.len()],
        }
    }

    pub fn known(&self) -> &[Card] {
        &self.known
    }

    pub fn likely(&self) -> &[Card] {
        &self.likely
    }

    pub fn floor(&self, suit: Suit) -> SuitFloor {
        self.floors[suit.index()]
    }

    pub fn is_void(&self, suit: Suit) -> bool {
        self.floors[suit.index()].is_void()
    }

    pub fn could_hold(&self, card: Card) -> bool {
        self.floors[card.suit.index()].admits(card.rank)
    }

    fn remove_copy(&mut self, card: Card) {
        if let Some(index) = self.known.iter().position(|c| *c == card) {
            self.known.swap_remove(index);
        }
        if let Some(index) = self.likely.iter().position(|c| *c == card) {
            self.likely.swap_remove(index);
        }
    }
}

/// Per-opponent belief state for one observer and one hand, indexed by
/// relative seat offset: 0 is the seat to the left, 1 the partner, 2 the
/// seat to the right.
#[derive(Debug, Clone)]
pub struct Belief {
    perspective: Seat,
    others: [SeatBelief; 3],
}

impl Belief {
    /// Seeds beliefs from the bidding round, once the contract is fixed and
    /// every zone is trump-converted. The lowest bid on the table, when
    /// small, is read as an indication and its bauers become known; every
    /// other bid only marks its suit's high cards likely.
    pub fn from_bidding(
        bids: &[SeatBid],
        perspective: Seat,
        trump: Suit,
        sitting_out: Option<Seat>,
    ) -> Self {
        let lowest = bids
            .iter()
            .filter_map(|sb| sb.bid.map(|b| (sb.seat, b)))
            .min_by_key(|(_, b)| b.amount);

        let mut others: [SeatBelief; 3] = array::from_fn(|_| SeatBelief::open());
        for sb in bids {
            let Some(offset) = perspective.offset_to(sb.seat) else {
                continue;
            };
            if sitting_out == Some(sb.seat) {
                others[offset] = SeatBelief::folded();
                continue;
            }
            let Some(bid) = sb.bid else {
                // Pass inference is deliberately not drawn; a pass says
                // nothing certain about the hand.
                continue;
            };

            let is_indication = bid.amount <= 3
                && bid.suit != Suit::Trump
                && lowest.map(|(seat, _)| seat) == Some(sb.seat);
            if is_indication {
                others[offset].known = indicated_bauers(bid.amount, bid.suit, trump);
            } else if bid.suit == Suit::Trump {
                others[offset].likely = Suit::BASE
                    .iter()
                    .map(|s| Card::new(Rank::Ace, *s).with_trump(trump))
                    .collect();
            } else {
                let mut likely = vec![
                    Card::new(Rank::Jack, bid.suit).with_trump(trump),
                    Card::new(Rank::Ace, bid.suit).with_trump(trump),
                ];
                if let Some(left) = bid.suit.left() {
                    likely.push(Card::new(Rank::Jack, left).with_trump(trump));
                }
                others[offset].likely = likely;
            }
        }

        Self {
            perspective,
            others,
        }
    }

    pub fn perspective(&self) -> Seat {
        self.perspective
    }

    pub fn left_opponent(&self) -> &SeatBelief {
        &self.others[0]
    }

    pub fn partner(&self) -> &SeatBelief {
        &self.others[1]
    }

    pub fn right_opponent(&self) -> &SeatBelief {
        &self.others[2]
    }

    pub fn for_seat(&self, seat: Seat) -> Option<&SeatBelief> {
        self.perspective.offset_to(seat).map(|o| &self.others[o])
    }

    /// Narrows every seat's belief with one completed trick. `unseen` is
    /// the observer's view of cards not yet accounted for, after the trick.
    pub fn observe_trick(&mut self, trick: &Trick, unseen: &[Card]) {
        let lead = trick.lead_suit();
        for (index, play) in trick.plays().iter().enumerate() {
            // The card is gone from everywhere, including any stale
            // deduction that parked the copy in another seat.
            for other in &mut self.others {
                other.remove_copy(play.card);
            }

            let Some(offset) = self.perspective.offset_to(play.seat) else {
                continue;
            };
            let seat_belief = &mut self.others[offset];

            if let Some(lead) = lead {
                if play.card.suit != lead {
                    seat_belief.floors[lead.index()] = SuitFloor::Void;
                }
            }

            // A card laid while losing the trick was a chosen discard, so
            // the seat holds nothing lower in that suit.
            if !was_winning_when_laid(trick, index) {
                seat_belief.floors[play.card.suit.index()].raise_to(play.card.rank);
            }
        }

        // Nobody can hold below the lowest rank still unseen.
        for suit in Suit::ALL {
            let min_unseen = unseen
                .iter()
                .filter(|c| c.suit == suit)
                .map(|c| c.rank)
                .min();
            for other in &mut self.others {
                match min_unseen {
                    Some(rank) => other.floors[suit.index()].raise_to(rank),
                    None => other.floors[suit.index()] = SuitFloor::Void,
                }
            }
        }

        self.deduce_single_holders(unseen);
    }

    /// Promotes any unseen identity only one seat's floors still admit into
    /// that seat's known set. Identities already claimed, or admitted by
    /// two or more seats, stay unassigned.
    fn deduce_single_holders(&mut self, unseen: &[Card]) {
        let mut identities: Vec<Card> = unseen.to_vec();
        identities.sort();
        identities.dedup();

        for card in identities {
            let claimed: usize = self
                .others
                .iter()
                .map(|o| o.known.iter().filter(|c| **c == card).count())
                .sum();
            if claimed > 0 {
                continue;
            }

            let mut holders = (0..self.others.len()).filter(|&i| self.others[i].could_hold(card));
            let (Some(only), None) = (holders.next(), holders.next()) else {
                continue;
            };
            let copies = unseen.iter().filter(|c| **c == card).count();
            for _ in 0..copies {
                self.others[only].known.push(card);
            }
        }
    }

    /// True when no card identity sits in two seats' known sets at once.
    /// Holds by construction after every update; exposed for audits.
    pub fn known_sets_disjoint(&self) -> bool {
        for (index, other) in self.others.iter().enumerate() {
            for card in &other.known {
                for later in &self.others[index + 1..] {
                    if later.known.contains(card) {
                        return false;
                    }
                }
            }
        }
        true
    }
}

/// Cards an indication bid promises: 1 means one right bauer, 2 both right
/// bauers, 3 a right and a left.
fn indicated_bauers(amount: u8, bid_suit: Suit, trump: Suit) -> Vec<Card> {
    let right = Card::new(Rank::Jack, bid_suit).with_trump(trump);
    match amount {
        1 => vec![right],
        2 => vec![right, right],
        3 => match bid_suit.left() {
            Some(left) => vec![right, Card::new(Rank::Jack, left).with_trump(trump)],
            None => vec![right],
        },
        _ => Vec::new(),
    }
}

/// Whether the card at `index` was taking the trick at the moment it hit
/// the table.
fn was_winning_when_laid(trick: &Trick, index: usize) -> bool {
    let plays = trick.plays();
    let mut winner = 0usize;
    for (i, play) in plays.iter().enumerate().take(index + 1).skip(1) {
        if play.card.beats(plays[winner].card) {
            winner = i;
        }
    }
    winner == index
}
