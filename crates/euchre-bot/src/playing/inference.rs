use super::boss::would_win;
use crate::eval::{BossRank, boss_rank, card_value, throwaway};
use euchre_core::belief::Belief;
use euchre_core::model::card::Card;
use euchre_core::model::hand::Hand;
use euchre_core::model::rank::Rank;
use euchre_core::model::suit::Suit;
use euchre_core::model::trick::Trick;
use euchre_core::strategy::{HandStartView, PlayStrategy};
use tracing::{Level, event};

/// The strongest playing tier: maintains a per-opponent belief over the
/// hand, discards to the kitty by suit-shape priorities, and wins tricks
/// with the cheapest card that suffices once the belief says nothing
/// behind can take over.
#[derive(Debug, Default)]
pub struct InferencePlayer {
    belief: Option<Belief>,
}

impl InferencePlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when every seat still to play after us is known unable to beat
    /// a winning card in the led suit: either we are last to act, or each
    /// remaining seat is believed void in both the led suit and trump.
    fn nothing_behind_can_take(&self, trick: &Trick) -> bool {
        let played = trick.plays().len() + 1;
        if played >= trick.seats_expected() {
            return true;
        }
        let Some(belief) = &self.belief else {
            return false;
        };
        let Some(lead) = trick.lead_suit() else {
            return false;
        };

        let mut seat = trick.leader();
        let mut remaining = Vec::new();
        let mut seen = 0;
        while seen < trick.seats_expected() {
            if trick.sitting_out() != Some(seat) {
                if seen >= played {
                    remaining.push(seat);
                }
                seen += 1;
            }
            seat = seat.next();
        }

        remaining.iter().all(|s| {
            belief
                .for_seat(*s)
                .map_or(false, |b| b.is_void(lead) && b.is_void(Suit::Trump))
        })
    }

    /// Smallest legal card that currently holds the trick.
    fn cheapest_winner(legal: &[Card], trick: &Trick) -> Option<Card> {
        legal
            .iter()
            .copied()
            .filter(|c| would_win(*c, trick))
            .min_by_key(|c| card_value(*c))
    }
}

impl PlayStrategy for InferencePlayer {
    fn begin_hand(&mut self, view: &HandStartView<'_>) {
        self.belief = Some(Belief::from_bidding(
            view.bids,
            view.seat,
            view.trump,
            view.sitting_out,
        ));
        event!(
            target: "euchre::play",
            Level::DEBUG,
            seat = ?view.seat,
            trump = %view.trump,
            "belief seeded from bidding"
        );
    }

    fn observe_trick(&mut self, trick: &Trick, unseen: &[Card]) {
        if let Some(belief) = &mut self.belief {
            belief.observe_trick(trick, unseen);
        }
    }

    /// Suit-shape discard: void a non-ace suit entirely when it fits the
    /// remaining budget (smallest suit first), then strip one ace bare,
    /// then fall back to lowest-value discards. Trump never goes.
    fn take_kitty(&mut self, hand: &Hand, discard_count: usize) -> Vec<Card> {
        let mut working = hand.cards().to_vec();
        let mut discards: Vec<Card> = Vec::with_capacity(discard_count);

        let count = |working: &[Card], suit: Suit| working.iter().filter(|c| c.suit == suit).count();
        let aces = |working: &[Card], suit: Suit| {
            working
                .iter()
                .filter(|c| c.suit == suit && c.rank == Rank::Ace)
                .count()
        };

        loop {
            let budget = discard_count - discards.len();
            let target = Suit::BASE
                .iter()
                .copied()
                .filter(|s| {
                    let n = count(&working, *s);
                    n >= 1 && n <= budget && aces(&working, *s) == 0
                })
                .min_by_key(|s| count(&working, *s));
            match target {
                Some(suit) => {
                    working.retain(|c| {
                        if c.suit == suit {
                            discards.push(*c);
                            false
                        } else {
                            true
                        }
                    });
                }
                None => break,
            }
        }

        // Bare a single ace if the rest of its suit fits.
        let budget = discard_count - discards.len();
        let bare_target = Suit::BASE
            .iter()
            .copied()
            .filter(|s| {
                let n = count(&working, *s);
                aces(&working, *s) == 1 && n >= 2 && n - 1 <= budget
            })
            .min_by_key(|s| count(&working, *s));
        if let Some(suit) = bare_target {
            working.retain(|c| {
                if c.suit == suit && c.rank != Rank::Ace {
                    discards.push(*c);
                    false
                } else {
                    true
                }
            });
        }

        while discards.len() < discard_count {
            match throwaway(&working) {
                Some(card) => {
                    if let Some(pos) = working.iter().position(|c| *c == card) {
                        working.remove(pos);
                    }
                    discards.push(card);
                }
                None => break,
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
        suit_high
            .or_else(|| throwaway(hand.cards()))
            .unwrap_or(hand.cards()[0])
    }

    fn follow(&mut self, hand: &Hand, unseen: &[Card], trick: &Trick) -> Card {
        let legal = hand.legal_plays(trick.lead_suit());

        if self.nothing_behind_can_take(trick) {
            if let Some(card) = Self::cheapest_winner(&legal, trick) {
                event!(
                    target: "euchre::play",
                    Level::DEBUG,
                    card = %card,
                    "cheap win, nothing behind can take"
                );
                return card;
            }
        }

        for &card in &legal {
            if boss_rank(card, unseen).is_some() && would_win(card, trick) {
                return card;
            }
        }
        throwaway(&legal).unwrap_or(legal[0])
    }
}

#[cfg(test)]
mod tests {
    use super::InferencePlayer;
    use euchre_core::model::card::Card;
    use euchre_core::model::hand::Hand;
    use euchre_core::model::rank::Rank;
    use euchre_core::model::seat::Seat;
    use euchre_core::model::suit::Suit;
    use euchre_core::model::trick::Trick;
    use euchre_core::strategy::PlayStrategy;

    fn c(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    #[test]
    fn kitty_short_suits_the_aceless_suit_first() {
        let hand = Hand::with_cards(vec![
            c(Rank::Ace, Suit::Trump),
            c(Rank::King, Suit::Trump),
            c(Rank::Nine, Suit::Trump),
            c(Rank::Nine, Suit::Clubs),
            c(Rank::Ten, Suit::Clubs),
            c(Rank::Ace, Suit::Spades),
            c(Rank::King, Suit::Spades),
            c(Rank::Queen, Suit::Hearts),
        ]);
        let mut player = InferencePlayer::new();
        let discards = player.take_kitty(&hand, 4);
        assert_eq!(discards.len(), 4);
        // Hearts (one card, no ace) goes first, then both clubs, then the
        // spade king bares the ace.
        assert!(discards.contains(&c(Rank::Queen, Suit::Hearts)));
        assert!(discards.contains(&c(Rank::Nine, Suit::Clubs)));
        assert!(discards.contains(&c(Rank::Ten, Suit::Clubs)));
        assert!(discards.contains(&c(Rank::King, Suit::Spades)));
        assert!(!discards.iter().any(|c| c.suit.is_trump()));
    }

    #[test]
    fn wins_cheaply_when_last_to_act() {
        let hand = Hand::with_cards(vec![
            c(Rank::Ace, Suit::Clubs),
            c(Rank::King, Suit::Clubs),
            c(Rank::Nine, Suit::Hearts),
        ]);
        let mut trick = Trick::new(Seat::East);
        trick
            .play(Seat::East, c(Rank::Ten, Suit::Clubs))
            .expect("legal");
        trick
            .play(Seat::South, c(Rank::Nine, Suit::Clubs))
            .expect("legal");
        trick
            .play(Seat::West, c(Rank::Queen, Suit::Clubs))
            .expect("legal");

        // North is last; the king beats the queen-high trick, no need for
        // the ace.
        let unseen = [c(Rank::Ace, Suit::Clubs)];
        let mut player = InferencePlayer::new();
        assert_eq!(
            player.follow(&hand, &unseen, &trick),
            c(Rank::King, Suit::Clubs)
        );
    }

    #[test]
    fn falls_back_to_boss_logic_mid_trick() {
        let hand = Hand::with_cards(vec![
            c(Rank::Ace, Suit::Clubs),
            c(Rank::Jack, Suit::Clubs),
        ]);
        let mut trick = Trick::new(Seat::East);
        trick
            .play(Seat::East, c(Rank::Ten, Suit::Clubs))
            .expect("legal");

        // Two seats still to play and no belief: the ace is boss and wins.
        let unseen = [c(Rank::King, Suit::Clubs)];
        let mut player = InferencePlayer::new();
        assert_eq!(
            player.follow(&hand, &unseen, &trick),
            c(Rank::Ace, Suit::Clubs)
        );
    }
}
