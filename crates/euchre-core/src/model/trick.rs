use crate::model::card::Card;
use crate::model::seat::Seat;
use crate::model::suit::Suit;
use std::fmt;

/// One trick: seat-attributed plays in table order. A lone hand folds one
/// seat, so the trick knows which seat (if any) is skipped when rotating.
#[derive(Debug, Clone)]
pub struct Trick {
    leader: Seat,
    sitting_out: Option<Seat>,
    plays: Vec<Play>,
}

#[derive(Debug, Clone, Copy)]
pub struct Play {
    pub seat: Seat,
    pub card: Card,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrickError {
    TrickComplete,
    OutOfTurn { expected: Seat, actual: Seat },
    AlreadyPlayed(Seat),
    SittingOut(Seat),
}

impl fmt::Display for TrickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrickError::TrickComplete => write!(f, "trick already complete"),
            TrickError::OutOfTurn { expected, actual } => {
                write!(f, "expected {expected} to play next but got {actual}")
            }
            TrickError::AlreadyPlayed(seat) => {
                write!(f, "{seat} has already played this trick")
            }
            TrickError::SittingOut(seat) => {
                write!(f, "{seat} is sitting out this hand")
            }
        }
    }
}

impl std::error::Error for TrickError {}

impl Trick {
    pub fn new(leader: Seat) -> Self {
        Self {
            leader,
            sitting_out: None,
            plays: Vec::with_capacity(4),
        }
    }

    pub fn with_sitting_out(leader: Seat, sitting_out: Seat) -> Self {
        Self {
            leader,
            sitting_out: Some(sitting_out),
            plays: Vec::with_capacity(3),
        }
    }

    pub fn leader(&self) -> Seat {
        self.leader
    }

    pub fn sitting_out(&self) -> Option<Seat> {
        self.sitting_out
    }

    pub fn plays(&self) -> &[Play] {
        &self.plays
    }

    pub fn seats_expected(&self) -> usize {
        if self.sitting_out.is_some() { 3 } else { 4 }
    }

    pub fn is_complete(&self) -> bool {
        self.plays.len() == self.seats_expected()
    }

    pub fn lead_suit(&self) -> Option<Suit> {
        self.plays.first().map(|play| play.card.suit)
    }

    pub fn play(&mut self, seat: Seat, card: Card) -> Result<(), TrickError> {
        if self.is_complete() {
            return Err(TrickError::TrickComplete);
        }

        if self.sitting_out == Some(seat) {
            return Err(TrickError::SittingOut(seat));
        }

        if self.plays.iter().any(|play| play.seat == seat) {
            return Err(TrickError::AlreadyPlayed(seat));
        }

        let expected = self.expected_seat();
        if expected != seat {
            return Err(TrickError::OutOfTurn {
                expected,
                actual: seat,
            });
        }

        self.plays.push(Play { seat, card });
        Ok(())
    }

    /// Index (into `plays`) of the card currently taking the trick. A later
    /// card takes over only by strictly beating the incumbent, so the first
    /// copy of twin cards keeps the trick.
    pub fn winning_index(&self) -> Option<usize> {
        let mut winner = 0usize;
        for (index, play) in self.plays.iter().enumerate().skip(1) {
            if play.card.beats(self.plays[winner].card) {
                winner = index;
            }
        }
        if self.plays.is_empty() { None } else { Some(winner) }
    }

    pub fn winning_play(&self) -> Option<&Play> {
        self.winning_index().map(|index| &self.plays[index])
    }

    pub fn winner(&self) -> Option<Seat> {
        if !self.is_complete() {
            return None;
        }
        self.winning_play().map(|play| play.seat)
    }

    /// The seat whose turn it is, rotating left from the leader and passing
    /// over a folded seat.
    pub fn expected_seat(&self) -> Seat {
        let mut seat = self
            .plays
            .last()
            .map(|play| play.seat.next())
            .unwrap_or(self.leader);
        while self.sitting_out == Some(seat) {
            seat = seat.next();
        }
        seat
    }
}
