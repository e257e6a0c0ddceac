use crate::model::seat::{Seat, Team};

/// Running match totals per partnership. Euchred hands go negative, so the
/// totals are signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreBoard {
    totals: [i32; 2],
}

impl ScoreBoard {
    pub const fn new() -> Self {
        Self { totals: [0; 2] }
    }

    pub fn apply(&mut self, team: Team, points: i32) {
        self.totals[team.index()] += points;
    }

    pub fn score(&self, team: Team) -> i32 {
        self.totals[team.index()]
    }

    pub fn totals(&self) -> [i32; 2] {
        self.totals
    }

    /// Seat-relative score difference, positive when the seat's team leads.
    pub fn delta_for(&self, seat: Seat) -> i32 {
        let team = seat.team();
        self.score(team) - self.score(team.opponent())
    }

    pub fn gap(&self) -> i32 {
        (self.totals[0] - self.totals[1]).abs()
    }

    pub fn leading_team(&self) -> Option<Team> {
        match self.totals[0].cmp(&self.totals[1]) {
            core::cmp::Ordering::Greater => Some(Team::NorthSouth),
            core::cmp::Ordering::Less => Some(Team::EastWest),
            core::cmp::Ordering::Equal => None,
        }
    }
}
