/// Deterministic agent-to-seat assignments: entry `i` of a seating is the
/// agent index placed at seat `i`. The identity seating always comes first
/// so single-seating runs keep the configured agent order, and successive
/// seatings follow lexicographic order so a given count names the same
/// seatings in every run.
pub struct SeatPermutations {
    seatings: Vec<[usize; 4]>,
}

const ALL_SEATINGS: usize = 24;

impl SeatPermutations {
    pub fn new(count: usize) -> Self {
        let limit = count.min(ALL_SEATINGS);
        let mut seatings = Vec::with_capacity(limit);
        let mut current = [0usize, 1, 2, 3];
        while seatings.len() < limit {
            seatings.push(current);
            if !advance(&mut current) {
                break;
            }
        }
        Self { seatings }
    }

    pub fn as_slice(&self) -> &[[usize; 4]] {
        &self.seatings
    }
}

/// Steps a seating to its lexicographic successor in place; `false` once
/// the descending-order seating is reached.
fn advance(seating: &mut [usize; 4]) -> bool {
    let Some(pivot) = (0..seating.len() - 1)
        .rev()
        .find(|&i| seating[i] < seating[i + 1])
    else {
        return false;
    };
    let successor = (pivot + 1..seating.len())
        .rev()
        .find(|&j| seating[j] > seating[pivot])
        .unwrap_or(pivot + 1);
    seating.swap(pivot, successor);
    seating[pivot + 1..].reverse();
    true
}

#[cfg(test)]
mod tests {
    use super::SeatPermutations;

    #[test]
    fn identity_seating_comes_first() {
        let perms = SeatPermutations::new(1);
        assert_eq!(perms.as_slice(), &[[0, 1, 2, 3]]);
    }

    #[test]
    fn seatings_are_lexicographic_and_distinct() {
        let perms = SeatPermutations::new(24);
        let seatings = perms.as_slice();
        assert_eq!(seatings.len(), 24);
        for pair in seatings.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(seatings[1], [0, 1, 3, 2]);
        assert_eq!(seatings[23], [3, 2, 1, 0]);
    }

    #[test]
    fn oversized_requests_cap_at_the_full_set() {
        let perms = SeatPermutations::new(100);
        assert_eq!(perms.as_slice().len(), 24);
    }
}
