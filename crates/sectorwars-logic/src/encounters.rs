//! Encounter bookkeeping between pilots.
//!
//! Each pilot keeps a tally per other pilot met. A meeting is recorded in
//! both directions; seeing the same pair twice at the same instant (one
//! transaction) counts once. Times are microseconds since the Unix epoch.

/// Meetings of one pilot with one other pilot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncounterTally {
    pub count: u32,
    pub first_met: i64,
    pub last_met: i64,
}

/// The ordered pairs a meeting between `a` and `b` touches. Empty for a
/// pilot meeting themselves.
pub fn meeting_directions(a: u64, b: u64) -> Vec<(u64, u64)> {
    if a == b {
        return Vec::new();
    }
    vec![(a, b), (b, a)]
}

/// Fold one meeting at `now` into a tally. Returns the tally to write, or
/// `None` when this instant was already counted.
pub fn tally_meeting(prev: Option<EncounterTally>, now: i64) -> Option<EncounterTally> {
    match prev {
        None => Some(EncounterTally {
            count: 1,
            first_met: now,
            last_met: now,
        }),
        Some(t) if t.last_met == now => None,
        Some(t) => Some(EncounterTally {
            count: t.count.saturating_add(1),
            last_met: now,
            ..t
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_meeting_starts_at_one() {
        let t = tally_meeting(None, 1_000).unwrap();
        assert_eq!(
            t,
            EncounterTally {
                count: 1,
                first_met: 1_000,
                last_met: 1_000
            }
        );
    }

    #[test]
    fn test_later_meeting_bumps_count() {
        let first = tally_meeting(None, 1_000).unwrap();
        let second = tally_meeting(Some(first), 5_000).unwrap();
        assert_eq!(second.count, 2);
        assert_eq!(second.first_met, 1_000);
        assert_eq!(second.last_met, 5_000);
    }

    #[test]
    fn test_same_instant_is_idempotent() {
        let first = tally_meeting(None, 1_000).unwrap();
        assert_eq!(tally_meeting(Some(first), 1_000), None);
    }

    #[test]
    fn test_count_saturates() {
        let t = EncounterTally {
            count: u32::MAX,
            first_met: 0,
            last_met: 0,
        };
        assert_eq!(tally_meeting(Some(t), 1).unwrap().count, u32::MAX);
    }

    #[test]
    fn test_meetings_are_bidirectional() {
        assert_eq!(meeting_directions(3, 8), vec![(3, 8), (8, 3)]);
        assert!(meeting_directions(4, 4).is_empty());
    }
}
