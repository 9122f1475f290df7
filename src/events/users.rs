use crate::source::LogEvent;
use crate::tables::UserRow;
use rayon::prelude::*;
use std::collections::HashMap;

/// Position of the event currently winning for a user.
#[derive(Debug, Clone, Copy)]
struct Latest {
    ts: i64,
    index: usize,
}

impl Latest {
    /// Later timestamp wins, the earlier record wins a tie.
    fn beats(&self, other: &Latest) -> bool {
        self.ts > other.ts || (self.ts == other.ts && self.index < other.index)
    }
}

fn offer<'a>(acc: &mut HashMap<&'a str, Latest>, user_id: &'a str, candidate: Latest) {
    acc.entry(user_id)
        .and_modify(|current| {
            if candidate.beats(current) {
                *current = candidate;
            }
        })
        .or_insert(candidate);
}

/// One `users` row per user id, taken from that user's most recent event.
///
/// Events without a timestamp or a known user id (see
/// [`LogEvent::known_user_id`]) never contribute. Since the
/// winner is chosen by `(ts, source position)` the result does not depend on
/// how the events are split across threads. Rows come out in the source order
/// of their winning events.
pub fn extract_users(events: &[LogEvent]) -> Vec<UserRow> {
    let latest = events
        .par_iter()
        .enumerate()
        .filter_map(|(index, e)| Some((e.known_user_id()?, Latest { ts: e.ts?, index })))
        .fold(HashMap::new, |mut acc, (user_id, candidate)| {
            offer(&mut acc, user_id, candidate);
            acc
        })
        .reduce(HashMap::new, |mut left, right| {
            for (user_id, candidate) in right {
                offer(&mut left, user_id, candidate);
            }
            left
        });

    let mut winners: Vec<usize> = latest.into_values().map(|l| l.index).collect();
    winners.sort_unstable();
    winners
        .into_iter()
        .filter_map(|index| {
            let e = &events[index];
            Some(UserRow {
                user_id: e.known_user_id()?.to_string(),
                first_name: e.first_name.clone(),
                last_name: e.last_name.clone(),
                gender: e.gender.clone(),
                level: e.level.clone(),
            })
        })
        .collect()
}
