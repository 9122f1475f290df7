use super::songplays::JoinedPlay;
use crate::tables::SongplayRow;
use clap::ValueEnum;
use rayon::prelude::*;
use sha2::{Digest, Sha256};

/// How `songplay_id` values are assigned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SongplayIdStrategy {
    /// Dense `1..=N` over the joined plays. Needs the whole result in one
    /// place, so it runs single-threaded after the join.
    #[default]
    Sequence,
    /// 63-bit digest of the play's identifying columns and its position in
    /// the event input. Computed per row with no coordination, and stable
    /// across runs over the same input.
    Hashed,
}

pub fn assign_songplay_ids(plays: Vec<JoinedPlay>, strategy: SongplayIdStrategy) -> Vec<SongplayRow> {
    match strategy {
        SongplayIdStrategy::Sequence => plays
            .into_iter()
            .zip(1i64..)
            .map(|(play, id)| play.into_row(id))
            .collect(),
        SongplayIdStrategy::Hashed => plays
            .into_par_iter()
            .map(|play| {
                let id = hashed_id(&play);
                play.into_row(id)
            })
            .collect(),
    }
}

fn hashed_id(play: &JoinedPlay) -> i64 {
    let event_index = play.event_index.to_string();
    let session = play.session_id.map(|s| s.to_string()).unwrap_or_default();
    let start_time = play.start_time.to_string();
    let mut hasher = Sha256::new();
    for part in [
        event_index.as_str(),
        start_time.as_str(),
        play.user_id.as_str(),
        session.as_str(),
        play.song_id.as_str(),
        play.artist_id.as_str(),
    ] {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    let digest = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(head) >> 1) as i64
}
