use crate::source::SongRecord;
use crate::tables::{distinct, ArtistRow, SongRow};
use rayon::prelude::*;

/// Distinct `songs` rows with a song id.
///
/// Rows are deduplicated on every column, so one song id with two different
/// titles (or durations, ...) yields two rows.
pub fn extract_songs(records: &[SongRecord]) -> Vec<SongRow> {
    let projected: Vec<SongRow> = records
        .par_iter()
        .filter_map(|r| {
            Some(SongRow {
                song_id: r.song_id.clone()?,
                title: r.title.clone(),
                artist_id: r.artist_id.clone(),
                year: r.year,
                duration: r.duration,
            })
        })
        .collect();
    distinct(projected)
}

/// Distinct `artists` rows with an artist id.
pub fn extract_artists(records: &[SongRecord]) -> Vec<ArtistRow> {
    let projected: Vec<ArtistRow> = records
        .par_iter()
        .filter_map(|r| {
            Some(ArtistRow {
                artist_id: r.artist_id.clone()?,
                name: r.artist_name.clone(),
                location: r.artist_location.clone(),
                latitude: r.artist_latitude,
                longitude: r.artist_longitude,
            })
        })
        .collect();
    distinct(projected)
}
