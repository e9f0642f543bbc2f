use chrono::{DateTime, TimeDelta, Utc};
use std::collections::BTreeMap;

use crate::domain::SeriesId;
use crate::models::Episode;

/// Spreads episodes of one refresh pass that share a `(series, air date)`
/// slot by `runtime_minutes` each, in season/episode order. The first
/// episode of a slot keeps its air date.
///
/// Only the given episodes are considered; nothing outside the pass is read
/// or changed. Returns the number of episodes whose air date moved.
pub fn resolve_air_date_conflicts<'a, I>(episodes: I, runtime_minutes: i32) -> usize
where
    I: IntoIterator<Item = &'a mut Episode>,
{
    let mut slots: BTreeMap<(SeriesId, DateTime<Utc>), Vec<&'a mut Episode>> = BTreeMap::new();
    for episode in episodes {
        if let Some(air_date) = episode.air_date {
            slots
                .entry((episode.series_id, air_date))
                .or_default()
                .push(episode);
        }
    }

    let mut moved = 0;
    for ((_, air_date), mut group) in slots {
        if group.len() < 2 {
            continue;
        }

        group.sort_by_key(|e| e.numbering());

        for (index, episode) in group.into_iter().enumerate() {
            let index = i64::try_from(index).unwrap_or(i64::MAX);
            let Some(shifted) = TimeDelta::try_minutes(i64::from(runtime_minutes).saturating_mul(index))
                .and_then(|offset| air_date.checked_add_signed(offset))
            else {
                tracing::warn!(
                    episode = %episode.numbering(),
                    "Air date offset out of range, leaving air date unchanged"
                );
                continue;
            };

            if shifted != air_date {
                moved += 1;
            }
            episode.air_date = Some(shifted);
        }
    }

    moved
}
