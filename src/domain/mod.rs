//! Domain primitives for the series library.
//!
//! Identifiers are newtypes so a series id can never be passed where an
//! episode id is expected.

pub mod events;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Local identifier of a series row.
///
/// # Examples
///
/// ```rust
/// use episodarr::domain::SeriesId;
///
/// let id = SeriesId::new(42);
/// assert_eq!(id.value(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SeriesId(i32);

impl SeriesId {
    /// # Panics
    ///
    /// Panics in debug mode if `id` is negative.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        debug_assert!(id >= 0, "SeriesId should be non-negative");
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<SeriesId> for i32 {
    fn from(id: SeriesId) -> Self {
        id.0
    }
}

impl From<i32> for SeriesId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl Serialize for SeriesId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.0)
    }
}

impl<'de> Deserialize<'de> for SeriesId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let id = i32::deserialize(deserializer)?;
        Ok(Self::new(id))
    }
}

/// Local identifier of an episode row. `EpisodeId::UNSAVED` marks an episode
/// that has been created in memory but not inserted yet.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EpisodeId(i32);

impl EpisodeId {
    pub const UNSAVED: Self = Self(0);

    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }

    #[must_use]
    pub const fn is_saved(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Season/episode numbering of an episode.
///
/// Ordering is season first, then episode, which is the processing order of a
/// refresh pass.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct SeasonEpisode {
    pub season: i32,
    pub episode: i32,
}

impl SeasonEpisode {
    #[must_use]
    pub const fn new(season: i32, episode: i32) -> Self {
        Self { season, episode }
    }

    /// Episode zero outside of season one is a special or bonus item.
    #[must_use]
    pub const fn is_special(&self) -> bool {
        self.episode == 0 && self.season != 1
    }
}

impl fmt::Display for SeasonEpisode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{:02}E{:02}", self.season, self.episode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_id_conversions() {
        let id = SeriesId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(i32::from(id), 42);
        assert_eq!(SeriesId::from(42), id);
    }

    #[test]
    fn series_id_serialization() {
        let id = SeriesId::new(7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "7");
        let back: SeriesId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn unsaved_episode_id() {
        assert!(!EpisodeId::UNSAVED.is_saved());
        assert!(EpisodeId::new(3).is_saved());
    }

    #[test]
    fn season_episode_orders_by_season_first() {
        let mut numbers = vec![
            SeasonEpisode::new(2, 1),
            SeasonEpisode::new(1, 10),
            SeasonEpisode::new(1, 2),
        ];
        numbers.sort();
        assert_eq!(
            numbers,
            vec![
                SeasonEpisode::new(1, 2),
                SeasonEpisode::new(1, 10),
                SeasonEpisode::new(2, 1),
            ]
        );
    }

    #[test]
    fn season_episode_display() {
        assert_eq!(SeasonEpisode::new(1, 5).to_string(), "S01E05");
        assert_eq!(SeasonEpisode::new(12, 105).to_string(), "S12E105");
    }

    #[test]
    fn special_detection() {
        assert!(SeasonEpisode::new(0, 0).is_special());
        assert!(SeasonEpisode::new(2, 0).is_special());
        assert!(!SeasonEpisode::new(1, 0).is_special());
        assert!(!SeasonEpisode::new(2, 1).is_special());
    }
}
