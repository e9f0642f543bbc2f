use crate::domain::SeasonEpisode;
use crate::models::Season;

/// Default `ignored` flag for a newly discovered episode.
///
/// Specials (episode 0 outside season 1) start ignored; everything else
/// inherits the flag of its season, or `false` if the season is unknown.
#[must_use]
pub fn initial_ignored(numbering: SeasonEpisode, seasons: &[Season]) -> bool {
    if numbering.is_special() {
        return true;
    }

    seasons
        .iter()
        .find(|s| s.season_number == numbering.season)
        .is_some_and(|s| s.ignored)
}
