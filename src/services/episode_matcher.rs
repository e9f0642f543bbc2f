//! Identity resolution of remote episode records against local rows.
//!
//! A remote record matches a local episode by provider episode id first and
//! by `(season, episode)` numbering second. Anything else is a new episode.
//!
//! The numbering fallback never takes a local row whose provider id belongs
//! to a different record of the same payload. Providers that leave specials
//! unnumbered report several records at the same `SxxE00`, and those rows
//! must stay with their own record.

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use crate::domain::{EpisodeId, SeasonEpisode, SeriesId};
use crate::models::{Episode, RemoteEpisode};

/// Per-record failures. These are counted and logged by the refresh pass and
/// never abort it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EpisodeMatchError {
    #[error("{count} local episodes match {numbering} (external id {external_id:?})")]
    AmbiguousMatch {
        numbering: SeasonEpisode,
        external_id: Option<i32>,
        count: usize,
    },

    #[error("local episode {episode_id} was already matched by another record in this refresh")]
    AlreadyClaimed {
        episode_id: EpisodeId,
        numbering: SeasonEpisode,
    },

    #[error("invalid numbering: season {season}, episode {episode}")]
    InvalidNumbering { season: i32, episode: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The local episode to update, taken out of the matcher's working set.
    Existing(Episode),
    New,
}

/// Matches remote records against the local episode set of one series.
///
/// Each local episode can be claimed by at most one remote record per pass,
/// so the updated list never contains the same row twice.
#[derive(Debug)]
pub struct EpisodeMatcher {
    local: Vec<Episode>,
    claimed: Vec<bool>,
    remote_ids: HashSet<i32>,
}

impl EpisodeMatcher {
    /// `remote` is the whole payload of the pass; its provider ids decide
    /// which local rows the numbering fallback may take.
    #[must_use]
    pub fn new(local: Vec<Episode>, remote: &[RemoteEpisode]) -> Self {
        let claimed = vec![false; local.len()];
        let remote_ids = remote.iter().filter_map(|e| e.external_episode_id).collect();
        Self {
            local,
            claimed,
            remote_ids,
        }
    }

    /// Resolves `remote` to an existing local episode or to a new one.
    ///
    /// # Errors
    ///
    /// - [`EpisodeMatchError::InvalidNumbering`] for negative numbers
    /// - [`EpisodeMatchError::AmbiguousMatch`] if more than one local row matches
    /// - [`EpisodeMatchError::AlreadyClaimed`] if the matching row was already
    ///   taken by an earlier record of this pass
    pub fn resolve(&mut self, remote: &RemoteEpisode) -> Result<MatchOutcome, EpisodeMatchError> {
        validate(remote)?;

        let Some(index) = self.find(remote)? else {
            return Ok(MatchOutcome::New);
        };

        if self.claimed[index] {
            return Err(EpisodeMatchError::AlreadyClaimed {
                episode_id: self.local[index].id,
                numbering: remote.numbering(),
            });
        }

        self.claimed[index] = true;
        Ok(MatchOutcome::Existing(self.local[index].clone()))
    }

    fn find(&self, remote: &RemoteEpisode) -> Result<Option<usize>, EpisodeMatchError> {
        if let Some(external_id) = remote.external_episode_id {
            let by_id = self.positions(|e| e.external_episode_id == Some(external_id));
            if !by_id.is_empty() {
                return single(remote, &by_id);
            }
        }

        let numbering = remote.numbering();
        let by_number = self.positions(|e| {
            e.numbering() == numbering && !self.owned_by_other_record(e, remote)
        });
        if by_number.is_empty() {
            return Ok(None);
        }
        single(remote, &by_number)
    }

    fn positions(&self, predicate: impl Fn(&Episode) -> bool) -> Vec<usize> {
        self.local
            .iter()
            .enumerate()
            .filter(|(_, e)| predicate(e))
            .map(|(i, _)| i)
            .collect()
    }

    fn owned_by_other_record(&self, local: &Episode, remote: &RemoteEpisode) -> bool {
        local.external_episode_id.is_some_and(|id| {
            remote.external_episode_id != Some(id) && self.remote_ids.contains(&id)
        })
    }
}

fn single(remote: &RemoteEpisode, found: &[usize]) -> Result<Option<usize>, EpisodeMatchError> {
    match found {
        [index] => Ok(Some(*index)),
        _ => Err(EpisodeMatchError::AmbiguousMatch {
            numbering: remote.numbering(),
            external_id: remote.external_episode_id,
            count: found.len(),
        }),
    }
}

fn validate(remote: &RemoteEpisode) -> Result<(), EpisodeMatchError> {
    if remote.season_number < 0 || remote.episode_number < 0 {
        return Err(EpisodeMatchError::InvalidNumbering {
            season: remote.season_number,
            episode: remote.episode_number,
        });
    }
    Ok(())
}

/// Overwrites provider-owned fields of `episode` with `remote`.
///
/// A file linked under the old numbering is unlinked first when the numbering
/// changes. Returns `true` if a link was cleared.
pub fn apply_remote(episode: &mut Episode, remote: &RemoteEpisode, series_id: SeriesId) -> bool {
    let renumbered = episode.numbering() != remote.numbering();
    let unlinked = renumbered && episode.has_file();

    if unlinked {
        debug!(
            episode_id = %episode.id,
            from = %episode.numbering(),
            to = %remote.numbering(),
            episode_file_id = episode.episode_file_id,
            "Un-linking episode file because the episode number has changed"
        );
        episode.episode_file_id = 0;
    }

    episode.series_id = series_id;
    episode.external_episode_id = remote.external_episode_id;
    episode.season_number = remote.season_number;
    episode.episode_number = remote.episode_number;
    episode.title.clone_from(&remote.title);
    episode.overview.clone_from(&remote.overview);
    episode.air_date = remote.air_date;

    unlinked
}
