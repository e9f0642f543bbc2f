use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::{debug, warn};
use url::Url;

use crate::models::{RemoteEpisode, RemoteSeries, SeriesImage};
use crate::parser::title::get_regex;
use crate::services::traits::{MetadataProvider, RemoteSeriesInfo};

pub const TVMAZE_API: &str = "https://api.tvmaze.com";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TvMazeShow {
    name: String,
    status: Option<String>,
    runtime: Option<i32>,
    average_runtime: Option<i32>,
    premiered: Option<String>,
    schedule: Option<TvMazeSchedule>,
    network: Option<TvMazeNetwork>,
    web_channel: Option<TvMazeNetwork>,
    image: Option<TvMazeImage>,
    summary: Option<String>,
    #[serde(rename = "_embedded")]
    embedded: Option<TvMazeEmbedded>,
}

#[derive(Debug, Deserialize)]
struct TvMazeSchedule {
    time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TvMazeNetwork {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TvMazeImage {
    medium: Option<String>,
    original: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TvMazeEmbedded {
    #[serde(default)]
    episodes: Vec<TvMazeEpisode>,
}

#[derive(Debug, Deserialize)]
struct TvMazeEpisode {
    id: i32,
    name: Option<String>,
    season: i32,
    /// `null` for specials.
    number: Option<i32>,
    airstamp: Option<String>,
    summary: Option<String>,
}

impl TvMazeShow {
    fn into_remote(self) -> RemoteSeriesInfo {
        let mut images = Vec::new();
        if let Some(image) = self.image {
            if let Some(url) = image.medium {
                images.push(SeriesImage {
                    cover_type: "poster".to_string(),
                    url,
                });
            }
            if let Some(url) = image.original {
                images.push(SeriesImage {
                    cover_type: "poster_original".to_string(),
                    url,
                });
            }
        }

        let episodes = self
            .embedded
            .map(|e| e.episodes)
            .unwrap_or_default()
            .into_iter()
            .map(TvMazeEpisode::into_remote)
            .collect();

        let series = RemoteSeries {
            title: self.name,
            air_time: self
                .schedule
                .and_then(|s| s.time)
                .filter(|t| !t.trim().is_empty()),
            overview: self.summary.as_deref().and_then(strip_html),
            status: self.status.unwrap_or_else(|| "unknown".to_string()),
            runtime: self.average_runtime.or(self.runtime).unwrap_or(0),
            images,
            network: self.network.or(self.web_channel).map(|n| n.name),
            first_aired: self
                .premiered
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
        };

        RemoteSeriesInfo { series, episodes }
    }
}

impl TvMazeEpisode {
    fn into_remote(self) -> RemoteEpisode {
        let air_date = self.airstamp.as_deref().and_then(|stamp| {
            DateTime::parse_from_rfc3339(stamp)
                .map(|d| d.with_timezone(&Utc))
                .map_err(|e| warn!(episode_id = self.id, airstamp = stamp, error = %e, "Unparseable airstamp"))
                .ok()
        });

        RemoteEpisode {
            external_episode_id: Some(self.id),
            season_number: self.season,
            // TVmaze leaves specials unnumbered
            episode_number: self.number.unwrap_or(0),
            title: self.name.filter(|n| !n.is_empty()),
            overview: self.summary.as_deref().and_then(strip_html),
            air_date,
        }
    }
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    get_regex(&RE, r"<[^>]*>")
}

/// Drops markup from a provider summary. Empty results become `None`.
fn strip_html(html: &str) -> Option<String> {
    let text = tag_regex().replace_all(html, " ");
    let text = html_escape::decode_html_entities(&text);
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

#[derive(Clone)]
pub struct TvMazeClient {
    client: Client,
    base_url: String,
}

impl TvMazeClient {
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn show_url(&self, id: i32) -> Result<Url> {
        let base = self.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/shows/{id}"))
            .with_context(|| format!("Invalid TVmaze base URL: {}", self.base_url))?;
        url.query_pairs_mut().append_pair("embed", "episodes");
        Ok(url)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TvMazeClient {
    async fn fetch(&self, external_id: i32) -> Result<RemoteSeriesInfo> {
        let url = self.show_url(external_id)?;
        debug!("Fetching TVmaze show {}", external_id);

        let response = self.client.get(url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            anyhow::bail!("Series with TVmaze id {external_id} not found");
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("TVmaze API error: {} - {}", status, body));
        }

        let show: TvMazeShow = response
            .json()
            .await
            .with_context(|| format!("Failed to decode TVmaze show {external_id}"))?;

        Ok(show.into_remote())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SHOW: &str = r#"{
        "id": 1,
        "name": "Under the Dome",
        "status": "Ended",
        "runtime": 60,
        "averageRuntime": 61,
        "premiered": "2013-06-24",
        "schedule": { "time": "22:00", "days": ["Thursday"] },
        "network": { "id": 2, "name": "CBS" },
        "webChannel": null,
        "image": { "medium": "https://img/m.jpg", "original": "https://img/o.jpg" },
        "summary": "<p><b>Under the Dome</b> is the story of a small town &amp; its people.</p>",
        "_embedded": {
            "episodes": [
                { "id": 1, "name": "Pilot", "season": 1, "number": 1,
                  "airstamp": "2013-06-25T02:00:00+00:00", "summary": "<p>The dome falls.</p>" },
                { "id": 9, "name": "Behind the Dome", "season": 2, "number": null,
                  "airstamp": null, "summary": null }
            ]
        }
    }"#;

    #[test]
    fn maps_show_fields() {
        let show: TvMazeShow = serde_json::from_str(SHOW).unwrap();
        let info = show.into_remote();

        assert_eq!(info.series.title, "Under the Dome");
        assert_eq!(info.series.status, "Ended");
        assert_eq!(info.series.runtime, 61);
        assert_eq!(info.series.air_time.as_deref(), Some("22:00"));
        assert_eq!(info.series.network.as_deref(), Some("CBS"));
        assert_eq!(info.series.first_aired, NaiveDate::from_ymd_opt(2013, 6, 24));
        assert_eq!(info.series.images.len(), 2);
        assert_eq!(
            info.series.overview.as_deref(),
            Some("Under the Dome is the story of a small town & its people.")
        );
    }

    #[test]
    fn maps_episodes_and_specials() {
        let show: TvMazeShow = serde_json::from_str(SHOW).unwrap();
        let info = show.into_remote();

        assert_eq!(info.episodes.len(), 2);
        let pilot = &info.episodes[0];
        assert_eq!(pilot.external_episode_id, Some(1));
        assert_eq!(
            pilot.air_date,
            Some(Utc.with_ymd_and_hms(2013, 6, 25, 2, 0, 0).unwrap())
        );
        assert_eq!(pilot.overview.as_deref(), Some("The dome falls."));

        let special = &info.episodes[1];
        assert_eq!(special.season_number, 2);
        assert_eq!(special.episode_number, 0);
        assert_eq!(special.air_date, None);
    }

    #[test]
    fn falls_back_to_web_channel_and_runtime() {
        let json = r#"{
            "name": "Web Show",
            "status": "Running",
            "runtime": 25,
            "averageRuntime": null,
            "network": null,
            "webChannel": { "name": "Netflix" },
            "schedule": { "time": "" }
        }"#;
        let info = serde_json::from_str::<TvMazeShow>(json).unwrap().into_remote();

        assert_eq!(info.series.network.as_deref(), Some("Netflix"));
        assert_eq!(info.series.runtime, 25);
        assert_eq!(info.series.air_time, None);
        assert!(info.episodes.is_empty());
    }

    #[test]
    fn strip_html_handles_empty_markup() {
        assert_eq!(strip_html("<p></p>"), None);
        assert_eq!(strip_html("a<br/>b"), Some("a b".to_string()));
    }

    #[test]
    fn builds_show_url() {
        let client = TvMazeClient::new(Client::new(), "https://api.tvmaze.com/");
        assert_eq!(
            client.show_url(82).unwrap().as_str(),
            "https://api.tvmaze.com/shows/82?embed=episodes"
        );
    }
}
