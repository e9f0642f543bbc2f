pub mod episode;
pub mod season;
pub mod series;

pub use episode::{Episode, RemoteEpisode};
pub use season::Season;
pub use series::{RemoteSeries, Series, SeriesImage};
