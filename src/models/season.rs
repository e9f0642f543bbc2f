use serde::{Deserialize, Serialize};

use crate::domain::SeriesId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub series_id: SeriesId,
    pub season_number: i32,
    pub ignored: bool,
}
