pub mod tvmaze;
