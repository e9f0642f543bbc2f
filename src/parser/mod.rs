pub mod title;

pub use title::{normalize_title, tidy_title};
