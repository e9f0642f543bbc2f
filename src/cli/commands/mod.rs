mod add;
mod episodes;
mod list;
mod refresh;

pub use add::cmd_add_series;
pub use episodes::cmd_episodes;
pub use list::cmd_list_series;
pub use refresh::cmd_refresh;
