//! List series command handler

use crate::state::SharedState;

pub async fn cmd_list_series(state: &SharedState) -> anyhow::Result<()> {
    let series_list = state.store.list_series().await?;

    if series_list.is_empty() {
        println!("No series in the library.");
        println!();
        println!("Add a series with: episodarr add <tvmaze-id>");
        return Ok(());
    }

    println!("Series ({} total)", series_list.len());
    println!("{:-<70}", "");

    for series in series_list {
        let episodes = state.store.list_episodes(series.id).await?;
        let with_file = episodes.iter().filter(|e| e.has_file()).count();

        let synced = series
            .last_info_sync
            .map_or_else(|| "never".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());

        println!(
            "{} [{}/{} eps]",
            series.display_title(),
            with_file,
            episodes.len()
        );
        println!(
            "  ID: {} | TVmaze: {} | Status: {} | Last sync: {}",
            series.id, series.external_id, series.status, synced
        );
    }

    Ok(())
}
