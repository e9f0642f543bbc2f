use crate::domain::events::LibraryEvent;
use crate::state::SharedState;

/// Inserts the series and runs the refresh the series-added listener would
/// run in the daemon. No listener is running in a one-shot invocation.
pub async fn cmd_add_series(state: &SharedState, external_id: i32) -> anyhow::Result<()> {
    let series = state.store.add_series(external_id).await?;
    println!("Added series #{} (TVmaze {})", series.id, external_id);

    state.publish(LibraryEvent::SeriesAdded {
        series: series.clone(),
    });

    let outcome = state.refresh.refresh_series(series.id).await?;
    let episodes = outcome.episodes;

    println!("✓ {}", outcome.series.title);
    println!(
        "  {} episodes added, {} updated, {} failed",
        episodes.added, episodes.updated, episodes.failed
    );

    Ok(())
}
