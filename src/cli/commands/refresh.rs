use crate::domain::SeriesId;
use crate::services::RefreshSeriesCommand;
use crate::state::SharedState;

pub async fn cmd_refresh(state: &SharedState, id: Option<i32>) -> anyhow::Result<()> {
    let command = id.map_or_else(RefreshSeriesCommand::all, |id| {
        RefreshSeriesCommand::single(SeriesId::new(id))
    });

    let summary = state.refresh.execute(command).await?;

    println!("Refreshed {} series", summary.refreshed.len());

    if !summary.is_success() {
        for (id, error) in &summary.failed {
            println!("✗ Series {id}: {error}");
        }
        anyhow::bail!("{} series failed to refresh", summary.failed.len());
    }

    Ok(())
}
