use crate::domain::SeriesId;
use crate::state::SharedState;

pub async fn cmd_episodes(state: &SharedState, id: i32) -> anyhow::Result<()> {
    let id = SeriesId::new(id);

    let series = state
        .store
        .get_series(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Series with ID {id} not found"))?;

    println!("Episodes for: {}", series.display_title());
    println!("{:-<70}", "");

    let episodes = state.store.list_episodes(id).await?;
    if episodes.is_empty() {
        println!("No episodes yet. Run: episodarr refresh {id}");
        return Ok(());
    }

    for episode in episodes {
        let status_icon = if episode.has_file() {
            "✓"
        } else if episode.ignored {
            "-"
        } else {
            "○"
        };
        let title = episode.title.as_deref().unwrap_or("(No title)");
        let aired = episode
            .air_date
            .map(|d| format!(" - {}", d.format("%Y-%m-%d %H:%M")))
            .unwrap_or_default();

        println!("{status_icon} {}: {title}{aired}", episode.numbering());
    }

    println!();
    println!("Legend: ✓ Has file | ○ Missing | - Ignored");

    Ok(())
}
