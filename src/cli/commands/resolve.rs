//! Resolve/ignore command implementations.

use crate::cli::commands::AppContext;
use crate::models::media::MediaKind;
use crate::{Error, Result};
use colored::Colorize;

/// Resolve an unmatched row with the candidate carrying `tmdb_id`.
pub async fn resolve(
    ctx: &AppContext,
    session_id: &str,
    title: &str,
    tmdb_id: u64,
    kind: MediaKind,
) -> Result<()> {
    // Re-run the raw search to recover the full candidate for the chosen id.
    let candidates = ctx.resolution.search_again(title, None, kind).await?;
    let candidate = candidates
        .into_iter()
        .find(|c| c.id == tmdb_id)
        .ok_or_else(|| {
            Error::other(format!(
                "tmdb id {} not among the search results for '{}'",
                tmdb_id, title
            ))
        })?;

    let record = ctx.resolution.resolve(session_id, title, &candidate).await?;

    println!(
        "{} '{}' resolved to '{}' (tmdb {})",
        "OK".green().bold(),
        title,
        record.title,
        record.tmdb_id
    );
    Ok(())
}

/// Dismiss an unmatched row. This cannot be undone.
pub async fn ignore(ctx: &AppContext, session_id: &str, title: &str) -> Result<()> {
    ctx.resolution.ignore(session_id, title).await?;
    println!("{} '{}' ignored", "OK".green().bold(), title);
    Ok(())
}
