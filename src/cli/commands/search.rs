//! Search command implementation.
//!
//! Manual catalog search: raw candidates, no automated filtering, so the
//! user sees everything the provider returned.

use crate::cli::commands::AppContext;
use crate::models::media::MediaKind;
use crate::Result;
use colored::Colorize;

pub async fn search(
    ctx: &AppContext,
    title: &str,
    year: Option<u16>,
    kind: MediaKind,
) -> Result<()> {
    let candidates = ctx.resolution.search_again(title, year, kind).await?;

    if candidates.is_empty() {
        println!("No results for '{}'.", title);
        return Ok(());
    }

    println!(
        "{:<10} {:<44} {:<12} {:>6}",
        "TMDB ID".bold(),
        "Title".bold(),
        "Released".bold(),
        "Rating".bold()
    );
    println!("{}", "-".repeat(76));

    for candidate in candidates {
        println!(
            "{:<10} {:<44} {:<12} {:>6}",
            candidate.id,
            candidate.title,
            candidate.release_date.as_deref().unwrap_or("-"),
            candidate
                .vote_average
                .map(|v| format!("{:.1}", v))
                .unwrap_or_else(|| "-".to_string())
        );
    }

    Ok(())
}
