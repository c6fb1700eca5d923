//! Sessions command implementation.

use crate::db::sessions::SessionRepository;
use crate::db::unmatched::UnmatchedRepository;
use crate::db::Database;
use crate::{Error, Result};
use colored::Colorize;

/// List all import sessions.
pub async fn list_sessions(db: &Database) -> Result<()> {
    let sessions = SessionRepository::new(db).list().await?;

    if sessions.is_empty() {
        println!("No sessions found.");
        return Ok(());
    }

    println!(
        "{:<38} {:<20} {:>6} {:>10} {:>6} {:>8}",
        "Session ID".bold(),
        "Status".bold(),
        "Total".bold(),
        "Processed".bold(),
        "Auto".bold(),
        "Manual".bold()
    );
    println!("{}", "-".repeat(92));

    for session in sessions {
        println!(
            "{:<38} {:<20} {:>6} {:>10} {:>6} {:>8}",
            session.id,
            session.status.to_string(),
            session.total,
            session.processed,
            session.auto_resolved,
            session.manual_resolved
        );
    }

    Ok(())
}

/// Show one session with its outstanding unmatched items.
pub async fn show_session(db: &Database, session_id: &str) -> Result<()> {
    let session = SessionRepository::new(db)
        .get(session_id)
        .await?
        .ok_or_else(|| Error::SessionNotFound(session_id.to_string()))?;

    println!("{}: {}", "Session".bold(), session.id);
    println!("  Status:          {}", session.status);
    println!("  Total rows:      {}", session.total);
    println!("  Processed:       {}", session.processed);
    println!("  Auto-resolved:   {}", session.auto_resolved);
    println!("  Manual-resolved: {}", session.manual_resolved);
    println!("  Created:         {}", session.created_at);
    println!("  Updated:         {}", session.updated_at);

    let unmatched = UnmatchedRepository::new(db)
        .list_by_session(session_id)
        .await?;

    if !unmatched.is_empty() {
        println!();
        println!("{} ({})", "Unmatched items".bold(), unmatched.len());
        for item in unmatched {
            match item.error {
                Some(err) => println!("  {} {} ({})", "-".yellow(), item.title, err),
                None => println!("  {} {}", "-".yellow(), item.title),
            }
        }
    }

    Ok(())
}
