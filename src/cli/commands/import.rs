//! Import command implementation.

use crate::cli::commands::AppContext;
use crate::models::media::MediaKind;
use crate::models::session::{
    ColumnMapping, SessionStatus, FIELD_ORIGINAL_TITLE, FIELD_TITLE, FIELD_YEAR,
};
use crate::{Error, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Run a bulk import from a CSV file.
pub async fn run_import(
    ctx: &AppContext,
    csv_file: &Path,
    mapping_file: Option<&Path>,
    kind: MediaKind,
) -> Result<()> {
    let mapping = load_mapping(mapping_file)?;
    let rows = read_rows(csv_file)?;

    let session = ctx.coordinator.create_session().await?;
    println!(
        "{} {} ({} rows)",
        "Starting import session".bold(),
        session.id.cyan(),
        rows.len()
    );

    let pb = ProgressBar::new(rows.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} rows")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    // The import runs in the background; the caller's contract is to poll.
    let coordinator = ctx.coordinator.clone();
    let session_id = session.id.clone();
    let handle = tokio::spawn(async move {
        coordinator
            .run_import(&session_id, rows, &mapping, kind)
            .await
    });

    loop {
        let snapshot = ctx.coordinator.get_status(&session.id).await?;
        pb.set_position(snapshot.processed as u64);
        match snapshot.status {
            SessionStatus::Pending | SessionStatus::Processing => {
                tokio::time::sleep(Duration::from_millis(250)).await;
            }
            _ => break,
        }
    }
    pb.finish_and_clear();

    handle
        .await
        .map_err(|e| Error::other(format!("import task panicked: {e}")))??;

    let snapshot = ctx.coordinator.get_status(&session.id).await?;
    println!();
    println!("Status: {}", status_colored(snapshot.status));
    println!(
        "  {} auto-resolved, {} unmatched of {} rows",
        snapshot.auto_resolved,
        snapshot.unmatched.len(),
        snapshot.total
    );

    if !snapshot.unmatched.is_empty() {
        println!();
        println!("{}", "Unmatched rows:".bold());
        for item in &snapshot.unmatched {
            match &item.error {
                Some(err) => println!("  {} {} ({})", "-".yellow(), item.title, err),
                None => println!("  {} {}", "-".yellow(), item.title),
            }
        }
        println!();
        println!(
            "Resolve them with: catalog-importer resolve {} <TITLE> --tmdb-id <ID>",
            session.id
        );
    }

    Ok(())
}

/// Load the column mapping, defaulting to identity names.
fn load_mapping(mapping_file: Option<&Path>) -> Result<ColumnMapping> {
    match mapping_file {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            let mapping: ColumnMapping = serde_json::from_str(&content)?;
            if !mapping.contains_key(FIELD_TITLE) {
                return Err(Error::InvalidColumnMapping(format!(
                    "mapping must include a '{}' entry",
                    FIELD_TITLE
                )));
            }
            Ok(mapping)
        }
        None => {
            let mut mapping = ColumnMapping::new();
            for field in [FIELD_TITLE, FIELD_ORIGINAL_TITLE, FIELD_YEAR] {
                mapping.insert(field.to_string(), field.to_string());
            }
            Ok(mapping)
        }
    }
}

/// Read all CSV rows as header -> cell maps.
fn read_rows(csv_file: &Path) -> Result<Vec<HashMap<String, String>>> {
    let mut reader = csv::Reader::from_path(csv_file)?;
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: HashMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

fn status_colored(status: SessionStatus) -> colored::ColoredString {
    match status {
        SessionStatus::Completed => status.to_string().green(),
        SessionStatus::PendingResolution => status.to_string().yellow(),
        SessionStatus::Failed => status.to_string().red(),
        _ => status.to_string().normal(),
    }
}
