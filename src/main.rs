//! Catalog Importer CLI
//!
//! A command-line tool for bulk-importing titles into a personal media
//! catalog, with human-in-the-loop resolution for rows that cannot be
//! matched automatically.

use catalog_importer::cli::{
    args::{Cli, Commands, SessionsAction},
    commands::{self, import, resolve, search, sessions},
};
use catalog_importer::db::Database;
use catalog_importer::models::config;
use catalog_importer::models::media::MediaKind;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = config::load_config();

    match cli.command {
        Commands::Import {
            csv_file,
            mapping,
            kind,
        } => {
            let kind: MediaKind = kind.parse()?;
            let ctx = commands::build_context(&config).await?;
            import::run_import(&ctx, &csv_file, mapping.as_deref(), kind).await?;
            ctx.db.close().await;
        }

        Commands::Sessions { action } => {
            let db = Database::open(&config.storage.database_path).await?;
            match action {
                SessionsAction::List => sessions::list_sessions(&db).await?,
                SessionsAction::Show { session_id } => {
                    sessions::show_session(&db, &session_id).await?
                }
            }
            db.close().await;
        }

        Commands::Search { title, year, kind } => {
            let kind: MediaKind = kind.parse()?;
            let ctx = commands::build_context(&config).await?;
            search::search(&ctx, &title, year, kind).await?;
            ctx.db.close().await;
        }

        Commands::Resolve {
            session_id,
            title,
            tmdb_id,
            kind,
        } => {
            let kind: MediaKind = kind.parse()?;
            let ctx = commands::build_context(&config).await?;
            resolve::resolve(&ctx, &session_id, &title, tmdb_id, kind).await?;
            ctx.db.close().await;
        }

        Commands::Ignore { session_id, title } => {
            let ctx = commands::build_context(&config).await?;
            resolve::ignore(&ctx, &session_id, &title).await?;
            ctx.db.close().await;
        }
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("catalog_importer=debug")
    } else {
        EnvFilter::new("catalog_importer=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
