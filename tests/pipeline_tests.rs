//! End-to-end import pipeline tests against stub providers and an
//! in-memory database.

mod common;

use catalog_importer::db::Database;
use catalog_importer::models::media::MediaKind;
use catalog_importer::models::session::SessionStatus;
use catalog_importer::Error;
use common::{
    build_pipeline, candidate, fast_config, identity_mapping, record_count, row, StubCatalog,
};
use std::time::Duration;

// ========== CORE SCENARIOS ==========

#[tokio::test]
async fn test_confident_and_unknown_rows_end_in_pending_resolution() {
    let db = Database::open_in_memory().await.unwrap();
    let catalog =
        StubCatalog::new().with_entry("Amélie", candidate(42, "Amélie", Some(25.0), Some(7.9)));
    let (coordinator, _) = build_pipeline(&db, catalog, fast_config());

    let session = coordinator.create_session().await.unwrap();
    let rows = vec![row("Amélie", "2001"), row("Unknown Obscure Title XYZ123", "")];
    coordinator
        .run_import(&session.id, rows, &identity_mapping(), MediaKind::Movie)
        .await
        .unwrap();

    let snapshot = coordinator.get_status(&session.id).await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::PendingResolution);
    assert_eq!(snapshot.total, 2);
    assert_eq!(snapshot.processed, 2);
    assert_eq!(snapshot.auto_resolved, 1);
    assert_eq!(snapshot.unmatched.len(), 1);
    assert_eq!(snapshot.unmatched[0].title, "Unknown Obscure Title XYZ123");

    assert_eq!(record_count(&db).await, 1);
}

#[tokio::test]
async fn test_all_confident_rows_complete_the_session() {
    let db = Database::open_in_memory().await.unwrap();
    let catalog = StubCatalog::new()
        .with_entry("Amélie", candidate(42, "Amélie", Some(25.0), Some(7.9)))
        .with_entry("Alien", candidate(43, "Alien", Some(60.0), Some(8.4)))
        .with_entry("Dune", candidate(44, "Dune", Some(90.0), Some(7.8)));
    let (coordinator, _) = build_pipeline(&db, catalog, fast_config());

    let session = coordinator.create_session().await.unwrap();
    let rows = vec![row("Amélie", ""), row("Alien", ""), row("Dune", "")];
    coordinator
        .run_import(&session.id, rows, &identity_mapping(), MediaKind::Movie)
        .await
        .unwrap();

    let snapshot = coordinator.get_status(&session.id).await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::Completed);
    assert_eq!(snapshot.processed, 3);
    assert_eq!(snapshot.auto_resolved, 3);
    assert_eq!(snapshot.manual_resolved, 0);
    assert_eq!(
        snapshot.auto_resolved + snapshot.manual_resolved,
        snapshot.total
    );
    assert!(snapshot.unmatched.is_empty());
}

#[tokio::test]
async fn test_reimport_is_idempotent() {
    let db = Database::open_in_memory().await.unwrap();
    let catalog = StubCatalog::new()
        .with_entry("Amélie", candidate(42, "Amélie", Some(25.0), Some(7.9)))
        .with_entry("Alien", candidate(43, "Alien", Some(60.0), Some(8.4)));
    let (coordinator, _) = build_pipeline(&db, catalog, fast_config());

    let rows = vec![row("Amélie", ""), row("Alien", "")];

    let first = coordinator.create_session().await.unwrap();
    coordinator
        .run_import(&first.id, rows.clone(), &identity_mapping(), MediaKind::Movie)
        .await
        .unwrap();
    assert_eq!(record_count(&db).await, 2);

    // Second run over a fresh session: every row short-circuits as existing.
    let second = coordinator.create_session().await.unwrap();
    coordinator
        .run_import(&second.id, rows, &identity_mapping(), MediaKind::Movie)
        .await
        .unwrap();

    let snapshot = coordinator.get_status(&second.id).await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::Completed);
    assert_eq!(snapshot.auto_resolved, 2);
    assert_eq!(record_count(&db).await, 2);
}

#[tokio::test]
async fn test_existing_record_found_by_external_id_under_new_spelling() {
    let db = Database::open_in_memory().await.unwrap();
    // Both spellings search to the same catalog entry.
    let amelie = candidate(42, "Amélie", Some(25.0), Some(7.9));
    let catalog = StubCatalog::new()
        .with_entry("Amélie", amelie.clone())
        .with_results("Amelie from Montmartre", vec![amelie]);
    let (coordinator, _) = build_pipeline(&db, catalog, fast_config());

    let first = coordinator.create_session().await.unwrap();
    coordinator
        .run_import(
            &first.id,
            vec![row("Amélie", "")],
            &identity_mapping(),
            MediaKind::Movie,
        )
        .await
        .unwrap();

    let second = coordinator.create_session().await.unwrap();
    coordinator
        .run_import(
            &second.id,
            vec![row("Amelie from Montmartre", "")],
            &identity_mapping(),
            MediaKind::Movie,
        )
        .await
        .unwrap();

    let snapshot = coordinator.get_status(&second.id).await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::Completed);
    assert_eq!(snapshot.auto_resolved, 1);
    assert_eq!(record_count(&db).await, 1);
}

// ========== ERROR BOUNDARIES ==========

#[tokio::test]
async fn test_empty_import_fails_the_session() {
    let db = Database::open_in_memory().await.unwrap();
    let (coordinator, _) = build_pipeline(&db, StubCatalog::new(), fast_config());

    let session = coordinator.create_session().await.unwrap();
    let result = coordinator
        .run_import(&session.id, vec![], &identity_mapping(), MediaKind::Movie)
        .await;

    assert!(matches!(result, Err(Error::EmptyImport)));
    let snapshot = coordinator.get_status(&session.id).await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::Failed);
}

#[tokio::test]
async fn test_rerun_on_a_finished_session_is_rejected() {
    let db = Database::open_in_memory().await.unwrap();
    let catalog =
        StubCatalog::new().with_entry("Amélie", candidate(42, "Amélie", Some(25.0), Some(7.9)));
    let (coordinator, _) = build_pipeline(&db, catalog, fast_config());

    let session = coordinator.create_session().await.unwrap();
    let rows = vec![row("Amélie", "")];
    coordinator
        .run_import(&session.id, rows.clone(), &identity_mapping(), MediaKind::Movie)
        .await
        .unwrap();

    let result = coordinator
        .run_import(&session.id, rows, &identity_mapping(), MediaKind::Movie)
        .await;
    assert!(matches!(result, Err(Error::SessionAlreadyStarted(_))));

    // The rejected rerun leaves status and counters untouched.
    let snapshot = coordinator.get_status(&session.id).await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::Completed);
    assert_eq!(snapshot.total, 1);
    assert_eq!(snapshot.processed, 1);
    assert_eq!(snapshot.auto_resolved, 1);
}

#[tokio::test]
async fn test_unknown_session_is_reported() {
    let db = Database::open_in_memory().await.unwrap();
    let (coordinator, _) = build_pipeline(&db, StubCatalog::new(), fast_config());

    let result = coordinator.get_status("no-such-session").await;
    assert!(matches!(result, Err(Error::SessionNotFound(_))));
}

#[tokio::test]
async fn test_row_without_title_becomes_unmatched_with_error() {
    let db = Database::open_in_memory().await.unwrap();
    let (coordinator, _) = build_pipeline(&db, StubCatalog::new(), fast_config());

    let session = coordinator.create_session().await.unwrap();
    coordinator
        .run_import(
            &session.id,
            vec![row("", "2001")],
            &identity_mapping(),
            MediaKind::Movie,
        )
        .await
        .unwrap();

    let snapshot = coordinator.get_status(&session.id).await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::PendingResolution);
    assert_eq!(snapshot.unmatched.len(), 1);
    assert!(snapshot.unmatched[0].error.is_some());
}

#[tokio::test]
async fn test_detail_fetch_failure_is_a_row_level_error() {
    let db = Database::open_in_memory().await.unwrap();
    // A confident search result whose detail fetch will fail.
    let catalog = StubCatalog::new()
        .with_results("Amélie", vec![candidate(42, "Amélie", Some(25.0), Some(7.9))]);
    let (coordinator, _) = build_pipeline(&db, catalog, fast_config());

    let session = coordinator.create_session().await.unwrap();
    coordinator
        .run_import(
            &session.id,
            vec![row("Amélie", "")],
            &identity_mapping(),
            MediaKind::Movie,
        )
        .await
        .unwrap();

    let snapshot = coordinator.get_status(&session.id).await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::PendingResolution);
    assert_eq!(snapshot.unmatched.len(), 1);
    assert!(snapshot.unmatched[0]
        .error
        .as_deref()
        .unwrap()
        .contains("unavailable"));
    assert_eq!(record_count(&db).await, 0);
}

#[tokio::test]
async fn test_slow_provider_times_out_at_row_level() {
    let db = Database::open_in_memory().await.unwrap();
    let catalog = StubCatalog::new()
        .with_entry("Amélie", candidate(42, "Amélie", Some(25.0), Some(7.9)))
        .with_delay(Duration::from_secs(3));
    let mut config = fast_config();
    config.request_timeout_secs = 1;
    let (coordinator, _) = build_pipeline(&db, catalog, config);

    let session = coordinator.create_session().await.unwrap();
    coordinator
        .run_import(
            &session.id,
            vec![row("Amélie", "")],
            &identity_mapping(),
            MediaKind::Movie,
        )
        .await
        .unwrap();

    // A hung provider never fails the session, only the row.
    let snapshot = coordinator.get_status(&session.id).await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::PendingResolution);
    assert_eq!(snapshot.unmatched.len(), 1);
    assert!(snapshot.unmatched[0]
        .error
        .as_deref()
        .unwrap()
        .contains("timed out"));
}

#[tokio::test]
async fn test_ambiguous_rows_are_held_for_resolution() {
    let db = Database::open_in_memory().await.unwrap();
    let catalog = StubCatalog::new().with_results(
        "Solaris",
        vec![
            candidate(1, "Solaris", Some(20.0), Some(8.0)),
            candidate(2, "Solaris", Some(15.0), Some(6.2)),
        ],
    );
    let (coordinator, _) = build_pipeline(&db, catalog, fast_config());

    let session = coordinator.create_session().await.unwrap();
    coordinator
        .run_import(
            &session.id,
            vec![row("Solaris", "")],
            &identity_mapping(),
            MediaKind::Movie,
        )
        .await
        .unwrap();

    let snapshot = coordinator.get_status(&session.id).await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::PendingResolution);
    assert_eq!(snapshot.auto_resolved, 0);
    assert_eq!(snapshot.unmatched.len(), 1);
    assert_eq!(record_count(&db).await, 0);
}

// ========== OBSERVED STATISTICS ==========

#[tokio::test]
async fn test_status_snapshots_stay_monotonic() {
    let db = Database::open_in_memory().await.unwrap();
    let catalog = StubCatalog::new()
        .with_entry("Amélie", candidate(42, "Amélie", Some(25.0), Some(7.9)))
        .with_entry("Alien", candidate(43, "Alien", Some(60.0), Some(8.4)))
        .with_entry("Dune", candidate(44, "Dune", Some(90.0), Some(7.8)))
        .with_entry("Heat", candidate(45, "Heat", Some(50.0), Some(7.9)));
    let mut config = fast_config();
    config.batch_size = 1;
    config.batch_delay_ms = 50;
    let (coordinator, _) = build_pipeline(&db, catalog, config);

    let session = coordinator.create_session().await.unwrap();
    let rows = vec![
        row("Amélie", ""),
        row("Alien", ""),
        row("Dune", ""),
        row("Heat", ""),
    ];

    let runner = coordinator.clone();
    let session_id = session.id.clone();
    let mapping = identity_mapping();
    let handle = tokio::spawn(async move {
        runner
            .run_import(&session_id, rows, &mapping, MediaKind::Movie)
            .await
    });

    let mut last_processed = 0;
    loop {
        let snapshot = coordinator.get_status(&session.id).await.unwrap();
        assert!(snapshot.processed <= snapshot.total || snapshot.total == 0);
        assert!(snapshot.processed >= last_processed);
        last_processed = snapshot.processed;

        match snapshot.status {
            SessionStatus::Pending | SessionStatus::Processing => {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            _ => break,
        }
    }

    handle.await.unwrap().unwrap();
    let snapshot = coordinator.get_status(&session.id).await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::Completed);
    assert_eq!(snapshot.processed, 4);
    assert_eq!(snapshot.auto_resolved, 4);
}
