//! Batch import through the async driver.

use anyhow::{Context, Result};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use tcxtour::{
    Document, FileProvider, ImportEvent, ImportOptions, InMemoryStore, MemoryProvider,
    StartTimeIdentity, TcxImport,
};

fn activity(start_minute: u32, points: u32) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<TrainingCenterDatabase xmlns="http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2">
<Activities><Activity Sport="Running"><Lap StartTime="2024-06-01T08:00:00Z"><Calories>10</Calories><Track>
"#,
    );
    for s in 0..points {
        xml.push_str(&format!(
            "<Trackpoint><Time>2024-06-01T08:{:02}:{:02}Z</Time><DistanceMeters>{}</DistanceMeters></Trackpoint>\n",
            start_minute,
            s,
            s * 3
        ));
    }
    xml.push_str("</Track></Lap></Activity></Activities></TrainingCenterDatabase>\n");
    xml
}

const EMPTY_ACTIVITY: &str = r#"<TrainingCenterDatabase xmlns="http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2">
<Activities><Activity Sport="Other"><Lap StartTime="2024-06-01T08:00:00Z"/></Activity></Activities>
</TrainingCenterDatabase>"#;

const MALFORMED: &str = r#"<TrainingCenterDatabase xmlns="http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2">
<Activities><Activity Sport="Running"></Lap></Activities>"#;

fn provider() -> MemoryProvider {
    MemoryProvider::new([
        Document::new("a.tcx", activity(0, 10)),
        Document::new("b.tcx", activity(30, 5)),
        Document::new("empty.tcx", EMPTY_ACTIVITY),
        Document::new("broken.tcx", MALFORMED),
    ])
}

#[tokio::test]
async fn imports_then_skips_known_tours() -> Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let store = InMemoryStore::new();
    let identity = Arc::new(StartTimeIdentity);

    let first = TcxImport::batch(provider(), ImportOptions::default(), Arc::new(store.clone()), identity.clone())
        .finish()
        .await?;
    assert_eq!(first.documents, 4);
    assert_eq!(first.imported, 2);
    assert_eq!(first.empty, 1);
    assert_eq!(first.failed, 1);
    assert!(!first.cancelled);
    assert_eq!(store.len(), 2);

    let second = TcxImport::batch(provider(), ImportOptions::default(), Arc::new(store.clone()), identity)
        .finish()
        .await?;
    assert_eq!(second.imported, 0);
    assert_eq!(second.skipped, 2);
    assert_eq!(store.len(), 2);
    Ok(())
}

#[tokio::test]
async fn events_describe_each_document() -> Result<()> {
    let mut batch = TcxImport::batch(
        provider(),
        ImportOptions::default(),
        Arc::new(InMemoryStore::new()),
        Arc::new(StartTimeIdentity),
    );

    let events: Vec<ImportEvent> = batch.events().collect().await;

    let imported: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            ImportEvent::TourImported { source, tour, .. } => Some((source.clone(), tour.samples.len())),
            _ => None,
        })
        .collect();
    assert_eq!(imported, vec![(PathBuf::from("a.tcx"), 10), (PathBuf::from("b.tcx"), 5)]);

    assert!(events.iter().any(|event| matches!(
        event,
        ImportEvent::DocumentEmpty { source } if source.as_os_str() == "empty.tcx"
    )));
    assert!(events.iter().any(|event| matches!(
        event,
        ImportEvent::DocumentFailed { source: Some(source), .. } if source.as_os_str() == "broken.tcx"
    )));
    assert!(events.iter().any(|event| matches!(event, ImportEvent::Message { .. })));

    let Some(ImportEvent::Finished(summary)) = events.last() else {
        panic!("Last event should be the summary, got {:?}", events.last());
    };
    assert_eq!(summary.documents, 4);
    Ok(())
}

#[tokio::test]
async fn cancel_before_first_document() -> Result<()> {
    let store = InMemoryStore::new();
    let batch = TcxImport::batch(
        provider(),
        ImportOptions::default(),
        Arc::new(store.clone()),
        Arc::new(StartTimeIdentity),
    );

    // The task has not been polled yet on the current-thread runtime
    batch.cancel();
    let summary = batch.finish().await?;

    assert!(summary.cancelled);
    assert_eq!(summary.documents, 0);
    assert!(store.is_empty());
    Ok(())
}

#[tokio::test]
async fn directory_import_reports_unreadable_files() -> Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("one.tcx"), activity(0, 3))?;
    std::fs::write(dir.path().join("two.TCX"), activity(10, 3))?;
    std::fs::write(dir.path().join("notes.txt"), "not a tour")?;

    let store = InMemoryStore::new();
    let summary = TcxImport::directory(
        dir.path(),
        ImportOptions::default(),
        Arc::new(store.clone()),
        Arc::new(StartTimeIdentity),
    )
    .await?
    .finish()
    .await?;
    assert_eq!(summary.documents, 2);
    assert_eq!(summary.imported, 2);

    let missing = FileProvider::new([dir.path().join("gone.tcx")]);
    let mut batch =
        TcxImport::batch(missing, ImportOptions::default(), Arc::new(store), Arc::new(StartTimeIdentity));

    let first = batch.next_event().await.context("no event")?;
    assert!(matches!(first, ImportEvent::DocumentFailed { source: None, .. }));
    let summary = batch.finish().await?;
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.documents, 0);
    Ok(())
}
