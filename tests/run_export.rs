//! Profile runs through `run_export`, written to files.

use anon_export::config::DemoConfig;
use anon_export::{run_export, DumpFormat, ExportConfig, ProfileKind};
use record_source::MemorySource;
use serde_json::{json, Value};

fn source() -> MemorySource {
    let document = json!({
        "option": [{"key": "site-name", "value": "Membership"}],
        "contact": [
            {"id": "c3", "email": "three@real.org", "firstname": "Three"},
            {"id": "c1", "email": "one@real.org", "firstname": "One"},
            {"id": "c2", "email": "two@real.org", "firstname": "Two"},
        ],
        "payment": [
            {"id": "p1", "contactId": "c1", "amount": 3},
            {"id": "p2", "contactId": "c3", "amount": 4},
        ],
        "callout": [
            {"id": "k1", "formSchema": {"slides": [{"id": "s", "components": [
                {"key": "why", "type": "textarea"}
            ]}]}},
        ],
        "callout_response": [
            {"id": "r1", "calloutId": "k1", "contactId": "c1", "answers": {"s": {"why": "Because"}}},
            {"id": "r2", "calloutId": "k1", "contactId": "c3", "answers": {"s": {"why": "No"}}},
        ],
        "project_engagement": [
            {"id": "e1", "byContactId": "c1", "toContactId": "c2", "notes": "met"},
        ],
    });
    MemorySource::from_json_value(document).unwrap()
}

fn config(seed: u64) -> ExportConfig {
    ExportConfig {
        seed: Some(seed),
        demo: DemoConfig {
            contacts: 2,
            callouts: 1,
        },
        ..ExportConfig::default()
    }
}

async fn export_to_file(format: DumpFormat, profile: ProfileKind) -> String {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dump");
    let file = tokio::fs::File::create(&path).await.unwrap();

    let summary = run_export(&source(), file, format, profile, &config(8))
        .await
        .unwrap();
    assert!(summary.total_records() > 0);

    tokio::fs::read_to_string(&path).await.unwrap()
}

#[tokio::test]
async fn test_full_json_dump() {
    let dump = export_to_file(DumpFormat::Json, ProfileKind::Full).await;
    let document: Value = serde_json::from_str(&dump).unwrap();

    assert_eq!(document["contact"].as_array().unwrap().len(), 3);
    assert_eq!(document["payment"].as_array().unwrap().len(), 2);
    assert_eq!(document["option"][0]["value"], json!("Membership"));
    assert!(!dump.contains("real.org"));
    assert!(!dump.contains("Because"));
    // every cleared table is present, even when empty
    assert_eq!(document["api_key"], json!([]));
}

#[tokio::test]
async fn test_demo_json_dump_keeps_sample_only() {
    let dump = export_to_file(DumpFormat::Json, ProfileKind::Demo).await;
    let document: Value = serde_json::from_str(&dump).unwrap();

    // c1 and c2 are the first two contacts by key
    assert_eq!(document["contact"].as_array().unwrap().len(), 2);
    let payments = document["payment"].as_array().unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0]["amount"], json!(3));
    assert_eq!(payments[0]["contactId"], document["contact"][0]["id"]);

    let responses = document["callout_response"].as_array().unwrap();
    assert_eq!(responses.len(), 1);
    assert_eq!(document["project_engagement"], json!([]));
}

#[tokio::test]
async fn test_full_sql_dump() {
    let dump = export_to_file(DumpFormat::Sql, ProfileKind::Full).await;
    let lines: Vec<&str> = dump.lines().collect();

    assert_eq!(lines.len() % 2, 0);
    for pair in lines.chunks(2) {
        assert!(pair[0].ends_with(';'), "{}", pair[0]);
        let params: Value = serde_json::from_str(pair[1]).unwrap();
        assert!(params.is_array());
    }

    // deletes run dependents first, inserts run owners first
    let position = |needle: &str| lines.iter().position(|line| line.starts_with(needle)).unwrap();
    assert!(position("DELETE FROM \"payment\"") < position("DELETE FROM \"contact\""));
    assert!(position("INSERT INTO \"contact\"") < position("INSERT INTO \"payment\""));
    assert!(!dump.contains("real.org"));
}

#[test]
fn test_same_seed_same_sql() {
    let run = || tokio_test::block_on(export_to_file(DumpFormat::Sql, ProfileKind::Demo));
    assert_eq!(run(), run());
}

#[tokio::test]
async fn test_json_dump_feeds_a_second_export() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("full.json");
    let file = tokio::fs::File::create(&path).await.unwrap();
    run_export(&source(), file, DumpFormat::Json, ProfileKind::Full, &config(1))
        .await
        .unwrap();

    let reloaded = MemorySource::from_json_file(&path).await.unwrap();
    let summary = run_export(
        &reloaded,
        Vec::new(),
        DumpFormat::Json,
        ProfileKind::Demo,
        &config(2),
    )
    .await
    .unwrap();

    assert_eq!(summary.records_for("Contact"), Some(2));
}
