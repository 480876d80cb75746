use anon_core::EntityDescriptor;
use record_source::{MemorySource, PageRequest, RecordFilter, RecordSource};
use serde_json::json;
use std::io::Write;

#[tokio::test]
async fn loads_dump_file_and_pages_it() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let document = json!({
        "contact": [
            {"id": "c2", "email": "b@example.org"},
            {"id": "c1", "email": "a@example.org"}
        ],
        "payment": [
            {"id": 1, "contactId": "c1"},
            {"id": 2, "contactId": "c2"},
            {"id": 3, "contactId": "c1"}
        ]
    });
    write!(file, "{document}").unwrap();

    let source = MemorySource::from_json_file(file.path()).await.unwrap();
    assert_eq!(source.row_count("contact"), 2);

    let contact = EntityDescriptor::new("Contact", "contact", ["id"]);
    let page = source
        .fetch_page(&PageRequest::new(&contact, 0, 10))
        .await
        .unwrap();
    assert_eq!(page[0]["id"], json!("c1"));

    let payment = EntityDescriptor::new("Payment", "payment", ["id"]);
    let filter = RecordFilter::equals("contactId", json!("c1"));
    let page = source
        .fetch_page(&PageRequest::new(&payment, 0, 10).with_filter(Some(&filter)))
        .await
        .unwrap();
    let ids: Vec<_> = page.iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, vec![json!(1), json!(3)]);
}

#[tokio::test]
async fn missing_dump_file_fails_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    let err = MemorySource::from_json_file(&path).await.unwrap_err();
    assert!(format!("{err:#}").contains("absent.json"));
}

#[tokio::test]
async fn malformed_dump_file_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{not json").unwrap();

    assert!(MemorySource::from_json_file(file.path()).await.is_err());
}
