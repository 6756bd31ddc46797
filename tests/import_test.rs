use leadtui::import::{normalize_key, LeadTable, OpenOptions};
use std::io::Write;
use tempfile::NamedTempFile;

fn csv_file(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_csv_import() {
    let file = csv_file("Name,Company Name\nAnna,Acme\nBob,Beta\n");
    let table = LeadTable::from_path(file.path(), &OpenOptions::new()).unwrap();

    assert_eq!(table.column_labels(), vec!["Name", "Company Name"]);
    assert_eq!(table.records.len(), 2);
    assert_eq!(table.records[0].id, "1");
    assert_eq!(table.records[0].get("companyname"), "Acme");
    assert_eq!(table.records[1].get("name"), "Bob");
}

#[test]
fn test_csv_import_with_custom_delimiter() {
    let file = csv_file("Name;Company Name\nAnna;Acme\n");
    let options = OpenOptions::new().with_delimiter(b';');
    let table = LeadTable::from_path(file.path(), &options).unwrap();
    assert_eq!(table.records[0].get("companyname"), "Acme");
}

#[test]
fn test_csv_with_headers_but_no_rows_is_an_import_error() {
    let file = csv_file("Name,Company Name\n");
    let result = LeadTable::from_path(file.path(), &OpenOptions::new());
    assert!(result.is_err());
}

#[test]
fn test_missing_file_is_an_import_error() {
    let result = LeadTable::from_path(
        std::path::Path::new("/does/not/exist.csv"),
        &OpenOptions::new(),
    );
    assert!(result.is_err());
}

#[test]
fn test_header_labels_survive_while_keys_normalize() {
    let file = csv_file("LinkedIn URL,  Email \nhttps://example.com,a@b.c\n");
    let table = LeadTable::from_path(file.path(), &OpenOptions::new()).unwrap();

    assert_eq!(table.columns[0].label, "LinkedIn URL");
    assert_eq!(table.columns[0].key, "linkedinurl");
    assert_eq!(table.columns[1].key, "email");
    assert_eq!(table.records[0].get("linkedinurl"), "https://example.com");
}

#[test]
fn test_normalization_is_shared_between_import_and_lookup() {
    let file = csv_file("Company Name\nAcme\n");
    let table = LeadTable::from_path(file.path(), &OpenOptions::new()).unwrap();
    assert_eq!(
        table.records[0].get(&normalize_key("Company Name")),
        "Acme"
    );
}
