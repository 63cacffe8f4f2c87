//! Spreadsheet integration tests over the pure builders and reshapers.

use serde_json::json;

use oraculo::integrations::sheets::{
    build_add_sheet_body, build_spreadsheet_body, extract_new_sheet_id, reshape_file_list,
    spreadsheet_url,
};

#[test]
fn spreadsheet_urls_point_at_the_editor() {
    assert_eq!(
        spreadsheet_url("abc123"),
        "https://docs.google.com/spreadsheets/d/abc123/edit"
    );
}

#[test]
fn create_body_always_starts_with_principal_sheet() {
    let body = build_spreadsheet_body("Orçamento");
    assert_eq!(body["properties"]["title"], "Orçamento");
    assert_eq!(body["sheets"][0]["properties"]["title"], "Principal");
}

#[test]
fn add_sheet_body_is_a_single_batch_request() {
    let body = build_add_sheet_body("Fevereiro", 200, 30);
    let requests = body["requests"].as_array().expect("array");
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0]["addSheet"]["properties"]["gridProperties"]["rowCount"],
        200
    );
}

#[test]
fn sheet_id_absent_when_reply_shape_differs() {
    assert_eq!(extract_new_sheet_id(&json!({})), None);
    assert_eq!(
        extract_new_sheet_id(&json!({ "replies": [{ "other": {} }] })),
        None
    );
}

#[test]
fn file_list_without_owner_still_reshapes() {
    let response = json!({
        "files": [{ "id": "f9", "name": "Sem dono", "createdTime": "" }]
    });
    let records = reshape_file_list(&response);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["nome"], "Sem dono");
    assert!(records[0].get("proprietario").is_none());
}

#[test]
fn files_without_id_are_skipped() {
    let response = json!({
        "files": [{ "name": "quebrado" }, { "id": "ok", "name": "válido" }]
    });
    let records = reshape_file_list(&response);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], "ok");
}
