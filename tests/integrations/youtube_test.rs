//! Comment-report integration tests over the reshaping helpers.

use serde_json::json;

use oraculo::integrations::youtube::{first_video_match, reshape_comments};

#[test]
fn search_hit_without_title_still_matches() {
    let response = json!({
        "items": [{ "id": { "videoId": "v1" }, "snippet": {} }]
    });
    let (id, title) = first_video_match(&response).expect("match");
    assert_eq!(id, "v1");
    assert_eq!(title, "");
}

#[test]
fn search_hit_missing_video_id_is_no_match() {
    // A channel hit has an id object without videoId.
    let response = json!({
        "items": [{ "id": { "channelId": "c1" }, "snippet": { "title": "Canal" } }]
    });
    assert!(first_video_match(&response).is_none());
}

#[test]
fn malformed_thread_items_are_skipped() {
    let response = json!({
        "items": [
            { "snippet": {} },
            { "snippet": { "topLevelComment": { "snippet": {
                "authorDisplayName": "Rui",
                "textDisplay": "Ótimo conteúdo",
                "likeCount": 3,
                "publishedAt": "2026-06-01T09:00:00Z"
            }}}}
        ]
    });
    let comments = reshape_comments(&response, 10);
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["autor"], "Rui");
}

#[test]
fn comments_default_missing_numeric_fields_to_zero() {
    let response = json!({
        "items": [{ "snippet": { "topLevelComment": { "snippet": {
            "authorDisplayName": "Ana",
            "textDisplay": "?"
        }}}}]
    });
    let comments = reshape_comments(&response, 10);
    assert_eq!(comments[0]["curtidas"], 0);
    assert_eq!(comments[0]["publicado_em"], "");
}
