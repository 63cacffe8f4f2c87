//! Envelope assembly and wire-format tests.

use serde_json::{json, Map};

use oraculo::dispatch::ResultEnvelope;
use oraculo::integrations::RawResult;

#[test]
fn build_round_trips_every_field() {
    let mut params = Map::new();
    params.insert("dimensao".to_owned(), json!("country"));
    params.insert("limite".to_owned(), json!(20));

    let raw = RawResult::Rows {
        headers: vec!["country".to_owned()],
        rows: vec![vec!["Brazil".to_owned()]],
    };

    let envelope = ResultEnvelope::build(
        "de onde vêm as sessões?",
        "ga4",
        params.clone(),
        raw.clone(),
        Some("a maioria vem do Brasil".to_owned()),
    );

    assert_eq!(envelope.question, "de onde vêm as sessões?");
    assert_eq!(envelope.intent, "ga4");
    assert_eq!(envelope.parameters, params);
    assert_eq!(envelope.raw_result, raw);
    assert_eq!(envelope.narrative.as_deref(), Some("a maioria vem do Brasil"));
}

#[test]
fn json_round_trip_preserves_the_envelope() {
    let mut params = Map::new();
    params.insert("board_id".to_owned(), json!("b1"));

    let envelope = ResultEnvelope::build(
        "o que há no quadro?",
        "trello_listas",
        params,
        RawResult::object(json!({ "listas": [] })),
        None,
    );

    let text = serde_json::to_string(&envelope).expect("serializes");
    let back: ResultEnvelope = serde_json::from_str(&text).expect("deserializes");
    assert_eq!(back, envelope);
}

#[test]
fn wire_field_names_follow_the_protocol() {
    let envelope = ResultEnvelope::build(
        "q",
        "ga4",
        Map::new(),
        RawResult::error("upstream timeout"),
        Some("houve uma falha".to_owned()),
    );

    let value = serde_json::to_value(&envelope).expect("serializes");
    assert_eq!(value["pergunta"], "q");
    assert_eq!(value["tipo_consulta"], "ga4");
    assert_eq!(value["resultado_bruto"]["kind"], "error");
    assert_eq!(value["resultado_bruto"]["reason"], "upstream timeout");
    assert_eq!(value["interpretacao"], "houve uma falha");
}

#[test]
fn error_results_are_data_not_failures() {
    // An envelope around an error result is still a complete envelope.
    let envelope = ResultEnvelope::build(
        "q",
        "ga4",
        Map::new(),
        RawResult::error("auth expired"),
        None,
    );
    assert_eq!(
        envelope.raw_result,
        RawResult::Error {
            reason: "auth expired".to_owned()
        }
    );
}
