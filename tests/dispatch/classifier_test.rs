//! Classifier prompt and parsing tests.

use oraculo::dispatch::classifier::{compose_prompt, parse_classification};
use oraculo::dispatch::DispatchError;

#[test]
fn bare_json_classification_parses() {
    let c = parse_classification(
        r#"{"tipo_consulta":"search_console","parametros":{"limite":10}}"#,
    )
    .expect("valid");
    assert_eq!(c.intent, "search_console");
    assert_eq!(c.parameters.get("limite"), Some(&serde_json::json!(10)));
}

#[test]
fn fenced_json_classification_parses() {
    let reply = "Aqui está:\n```json\n{\"tipo_consulta\":\"ga4\",\"parametros\":{}}\n```\nPronto.";
    let c = parse_classification(reply).expect("valid");
    assert_eq!(c.intent, "ga4");
}

#[test]
fn unfenced_garbage_preserves_raw_text_in_error() {
    let raw = "Desculpe, não entendi a pergunta.";
    let err = parse_classification(raw).expect_err("should fail");
    match err {
        DispatchError::Classification { raw: attached, reason } => {
            assert_eq!(attached, raw);
            assert!(!reason.is_empty());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn wrong_shape_json_is_a_classification_error() {
    // Valid JSON, but not the required shape (tipo_consulta missing).
    let err = parse_classification(r#"{"intencao":"ga4"}"#).expect_err("should fail");
    assert!(matches!(err, DispatchError::Classification { .. }));
}

#[test]
fn prompt_lists_the_intent_catalog() {
    let catalog = "- ga4: relatório.\n- trello_quadros: quadros.";
    let prompt = compose_prompt("quantos acessos tivemos?", catalog);
    assert!(prompt.contains("quantos acessos tivemos?"));
    assert!(prompt.contains("- trello_quadros: quadros."));
    assert!(prompt.contains("Apenas o JSON."));
}
