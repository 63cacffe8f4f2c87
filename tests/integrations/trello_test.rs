//! Task-board integration tests over the reshaping helpers.

use serde_json::{json, Value};

use oraculo::integrations::trello::{reshape_boards, reshape_cards, reshape_lists};

#[test]
fn board_listing_keeps_registration_order() {
    let response = json!([
        { "id": "b1", "name": "Produto", "url": "u1" },
        { "id": "b2", "name": "Marketing", "url": "u2" }
    ]);
    let boards = reshape_boards(&response, 100);
    assert_eq!(boards[0]["nome"], "Produto");
    assert_eq!(boards[1]["nome"], "Marketing");
}

#[test]
fn boards_cap_applies() {
    let board = json!({ "id": "b", "name": "n", "url": "u" });
    let response = Value::Array(vec![board.clone(), board.clone(), board]);
    assert_eq!(reshape_boards(&response, 1).len(), 1);
}

#[test]
fn lists_carry_position_as_is() {
    let response = json!([{ "id": "l1", "name": "A Fazer", "pos": 16384.5 }]);
    let lists = reshape_lists(&response, 100);
    assert_eq!(lists[0]["posicao"], 16384.5);
}

#[test]
fn cards_without_labels_have_empty_etiquetas() {
    let response = json!([{
        "id": "c1", "name": "Tarefa", "desc": "d", "url": "u", "due": "2026-09-01"
    }]);
    let cards = reshape_cards(&response, 100);
    assert_eq!(cards[0]["etiquetas"], json!([]));
    assert_eq!(cards[0]["data_vencimento"], "2026-09-01");
}

#[test]
fn missing_fields_become_neutral_values() {
    let cards = reshape_cards(&json!([{}]), 100);
    assert_eq!(cards[0]["nome"], "");
    assert_eq!(cards[0]["data_vencimento"], Value::Null);
}
