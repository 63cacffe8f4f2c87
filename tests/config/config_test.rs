//! Configuration precedence tests.

use std::io::Write;

use oraculo::config::GatewayConfig;

#[test]
fn toml_sections_override_defaults() {
    let config = GatewayConfig::from_toml_str(
        r#"
        [llm]
        model = "claude-3-5-haiku-20241022"

        [gateway]
        max_rows = 50
        narrate = false

        [analytics]
        property_id = "properties/123"

        [search]
        site_url = "https://example.com/"
        "#,
    )
    .expect("valid toml");

    assert_eq!(config.llm.model, "claude-3-5-haiku-20241022");
    assert_eq!(config.gateway.max_rows, 50);
    assert!(!config.gateway.narrate);
    assert_eq!(config.analytics.property_id, "properties/123");
    assert_eq!(config.search.site_url, "https://example.com/");
    // Untouched sections keep their defaults.
    assert_eq!(config.gateway.request_timeout_secs, 30);
    assert_eq!(config.llm.classify_max_tokens, 1000);
}

#[test]
fn partial_sections_keep_remaining_defaults() {
    let config =
        GatewayConfig::from_toml_str("[gateway]\nrequest_timeout_secs = 5\n").expect("valid toml");
    assert_eq!(config.gateway.request_timeout_secs, 5);
    assert_eq!(config.gateway.max_rows, 100);
    assert!(config.gateway.narrate);
}

#[test]
fn mistyped_values_are_rejected() {
    assert!(GatewayConfig::from_toml_str("[gateway]\nmax_rows = \"many\"\n").is_err());
}

#[test]
fn env_overrides_apply_on_top_of_file_values() {
    let mut config = GatewayConfig::from_toml_str(
        "[gateway]\nmax_rows = 50\n\n[search]\nsite_url = \"https://a.example/\"\n",
    )
    .expect("valid toml");

    config.apply_overrides(|key| match key {
        "ORACULO_MAX_ROWS" => Some("10".to_owned()),
        "ORACULO_SITE_URL" => Some("https://b.example/".to_owned()),
        "ORACULO_NARRATE" => Some("false".to_owned()),
        _ => None,
    });

    assert_eq!(config.gateway.max_rows, 10);
    assert_eq!(config.search.site_url, "https://b.example/");
    assert!(!config.gateway.narrate);
}

#[test]
fn config_file_round_trips_through_disk() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        "[sheets]\nshare_email = \"time@example.com\"\n\n[gateway]\nmax_rows = 42\n"
    )
    .expect("write");

    let contents = std::fs::read_to_string(file.path()).expect("read back");
    let config = GatewayConfig::from_toml_str(&contents).expect("valid toml");
    assert_eq!(config.sheets.share_email, "time@example.com");
    assert_eq!(config.gateway.max_rows, 42);
}
