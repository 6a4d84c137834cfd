use std::fs;

use contact_resolve::{ConfigError, LogicalField, MatchEngine, MatcherConfig, RawRecord};
use tempfile::tempdir;

#[test]
fn loads_config_and_aliases_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("matcher.json");
    fs::write(
        &path,
        r#"{
            "acceptance_floor": 0.3,
            "default_top_n": 2,
            "aliases": { "email": ["Courriel", "Email"], "full_name": ["Nom Complet", "Name"] }
        }"#,
    )
    .unwrap();

    let config = MatcherConfig::from_path(&path).unwrap();
    assert!((config.acceptance_floor - 0.3).abs() < f64::EPSILON);
    assert_eq!(config.aliases.aliases(LogicalField::Email), &["courriel", "email"]);
    assert!(!config.aliases.aliases(LogicalField::Phone).is_empty());

    let mut engine = MatchEngine::new(config).unwrap();
    engine.load(&[RawRecord::builder("fr")
        .field("Nom_Complet", "Luc Kerr")
        .field("COURRIEL", "luc@kerr.fr")
        .build()]);

    let result = engine.find_matches_default("Kerr Luc");
    let best = result.best().unwrap();
    assert_eq!(best.contact.email.as_deref(), Some("luc@kerr.fr"));
    assert_eq!(best.contact.display_name.as_deref(), Some("Luc Kerr"));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = MatcherConfig::from_path(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn malformed_file_is_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ acceptance_floor: ").unwrap();
    assert!(matches!(MatcherConfig::from_path(&path), Err(ConfigError::Parse { .. })));
}

#[test]
fn out_of_range_value_is_invalid() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{ "high_confidence": -0.5 }"#).unwrap();
    let err = MatcherConfig::from_path(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let top: contact_resolve::ResolveError = err.into();
    assert!(top.is_config());
    assert!(!top.is_retryable());
}
