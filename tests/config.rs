// tests/config.rs
use std::path::Path;

use times_tables::{ConfigError, TrainerConfig};

#[test]
fn partial_json_keeps_defaults() {
    let cfg = TrainerConfig::from_json_str(r#"{"evolution_cost": 30, "shop": {"base_price": 50}}"#)
        .unwrap();
    assert_eq!(cfg.evolution_cost, 30);
    assert_eq!(cfg.shop.base_price, 50);
    assert_eq!(cfg.shop.price_step, 20);
    assert_eq!(cfg.storage_key, "gameState");
    assert_eq!(cfg.available_tables, (1..=10).collect::<Vec<_>>());
    assert_eq!(cfg.rewards.reward(7, true, false), 7);
}

#[test]
fn empty_document_is_the_default() {
    assert_eq!(TrainerConfig::from_json_str("{}").unwrap(), TrainerConfig::default());
}

#[test]
fn invalid_configs_are_rejected() {
    let cases = [
        r#"{"storage_key": ""}"#,
        r#"{"evolution_cost": 0}"#,
        r#"{"available_tables": []}"#,
        r#"{"rewards": {"easy_tables": [1, 2, 4]}}"#,
        r#"{"available_tables": [1, 12]}"#,
        r#"{"shop": {"price_buckets": 0}}"#,
    ];
    let errors: Vec<_> = cases
        .iter()
        .map(|json| TrainerConfig::from_json_str(json).unwrap_err())
        .collect();

    assert!(matches!(errors[0], ConfigError::EmptyStorageKey));
    assert!(matches!(errors[1], ConfigError::ZeroEvolutionCost));
    assert!(matches!(errors[2], ConfigError::NoTables));
    assert!(matches!(errors[3], ConfigError::OverlappingDifficulty { table: 4 }));
    assert!(matches!(errors[4], ConfigError::UnclassifiedTable { table: 12 }));
    assert!(matches!(errors[5], ConfigError::ZeroPriceBuckets));
}

#[test]
fn parse_and_read_errors() {
    assert!(matches!(
        TrainerConfig::from_json_str("{ nope"),
        Err(ConfigError::Parse(_))
    ));
    let err = TrainerConfig::from_file(Path::new("/definitely/not/here.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("not/here.json"));
}
