use gacha_core::{
    config::GachaConfig,
    error::GachaError,
    pool::{RewardItem, RewardPool},
    types::Rarity,
};
use std::collections::HashMap;

fn item(id: &str, rarity: Rarity, weight: f64, cap: u32) -> RewardItem {
    RewardItem {
        id:             id.into(),
        display_name:   id.into(),
        category:       "collectible".into(),
        rarity,
        weight,
        cap,
        obtained:       0,
        currency_yield: None,
    }
}

#[test]
fn empty_pool_is_rejected() {
    let err = RewardPool::new("empty", vec![], 0).unwrap_err();
    assert!(matches!(err, GachaError::EmptyPool { .. }), "got {err}");
}

/// Every common is capped, so nothing can absorb freed weight.
#[test]
fn pool_without_uncapped_common_is_rejected() {
    let err = RewardPool::new(
        "no-sink",
        vec![item("rare", Rarity::Rare, 50.0, 0), item("common", Rarity::Common, 50.0, 10)],
        0,
    )
    .unwrap_err();
    assert!(matches!(err, GachaError::NoSinkItem { .. }), "got {err}");
}

#[test]
fn zero_total_weight_is_rejected() {
    let err = RewardPool::new("zero", vec![item("c", Rarity::Common, 0.0, 0)], 0).unwrap_err();
    assert!(matches!(err, GachaError::NonPositiveTotalWeight { .. }), "got {err}");
}

/// Each weight is finite but the sum is not.
#[test]
fn overflowing_total_weight_is_rejected() {
    let err = RewardPool::new(
        "overflow",
        vec![item("c", Rarity::Common, 1e308, 0), item("leg", Rarity::Legendary, 1e308, 0)],
        0,
    )
    .unwrap_err();
    assert!(
        matches!(err, GachaError::NonPositiveTotalWeight { total, .. } if total.is_infinite()),
        "got {err}"
    );
}

#[test]
fn malformed_items_are_rejected() {
    let negative = RewardPool::new(
        "neg",
        vec![item("c", Rarity::Common, 10.0, 0), item("bad", Rarity::Rare, -1.0, 0)],
        0,
    )
    .unwrap_err();
    assert!(matches!(negative, GachaError::InvalidItem { ref id, .. } if id == "bad"));

    let nan = RewardPool::new("nan", vec![item("c", Rarity::Common, f64::NAN, 0)], 0).unwrap_err();
    assert!(matches!(nan, GachaError::InvalidItem { .. }));

    let duplicate = RewardPool::new(
        "dup",
        vec![item("c", Rarity::Common, 10.0, 0), item("c", Rarity::Common, 5.0, 0)],
        0,
    )
    .unwrap_err();
    assert!(matches!(duplicate, GachaError::DuplicateItem { .. }));

    let blank = RewardPool::new("blank", vec![item(" ", Rarity::Common, 10.0, 0)], 0).unwrap_err();
    assert!(matches!(blank, GachaError::InvalidItem { .. }));
}

#[test]
fn persisted_count_over_cap_is_rejected() {
    let activity = GachaConfig::standard_test_activity();
    let obtained: HashMap<String, u32> = [("golden_crown".to_string(), 2)].into_iter().collect();
    let err = RewardPool::from_activity(&activity, &obtained).unwrap_err();
    assert!(matches!(err, GachaError::InvalidItem { ref id, .. } if id == "golden_crown"));
}

#[test]
fn activity_merges_obtained_counts() {
    let activity = GachaConfig::standard_test_activity();
    let obtained: HashMap<String, u32> =
        [("silver_wing".to_string(), 1), ("paper_star".to_string(), 40)].into_iter().collect();
    let pool = RewardPool::from_activity(&activity, &obtained).unwrap();

    assert_eq!(pool.item("silver_wing").unwrap().obtained, 1);
    assert!(!pool.item("silver_wing").unwrap().is_eligible());
    assert_eq!(pool.item("silver_wing").unwrap().remaining(), Some(0));
    assert_eq!(pool.item("golden_crown").unwrap().remaining(), Some(1));
    assert_eq!(pool.item("paper_star").unwrap().remaining(), None);
    assert_eq!(pool.item("paper_star").unwrap().obtained, 40);
    assert_eq!(pool.item("wooden_token").unwrap().obtained, 0);
    assert_eq!(pool.jackpot().unwrap().id, "golden_crown");
}

#[test]
fn fast_forward_allowed_only_with_one_capped_highlight_left() {
    let activity = GachaConfig::standard_test_activity();
    let fresh = RewardPool::from_activity(&activity, &HashMap::new()).unwrap();
    assert!(!fresh.can_fast_forward(), "Two capped highlights unclaimed");

    let obtained: HashMap<String, u32> = [("silver_wing".to_string(), 1)].into_iter().collect();
    let one_left = RewardPool::from_activity(&activity, &obtained).unwrap();
    assert!(one_left.can_fast_forward());
}

#[test]
fn shipped_catalogs_load_and_validate() {
    let data_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../data");
    let config = GachaConfig::load(data_dir).expect("data/ must load");
    assert!(config.activities.len() >= 2);
    assert_eq!(config.machine.reveal.window_cap, 20);

    for activity in config.activities.values() {
        RewardPool::from_activity(activity, &HashMap::new())
            .unwrap_or_else(|e| panic!("{} failed validation: {e}", activity.pool_id));
    }
    let err = config.activity("no_such_pool").unwrap_err();
    assert!(matches!(err, GachaError::PoolNotFound { .. }), "got {err}");

    let slots: std::collections::HashSet<_> = config.activities.values().map(|a| a.slot).collect();
    assert_eq!(slots.len(), config.activities.len(), "Each pool needs its own RNG slot");
}

/// Deserialized pools skip validation; the jackpot lookup must not panic.
#[test]
fn deserialized_empty_pool_has_no_jackpot() {
    let json = r#"{
        "pool_id": "ghost",
        "items": [],
        "pity_threshold": 90,
        "pity_counter": 0,
        "total_draws": 0,
        "streaks": { "rare": 0, "epic": 0, "legendary": 0 }
    }"#;
    let pool: RewardPool = serde_json::from_str(json).unwrap();
    assert!(pool.pity_enabled());
    assert!(pool.jackpot().is_none());
}

#[test]
fn malformed_machine_config_names_the_file() {
    let dir = std::env::temp_dir().join(format!("gacha-bad-machine-{}", std::process::id()));
    std::fs::create_dir_all(dir.join("activities")).unwrap();
    std::fs::write(dir.join("machine.json"), "{ not json").unwrap();

    let err = GachaConfig::load(&dir.to_string_lossy()).unwrap_err();
    let _ = std::fs::remove_dir_all(&dir);
    assert!(err.to_string().contains("machine.json"), "got {err}");
}
