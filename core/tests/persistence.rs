use gacha_core::{
    config::{GachaConfig, MachineConfig},
    error::{GachaError, GachaResult},
    gateway::{MemoryGateway, PersistenceGateway},
    machine::GachaMachine,
    rng::RngBank,
    snapshot::PoolSnapshot,
    store::GachaStore,
    types::DrawType,
};

// ── Test helpers ────────────────────────────────────────────────────────────

fn make_store() -> GachaStore {
    let store = GachaStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store
}

fn machine_config(balance: u64) -> MachineConfig {
    MachineConfig {
        starting_balance: balance,
        ..MachineConfig::default()
    }
}

fn make_machine(seed: u64, balance: u64) -> GachaMachine<GachaStore> {
    let activity = GachaConfig::standard_test_activity();
    GachaMachine::open(&activity, &RngBank::new(seed), machine_config(balance), make_store())
        .expect("machine")
}

struct FailingGateway;

impl PersistenceGateway for FailingGateway {
    fn commit(&mut self, _snapshot: &PoolSnapshot) -> GachaResult<()> {
        Err(anyhow::anyhow!("disk full").into())
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn committed_batches_reload_into_identical_pool() {
    let mut machine = make_machine(7, 10_000);
    for _ in 0..3 {
        machine.perform_draw(DrawType::Hundred).unwrap();
    }

    let activity = GachaConfig::standard_test_activity();
    let reloaded = machine.gateway().load_pool(&activity).unwrap();
    assert_eq!(&reloaded, machine.pool(), "Reloaded pool must match the live pool");
    assert_eq!(reloaded.total_draws(), 300);

    let store = machine.gateway();
    assert_eq!(store.commit_count("standard").unwrap(), 3);
    assert_eq!(store.history("standard").unwrap().len(), 300);

    let pity_in_history = store
        .history("standard")
        .unwrap()
        .iter()
        .filter(|h| h.is_pity_triggered)
        .count() as i64;
    assert_eq!(store.pity_trigger_count("standard").unwrap(), pity_in_history);

    let rare = store.rare_history("standard").unwrap();
    assert!(rare.iter().all(|h| h.rarity.is_highlight()));
    let numbers: Vec<_> = store.history("standard").unwrap().iter().map(|h| h.draw_number).collect();
    assert_eq!(numbers, (1..=300).collect::<Vec<_>>());
}

#[test]
fn latest_snapshot_round_trips_through_store() {
    let mut machine = make_machine(11, 10_000);
    machine.perform_draw(DrawType::Ten).unwrap();
    let batch = machine.perform_draw(DrawType::Ten).unwrap();

    let snapshot = machine.gateway().latest_snapshot("standard").unwrap().expect("a snapshot");
    assert_eq!(snapshot.total_draws, 20);
    assert_eq!(snapshot.pity_counter, batch.pity_counter);
    assert_eq!(snapshot.streaks, batch.streaks);
    assert_eq!(snapshot.appended_history, batch.history);
    assert_eq!(snapshot.draw_type, Some(DrawType::Ten));
}

#[test]
fn fresh_store_loads_catalog_defaults() {
    let store = make_store();
    let activity = GachaConfig::standard_test_activity();
    let pool = store.load_pool(&activity).unwrap();
    assert_eq!(pool.total_draws(), 0);
    assert_eq!(pool.pity_counter(), 0);
    assert!(pool.items().iter().all(|i| i.obtained == 0));
    assert!(store.latest_snapshot("standard").unwrap().is_none());
}

#[test]
fn insufficient_funds_leaves_everything_untouched() {
    let mut machine = make_machine(5, 50);
    let err = machine.perform_draw(DrawType::Hundred).unwrap_err();
    assert!(
        matches!(err, GachaError::InsufficientFunds { needed: 100, available: 50 }),
        "unexpected error: {err}"
    );
    assert_eq!(machine.wallet().balance(), 50);
    assert_eq!(machine.pre_commit_delay(), std::time::Duration::from_millis(300));
    assert_eq!(machine.pool().total_draws(), 0);
    assert_eq!(machine.gateway().commit_count("standard").unwrap(), 0);
}

#[test]
fn failed_commit_refunds_and_keeps_old_pool() {
    let activity = GachaConfig::standard_test_activity();
    let pool = make_store().load_pool(&activity).unwrap();
    let rng = RngBank::new(1).for_pool("standard", 0);
    let mut machine = GachaMachine::new(pool.clone(), rng, machine_config(500), FailingGateway);

    assert!(machine.perform_draw(DrawType::Hundred).is_err());
    assert_eq!(machine.wallet().balance(), 500, "Cost must be refunded");
    assert_eq!(machine.pool(), &pool, "Pool must not be swapped on failed commit");
}

#[test]
fn currency_yield_is_credited_after_commit() {
    let activity = GachaConfig::standard_test_activity();
    let pool = make_store().load_pool(&activity).unwrap();
    let rng = RngBank::new(21).for_pool("standard", 0);
    let mut machine = GachaMachine::new(pool, rng, machine_config(1_000), MemoryGateway::new());

    let batch = machine.perform_draw(DrawType::Hundred).unwrap();
    assert_eq!(machine.wallet().balance(), 1_000 - 100 + batch.currency_yield);

    let commit = machine.gateway().last().unwrap();
    assert_eq!(commit.currency_yield, batch.currency_yield);
    assert_eq!(commit.appended_history.len(), 100);
    let rare_numbers: Vec<_> = commit.appended_rare_history.iter().map(|h| h.draw_number).collect();
    let sequence_numbers: Vec<_> = batch.results.iter().filter_map(|r| r.draw_sequence_number).collect();
    assert_eq!(rare_numbers, sequence_numbers);
}

#[test]
fn capped_items_stay_capped_across_commits() {
    let mut machine = make_machine(3, 100_000);
    for _ in 0..10 {
        machine.perform_draw(DrawType::FiveHundred).unwrap();
    }
    let crown = machine.pool().item("golden_crown").unwrap();
    let wing = machine.pool().item("silver_wing").unwrap();
    assert_eq!(crown.obtained, 1, "pity guarantees the jackpot within 5000 draws");
    assert_eq!(wing.obtained, 1);
    assert!(machine.can_fast_forward(), "No capped highlight left unclaimed");
}
