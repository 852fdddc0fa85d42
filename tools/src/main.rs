//! gacha-runner: headless draw-and-reveal runner.
//!
//! Usage:
//!   gacha-runner --seed 12345 --pool lantern_festival --draw-type hundred --draws 5
//!   gacha-runner --seed 12345 --draws 20 --draw-type ten --db run.db --fast-forward

use anyhow::Result;
use gacha_core::{
    batch::BatchResult,
    config::GachaConfig,
    error::GachaError,
    machine::GachaMachine,
    pacing::ManualScheduler,
    reveal::{PresentationSink, RevealEvent, RevealFrame, RevealScheduler, RevealState},
    rng::RngBank,
    store::GachaStore,
    types::{DrawType, Rarity},
};
use std::collections::BTreeMap;
use std::env;

/// Logs frames and keeps a tally for the summary.
#[derive(Default)]
struct LogSink {
    frames: usize,
    pauses: usize,
    whiffs: usize,
}

impl PresentationSink for LogSink {
    fn present(&mut self, frame: RevealFrame) {
        self.frames += 1;
        match frame.event {
            RevealEvent::PauseOnRare => self.pauses += 1,
            RevealEvent::Whiff => self.whiffs += 1,
            _ => {}
        }
        for result in &frame.revealed {
            log::debug!(
                "[{:>4}] {:<9} {}{}",
                frame.cursor,
                result.rarity().name(),
                result.item.display_name,
                if result.is_pity_triggered { " (pity)" } else { "" }
            );
        }
        if frame.event != RevealEvent::Reveal {
            log::info!(
                "reveal {:?} at cursor {} ({} on screen)",
                frame.event,
                frame.cursor,
                frame.displayed.len()
            );
        }
    }
}

#[derive(Default)]
struct Tally {
    actions:        usize,
    draws:          usize,
    pity_triggers:  usize,
    currency_yield: u64,
    whiff_actions:  usize,
    by_rarity:      BTreeMap<Rarity, usize>,
}

impl Tally {
    fn add(&mut self, batch: &BatchResult) {
        self.actions += 1;
        self.draws += batch.len();
        self.pity_triggers += batch.pity_triggers();
        self.currency_yield += batch.currency_yield;
        if !batch.has_highlight() {
            self.whiff_actions += 1;
        }
        for rarity in Rarity::ALL {
            *self.by_rarity.entry(rarity).or_default() += batch.count_by_rarity(rarity);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let draws = parse_arg(&args, "--draws", 10usize);
    let fast_forward = args.iter().any(|a| a == "--fast-forward");
    let db = str_arg(&args, "--db").unwrap_or(":memory:");
    let data_dir = str_arg(&args, "--data-dir").unwrap_or("./data");
    let pool_id = str_arg(&args, "--pool").unwrap_or("lantern_festival");
    let draw_type_name = str_arg(&args, "--draw-type").unwrap_or("ten");
    let draw_type = DrawType::parse(draw_type_name)
        .ok_or_else(|| anyhow::anyhow!("Unknown draw type '{draw_type_name}'"))?;

    println!("Gacha runner");
    println!("  seed:       {seed}");
    println!("  pool:       {pool_id}");
    println!("  draw type:  {}", draw_type.name());
    println!("  actions:    {draws}");
    println!("  db:         {db}");
    println!("  data_dir:   {data_dir}");
    println!();

    let config = GachaConfig::load(data_dir)?;
    let activity = config.activity(pool_id)?;

    let store = if db == ":memory:" {
        GachaStore::in_memory()?
    } else {
        GachaStore::open(db)?
    };
    store.migrate()?;
    log::info!("store ready at {}", store.path().unwrap_or(":memory:"));

    let rng_bank = RngBank::new(seed);
    let mut machine = GachaMachine::open(activity, &rng_bank, config.machine.clone(), store)?;
    let mut reveal = RevealScheduler::new(
        config.machine.reveal.clone(),
        ManualScheduler::new(),
        LogSink::default(),
    );

    // Headless: the pre-commit pause is reported, not slept.
    println!("  pre-commit delay: {} ms", machine.pre_commit_delay().as_millis());
    println!();

    let run_started = chrono::Utc::now();
    let mut tally = Tally::default();
    for _ in 0..draws {
        let batch = match machine.perform_draw(draw_type) {
            Ok(batch) => batch,
            Err(GachaError::InsufficientFunds { needed, available }) => {
                println!("  out of currency: need {needed}, have {available}");
                break;
            }
            Err(e) => return Err(e.into()),
        };
        tally.add(&batch);

        reveal.start(draw_type, batch.results.clone(), machine.can_fast_forward());
        drive_reveal(&mut reveal, fast_forward);
        reveal.dismiss();
    }

    print_summary(&machine, &tally, reveal.sink(), run_started)?;
    Ok(())
}

/// Deliver every scheduled tick immediately, resuming on each rare pause.
fn drive_reveal(reveal: &mut RevealScheduler<ManualScheduler, LogSink>, fast_forward: bool) {
    loop {
        match reveal.state() {
            RevealState::Playing => {
                if fast_forward {
                    reveal.fast_forward();
                    if reveal.state() != RevealState::Playing {
                        continue;
                    }
                }
                match reveal.scheduler_mut().pop() {
                    Some(tick) => reveal.on_wake(tick),
                    None => {
                        log::warn!("reveal stalled at cursor {} with no pending tick", reveal.cursor());
                        break;
                    }
                }
            }
            RevealState::PausedOnRare => reveal.resume(),
            RevealState::Complete | RevealState::Idle => break,
        }
    }
}

fn print_summary(
    machine:     &GachaMachine<GachaStore>,
    tally:       &Tally,
    sink:        &LogSink,
    run_started: chrono::DateTime<chrono::Utc>,
) -> Result<()> {
    let pool = machine.pool();
    let store = machine.gateway();
    let elapsed = chrono::Utc::now() - run_started;

    println!("=== RUN SUMMARY ===");
    println!("  actions:        {}", tally.actions);
    println!("  draws:          {}", tally.draws);
    println!("  pool draws:     {}", pool.total_draws());
    println!("  pity counter:   {} / {}", pool.pity_counter(), pool.pity_threshold());
    println!(
        "  pity triggers:  {} this run, {} all time",
        tally.pity_triggers,
        store.pity_trigger_count(pool.pool_id())?
    );
    println!("  currency yield: {}", tally.currency_yield);
    println!("  balance:        {}", machine.wallet().balance());
    println!("  commits:        {}", store.commit_count(pool.pool_id())?);
    println!("  frames:         {} ({} rare pauses, {} whiffs)", sink.frames, sink.pauses, sink.whiffs);
    println!("  whiff actions:  {}", tally.whiff_actions);
    println!("  elapsed:        {} ms", elapsed.num_milliseconds());

    println!();
    println!("=== RARITY ===");
    for (rarity, count) in &tally.by_rarity {
        let share = if tally.draws > 0 { *count as f64 * 100.0 / tally.draws as f64 } else { 0.0 };
        println!("  {:<10} {count:>6}  {share:>6.2}%", rarity.name());
    }

    println!();
    println!("=== CAPPED ITEMS ===");
    for item in pool.items().iter().filter(|i| i.is_capped()) {
        println!(
            "  {:<20} {}/{} ({} left)",
            item.display_name,
            item.obtained,
            item.cap,
            item.remaining().unwrap_or(0)
        );
    }

    let rare = store.rare_history(pool.pool_id())?;
    if !rare.is_empty() {
        println!();
        println!("=== RARE HISTORY (last 10) ===");
        for entry in rare.iter().rev().take(10).rev() {
            println!(
                "  #{:<6} {:<9} {}{}",
                entry.draw_number,
                entry.rarity.name(),
                entry.display_name,
                if entry.is_pity_triggered { " (pity)" } else { "" }
            );
        }
    }
    Ok(())
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
