use crate::error::{GachaError, GachaResult};
use crate::types::{DrawType, ItemId, PoolId, Rarity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

// ── Activity catalog ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemConfig {
    pub id: ItemId,
    pub display_name: String,
    pub category: String,
    pub rarity: Rarity,
    pub weight: f64,
    #[serde(default)]
    pub cap: u32,
    #[serde(default)]
    pub currency_yield: Option<u64>,
}

/// Read-only catalog for one pool. Obtained counts live in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityConfig {
    pub pool_id: PoolId,
    pub items: Vec<ItemConfig>,
    #[serde(default)]
    pub pity_threshold: u32,
    /// Stable RNG slot. Dual-pool activities give each pool its own slot.
    #[serde(default)]
    pub slot: u64,
}

impl ActivityConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let activity: ActivityConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(activity)
    }
}

// ── Machine tuning ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealConfig {
    /// Delay between consecutive reveals while Playing.
    pub tick_delay_ms: u64,
    /// Delay before the first reveal of a session.
    pub first_tick_delay_ms: u64,
    /// Visible entries kept for large-batch draw types.
    pub window_cap: usize,
}

impl RevealConfig {
    pub fn tick_delay(&self) -> Duration {
        Duration::from_millis(self.tick_delay_ms)
    }

    pub fn first_tick_delay(&self) -> Duration {
        Duration::from_millis(self.first_tick_delay_ms)
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            tick_delay_ms:       120,
            first_tick_delay_ms: 0,
            window_cap:          20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineConfig {
    pub reveal: RevealConfig,
    /// Input-feel pause the host waits before committing a draw action.
    pub pre_commit_delay_ms: u64,
    /// Currency cost per draw action, keyed by draw type.
    pub draw_costs: HashMap<DrawType, u64>,
    pub starting_balance: u64,
}

impl MachineConfig {
    pub fn pre_commit_delay(&self) -> Duration {
        Duration::from_millis(self.pre_commit_delay_ms)
    }

    /// Cost of one draw action. Unlisted types cost one unit per draw.
    pub fn cost_of(&self, draw_type: DrawType) -> u64 {
        self.draw_costs
            .get(&draw_type)
            .copied()
            .unwrap_or(draw_type.count() as u64)
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        let draw_costs = [
            (DrawType::Single, 1),
            (DrawType::Ten, 10),
            (DrawType::Hundred, 100),
            (DrawType::FiveHundred, 500),
        ]
        .into_iter()
        .collect();
        Self {
            reveal: RevealConfig::default(),
            pre_commit_delay_ms: 300,
            draw_costs,
            starting_balance: 0,
        }
    }
}

// ── Top-level config ───────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GachaConfig {
    pub activities: HashMap<PoolId, ActivityConfig>,
    pub machine: MachineConfig,
}

impl GachaConfig {
    /// Load from the data/ directory.
    /// In tests, use GachaConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let machine_path = format!("{data_dir}/machine.json");
        let machine_content = std::fs::read_to_string(&machine_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {machine_path}: {e}"))?;
        let machine: MachineConfig = serde_json::from_str(&machine_content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {machine_path}: {e}"))?;

        let activity_dir = format!("{data_dir}/activities");
        let mut paths: Vec<_> = std::fs::read_dir(&activity_dir)
            .map_err(|e| anyhow::anyhow!("Cannot read {activity_dir}: {e}"))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut activities = HashMap::new();
        for path in paths {
            let activity = ActivityConfig::load(&path.to_string_lossy())?;
            if activities.contains_key(&activity.pool_id) {
                anyhow::bail!("Duplicate pool_id '{}' in {}", activity.pool_id, path.display());
            }
            activities.insert(activity.pool_id.clone(), activity);
        }

        log::debug!("Loaded {} activities from {data_dir}", activities.len());
        Ok(Self { activities, machine })
    }

    pub fn activity(&self, pool_id: &str) -> GachaResult<&ActivityConfig> {
        self.activities
            .get(pool_id)
            .ok_or_else(|| GachaError::PoolNotFound { pool_id: pool_id.to_string() })
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        let activity = Self::standard_test_activity();
        let mut activities = HashMap::new();
        activities.insert(activity.pool_id.clone(), activity);
        Self {
            activities,
            machine: MachineConfig {
                starting_balance: 10_000,
                ..MachineConfig::default()
            },
        }
    }

    /// A small banner: capped jackpot at index 0, a capped epic,
    /// a currency refund item and two uncapped commons.
    pub fn standard_test_activity() -> ActivityConfig {
        let item = |id: &str, rarity: Rarity, weight: f64, cap: u32, yield_: Option<u64>| ItemConfig {
            id: id.into(),
            display_name: id.replace('_', " "),
            category: if yield_.is_some() { "currency".into() } else { "collectible".into() },
            rarity,
            weight,
            cap,
            currency_yield: yield_,
        };
        ActivityConfig {
            pool_id: "standard".into(),
            items: vec![
                item("golden_crown", Rarity::Legendary, 0.5, 1, None),
                item("silver_wing", Rarity::Epic, 2.0, 1, None),
                item("gem_pouch", Rarity::Rare, 7.5, 0, Some(5)),
                item("blue_ribbon", Rarity::Rare, 10.0, 0, None),
                item("wooden_token", Rarity::Common, 50.0, 0, None),
                item("paper_star", Rarity::Common, 30.0, 0, None),
            ],
            pity_threshold: 90,
            slot: 0,
        }
    }
}
