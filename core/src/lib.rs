//! gacha-core: reward-draw engine and reveal scheduler.
//!
//! Data flows RewardPool -> DrawEngine -> BatchSimulator -> RevealScheduler
//! -> PresentationSink. Commits flow BatchSimulator -> PersistenceGateway.

pub mod batch;
pub mod config;
pub mod draw;
pub mod error;
pub mod gateway;
pub mod machine;
pub mod pacing;
pub mod pool;
pub mod reveal;
pub mod rng;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod wallet;
