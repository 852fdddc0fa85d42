//! Persistence gateway contract.
//!
//! RULE: a commit is all-or-nothing. A gateway either applies every part
//! of a PoolSnapshot or returns an error and applies none of it.

use crate::{error::GachaResult, snapshot::PoolSnapshot};

pub trait PersistenceGateway {
    fn commit(&mut self, snapshot: &PoolSnapshot) -> GachaResult<()>;
}

/// Keeps every commit in memory. Used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    pub commits: Vec<PoolSnapshot>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&PoolSnapshot> {
        self.commits.last()
    }
}

impl PersistenceGateway for MemoryGateway {
    fn commit(&mut self, snapshot: &PoolSnapshot) -> GachaResult<()> {
        self.commits.push(snapshot.clone());
        Ok(())
    }
}

impl<G: PersistenceGateway + ?Sized> PersistenceGateway for &mut G {
    fn commit(&mut self, snapshot: &PoolSnapshot) -> GachaResult<()> {
        (**self).commit(snapshot)
    }
}
