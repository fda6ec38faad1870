//! Subscription registry
//!
//! Maps each agent id to the observers currently watching it. One
//! `RwLock` guards the whole map; readers take a snapshot of the handles and
//! release the lock before any send, so the lock is never held across an
//! await.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use roadpulse_protocol::AgentId;

use crate::observer::ObserverHandle;

/// Which observers watch which agent
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    entries: RwLock<HashMap<AgentId, HashMap<u64, ObserverHandle>>>,
}

impl SubscriptionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer for an agent
    ///
    /// Idempotent per observer id: returns `false` if it was already
    /// registered for this agent.
    pub fn subscribe(&self, agent_id: AgentId, handle: ObserverHandle) -> bool {
        let observer_id = handle.id();
        let mut entries = self.entries.write();
        let observers = entries.entry(agent_id).or_default();

        if observers.contains_key(&observer_id) {
            return false;
        }
        observers.insert(observer_id, handle);
        debug!(agent_id, observer_id, "observer subscribed");
        true
    }

    /// Register an observer and get a guard that deregisters it on drop
    pub fn subscribe_guarded(
        self: &Arc<Self>,
        agent_id: AgentId,
        handle: ObserverHandle,
    ) -> Subscription {
        let observer_id = handle.id();
        self.subscribe(agent_id, handle);
        Subscription {
            registry: Arc::clone(self),
            agent_id,
            observer_id,
        }
    }

    /// Remove an observer; no-op if absent
    ///
    /// Returns whether anything was removed. Agents left with no observers
    /// are dropped from the map.
    pub fn unsubscribe(&self, agent_id: AgentId, observer_id: u64) -> bool {
        let mut entries = self.entries.write();
        let Some(observers) = entries.get_mut(&agent_id) else {
            return false;
        };

        let removed = observers.remove(&observer_id).is_some();
        if observers.is_empty() {
            entries.remove(&agent_id);
        }
        if removed {
            debug!(agent_id, observer_id, "observer unsubscribed");
        }
        removed
    }

    /// Snapshot of the observers for an agent
    pub fn observers(&self, agent_id: AgentId) -> Vec<ObserverHandle> {
        self.entries
            .read()
            .get(&agent_id)
            .map(|observers| observers.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether anyone watches this agent
    pub fn has_observers(&self, agent_id: AgentId) -> bool {
        self.entries.read().contains_key(&agent_id)
    }

    /// Total registered observers across all agents
    pub fn observer_count(&self) -> usize {
        self.entries.read().values().map(HashMap::len).sum()
    }

    /// Number of agents with at least one observer
    pub fn agent_count(&self) -> usize {
        self.entries.read().len()
    }
}

/// Registration that lasts as long as this value
///
/// Dropping it removes the observer, so a connection task that ends for any
/// reason leaves no stale entry behind.
#[derive(Debug)]
pub struct Subscription {
    registry: Arc<SubscriptionRegistry>,
    agent_id: AgentId,
    observer_id: u64,
}

impl Subscription {
    #[inline]
    pub fn agent_id(&self) -> AgentId {
        self.agent_id
    }

    #[inline]
    pub fn observer_id(&self) -> u64 {
        self.observer_id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.unsubscribe(self.agent_id, self.observer_id);
    }
}
