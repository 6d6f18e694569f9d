use crate::model::AgentMetrics;
use moka::sync::Cache;

/// Read-through cache in front of `agent_metrics`. Never authoritative:
/// every write path invalidates the agent's entry, and each entry is tagged
/// with the `PRAGMA data_version` it was read at so commits from other
/// connections turn it into a miss.
#[derive(Clone)]
pub struct MetricsCache {
    inner: Cache<String, (i64, AgentMetrics)>,
}

impl MetricsCache {
    pub fn new(max_entries: u64) -> Self {
        Self {
            inner: Cache::new(max_entries.max(1)),
        }
    }

    pub fn get(&self, agent_type: &str, data_version: i64) -> Option<AgentMetrics> {
        match self.inner.get(agent_type) {
            Some((seen, metrics)) if seen == data_version => Some(metrics),
            Some(_) => {
                self.inner.invalidate(agent_type);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, metrics: &AgentMetrics, data_version: i64) {
        self.inner
            .insert(metrics.agent_type.clone(), (data_version, metrics.clone()));
    }

    pub fn invalidate(&self, agent_type: &str) {
        self.inner.invalidate(agent_type);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_from_an_older_data_version_miss() {
        let cache = MetricsCache::new(4);
        cache.put(&AgentMetrics::new("sandbox"), 3);
        assert!(cache.get("sandbox", 3).is_some());
        assert!(cache.get("sandbox", 4).is_none());
        // The stale entry is gone even for the old version.
        assert!(cache.get("sandbox", 3).is_none());
    }
}
