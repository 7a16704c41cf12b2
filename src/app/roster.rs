use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerRole {
    Sender,
    Listener,
}

impl WorkerRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            WorkerRole::Sender => "sender",
            WorkerRole::Listener => "listener",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRecord {
    pub role: WorkerRole,
    pub label: String,
    pub spawned_at: Instant,
}

/// Workers actually started during a run, in spawn order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerRoster {
    records: Vec<SpawnRecord>,
}

impl WorkerRoster {
    /// Registers the next worker of `role` and returns its label.
    pub fn register(&mut self, role: WorkerRole) -> String {
        let index = self.count(role).saturating_add(1);
        let label = format!("{}-{}", role.as_str(), index);
        self.records.push(SpawnRecord {
            role,
            label: label.clone(),
            spawned_at: Instant::now(),
        });
        label
    }

    #[must_use]
    pub fn count(&self, role: WorkerRole) -> usize {
        self.records
            .iter()
            .filter(|record| record.role == role)
            .count()
    }

    #[must_use]
    pub fn records(&self) -> &[SpawnRecord] {
        &self.records
    }

    pub fn spawn_times(&self, role: WorkerRole) -> impl Iterator<Item = Instant> + '_ {
        self.records
            .iter()
            .filter(move |record| record.role == role)
            .map(|record| record.spawned_at)
    }
}
