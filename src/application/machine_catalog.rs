// Catalog trait for static machine baselines and alerts
use crate::domain::alert::Alert;
use crate::domain::machine::MachineSnapshot;

pub trait MachineCatalog: Send + Sync {
    /// All baseline snapshots, in catalog order
    fn machines(&self) -> Vec<MachineSnapshot>;

    /// Baseline snapshot for one machine
    fn machine(&self, id: &str) -> Option<MachineSnapshot>;

    /// Entry used when a requested machine does not exist
    fn default_machine(&self) -> MachineSnapshot;

    /// Read-only alert feed
    fn alerts(&self) -> Vec<Alert>;

    /// Baseline for `id`, or the default entry when `id` is unknown
    fn machine_or_default(&self, id: &str) -> MachineSnapshot {
        self.machine(id).unwrap_or_else(|| {
            tracing::warn!("Unknown machine id {}, falling back to default entry", id);
            self.default_machine()
        })
    }
}
