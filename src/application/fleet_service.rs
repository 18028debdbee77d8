// Fleet service - Use cases over the static catalog and alert feed
use crate::application::machine_catalog::MachineCatalog;
use crate::domain::alert::Alert;
use crate::domain::machine::{MachineSnapshot, MachineState};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetStats {
    pub running_machines: usize,
    pub total_machines: usize,
    pub critical_alerts: usize,
    pub avg_efficiency: i64,
    pub uptime: i64,
}

#[derive(Clone)]
pub struct FleetService {
    catalog: Arc<dyn MachineCatalog>,
}

impl FleetService {
    pub fn new(catalog: Arc<dyn MachineCatalog>) -> Self {
        Self { catalog }
    }

    pub fn list_machines(&self) -> Vec<MachineSnapshot> {
        self.catalog.machines()
    }

    pub fn machines_by_location(&self, location: &str) -> Vec<MachineSnapshot> {
        self.catalog
            .machines()
            .into_iter()
            .filter(|m| m.location == location)
            .collect()
    }

    pub fn all_alerts(&self) -> Vec<Alert> {
        self.catalog.alerts()
    }

    /// Alerts to display for a machine: its own alerts, or the whole feed
    /// when it has none.
    pub fn alerts_for_machine(&self, machine_id: &str) -> Vec<Alert> {
        let alerts = self.catalog.alerts();
        let own: Vec<Alert> = alerts
            .iter()
            .filter(|a| a.belongs_to(machine_id))
            .cloned()
            .collect();

        if own.is_empty() { alerts } else { own }
    }

    pub fn fleet_stats(&self) -> FleetStats {
        let machines = self.catalog.machines();
        let total_machines = machines.len();
        let running_machines = machines
            .iter()
            .filter(|m| m.state == MachineState::Running)
            .count();
        let critical_alerts = self
            .catalog
            .alerts()
            .iter()
            .filter(|a| a.is_open_critical())
            .count();

        if total_machines == 0 {
            return FleetStats {
                running_machines,
                total_machines,
                critical_alerts,
                avg_efficiency: 0,
                uptime: 0,
            };
        }

        let avg_efficiency =
            machines.iter().map(|m| m.metrics.efficiency).sum::<f64>() / total_machines as f64;

        FleetStats {
            running_machines,
            total_machines,
            critical_alerts,
            avg_efficiency: avg_efficiency.round() as i64,
            uptime: (running_machines as f64 / total_machines as f64 * 100.0).round() as i64,
        }
    }
}
