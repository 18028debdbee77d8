// In-memory machine catalog and alert feed
use crate::application::machine_catalog::MachineCatalog;
use crate::domain::alert::{Alert, AlertCategory, AlertLevel};
use crate::domain::machine::{MachineCategory, MachineMetrics, MachineSnapshot, MachineState};
use crate::domain::oee::OeeScore;
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone)]
pub struct StaticCatalog {
    machines: Vec<MachineSnapshot>,
    alerts: Vec<Alert>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Builds the catalog with baseline and alert timestamps relative to `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            machines: baseline_machines(now),
            alerts: baseline_alerts(now),
        }
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MachineCatalog for StaticCatalog {
    fn machines(&self) -> Vec<MachineSnapshot> {
        self.machines.clone()
    }

    fn machine(&self, id: &str) -> Option<MachineSnapshot> {
        self.machines.iter().find(|m| m.id == id).cloned()
    }

    fn default_machine(&self) -> MachineSnapshot {
        // The baseline list is a non-empty literal.
        self.machines[0].clone()
    }

    fn alerts(&self) -> Vec<Alert> {
        self.alerts.clone()
    }
}

struct Entry {
    id: &'static str,
    name: &'static str,
    category: Option<MachineCategory>,
    state: MachineState,
    location: &'static str,
    metrics: MachineMetrics,
    oee: (f64, f64, f64),
}

impl Entry {
    fn into_snapshot(self, now: DateTime<Utc>) -> MachineSnapshot {
        let (availability, performance, quality) = self.oee;
        MachineSnapshot {
            id: self.id.to_string(),
            name: self.name.to_string(),
            category: self
                .category
                .unwrap_or_else(|| MachineCategory::infer_from_name(self.name)),
            state: self.state,
            location: self.location.to_string(),
            metrics: self.metrics,
            oee: OeeScore::from_factors(availability, performance, quality),
            timestamp: now,
        }
    }
}

fn metrics(temperature: f64, rpm: f64, uptime: f64, efficiency: f64) -> MachineMetrics {
    MachineMetrics::new(temperature, rpm, uptime, efficiency)
}

fn baseline_machines(now: DateTime<Utc>) -> Vec<MachineSnapshot> {
    let entries = vec![
        Entry {
            id: "mix-001",
            name: "Main Mixer A",
            category: Some(MachineCategory::Default),
            state: MachineState::Running,
            location: "Production Line 1",
            metrics: MachineMetrics {
                pressure: Some(45.2),
                vibration: Some(0.8),
                power: Some(125.0),
                ..metrics(78.0, 1200.0, 5.38, 92.0)
            },
            oee: (98.0, 95.0, 94.0),
        },
        Entry {
            id: "press-002",
            name: "Hydraulic Press B1",
            category: Some(MachineCategory::Press),
            state: MachineState::Running,
            location: "Production Line 1",
            metrics: MachineMetrics {
                pressure: Some(180.5),
                vibration: Some(1.2),
                power: Some(200.0),
                force: Some(850.0),
                ..metrics(65.0, 0.0, 7.25, 88.0)
            },
            oee: (95.0, 92.0, 90.0),
        },
        Entry {
            id: "cool-003",
            name: "Cooling System C",
            category: Some(MachineCategory::Cooling),
            state: MachineState::Running,
            location: "Production Line 1",
            metrics: MachineMetrics {
                pressure: Some(12.8),
                vibration: Some(0.3),
                power: Some(75.0),
                flow_rate: Some(450.0),
                ..metrics(22.0, 850.0, 12.5, 95.0)
            },
            oee: (99.0, 96.0, 98.0),
        },
        Entry {
            id: "ext-004",
            name: "Twin-Screw Extruder",
            category: None,
            state: MachineState::Maintenance,
            location: "Production Line 2",
            metrics: MachineMetrics {
                pressure: Some(0.0),
                vibration: Some(0.0),
                power: Some(0.0),
                throughput: Some(0.0),
                ..metrics(0.0, 0.0, 0.0, 0.0)
            },
            oee: (0.0, 0.0, 0.0),
        },
        Entry {
            id: "comp-005",
            name: "Atlas Copco Compressor",
            category: Some(MachineCategory::Compressor),
            state: MachineState::Running,
            location: "Utilities",
            metrics: MachineMetrics {
                pressure: Some(120.0),
                vibration: Some(0.9),
                power: Some(300.0),
                air_flow: Some(180.0),
                ..metrics(82.0, 1750.0, 15.2, 87.0)
            },
            oee: (96.0, 90.0, 95.0),
        },
        Entry {
            id: "oven-006",
            name: "Continuous Furnace 2000°C",
            category: Some(MachineCategory::Furnace),
            state: MachineState::Running,
            location: "Production Line 2",
            metrics: MachineMetrics {
                pressure: Some(0.5),
                vibration: Some(0.1),
                power: Some(450.0),
                gas_flow: Some(25.0),
                ..metrics(1850.0, 15.0, 18.7, 91.0)
            },
            oee: (97.0, 94.0, 93.0),
        },
        Entry {
            id: "pump-007",
            name: "Centrifugal Pump P1",
            category: Some(MachineCategory::Pump),
            state: MachineState::Running,
            location: "Hydraulic System",
            metrics: MachineMetrics {
                pressure: Some(85.2),
                vibration: Some(1.5),
                power: Some(90.0),
                flow_rate: Some(250.0),
                ..metrics(55.0, 3500.0, 22.1, 89.0)
            },
            oee: (98.0, 91.0, 96.0),
        },
        Entry {
            id: "conv-008",
            name: "Conveyor Belt ST-1",
            category: Some(MachineCategory::Conveyor),
            state: MachineState::Running,
            location: "Production Line 1",
            metrics: MachineMetrics {
                pressure: Some(0.0),
                vibration: Some(0.4),
                power: Some(25.0),
                speed: Some(1.2),
                ..metrics(35.0, 180.0, 8.9, 96.0)
            },
            oee: (99.0, 97.0, 98.0),
        },
        Entry {
            id: "gen-009",
            name: "Diesel Generator 500kW",
            category: None,
            state: MachineState::Stopped,
            location: "Substation",
            metrics: MachineMetrics {
                pressure: Some(0.0),
                vibration: Some(0.0),
                power: Some(0.0),
                fuel_level: Some(85.0),
                ..metrics(25.0, 0.0, 0.0, 0.0)
            },
            oee: (100.0, 100.0, 100.0),
        },
        Entry {
            id: "tower-010",
            name: "Cooling Tower TR-1",
            category: Some(MachineCategory::Cooling),
            state: MachineState::Running,
            location: "Refrigeration System",
            metrics: MachineMetrics {
                pressure: Some(2.1),
                vibration: Some(0.2),
                power: Some(150.0),
                water_flow: Some(2500.0),
                ..metrics(28.0, 840.0, 24.0, 93.0)
            },
            oee: (99.0, 94.0, 97.0),
        },
    ];

    entries.into_iter().map(|e| e.into_snapshot(now)).collect()
}

struct AlertEntry {
    id: &'static str,
    level: AlertLevel,
    message: &'static str,
    component: &'static str,
    machine_id: &'static str,
    minutes_ago: i64,
    acknowledged: bool,
    category: AlertCategory,
}

impl AlertEntry {
    fn into_alert(self, now: DateTime<Utc>) -> Alert {
        Alert {
            id: self.id.to_string(),
            level: self.level,
            message: self.message.to_string(),
            component: self.component.to_string(),
            machine_id: Some(self.machine_id.to_string()),
            timestamp: now - Duration::minutes(self.minutes_ago),
            acknowledged: self.acknowledged,
            category: Some(self.category),
        }
    }
}

fn baseline_alerts(now: DateTime<Utc>) -> Vec<Alert> {
    let entries = vec![
        AlertEntry {
            id: "a1",
            level: AlertLevel::Critical,
            message: "High temperature - 78°C (limit: 75°C)",
            component: "Main Mixer A",
            machine_id: "mix-001",
            minutes_ago: 2,
            acknowledged: false,
            category: AlertCategory::Temperature,
        },
        AlertEntry {
            id: "a2",
            level: AlertLevel::Warning,
            message: "Pressure above normal - 180.5 PSI",
            component: "Hydraulic Press B1",
            machine_id: "press-002",
            minutes_ago: 5,
            acknowledged: false,
            category: AlertCategory::Pressure,
        },
        AlertEntry {
            id: "a3",
            level: AlertLevel::Info,
            message: "Preventive maintenance scheduled for tomorrow",
            component: "Cooling System C",
            machine_id: "cool-003",
            minutes_ago: 15,
            acknowledged: true,
            category: AlertCategory::Maintenance,
        },
        AlertEntry {
            id: "a4",
            level: AlertLevel::Critical,
            message: "Machine under maintenance - production halted",
            component: "Twin-Screw Extruder",
            machine_id: "ext-004",
            minutes_ago: 45,
            acknowledged: true,
            category: AlertCategory::Maintenance,
        },
        AlertEntry {
            id: "a5",
            level: AlertLevel::Warning,
            message: "High vibration detected - 1.5 mm/s",
            component: "Centrifugal Pump P1",
            machine_id: "pump-007",
            minutes_ago: 8,
            acknowledged: false,
            category: AlertCategory::Vibration,
        },
        AlertEntry {
            id: "a6",
            level: AlertLevel::Info,
            message: "Low fuel level - 85%",
            component: "Diesel Generator 500kW",
            machine_id: "gen-009",
            minutes_ago: 30,
            acknowledged: false,
            category: AlertCategory::Fuel,
        },
        AlertEntry {
            id: "a7",
            level: AlertLevel::Warning,
            message: "Furnace temperature close to limit - 1850°C",
            component: "Continuous Furnace 2000°C",
            machine_id: "oven-006",
            minutes_ago: 12,
            acknowledged: false,
            category: AlertCategory::Temperature,
        },
        AlertEntry {
            id: "a8",
            level: AlertLevel::Info,
            message: "Normal operation - all parameters OK",
            component: "Conveyor Belt ST-1",
            machine_id: "conv-008",
            minutes_ago: 60,
            acknowledged: true,
            category: AlertCategory::Status,
        },
        AlertEntry {
            id: "a9",
            level: AlertLevel::Warning,
            message: "Efficiency below expected - 87%",
            component: "Atlas Copco Compressor",
            machine_id: "comp-005",
            minutes_ago: 20,
            acknowledged: false,
            category: AlertCategory::Efficiency,
        },
        AlertEntry {
            id: "a10",
            level: AlertLevel::Info,
            message: "System running in economy mode",
            component: "Cooling Tower TR-1",
            machine_id: "tower-010",
            minutes_ago: 90,
            acknowledged: true,
            category: AlertCategory::Status,
        },
    ];

    entries.into_iter().map(|e| e.into_alert(now)).collect()
}
