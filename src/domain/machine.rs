// Machine domain model
use super::oee::OeeScore;
use super::profile::CategoryProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MachineState {
    Running,
    Stopped,
    Maintenance,
    Error,
}

impl MachineState {
    /// Stopped and maintenance machines neither drift nor accrue uptime.
    pub fn is_idle(self) -> bool {
        matches!(self, MachineState::Stopped | MachineState::Maintenance)
    }
}

/// Selects the category profile that governs how a machine's metrics evolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineCategory {
    Furnace,
    Cooling,
    Compressor,
    Press,
    Pump,
    Conveyor,
    #[serde(other)]
    Default,
}

// Order matters: "compressor" contains "press", so it has to be tried first.
const NAME_RULES: &[(&[&str], MachineCategory)] = &[
    (&["furnace", "oven", "kiln"], MachineCategory::Furnace),
    (&["cooling", "cooler", "chiller"], MachineCategory::Cooling),
    (&["compressor"], MachineCategory::Compressor),
    (&["press"], MachineCategory::Press),
    (&["pump"], MachineCategory::Pump),
    (&["conveyor", "belt"], MachineCategory::Conveyor),
];

impl MachineCategory {
    /// Infers a category from a display name: case-insensitive substring
    /// match, first rule wins, `Default` otherwise.
    ///
    /// Only used for catalog entries that do not carry an explicit category.
    /// Renaming a machine changes the result, so explicit tags are preferred.
    pub fn infer_from_name(name: &str) -> Self {
        let name = name.to_lowercase();
        NAME_RULES
            .iter()
            .find(|(needles, _)| needles.iter().any(|n| name.contains(n)))
            .map(|(_, category)| *category)
            .unwrap_or(MachineCategory::Default)
    }

    pub fn profile(self) -> &'static CategoryProfile {
        CategoryProfile::for_category(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineMetrics {
    pub temperature: f64,
    pub rpm: f64,
    pub uptime_hours: f64,
    pub efficiency: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throughput: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_flow: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_flow: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_flow: Option<f64>,
}

impl MachineMetrics {
    /// Core metrics only; every optional field unset.
    pub fn new(temperature: f64, rpm: f64, uptime_hours: f64, efficiency: f64) -> Self {
        Self {
            temperature,
            rpm,
            uptime_hours,
            efficiency,
            pressure: None,
            vibration: None,
            power: None,
            force: None,
            flow_rate: None,
            throughput: None,
            air_flow: None,
            gas_flow: None,
            speed: None,
            fuel_level: None,
            water_flow: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineSnapshot {
    pub id: String,
    pub name: String,
    pub category: MachineCategory,
    pub state: MachineState,
    pub location: String,
    pub metrics: MachineMetrics,
    pub oee: OeeScore,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_category_from_name() {
        assert_eq!(
            MachineCategory::infer_from_name("Continuous Furnace 2000°C"),
            MachineCategory::Furnace
        );
        assert_eq!(
            MachineCategory::infer_from_name("COOLING TOWER TR-1"),
            MachineCategory::Cooling
        );
        assert_eq!(
            MachineCategory::infer_from_name("Atlas Copco Compressor"),
            MachineCategory::Compressor
        );
        assert_eq!(
            MachineCategory::infer_from_name("Hydraulic Press B1"),
            MachineCategory::Press
        );
        assert_eq!(
            MachineCategory::infer_from_name("Main Mixer A"),
            MachineCategory::Default
        );
    }

    #[test]
    fn test_unknown_category_deserializes_to_default() {
        let category: MachineCategory = serde_json::from_str("\"centrifuge\"").unwrap();
        assert_eq!(category, MachineCategory::Default);
    }

    #[test]
    fn test_idle_states() {
        assert!(MachineState::Stopped.is_idle());
        assert!(MachineState::Maintenance.is_idle());
        assert!(!MachineState::Running.is_idle());
        assert!(!MachineState::Error.is_idle());
    }
}
