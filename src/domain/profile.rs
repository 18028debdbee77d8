// Category profiles - ranges and behaviour per machine category
use super::machine::MachineCategory;

/// Closed interval used for clamping simulated values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EfficiencyModel {
    /// Efficiency follows from temperature and rpm staying inside their
    /// optimal bands, plus noise.
    Derived {
        temperature_threshold: f64,
        optimal_rpm: Range,
        temperature_penalty: f64,
        rpm_penalty: f64,
        base: f64,
        noise: f64,
    },
    /// Previous efficiency nudged by up to `step` in either direction.
    Perturb { step: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryProfile {
    pub category: MachineCategory,
    pub temperature: Range,
    pub rpm: Range,
    pub efficiency: Range,
    /// Multiplier applied to the shared temperature delta.
    pub temperature_scale: f64,
    /// Multiplier applied to the shared rpm delta.
    pub rpm_scale: f64,
    /// Nameplate speed used by the performance factor of OEE.
    pub rated_rpm: f64,
    pub efficiency_model: EfficiencyModel,
}

const FURNACE: CategoryProfile = CategoryProfile {
    category: MachineCategory::Furnace,
    temperature: Range::new(1800.0, 2000.0),
    rpm: Range::new(10.0, 20.0),
    efficiency: Range::new(85.0, 98.0),
    temperature_scale: 1.0,
    rpm_scale: 0.05,
    rated_rpm: 15.0,
    efficiency_model: EfficiencyModel::Perturb { step: 1.0 },
};

const COOLING: CategoryProfile = CategoryProfile {
    category: MachineCategory::Cooling,
    temperature: Range::new(15.0, 30.0),
    rpm: Range::new(800.0, 900.0),
    efficiency: Range::new(88.0, 99.0),
    temperature_scale: 0.3,
    rpm_scale: 0.5,
    rated_rpm: 850.0,
    efficiency_model: EfficiencyModel::Perturb { step: 1.0 },
};

const COMPRESSOR: CategoryProfile = CategoryProfile {
    category: MachineCategory::Compressor,
    temperature: Range::new(70.0, 90.0),
    rpm: Range::new(1600.0, 1800.0),
    efficiency: Range::new(80.0, 95.0),
    temperature_scale: 1.0,
    rpm_scale: 1.0,
    rated_rpm: 1700.0,
    efficiency_model: EfficiencyModel::Perturb { step: 1.5 },
};

const PRESS: CategoryProfile = CategoryProfile {
    category: MachineCategory::Press,
    temperature: Range::new(55.0, 80.0),
    rpm: Range::new(0.0, 0.0),
    efficiency: Range::new(80.0, 95.0),
    temperature_scale: 0.5,
    rpm_scale: 0.0,
    rated_rpm: 0.0,
    efficiency_model: EfficiencyModel::Perturb { step: 1.5 },
};

const PUMP: CategoryProfile = CategoryProfile {
    category: MachineCategory::Pump,
    temperature: Range::new(45.0, 70.0),
    rpm: Range::new(3300.0, 3700.0),
    efficiency: Range::new(82.0, 96.0),
    temperature_scale: 0.5,
    rpm_scale: 2.0,
    rated_rpm: 3500.0,
    efficiency_model: EfficiencyModel::Perturb { step: 1.0 },
};

const CONVEYOR: CategoryProfile = CategoryProfile {
    category: MachineCategory::Conveyor,
    temperature: Range::new(25.0, 45.0),
    rpm: Range::new(160.0, 200.0),
    efficiency: Range::new(88.0, 99.0),
    temperature_scale: 0.3,
    rpm_scale: 0.2,
    rated_rpm: 180.0,
    efficiency_model: EfficiencyModel::Perturb { step: 0.5 },
};

const DEFAULT: CategoryProfile = CategoryProfile {
    category: MachineCategory::Default,
    temperature: Range::new(60.0, 90.0),
    rpm: Range::new(800.0, 1500.0),
    efficiency: Range::new(70.0, 100.0),
    temperature_scale: 1.0,
    rpm_scale: 1.0,
    rated_rpm: 1400.0,
    efficiency_model: EfficiencyModel::Derived {
        temperature_threshold: 85.0,
        optimal_rpm: Range::new(1100.0, 1400.0),
        temperature_penalty: 0.9,
        rpm_penalty: 0.85,
        base: 95.0,
        noise: 5.0,
    },
};

impl CategoryProfile {
    pub fn for_category(category: MachineCategory) -> &'static CategoryProfile {
        match category {
            MachineCategory::Furnace => &FURNACE,
            MachineCategory::Cooling => &COOLING,
            MachineCategory::Compressor => &COMPRESSOR,
            MachineCategory::Press => &PRESS,
            MachineCategory::Pump => &PUMP,
            MachineCategory::Conveyor => &CONVEYOR,
            MachineCategory::Default => &DEFAULT,
        }
    }
}
