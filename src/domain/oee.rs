// OEE (Overall Equipment Effectiveness) derivation
use super::machine::MachineMetrics;
use super::profile::Range;
use serde::{Deserialize, Serialize};

const AVAILABILITY: Range = Range::new(85.0, 100.0);
const PERFORMANCE: Range = Range::new(75.0, 100.0);
const QUALITY: Range = Range::new(80.0, 100.0);

/// Hours added to uptime in the availability curve's denominator.
const AVAILABILITY_KNEE_HOURS: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OeeScore {
    pub availability: f64,
    pub performance: f64,
    pub quality: f64,
    pub overall: f64,
}

impl OeeScore {
    /// Combines three 0-100 factors and keeps `overall` consistent with them.
    pub fn from_factors(availability: f64, performance: f64, quality: f64) -> Self {
        Self {
            availability,
            performance,
            quality,
            overall: availability * performance * quality / 10_000.0,
        }
    }

    /// Derives the score from raw metrics. `rated_rpm` is the category's
    /// nameplate speed; idle spindles (rpm <= 0) are not penalized.
    pub fn compute(metrics: &MachineMetrics, rated_rpm: f64) -> Self {
        let uptime = metrics.uptime_hours.max(0.0);
        let availability = AVAILABILITY.clamp(uptime / (uptime + AVAILABILITY_KNEE_HOURS) * 100.0);

        let performance = if metrics.rpm <= 0.0 || rated_rpm <= 0.0 {
            100.0
        } else {
            PERFORMANCE.clamp(metrics.rpm / rated_rpm * 100.0)
        };

        let quality = QUALITY.clamp(metrics.efficiency);

        Self::from_factors(availability, performance, quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(uptime: f64, rpm: f64, efficiency: f64) -> MachineMetrics {
        MachineMetrics::new(75.0, rpm, uptime, efficiency)
    }

    #[test]
    fn test_overall_is_product_of_factors() {
        for (uptime, rpm, efficiency) in [
            (0.0, 0.0, 0.0),
            (5.38, 1200.0, 92.0),
            (0.05, 900.0, 71.0),
            (120.0, 2200.0, 100.0),
            (18.7, 15.0, 91.0),
        ] {
            let score = OeeScore::compute(&metrics(uptime, rpm, efficiency), 1400.0);
            let expected = score.availability * score.performance * score.quality / 10_000.0;
            assert!((score.overall - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_availability_floor_and_saturation() {
        let fresh = OeeScore::compute(&metrics(0.0, 1200.0, 90.0), 1400.0);
        assert_eq!(fresh.availability, 85.0);

        let seasoned = OeeScore::compute(&metrics(99.9, 1200.0, 90.0), 1400.0);
        assert!((seasoned.availability - 99.9).abs() < 1e-9);
    }

    #[test]
    fn test_performance_uses_rated_rpm() {
        let default = OeeScore::compute(&metrics(10.0, 1400.0, 90.0), 1400.0);
        assert_eq!(default.performance, 100.0);

        let compressor = OeeScore::compute(&metrics(10.0, 1445.0, 90.0), 1700.0);
        assert!((compressor.performance - 85.0).abs() < 1e-9);

        let slow = OeeScore::compute(&metrics(10.0, 100.0, 90.0), 1400.0);
        assert_eq!(slow.performance, 75.0);
    }

    #[test]
    fn test_idle_spindle_is_not_penalized() {
        let press = OeeScore::compute(&metrics(7.25, 0.0, 88.0), 0.0);
        assert_eq!(press.performance, 100.0);

        let stalled = OeeScore::compute(&metrics(7.25, 0.0, 88.0), 1400.0);
        assert_eq!(stalled.performance, 100.0);
    }

    #[test]
    fn test_quality_is_clamped_efficiency() {
        assert_eq!(OeeScore::compute(&metrics(1.0, 1200.0, 50.0), 1400.0).quality, 80.0);
        assert_eq!(OeeScore::compute(&metrics(1.0, 1200.0, 93.5), 1400.0).quality, 93.5);
    }
}
