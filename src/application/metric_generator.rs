// Metric generator - Synthesizes the next sample of a machine's metrics
use crate::domain::machine::{MachineMetrics, MachineState};
use crate::domain::profile::{CategoryProfile, EfficiencyModel};
use rand::Rng;

const TEMPERATURE_NOISE: f64 = 1.0;
const RPM_NOISE: f64 = 10.0;
const STABILITY_WINDOW: u32 = 5;
const STABILITY_DAMPING: f64 = 0.3;
const TREND_WEIGHT: f64 = 0.1;
const TREND_REDRAW_PROBABILITY: f64 = 0.1;
const TEMPERATURE_TREND_SPAN: f64 = 2.0;
const RPM_TREND_SPAN: f64 = 20.0;

/// Hidden per-machine bias that turns noise into multi-tick drift.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationTrendState {
    pub temperature_trend: f64,
    pub rpm_trend: f64,
    pub stability_counter: u32,
}

/// Computes the next metrics for a machine and updates `trend` in place.
///
/// Idle machines (stopped or under maintenance) are returned untouched and
/// the trend state is left as is. Every bounded field of the result lies
/// within `profile`'s ranges.
pub fn next_metrics<R: Rng + ?Sized>(
    rng: &mut R,
    current: &MachineMetrics,
    state: MachineState,
    profile: &CategoryProfile,
    elapsed_seconds: f64,
    trend: &mut SimulationTrendState,
) -> MachineMetrics {
    if state.is_idle() {
        return current.clone();
    }

    let mut temp_delta = rng.gen_range(-TEMPERATURE_NOISE..=TEMPERATURE_NOISE);
    let mut rpm_delta = rng.gen_range(-RPM_NOISE..=RPM_NOISE);

    if trend.stability_counter > STABILITY_WINDOW {
        temp_delta *= STABILITY_DAMPING;
        rpm_delta *= STABILITY_DAMPING;
        trend.stability_counter = 0;
    } else {
        trend.stability_counter += 1;
    }

    temp_delta += trend.temperature_trend * TREND_WEIGHT;
    rpm_delta += trend.rpm_trend * TREND_WEIGHT;

    if rng.gen_bool(TREND_REDRAW_PROBABILITY) {
        trend.temperature_trend = rng.gen_range(-TEMPERATURE_TREND_SPAN..=TEMPERATURE_TREND_SPAN);
        trend.rpm_trend = rng.gen_range(-RPM_TREND_SPAN..=RPM_TREND_SPAN);
    }

    let temperature = profile
        .temperature
        .clamp(current.temperature + temp_delta * profile.temperature_scale);
    let rpm = profile.rpm.clamp(current.rpm + rpm_delta * profile.rpm_scale);
    let efficiency = next_efficiency(rng, profile, current.efficiency, temperature, rpm);

    MachineMetrics {
        temperature,
        rpm,
        efficiency,
        uptime_hours: current.uptime_hours + elapsed_seconds.max(0.0) / 3600.0,
        ..current.clone()
    }
}

fn next_efficiency<R: Rng + ?Sized>(
    rng: &mut R,
    profile: &CategoryProfile,
    previous: f64,
    temperature: f64,
    rpm: f64,
) -> f64 {
    match profile.efficiency_model {
        EfficiencyModel::Derived {
            temperature_threshold,
            optimal_rpm,
            temperature_penalty,
            rpm_penalty,
            base,
            noise,
        } => {
            let temp_factor = if temperature < temperature_threshold {
                1.0
            } else {
                temperature_penalty
            };
            let rpm_factor = if optimal_rpm.contains(rpm) { 1.0 } else { rpm_penalty };
            let jitter = rng.gen_range(-noise..=noise);
            profile.efficiency.clamp(temp_factor * rpm_factor * base + jitter)
        }
        EfficiencyModel::Perturb { step } => {
            let jitter = rng.gen_range(-step..=step);
            profile.efficiency.clamp(previous + jitter)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::machine::MachineCategory;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const CATEGORIES: [MachineCategory; 7] = [
        MachineCategory::Furnace,
        MachineCategory::Cooling,
        MachineCategory::Compressor,
        MachineCategory::Press,
        MachineCategory::Pump,
        MachineCategory::Conveyor,
        MachineCategory::Default,
    ];

    fn midpoint_metrics(profile: &CategoryProfile) -> MachineMetrics {
        MachineMetrics::new(
            (profile.temperature.min + profile.temperature.max) / 2.0,
            (profile.rpm.min + profile.rpm.max) / 2.0,
            1.0,
            (profile.efficiency.min + profile.efficiency.max) / 2.0,
        )
    }

    #[test]
    fn test_every_category_stays_in_range() {
        for (seed, category) in CATEGORIES.iter().enumerate() {
            let profile = category.profile();
            let mut rng = StdRng::seed_from_u64(seed as u64);
            let mut trend = SimulationTrendState::default();
            let mut metrics = midpoint_metrics(profile);

            for _ in 0..10_000 {
                let next = next_metrics(
                    &mut rng,
                    &metrics,
                    MachineState::Running,
                    profile,
                    3.0,
                    &mut trend,
                );
                assert!(
                    profile.temperature.contains(next.temperature),
                    "{:?} temp {}",
                    category,
                    next.temperature
                );
                assert!(profile.rpm.contains(next.rpm), "{:?} rpm {}", category, next.rpm);
                assert!(
                    profile.efficiency.contains(next.efficiency),
                    "{:?} eff {}",
                    category,
                    next.efficiency
                );
                assert!(next.uptime_hours >= metrics.uptime_hours);
                metrics = next;
            }
        }
    }

    #[test]
    fn test_out_of_range_input_is_pulled_back() {
        let profile = MachineCategory::Default.profile();
        let mut rng = StdRng::seed_from_u64(11);
        let mut trend = SimulationTrendState::default();
        let current = MachineMetrics::new(250.0, 3500.0, 0.0, 10.0);

        let next =
            next_metrics(&mut rng, &current, MachineState::Running, profile, 3.0, &mut trend);
        assert_eq!(next.temperature, 90.0);
        assert_eq!(next.rpm, 1500.0);
        assert!(profile.efficiency.contains(next.efficiency));
    }

    #[test]
    fn test_furnace_holds_its_band() {
        let profile = MachineCategory::Furnace.profile();
        let mut rng = StdRng::seed_from_u64(2000);
        let mut trend = SimulationTrendState::default();
        let mut metrics = MachineMetrics::new(1850.0, 15.0, 18.7, 91.0);

        for _ in 0..100 {
            metrics =
                next_metrics(&mut rng, &metrics, MachineState::Running, profile, 3.0, &mut trend);
        }

        assert!((1800.0..=2000.0).contains(&metrics.temperature));
        assert!((10.0..=20.0).contains(&metrics.rpm));
    }

    #[test]
    fn test_idle_machines_do_not_change() {
        let profile = MachineCategory::Default.profile();
        let mut rng = StdRng::seed_from_u64(4);
        let mut trend = SimulationTrendState {
            temperature_trend: 1.5,
            rpm_trend: -12.0,
            stability_counter: 3,
        };
        let original_trend = trend.clone();
        let mut current = MachineMetrics::new(0.0, 0.0, 0.0, 0.0);
        current.throughput = Some(0.0);

        for state in [MachineState::Maintenance, MachineState::Stopped] {
            let mut metrics = current.clone();
            for _ in 0..500 {
                metrics = next_metrics(&mut rng, &metrics, state, profile, 3.0, &mut trend);
            }
            assert_eq!(metrics.temperature.to_bits(), current.temperature.to_bits());
            assert_eq!(metrics.rpm.to_bits(), current.rpm.to_bits());
            assert_eq!(metrics.uptime_hours.to_bits(), current.uptime_hours.to_bits());
            assert_eq!(metrics.efficiency.to_bits(), current.efficiency.to_bits());
            assert_eq!(metrics, current);
        }
        assert_eq!(trend, original_trend);
    }

    #[test]
    fn test_uptime_accrues_elapsed_hours() {
        let profile = MachineCategory::Compressor.profile();
        let mut rng = StdRng::seed_from_u64(5);
        let mut trend = SimulationTrendState::default();
        let current = MachineMetrics::new(82.0, 1750.0, 15.2, 87.0);

        let next =
            next_metrics(&mut rng, &current, MachineState::Running, profile, 1800.0, &mut trend);
        assert!((next.uptime_hours - 15.7).abs() < 1e-9);

        let backwards =
            next_metrics(&mut rng, &next, MachineState::Error, profile, -60.0, &mut trend);
        assert_eq!(backwards.uptime_hours, next.uptime_hours);
    }

    #[test]
    fn test_optional_fields_carry_through() {
        let profile = MachineCategory::Cooling.profile();
        let mut rng = StdRng::seed_from_u64(6);
        let mut trend = SimulationTrendState::default();
        let mut current = MachineMetrics::new(22.0, 850.0, 12.5, 95.0);
        current.pressure = Some(12.8);
        current.flow_rate = Some(450.0);

        let next =
            next_metrics(&mut rng, &current, MachineState::Running, profile, 3.0, &mut trend);
        assert_eq!(next.pressure, Some(12.8));
        assert_eq!(next.flow_rate, Some(450.0));
        assert_eq!(next.power, None);
    }

    #[test]
    fn test_stability_counter_cycles() {
        let profile = MachineCategory::Default.profile();
        let mut rng = StdRng::seed_from_u64(8);
        let mut trend = SimulationTrendState::default();
        let metrics = MachineMetrics::new(75.0, 1200.0, 1.0, 90.0);

        let mut counters = Vec::new();
        for _ in 0..8 {
            next_metrics(&mut rng, &metrics, MachineState::Running, profile, 3.0, &mut trend);
            counters.push(trend.stability_counter);
        }
        assert_eq!(counters, vec![1, 2, 3, 4, 5, 6, 0, 1]);
    }

    #[test]
    fn test_trend_redraw_stays_within_spans() {
        let profile = MachineCategory::Default.profile();
        let mut rng = StdRng::seed_from_u64(9);
        let mut trend = SimulationTrendState::default();
        let metrics = MachineMetrics::new(75.0, 1200.0, 1.0, 90.0);
        let mut redrawn = false;

        for _ in 0..200 {
            next_metrics(&mut rng, &metrics, MachineState::Running, profile, 3.0, &mut trend);
            assert!(trend.temperature_trend.abs() <= 2.0);
            assert!(trend.rpm_trend.abs() <= 20.0);
            redrawn |= trend.rpm_trend != 0.0;
        }
        assert!(redrawn);
    }
}
