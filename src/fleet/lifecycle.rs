//! Maps harvested power (and, when present, battery state of charge) onto a
//! device's `{on, critical, off}` status.

use super::device::{DeviceState, DeviceStatus};

/// Threshold used by the battery-less lifecycle function, watts.
pub const DEFAULT_P_MIN: f32 = 5.00;

/// `0.4·max_capacity` is the hysteresis band above which a battery-backed
/// device is considered healthy rather than merely alive.
const HEALTHY_SOC_FRACTION: f32 = 0.4;

/// Without a battery: power alone decides the state.
pub fn without_battery(actual_power: f32, p_min: f32) -> DeviceStatus {
    if actual_power > p_min {
        DeviceStatus::new(DeviceState::On, true)
    } else if actual_power > 0.0 {
        DeviceStatus::new(DeviceState::Critical, true)
    } else {
        DeviceStatus::off()
    }
}

/// With a battery: power gates liveness, state of charge gates the healthy
/// band.
pub fn with_battery(actual_power: f32, soc: f32, min_soc: f32, max_capacity: f32) -> DeviceStatus {
    if actual_power <= 0.0 {
        return DeviceStatus::off();
    }
    let healthy_floor = HEALTHY_SOC_FRACTION * max_capacity;
    if soc >= healthy_floor {
        DeviceStatus::new(DeviceState::On, true)
    } else if soc >= min_soc {
        DeviceStatus::new(DeviceState::Critical, true)
    } else {
        DeviceStatus::off()
    }
}
