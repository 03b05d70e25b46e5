//! Energy harvesting: the trace input, the optional battery layer, and the
//! `Harvester` that drives per-device power updates.

pub mod battery;
pub mod trace;

pub use battery::Battery;
pub use trace::EnergyTrace;

use crate::fleet::{Device, PowerSource};

/// The core treats a trace-only harvester and a battery-backed one through
/// the same capability set; modeled here as a tagged enum so strategies can
/// branch on the presence of the battery capability rather than on a
/// concrete type.
pub enum Harvester {
    Trace(EnergyTrace),
    Battery { trace: EnergyTrace, battery: Battery, power_required_w: f32 },
}

impl Harvester {
    pub fn has_battery(&self) -> bool {
        matches!(self, Harvester::Battery { .. })
    }

    pub fn soc(&self, id: u32) -> Option<f32> {
        match self {
            Harvester::Battery { battery, .. } => Some(battery.soc(id)),
            Harvester::Trace(_) => None,
        }
    }

    pub fn min_soc(&self) -> Option<f32> {
        match self {
            Harvester::Battery { battery, .. } => Some(battery.min_soc()),
            Harvester::Trace(_) => None,
        }
    }

    pub fn max_capacity(&self) -> Option<f32> {
        match self {
            Harvester::Battery { battery, .. } => Some(battery.max_capacity()),
            Harvester::Trace(_) => None,
        }
    }

    pub fn power_required(&self) -> Option<f32> {
        match self {
            Harvester::Battery { power_required_w, .. } => Some(*power_required_w),
            Harvester::Trace(_) => None,
        }
    }

    /// §4.4 power update: without a battery, picks the larger of
    /// {solar, wind} as the device's actual power; with one, charges then
    /// attempts to draw `power_required_w`.
    pub fn update_device_power(&mut self, device: &mut Device, tick: usize) {
        match self {
            Harvester::Trace(trace) => {
                let solar = trace.solar(device.id, tick);
                let wind = trace.wind(device.id, tick);
                device.actual_power = solar.max(wind);
                device.power_source = if device.actual_power <= 0.0 {
                    PowerSource::None
                } else if solar >= wind {
                    PowerSource::Solar
                } else {
                    PowerSource::Wind
                };
            }
            Harvester::Battery { trace, battery, power_required_w } => {
                let solar = trace.solar(device.id, tick);
                let wind = trace.wind(device.id, tick);
                let harvested = solar.max(wind);
                battery.charge(device.id, harvested);
                let ok = battery.consume(device.id, *power_required_w);
                device.actual_power = if ok { *power_required_w } else { 0.0 };
                device.power_source = PowerSource::Battery;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::{Device, ModelType};

    #[test]
    fn trace_only_picks_winning_source() {
        let trace = EnergyTrace::from_watts(&[1], &[10.0], &[3.0]);
        let mut h = Harvester::Trace(trace);
        let mut d = Device::new(1, ModelType::EdgeDevice, 1, 0, vec![]);
        h.update_device_power(&mut d, 0);
        assert_eq!(d.actual_power, 10.0);
        assert_eq!(d.power_source, PowerSource::Solar);
    }

    #[test]
    fn battery_backed_power_is_all_or_nothing() {
        let trace = EnergyTrace::from_watts(&[1], &[1_000_000.0], &[0.0]);
        let battery = Battery::new(&[1], 10.0, 12.0, 1.0, 0.0, 1.0);
        let mut h = Harvester::Battery { trace, battery, power_required_w: 5.0 };
        let mut d = Device::new(1, ModelType::EdgeDevice, 1, 0, vec![]);
        h.update_device_power(&mut d, 0);
        assert_eq!(d.actual_power, 5.0);
        assert_eq!(d.power_source, PowerSource::Battery);
    }
}
