//! Per-device solar/wind power time series, partitioned from a global
//! weather trace.

use std::collections::HashMap;

/// 1 Langley = 11.622 Wh/m^2 over a unit area.
const WH_PER_LANGLEY: f32 = 11.622;

const AIR_DENSITY_KG_M3: f32 = 1.225;
const SWEPT_AREA_M2: f32 = 0.5;
const POWER_COEFFICIENT: f32 = 0.35;
const TURBINE_EFFICIENCY: f32 = 0.90;

fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}

fn coerce(v: f32) -> f32 {
    if v.is_finite() && v >= 0.0 {
        v
    } else {
        0.0
    }
}

/// Converts an insolation reading (Langleys) into solar power (watts), per
/// the unit-area fallback formula.
pub fn insolation_to_watts(langleys: f32) -> f32 {
    round2(coerce(langleys) * WH_PER_LANGLEY)
}

/// Converts a wind speed reading (m/s) into wind power (watts) via
/// `P = 1/2 * rho * A * v^3 * Cp * eta`.
pub fn wind_speed_to_watts(speed_m_s: f32) -> f32 {
    let v = coerce(speed_m_s);
    let p = 0.5 * AIR_DENSITY_KG_M3 * SWEPT_AREA_M2 * v.powi(3) * POWER_COEFFICIENT * TURBINE_EFFICIENCY;
    round2(p)
}

/// Splits a sequence of length `total` into `n` contiguous chunks of length
/// `total / n`, with the last chunk absorbing the remainder. Returns
/// `(start, end)` ranges, one per chunk.
pub fn partition_chunks(n: usize, total: usize) -> Vec<(usize, usize)> {
    if n == 0 {
        return Vec::new();
    }
    let chunk = total / n;
    let mut ranges = Vec::with_capacity(n);
    let mut start = 0;
    for i in 0..n {
        let end = if i + 1 == n { total } else { start + chunk };
        ranges.push((start, end));
        start = end;
    }
    ranges
}

/// Per-device solar and wind power series, indexed by tick.
#[derive(Debug, Clone, Default)]
pub struct EnergyTrace {
    solar_w: HashMap<u32, Vec<f32>>,
    wind_w: HashMap<u32, Vec<f32>>,
}

impl EnergyTrace {
    /// Builds a trace already expressed in watts, partitioning the two
    /// global series across `device_ids` per [`partition_chunks`].
    pub fn from_watts(device_ids: &[u32], solar_global: &[f32], wind_global: &[f32]) -> Self {
        Self::partitioned(device_ids, solar_global, wind_global, |v| coerce(v))
    }

    /// Builds a trace from raw insolation (Langleys) and wind speed (m/s)
    /// series, applying the §4.1 fallback formulas before partitioning.
    pub fn from_raw(device_ids: &[u32], insolation: &[f32], wind_speed: &[f32]) -> Self {
        let solar: Vec<f32> = insolation.iter().map(|&v| insolation_to_watts(v)).collect();
        let wind: Vec<f32> = wind_speed.iter().map(|&v| wind_speed_to_watts(v)).collect();
        Self::partitioned(device_ids, &solar, &wind, |v| v)
    }

    fn partitioned(device_ids: &[u32], solar_global: &[f32], wind_global: &[f32], xform: impl Fn(f32) -> f32) -> Self {
        let solar_ranges = partition_chunks(device_ids.len(), solar_global.len());
        let wind_ranges = partition_chunks(device_ids.len(), wind_global.len());
        let mut solar_w = HashMap::new();
        let mut wind_w = HashMap::new();
        for (i, &id) in device_ids.iter().enumerate() {
            let (ss, se) = solar_ranges.get(i).copied().unwrap_or((0, 0));
            let (ws, we) = wind_ranges.get(i).copied().unwrap_or((0, 0));
            solar_w.insert(id, solar_global[ss..se].iter().map(|&v| round2(xform(v))).collect());
            wind_w.insert(id, wind_global[ws..we].iter().map(|&v| round2(xform(v))).collect());
        }
        Self { solar_w, wind_w }
    }

    pub fn solar(&self, id: u32, t: usize) -> f32 {
        self.solar_w.get(&id).and_then(|s| s.get(t)).copied().unwrap_or(0.0)
    }

    pub fn wind(&self, id: u32, t: usize) -> f32 {
        self.wind_w.get(&id).and_then(|s| s.get(t)).copied().unwrap_or(0.0)
    }
}
