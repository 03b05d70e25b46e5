//! Shared simulation-clock helper.

/// Tick count and nominal tick duration, carried by the scheduler for
/// reporting; the simulation loop itself only ever advances by whole ticks.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of ticks to run.
    pub steps: usize,
    /// Nominal duration of one tick, in `tick_unit`s.
    pub tick_duration: f32,
    /// Unit name for `tick_duration` (e.g. `"seconds"`).
    pub tick_unit: String,
}

impl SimConfig {
    pub fn new(steps: usize, tick_duration: f32, tick_unit: impl Into<String>) -> Self {
        Self {
            steps,
            tick_duration,
            tick_unit: tick_unit.into(),
        }
    }
}

impl From<&crate::config::SimulationConfig> for SimConfig {
    fn from(cfg: &crate::config::SimulationConfig) -> Self {
        Self::new(cfg.steps, cfg.tick_duration, cfg.tick_unit.clone())
    }
}
