//! The `Service` lifecycle: a train-then-predict micro-state-machine hosted
//! on a device.

/// Lifecycle state of a hosted service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Idle,
    Running,
    Stopped,
}

/// One AI workload hosted on a device.
///
/// `device_id` is a non-owning back-reference, kept in sync by [`crate::fleet::Fleet::move_service`]
/// whenever ownership changes; it is never consulted to decide where the
/// service physically lives (the owning device's `services` list is the
/// source of truth for that).
#[derive(Debug, Clone)]
pub struct Service {
    pub id: u32,
    pub name: String,
    pub device_id: u32,
    pub state: ServiceState,
    pub max_training_time: u32,
    pub actual_training_time: u32,
    pub trained: bool,
    pub max_prediction_time: u32,
    pub actual_prediction_time: u32,
    pub predictions_counter: u64,
    pub program_counter: u64,
}

impl Service {
    pub fn new(id: u32, name: impl Into<String>, device_id: u32, max_training_time: u32, max_prediction_time: u32) -> Self {
        Self {
            id,
            name: name.into(),
            device_id,
            state: ServiceState::Idle,
            max_training_time,
            actual_training_time: 0,
            trained: false,
            max_prediction_time,
            actual_prediction_time: 0,
            predictions_counter: 0,
            program_counter: 0,
        }
    }

    /// Runs one tick of train-then-predict, per the active-service ordering.
    pub fn tick_running(&mut self) {
        self.state = ServiceState::Running;

        if !self.trained && self.actual_training_time < self.max_training_time {
            self.actual_training_time += 1;
            if self.actual_training_time == self.max_training_time {
                self.trained = true;
                self.actual_training_time = 0;
            }
        }

        if self.trained {
            self.actual_prediction_time += 1;
            if self.actual_prediction_time >= self.max_prediction_time {
                self.predictions_counter += 1;
                self.actual_prediction_time = 0;
            }
        }

        self.program_counter += 1;
    }

    /// Parks the service without advancing any counter.
    pub fn stop(&mut self) {
        self.state = ServiceState::Stopped;
    }
}
