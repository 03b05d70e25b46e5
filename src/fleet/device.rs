//! The `Device` entity: identity, status, hosted services, and transfer slot.

use super::service::Service;
use super::transfer::TransferModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelType {
    EdgeDevice,
    Server,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    On,
    Critical,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerSource {
    Solar,
    Wind,
    Battery,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceStatus {
    pub state: DeviceState,
    pub active: bool,
}

impl DeviceStatus {
    pub fn off() -> Self {
        Self {
            state: DeviceState::Off,
            active: false,
        }
    }

    /// `state = off` iff `active = false`; this constructor is the only
    /// place that invariant is asserted.
    pub fn new(state: DeviceState, active: bool) -> Self {
        debug_assert_eq!(state == DeviceState::Off, !active);
        Self { state, active }
    }
}

/// One sensor reading captured while a device was on and not transferring.
#[derive(Debug, Clone, Copy)]
pub struct TemperatureSample {
    pub tick: usize,
    pub value: f32,
}

/// A node in the fleet: either an edge device or the central server.
#[derive(Debug, Clone)]
pub struct Device {
    pub id: u32,
    pub model_type: ModelType,
    pub cpu_cores: u32,
    pub reserved_cpu_cores: u32,
    pub services: Vec<Service>,
    pub status: DeviceStatus,
    pub actual_power: f32,
    pub power_source: PowerSource,
    pub temperature_measurements: Vec<TemperatureSample>,
    pub partner_devices: Vec<u32>,
    pub transfer: TransferModel,
}

impl Device {
    pub fn new(id: u32, model_type: ModelType, cpu_cores: u32, reserved_cpu_cores: u32, partner_devices: Vec<u32>) -> Self {
        Self {
            id,
            model_type,
            cpu_cores,
            reserved_cpu_cores,
            services: Vec::new(),
            status: DeviceStatus::off(),
            actual_power: 0.0,
            power_source: PowerSource::None,
            temperature_measurements: Vec::new(),
            partner_devices,
            transfer: TransferModel::default(),
        }
    }

    pub fn is_edge_device(&self) -> bool {
        self.model_type == ModelType::EdgeDevice
    }

    /// Free service slots, per the cpu-core cap used by the load balancer
    /// (distinct from `reactive`/`oracle`'s flat `max_services_per_device`).
    pub fn free_slots(&self) -> i64 {
        self.cpu_cores as i64 - self.reserved_cpu_cores as i64 - self.services.len() as i64
    }

    pub fn is_overloaded(&self) -> bool {
        self.services.len() as i64 > self.cpu_cores as i64 - self.reserved_cpu_cores as i64
    }

    pub fn check_invariants(&self) {
        debug_assert_eq!(self.status.state == DeviceState::Off, !self.status.active);
        debug_assert!(!(self.transfer.to_device_id != 0 && self.transfer.from_device_id != 0));
    }
}
