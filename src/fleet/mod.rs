//! The fleet: an ordered device set plus the operations (service/buffer
//! migration, partner lookup) that act across device boundaries.

pub mod device;
pub mod lifecycle;
pub mod service;
pub mod transfer;

pub use device::{Device, DeviceState, DeviceStatus, ModelType, PowerSource, TemperatureSample};
pub use service::{Service, ServiceState};
pub use transfer::{Direction, TransferModel};

/// Devices in ascending id order, the central server among them.
#[derive(Debug, Clone)]
pub struct Fleet {
    devices: Vec<Device>,
    server_id: u32,
}

impl Fleet {
    /// `devices` must already be sorted by ascending id; `server_id` must
    /// name a device present in the list. Both are guaranteed by
    /// [`crate::topology::Topology::into_fleet`].
    pub fn new(devices: Vec<Device>, server_id: u32) -> Self {
        debug_assert!(devices.is_sorted_by_key(|d| d.id));
        debug_assert!(devices.iter().any(|d| d.id == server_id));
        Self { devices, server_id }
    }

    pub fn server_id(&self) -> u32 {
        self.server_id
    }

    pub fn server(&self) -> &Device {
        self.device(self.server_id).expect("server device missing from fleet")
    }

    pub fn server_mut(&mut self) -> &mut Device {
        self.device_mut(self.server_id).expect("server device missing from fleet")
    }

    pub fn device(&self, id: u32) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn device_mut(&mut self, id: u32) -> Option<&mut Device> {
        self.devices.iter_mut().find(|d| d.id == id)
    }

    fn index_of(&self, id: u32) -> Option<usize> {
        self.devices.iter().position(|d| d.id == id)
    }

    /// All devices in fleet order (ascending id), including the server.
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Edge devices only, in fleet order.
    pub fn edge_device_ids(&self) -> Vec<u32> {
        self.devices.iter().filter(|d| d.is_edge_device()).map(|d| d.id).collect()
    }

    /// Moves the service identified by `service_id` from `from_id` to
    /// `to_id`, updating the service's back-reference atomically. No-op if
    /// the service is not currently hosted by `from_id`.
    pub fn move_service(&mut self, service_id: u32, from_id: u32, to_id: u32) {
        let from_idx = match self.index_of(from_id) {
            Some(i) => i,
            None => return,
        };
        let pos = match self.devices[from_idx].services.iter().position(|s| s.id == service_id) {
            Some(p) => p,
            None => return,
        };
        let mut svc = self.devices[from_idx].services.remove(pos);
        svc.device_id = to_id;
        if let Some(to) = self.device_mut(to_id) {
            to.services.push(svc);
        }
    }

    /// Splices the entire temperature-measurement buffer from `from_id` to
    /// `to_id`, leaving the source buffer empty.
    pub fn move_measurements(&mut self, from_id: u32, to_id: u32) {
        let taken = match self.device_mut(from_id) {
            Some(d) => std::mem::take(&mut d.temperature_measurements),
            None => return,
        };
        if let Some(to) = self.device_mut(to_id) {
            to.temperature_measurements = taken;
        }
    }

    /// `heartbeat(d) = (d.status.state != off)`.
    pub fn heartbeat(&self, id: u32) -> bool {
        self.device(id).map(|d| d.status.state != DeviceState::Off).unwrap_or(false)
    }
}
