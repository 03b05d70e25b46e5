//! Liveness probe and partner-device selection.

use crate::fleet::{DeviceState, Fleet};

/// `heartbeat(d) = (d.status.state != off)`.
pub fn heartbeat(fleet: &Fleet, id: u32) -> bool {
    fleet.heartbeat(id)
}

/// Subset of `d.partner_devices` that are alive, active, and under the
/// service-count cap, scanned in fleet order (not `partner_devices` order).
pub fn partners(fleet: &Fleet, device_id: u32, max_services: u32) -> Vec<u32> {
    let Some(device) = fleet.device(device_id) else {
        return Vec::new();
    };
    fleet
        .devices()
        .iter()
        .filter(|d| device.partner_devices.contains(&d.id))
        .filter(|d| d.status.state != DeviceState::Off && d.status.active)
        .filter(|d| (d.services.len() as u32) < max_services)
        .map(|d| d.id)
        .collect()
}

/// As [`partners`], but additionally requires `state = on` — used by the
/// load balancer.
pub fn online_partners(fleet: &Fleet, device_id: u32, max_services: u32) -> Vec<u32> {
    let Some(device) = fleet.device(device_id) else {
        return Vec::new();
    };
    fleet
        .devices()
        .iter()
        .filter(|d| device.partner_devices.contains(&d.id))
        .filter(|d| d.status.state == DeviceState::On)
        .filter(|d| (d.services.len() as u32) < max_services)
        .map(|d| d.id)
        .collect()
}
