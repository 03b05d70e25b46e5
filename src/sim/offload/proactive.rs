//! Proactive strategy: pre-emptive uploads on predicted shortage, paired
//! with a server-side download pass and multi-tick transfer progression.

use crate::energy::Harvester;
use crate::fleet::{DeviceState, Fleet};

use super::{OffloadPolicy, OffloadingUnit};

pub struct ProactivePolicy {
    min_power_threshold_w: f32,
    offloading: OffloadingUnit,
    loadbalancing: bool,
    transfer_target_duration: u32,
}

impl ProactivePolicy {
    pub fn new(min_power_threshold_w: f32, offloading: OffloadingUnit, loadbalancing: bool, transfer_target_duration: u32) -> Self {
        Self {
            min_power_threshold_w,
            offloading,
            loadbalancing,
            transfer_target_duration,
        }
    }

    fn low_power(&self, fleet: &Fleet, harvester: &Harvester, device_id: u32) -> bool {
        let Some(d) = fleet.device(device_id) else { return false };
        match harvester {
            Harvester::Trace(_) => d.actual_power < self.min_power_threshold_w,
            Harvester::Battery { .. } => {
                let soc = harvester.soc(device_id).unwrap_or(0.0);
                let max_capacity = harvester.max_capacity().unwrap_or(0.0);
                soc < self.min_power_threshold_w || soc <= 0.4 * max_capacity
            }
        }
    }

    fn high_power(&self, fleet: &Fleet, harvester: &Harvester, device_id: u32) -> bool {
        let Some(d) = fleet.device(device_id) else { return false };
        match harvester {
            Harvester::Trace(_) => d.actual_power >= self.min_power_threshold_w,
            Harvester::Battery { .. } => {
                let soc = harvester.soc(device_id).unwrap_or(0.0);
                let max_capacity = harvester.max_capacity().unwrap_or(0.0);
                soc >= self.min_power_threshold_w && soc > 0.4 * max_capacity
            }
        }
    }
}

impl OffloadPolicy for ProactivePolicy {
    /// Upload trigger only: the download side is a server-wide pass, run
    /// once per tick in `post_pass`, not per device here.
    fn decide(&mut self, fleet: &mut Fleet, harvester: &Harvester, _tick: usize) {
        let server_id = fleet.server_id();
        for device_id in fleet.edge_device_ids() {
            if fleet.device(device_id).map(|d| d.transfer.in_flight()).unwrap_or(true) {
                continue;
            }
            if !self.low_power(fleet, harvester, device_id) {
                continue;
            }
            let pending: Vec<u32> = match self.offloading {
                OffloadingUnit::Model => fleet.device(device_id).map(|d| d.services.iter().map(|s| s.id).collect()).unwrap_or_default(),
                OffloadingUnit::Data => Vec::new(),
            };
            if let Some(d) = fleet.device_mut(device_id) {
                tracing::info!(target: "offloading", device_id, "low power, uploading to server");
                d.transfer.start_upload(server_id, self.transfer_target_duration, pending);
            }
        }
    }

    fn post_pass(&mut self, fleet: &mut Fleet, harvester: &Harvester, _tick: usize) {
        self.download_pass(fleet, harvester);
        self.advance_transfers(fleet);
    }

    fn multi_tick_transfers(&self) -> bool {
        true
    }
}

impl ProactivePolicy {
    fn download_pass(&mut self, fleet: &mut Fleet, harvester: &Harvester) {
        let server_id = fleet.server_id();

        // Services currently on the server, not already pinned as pending on
        // some other device's transfer (prevents double-assignment).
        let already_pending: Vec<u32> = fleet
            .devices()
            .iter()
            .flat_map(|d| d.transfer.pending_service_ids.iter().copied())
            .collect();

        let mut available: Vec<u32> = match self.offloading {
            OffloadingUnit::Model => fleet
                .server()
                .services
                .iter()
                .map(|s| s.id)
                .filter(|id| !already_pending.contains(id))
                .collect(),
            OffloadingUnit::Data => Vec::new(),
        };

        for device_id in fleet.edge_device_ids() {
            if fleet.device(device_id).map(|d| d.transfer.in_flight()).unwrap_or(true) {
                continue;
            }
            if !self.high_power(fleet, harvester, device_id) {
                continue;
            }

            match self.offloading {
                OffloadingUnit::Model => {
                    let free_slots = fleet.device(device_id).map(|d| {
                        if self.loadbalancing {
                            d.free_slots().max(0) as usize
                        } else if d.services.is_empty() {
                            usize::MAX
                        } else {
                            0
                        }
                    }).unwrap_or(0);
                    if free_slots == 0 || available.is_empty() {
                        continue;
                    }
                    let take = free_slots.min(available.len());
                    let pending: Vec<u32> = available.drain(0..take).collect();
                    if let Some(d) = fleet.device_mut(device_id) {
                        d.transfer.start_download(server_id, self.transfer_target_duration, pending);
                    }
                }
                OffloadingUnit::Data => {
                    let server_has_buffer = !fleet.server().temperature_measurements.is_empty();
                    let dest_empty = fleet.device(device_id).map(|d| d.temperature_measurements.is_empty()).unwrap_or(false);
                    if server_has_buffer && dest_empty {
                        if let Some(d) = fleet.device_mut(device_id) {
                            d.transfer.start_download(server_id, self.transfer_target_duration, Vec::new());
                        }
                    }
                }
            }
        }
    }

    /// Failure check before progress check, per device, for every in-flight
    /// transfer in the fleet (the server itself is never in-flight).
    fn advance_transfers(&mut self, fleet: &mut Fleet) {
        for device_id in fleet.edge_device_ids() {
            let Some(device) = fleet.device(device_id) else { continue };
            if !device.transfer.in_flight() {
                continue;
            }

            if device.actual_power == 0.0 && device.transfer.duration < device.transfer.target_duration {
                tracing::warn!(target: "transfer", device_id, "transfer failed: device lost power mid-transfer");
                fleet.device_mut(device_id).unwrap().transfer.fail();
                continue;
            }

            let (direction, other_id, target_duration, pending, new_duration) = {
                let device = fleet.device(device_id).unwrap();
                let new_duration = device.transfer.duration + 1;
                (
                    device.transfer.direction(),
                    match device.transfer.direction() {
                        crate::fleet::Direction::ToServer => device.transfer.to_device_id,
                        crate::fleet::Direction::FromServer => device.transfer.from_device_id,
                        crate::fleet::Direction::None => 0,
                    },
                    device.transfer.target_duration,
                    device.transfer.pending_service_ids.clone(),
                    new_duration,
                )
            };

            if new_duration < target_duration {
                fleet.device_mut(device_id).unwrap().transfer.duration = new_duration;
                continue;
            }

            match (direction, self.offloading) {
                (crate::fleet::Direction::ToServer, OffloadingUnit::Model) => {
                    for sid in pending {
                        fleet.move_service(sid, device_id, other_id);
                    }
                }
                (crate::fleet::Direction::FromServer, OffloadingUnit::Model) => {
                    for sid in pending {
                        fleet.move_service(sid, other_id, device_id);
                    }
                }
                (crate::fleet::Direction::ToServer, OffloadingUnit::Data) => {
                    fleet.move_measurements(device_id, other_id);
                }
                (crate::fleet::Direction::FromServer, OffloadingUnit::Data) => {
                    fleet.move_measurements(other_id, device_id);
                }
                (crate::fleet::Direction::None, _) => {}
            }
            tracing::info!(target: "transfer", device_id, "transfer complete");
            fleet.device_mut(device_id).unwrap().transfer.complete();
        }
    }
}
