//! Reactive strategy: instantaneous failover driven by heartbeat failure.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::energy::Harvester;
use crate::fleet::Fleet;
use crate::sim::heartbeat::{heartbeat, partners};

use super::{OffloadPolicy, OffloadingUnit};

pub struct ReactivePolicy {
    max_services_per_device: u32,
    offloading: OffloadingUnit,
    rng: StdRng,
}

impl ReactivePolicy {
    pub fn new(max_services_per_device: u32, offloading: OffloadingUnit, seed: u64) -> Self {
        Self {
            max_services_per_device,
            offloading,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Shared with [`super::oracle::OraclePolicy`], which has the same
    /// decision surface.
    pub(super) fn decide_impl(&mut self, fleet: &mut Fleet, _tick: usize) {
        for device_id in fleet.edge_device_ids() {
            if heartbeat(fleet, device_id) {
                continue;
            }
            let candidates = partners(fleet, device_id, self.max_services_per_device);
            if candidates.is_empty() {
                tracing::warn!(target: "transfer", device_id, "no partners available for reactive failover");
                continue;
            }

            match self.offloading {
                OffloadingUnit::Model => {
                    let service_ids: Vec<u32> = fleet
                        .device(device_id)
                        .map(|d| d.services.iter().map(|s| s.id).collect())
                        .unwrap_or_default();
                    // Fills the current partner to `max_services_per_device`
                    // before spilling onto the next one; the pointer only
                    // ever advances, it never revisits an earlier partner.
                    let mut partner = 0usize;
                    for sid in service_ids {
                        while partner < candidates.len()
                            && fleet.device(candidates[partner]).map(|p| (p.services.len() as u32) >= self.max_services_per_device).unwrap_or(true)
                        {
                            partner += 1;
                        }
                        if partner >= candidates.len() {
                            break;
                        }
                        fleet.move_service(sid, device_id, candidates[partner]);
                    }
                }
                OffloadingUnit::Data => {
                    let idx = self.rng.random_range(0..candidates.len());
                    fleet.move_measurements(device_id, candidates[idx]);
                }
            }
        }
    }
}

impl OffloadPolicy for ReactivePolicy {
    fn decide(&mut self, fleet: &mut Fleet, _harvester: &Harvester, tick: usize) {
        self.decide_impl(fleet, tick);
    }
}
