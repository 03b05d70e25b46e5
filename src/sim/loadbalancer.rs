//! Oracle-only post-pass: spreads overflow services onto under-loaded
//! partners.

use crate::fleet::Fleet;
use crate::sim::heartbeat::online_partners;

/// For each overloaded edge device, moves its overflow (service count minus
/// cpu-core cap) onto online partners that still have free cpu-core slots,
/// most-loaded-first is not required: devices are walked in fleet order and
/// partners are filled in the order `online_partners` returns them.
pub fn balance(fleet: &mut Fleet) {
    for device_id in fleet.edge_device_ids() {
        let mut overflow = fleet.device(device_id).map(|d| {
            let cap = d.cpu_cores as i64 - d.reserved_cpu_cores as i64;
            (d.services.len() as i64 - cap).max(0)
        }).unwrap_or(0);
        if overflow == 0 {
            continue;
        }

        // online_partners() already filters by the reactive/oracle
        // max_services_per_device cap; the load balancer instead needs the
        // cpu-core cap, so pass a cap large enough to never bind here and
        // re-check free cpu slots per partner below.
        let partners = online_partners(fleet, device_id, u32::MAX);
        for partner_id in partners {
            if overflow == 0 {
                break;
            }
            let free = fleet.device(partner_id).map(|p| p.cpu_cores as i64 - p.reserved_cpu_cores as i64 - p.services.len() as i64).unwrap_or(0);
            if free <= 0 {
                continue;
            }
            let n = free.min(overflow);
            let service_ids: Vec<u32> = fleet
                .device(device_id)
                .map(|d| d.services.iter().take(n as usize).map(|s| s.id).collect())
                .unwrap_or_default();
            for sid in service_ids {
                fleet.move_service(sid, device_id, partner_id);
            }
            overflow -= n;
        }
    }
}
