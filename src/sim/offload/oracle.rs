//! Oracle strategy: the reactive decision surface plus an optional
//! load-balancing post-pass.

use crate::energy::Harvester;
use crate::fleet::Fleet;
use crate::sim::loadbalancer;

use super::{OffloadPolicy, OffloadingUnit, ReactivePolicy};

pub struct OraclePolicy {
    reactive: ReactivePolicy,
    offloading: OffloadingUnit,
    loadbalancing: bool,
}

impl OraclePolicy {
    pub fn new(max_services_per_device: u32, offloading: OffloadingUnit, loadbalancing: bool, seed: u64) -> Self {
        Self {
            reactive: ReactivePolicy::new(max_services_per_device, offloading, seed),
            offloading,
            loadbalancing,
        }
    }
}

impl OffloadPolicy for OraclePolicy {
    fn decide(&mut self, fleet: &mut Fleet, _harvester: &Harvester, tick: usize) {
        self.reactive.decide_impl(fleet, tick);
    }

    fn post_pass(&mut self, fleet: &mut Fleet, _harvester: &Harvester, _tick: usize) {
        if self.loadbalancing && self.offloading == OffloadingUnit::Model {
            loadbalancer::balance(fleet);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::{Device, DeviceState, DeviceStatus, ModelType, Service};

    fn online(d: &mut Device) {
        d.status = DeviceStatus::new(DeviceState::On, true);
    }

    #[test]
    fn post_pass_balances_overloaded_devices_when_enabled() {
        let harvester = crate::energy::Harvester::Trace(crate::energy::EnergyTrace::default());
        let server = Device::new(0, ModelType::Server, 0, 0, vec![]);
        let mut a = Device::new(1, ModelType::EdgeDevice, 1, 0, vec![2]);
        let mut b = Device::new(2, ModelType::EdgeDevice, 2, 0, vec![1]);
        online(&mut a);
        online(&mut b);
        a.services.push(Service::new(1, "s1", 1, 1, 1));
        a.services.push(Service::new(2, "s2", 1, 1, 1));
        let mut fleet = Fleet::new(vec![server, a, b], 0);

        let mut policy = OraclePolicy::new(4, OffloadingUnit::Model, true, 1);
        policy.post_pass(&mut fleet, &harvester, 0);

        assert_eq!(fleet.device(1).unwrap().services.len(), 1);
        assert_eq!(fleet.device(2).unwrap().services.len(), 1);
    }

    #[test]
    fn post_pass_is_noop_when_loadbalancing_disabled() {
        let harvester = crate::energy::Harvester::Trace(crate::energy::EnergyTrace::default());
        let server = Device::new(0, ModelType::Server, 0, 0, vec![]);
        let mut a = Device::new(1, ModelType::EdgeDevice, 1, 0, vec![2]);
        online(&mut a);
        a.services.push(Service::new(1, "s1", 1, 1, 1));
        a.services.push(Service::new(2, "s2", 1, 1, 1));
        let mut fleet = Fleet::new(vec![server, a], 0);

        let mut policy = OraclePolicy::new(4, OffloadingUnit::Model, false, 1);
        policy.post_pass(&mut fleet, &harvester, 0);

        assert_eq!(fleet.device(1).unwrap().services.len(), 2);
    }
}
