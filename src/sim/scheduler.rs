//! The tick-loop driver: wires the fleet, harvester and offload policy
//! together and emits telemetry once per device/service per tick.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::energy::Harvester;
use crate::fleet::{DeviceState, Fleet, TemperatureSample, lifecycle};
use crate::io::{Collector, DeviceRecord, ServiceRecord, TransferTelemetry};

use super::offload::OffloadPolicy;

/// Owns the whole simulation state and advances it tick by tick, per the
/// deterministic ordering: power update, lifecycle update, temperature
/// capture, service run/stop, the strategy's decide/post_pass hooks, then
/// the harvester clock.
pub struct Scheduler<C: Collector> {
    fleet: Fleet,
    harvester: Harvester,
    policy: Box<dyn OffloadPolicy>,
    collector: C,
    tick: usize,
    rng: StdRng,
}

impl<C: Collector> Scheduler<C> {
    pub fn new(fleet: Fleet, harvester: Harvester, policy: Box<dyn OffloadPolicy>, collector: C, seed: u64) -> Self {
        Self {
            fleet,
            harvester,
            policy,
            collector,
            tick: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn tick(&self) -> usize {
        self.tick
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn collector(&self) -> &C {
        &self.collector
    }

    pub fn collector_mut(&mut self) -> &mut C {
        &mut self.collector
    }

    pub fn into_collector(self) -> C {
        self.collector
    }

    /// Runs `steps` ticks in sequence.
    pub fn run(&mut self, steps: usize) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Advances the simulation by exactly one tick.
    pub fn step(&mut self) {
        let multi_tick = self.policy.multi_tick_transfers();

        for device_id in self.fleet.edge_device_ids() {
            {
                let device = self.fleet.device_mut(device_id).expect("edge_device_ids yields only present devices");
                self.harvester.update_device_power(device, self.tick);
            }

            let status = {
                let device = self.fleet.device(device_id).unwrap();
                if self.harvester.has_battery() {
                    let soc = self.harvester.soc(device_id).unwrap_or(0.0);
                    let min_soc = self.harvester.min_soc().unwrap_or(0.0);
                    let max_capacity = self.harvester.max_capacity().unwrap_or(0.0);
                    lifecycle::with_battery(device.actual_power, soc, min_soc, max_capacity)
                } else {
                    lifecycle::without_battery(device.actual_power, lifecycle::DEFAULT_P_MIN)
                }
            };

            let device = self.fleet.device_mut(device_id).unwrap();
            if device.status.state != status.state {
                tracing::info!(target: "status", device_id, old = ?device.status.state, new = ?status.state, "device state changed");
            }
            device.status = status;

            let transferring = device.transfer.in_flight();
            if device.status.state == DeviceState::On && !transferring {
                let value = self.rng.random_range(0..=40) as f32;
                device.temperature_measurements.push(TemperatureSample { tick: self.tick, value });
            }

            let services_run = device.status.active && !(multi_tick && transferring);
            if services_run {
                for svc in device.services.iter_mut() {
                    svc.tick_running();
                }
            } else {
                for svc in device.services.iter_mut() {
                    svc.stop();
                }
            }
        }

        self.policy.decide(&mut self.fleet, &self.harvester, self.tick);
        self.policy.post_pass(&mut self.fleet, &self.harvester, self.tick);

        self.emit_telemetry(multi_tick);

        self.tick += 1;
    }

    fn emit_telemetry(&mut self, multi_tick: bool) {
        for device in self.fleet.devices() {
            let transfer = multi_tick.then(|| TransferTelemetry {
                trans_service_ids: device.transfer.pending_service_ids.clone(),
                transfer_duration: device.transfer.duration,
                transfer_time: device.transfer.target_duration,
                transfer_to_device_id: device.transfer.to_device_id,
                transfer_from_device_id: device.transfer.from_device_id,
                failed_transfers: device.transfer.failed,
            });

            self.collector.record_device(DeviceRecord {
                tick: self.tick,
                device_id: device.id,
                model_name: device.id.to_string(),
                model_type: if device.is_edge_device() { "edge_device".to_string() } else { "server".to_string() },
                service_ids: device.services.iter().map(|s| s.id).collect(),
                power_source: format!("{:?}", device.power_source).to_lowercase(),
                actual_power: device.actual_power,
                active: device.status.active,
                state: format!("{:?}", device.status.state).to_lowercase(),
                temperature_measurements: device.temperature_measurements.iter().map(|t| t.value).collect(),
                transfer,
            });

            for svc in &device.services {
                self.collector.record_service(ServiceRecord {
                    tick: self.tick,
                    model_id: svc.id,
                    model_name: svc.name.clone(),
                    device_id: svc.device_id,
                    state: format!("{:?}", svc.state).to_lowercase(),
                    program_counter: svc.program_counter,
                    trained: svc.trained,
                    max_training_time: svc.max_training_time,
                    actual_training_time: svc.actual_training_time,
                    max_prediction_time: svc.max_prediction_time,
                    actual_prediction_time: svc.actual_prediction_time,
                    predictions_counter: svc.predictions_counter,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::EnergyTrace;
    use crate::fleet::{Device, DeviceStatus, ModelType, Service};
    use crate::io::VecCollector;
    use crate::sim::offload::{OffloadingUnit, ReactivePolicy};

    fn fleet_with_one_device() -> Fleet {
        let server = Device::new(0, ModelType::Server, 0, 0, vec![]);
        let mut a = Device::new(1, ModelType::EdgeDevice, 4, 0, vec![]);
        a.services.push(Service::new(10, "anomaly", 1, 3, 2));
        Fleet::new(vec![server, a], 0)
    }

    #[test]
    fn step_advances_tick_and_powers_devices() {
        let fleet = fleet_with_one_device();
        let trace = EnergyTrace::from_watts(&[1], &[10.0], &[0.0]);
        let harvester = Harvester::Trace(trace);
        let policy = Box::new(ReactivePolicy::new(4, OffloadingUnit::Model, 1));
        let mut sched = Scheduler::new(fleet, harvester, policy, VecCollector::default(), 1);

        sched.step();

        assert_eq!(sched.tick(), 1);
        let d = sched.fleet().device(1).unwrap();
        assert_eq!(d.actual_power, 10.0);
        assert_eq!(d.status.state, DeviceState::On);
    }

    #[test]
    fn step_emits_one_device_record_and_one_service_record_per_device() {
        let fleet = fleet_with_one_device();
        let trace = EnergyTrace::from_watts(&[1], &[10.0], &[0.0]);
        let harvester = Harvester::Trace(trace);
        let policy = Box::new(ReactivePolicy::new(4, OffloadingUnit::Model, 1));
        let mut sched = Scheduler::new(fleet, harvester, policy, VecCollector::default(), 1);

        sched.step();

        let collector = sched.collector();
        assert_eq!(collector.devices.len(), 2); // server + edge device
        assert_eq!(collector.services.len(), 1);
        assert!(collector.devices.iter().all(|d| d.transfer.is_none()));
    }

    #[test]
    fn inactive_device_stops_its_services() {
        let server = Device::new(0, ModelType::Server, 0, 0, vec![]);
        let mut a = Device::new(1, ModelType::EdgeDevice, 4, 0, vec![]);
        a.status = DeviceStatus::off();
        a.services.push(Service::new(10, "s", 1, 3, 2));
        let fleet = Fleet::new(vec![server, a], 0);
        // no power at all -> stays off
        let harvester = Harvester::Trace(EnergyTrace::default());
        let policy = Box::new(ReactivePolicy::new(4, OffloadingUnit::Model, 1));
        let mut sched = Scheduler::new(fleet, harvester, policy, VecCollector::default(), 1);

        sched.step();

        assert_eq!(sched.fleet().device(1).unwrap().services[0].program_counter, 0);
    }

    #[test]
    fn run_executes_the_requested_number_of_ticks() {
        let fleet = fleet_with_one_device();
        let harvester = Harvester::Trace(EnergyTrace::from_watts(&[1], &[10.0; 5], &[0.0; 5]));
        let policy = Box::new(ReactivePolicy::new(4, OffloadingUnit::Model, 1));
        let mut sched = Scheduler::new(fleet, harvester, policy, VecCollector::default(), 1);

        sched.run(5);

        assert_eq!(sched.tick(), 5);
    }
}
