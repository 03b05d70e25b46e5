//! JSON fleet/partner/transfer-time loader.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::fleet::{Device, Fleet, ModelType, Service};

#[derive(Debug, Clone, Deserialize)]
pub struct TopologyServiceSpec {
    pub id: u32,
    pub name: String,
    pub max_training_time: u32,
    pub max_prediction_time: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopologyDeviceSpec {
    pub id: u32,
    pub model_type: String,
    pub cpu_cores: u32,
    #[serde(default)]
    pub reserved_cpu_cores: u32,
    #[serde(default)]
    pub partner_devices: Vec<u32>,
    #[serde(default)]
    pub services: Vec<TopologyServiceSpec>,
}

/// A fleet description plus the transfer duration (in ticks) shared by
/// every device in this topology.
#[derive(Debug, Clone, Deserialize)]
pub struct Topology {
    pub devices: Vec<TopologyDeviceSpec>,
    pub transfer_time: u32,
}

/// Fatal at load time: a malformed or internally inconsistent topology.
#[derive(Debug)]
pub struct TopologyError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "topology error: {} — {}", self.field, self.message)
    }
}

impl Topology {
    pub fn from_json_file(path: &Path) -> Result<Self, TopologyError> {
        let content = fs::read_to_string(path).map_err(|e| TopologyError {
            field: "topology".into(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(s: &str) -> Result<Self, TopologyError> {
        serde_json::from_str(s).map_err(|e| TopologyError {
            field: "json".into(),
            message: e.to_string(),
        })
    }

    /// Builds the runtime `Fleet`, in ascending device-id order, validating
    /// that `server_id` names a present `server`-typed device, every
    /// partner reference resolves, and no device cites itself as a
    /// partner. Device id `0` is rejected: the transfer slots use `0` as
    /// their "unused" sentinel, so a real device can never carry that id.
    pub fn into_fleet(&self, server_id: u32) -> Result<Fleet, TopologyError> {
        let mut specs = self.devices.clone();
        specs.sort_by_key(|d| d.id);

        let ids: Vec<u32> = specs.iter().map(|d| d.id).collect();

        if ids.contains(&0) {
            return Err(TopologyError {
                field: "devices[].id".into(),
                message: "device id 0 is reserved as the transfer-slot sentinel".into(),
            });
        }

        let Some(server_spec) = specs.iter().find(|d| d.id == server_id) else {
            return Err(TopologyError {
                field: "server_id".into(),
                message: format!("no device with id {server_id} in topology"),
            });
        };
        if server_spec.model_type != "server" {
            return Err(TopologyError {
                field: "server_id".into(),
                message: format!("device {server_id} is not model_type \"server\""),
            });
        }

        for spec in &specs {
            for &partner in &spec.partner_devices {
                if partner == spec.id {
                    return Err(TopologyError {
                        field: "partner_devices".into(),
                        message: format!("device {} lists itself as a partner", spec.id),
                    });
                }
                if !ids.contains(&partner) {
                    return Err(TopologyError {
                        field: "partner_devices".into(),
                        message: format!("device {} references unknown partner {partner}", spec.id),
                    });
                }
            }
        }

        let mut devices = Vec::with_capacity(specs.len());
        for spec in &specs {
            let model_type = match spec.model_type.as_str() {
                "edge_device" => ModelType::EdgeDevice,
                "server" => ModelType::Server,
                other => {
                    return Err(TopologyError {
                        field: "model_type".into(),
                        message: format!("device {}: unknown model_type \"{other}\"", spec.id),
                    });
                }
            };
            let mut device = Device::new(spec.id, model_type, spec.cpu_cores, spec.reserved_cpu_cores, spec.partner_devices.clone());
            for svc in &spec.services {
                device.services.push(Service::new(svc.id, svc.name.clone(), spec.id, svc.max_training_time, svc.max_prediction_time));
            }
            devices.push(device);
        }

        Ok(Fleet::new(devices, server_id))
    }
}
