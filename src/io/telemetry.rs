//! The pluggable `Collector` trait and its two implementations: a streaming
//! CSV exporter and an in-memory store used by tests and the REST surface.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

/// Transfer-specific fields, present only for the proactive strategy.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransferTelemetry {
    pub trans_service_ids: Vec<u32>,
    pub transfer_duration: u32,
    pub transfer_time: u32,
    pub transfer_to_device_id: u32,
    pub transfer_from_device_id: u32,
    pub failed_transfers: u32,
}

/// One device, one tick.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceRecord {
    pub tick: usize,
    pub device_id: u32,
    pub model_name: String,
    pub model_type: String,
    pub service_ids: Vec<u32>,
    pub power_source: String,
    pub actual_power: f32,
    pub active: bool,
    pub state: String,
    pub temperature_measurements: Vec<f32>,
    pub transfer: Option<TransferTelemetry>,
}

/// One service, one tick.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceRecord {
    pub tick: usize,
    pub model_id: u32,
    pub model_name: String,
    pub device_id: u32,
    pub state: String,
    pub program_counter: u64,
    pub trained: bool,
    pub max_training_time: u32,
    pub actual_training_time: u32,
    pub max_prediction_time: u32,
    pub actual_prediction_time: u32,
    pub predictions_counter: u64,
}

/// Receives the two telemetry streams emitted once per device per tick.
pub trait Collector {
    fn record_device(&mut self, record: DeviceRecord);
    fn record_service(&mut self, record: ServiceRecord);
}

/// Schema v1 column header for the device stream.
const DEVICE_HEADER: &str = "tick,device_id,model_name,model_type,service_ids,power_source,actual_power,\
                              active,state,temperature_measurements,trans_service_ids,transfer_duration,\
                              transfer_time,transfer_to_device_id,transfer_from_device_id,failed_transfers";

/// Schema v1 column header for the service stream.
const SERVICE_HEADER: &str = "tick,model_id,model_name,device_id,state,program_counter,trained,\
                               max_training_time,actual_training_time,max_prediction_time,\
                               actual_prediction_time,predictions_counter";

fn join_ids(ids: &[u32]) -> String {
    ids.iter().map(u32::to_string).collect::<Vec<_>>().join(";")
}

fn join_floats(values: &[f32]) -> String {
    values.iter().map(|v| format!("{v:.2}")).collect::<Vec<_>>().join(";")
}

/// File-backed collector writing one CSV row per record as it arrives.
pub struct CsvCollector {
    devices: csv::Writer<BufWriter<File>>,
    services: csv::Writer<BufWriter<File>>,
}

impl CsvCollector {
    pub fn create(device_path: &Path, service_path: &Path) -> io::Result<Self> {
        let mut devices = csv::WriterBuilder::new().from_writer(BufWriter::new(File::create(device_path)?));
        let mut services = csv::WriterBuilder::new().from_writer(BufWriter::new(File::create(service_path)?));
        devices.write_record(DEVICE_HEADER.split(',').map(str::trim))?;
        services.write_record(SERVICE_HEADER.split(',').map(str::trim))?;
        Ok(Self { devices, services })
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.devices.flush()?;
        self.services.flush()
    }
}

impl Collector for CsvCollector {
    fn record_device(&mut self, r: DeviceRecord) {
        let t = r.transfer.unwrap_or_default();
        let _ = self.devices.write_record(&[
            r.tick.to_string(),
            r.device_id.to_string(),
            r.model_name,
            r.model_type,
            join_ids(&r.service_ids),
            r.power_source,
            format!("{:.2}", r.actual_power),
            r.active.to_string(),
            r.state,
            join_floats(&r.temperature_measurements),
            join_ids(&t.trans_service_ids),
            t.transfer_duration.to_string(),
            t.transfer_time.to_string(),
            t.transfer_to_device_id.to_string(),
            t.transfer_from_device_id.to_string(),
            t.failed_transfers.to_string(),
        ]);
    }

    fn record_service(&mut self, r: ServiceRecord) {
        let _ = self.services.write_record(&[
            r.tick.to_string(),
            r.model_id.to_string(),
            r.model_name,
            r.device_id.to_string(),
            r.state,
            r.program_counter.to_string(),
            r.trained.to_string(),
            r.max_training_time.to_string(),
            r.actual_training_time.to_string(),
            r.max_prediction_time.to_string(),
            r.actual_prediction_time.to_string(),
            r.predictions_counter.to_string(),
        ]);
    }
}

/// In-memory collector; every record is retained for later inspection.
#[derive(Default)]
pub struct VecCollector {
    pub devices: Vec<DeviceRecord>,
    pub services: Vec<ServiceRecord>,
}

impl Collector for VecCollector {
    fn record_device(&mut self, record: DeviceRecord) {
        self.devices.push(record);
    }

    fn record_service(&mut self, record: ServiceRecord) {
        self.services.push(record);
    }
}
