//! Telemetry collection and external input loading.

pub mod energy_input;
pub mod telemetry;

pub use energy_input::load_energy_trace;
pub use telemetry::{Collector, CsvCollector, DeviceRecord, ServiceRecord, TransferTelemetry, VecCollector};
