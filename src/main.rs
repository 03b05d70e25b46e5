//! Edge-fleet simulator entry point: CLI argument parsing, scenario/topology
//! loading, and scheduler construction and execution.

use std::path::Path;
use std::process;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use edgefleet_sim::config::ScenarioConfig;
use edgefleet_sim::energy::{Battery, EnergyTrace, Harvester};
use edgefleet_sim::io::{Collector, CsvCollector, DeviceRecord, ServiceRecord, VecCollector, load_energy_trace};
use edgefleet_sim::sim::Scheduler;
use edgefleet_sim::sim::offload::{OffloadPolicy, OffloadingUnit, OraclePolicy, ProactivePolicy, ReactivePolicy};
use edgefleet_sim::topology::Topology;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    topology_path: Option<String>,
    energy_input_path: Option<String>,
    seed_override: Option<u64>,
    steps_override: Option<usize>,
    telemetry_out: Option<String>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

fn print_help() {
    eprintln!("edgefleet-sim — discrete-time simulator for energy-harvesting edge-computing fleets");
    eprintln!();
    eprintln!("Usage: edgefleet-sim --topology <path> [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --topology <path>        Fleet topology JSON file (required)");
    eprintln!("  --scenario <path>        Load scenario from a TOML config file");
    eprintln!("  --preset <name>          Use a built-in preset (baseline, battery_constrained, oracle_dense)");
    eprintln!("  --energy-input <path>    Weather/power CSV driving the harvester");
    eprintln!("  --seed <u64>             Override the random seed");
    eprintln!("  --steps <n>              Override simulation.steps");
    eprintln!("  --telemetry-out <prefix> Write <prefix>_devices.csv and <prefix>_services.csv");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start the REST API after the run (mutually exclusive with --telemetry-out)");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("With neither --scenario nor --preset given, the baseline preset is used.");
}

fn require_arg(args: &[String], i: usize, flag: &str) -> String {
    args.get(i)
        .unwrap_or_else(|| {
            eprintln!("error: {flag} requires an argument");
            process::exit(1);
        })
        .clone()
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        topology_path: None,
        energy_input_path: None,
        seed_override: None,
        steps_override: None,
        telemetry_out: None,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--topology" => {
                i += 1;
                cli.topology_path = Some(require_arg(&args, i, "--topology"));
            }
            "--scenario" => {
                i += 1;
                cli.scenario_path = Some(require_arg(&args, i, "--scenario"));
            }
            "--preset" => {
                i += 1;
                cli.preset = Some(require_arg(&args, i, "--preset"));
            }
            "--energy-input" => {
                i += 1;
                cli.energy_input_path = Some(require_arg(&args, i, "--energy-input"));
            }
            "--seed" => {
                i += 1;
                let raw = require_arg(&args, i, "--seed");
                cli.seed_override = Some(raw.parse().unwrap_or_else(|_| {
                    eprintln!("error: --seed value \"{raw}\" is not a valid u64");
                    process::exit(1);
                }));
            }
            "--steps" => {
                i += 1;
                let raw = require_arg(&args, i, "--steps");
                cli.steps_override = Some(raw.parse().unwrap_or_else(|_| {
                    eprintln!("error: --steps value \"{raw}\" is not a valid usize");
                    process::exit(1);
                }));
            }
            "--telemetry-out" => {
                i += 1;
                cli.telemetry_out = Some(require_arg(&args, i, "--telemetry-out"));
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                let raw = require_arg(&args, i, "--port");
                cli.port = raw.parse().unwrap_or_else(|_| {
                    eprintln!("error: --port value \"{raw}\" is not a valid u16");
                    process::exit(1);
                });
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn build_policy(cfg: &ScenarioConfig, transfer_target_duration: u32) -> Box<dyn OffloadPolicy> {
    let offloading = match cfg.offloading.as_str() {
        "data" => OffloadingUnit::Data,
        _ => OffloadingUnit::Model,
    };
    match cfg.strategy.as_str() {
        "proactive" => Box::new(ProactivePolicy::new(cfg.proactive.min_power_threshold, offloading, cfg.loadbalancing, transfer_target_duration)),
        "oracle" => Box::new(OraclePolicy::new(cfg.oracle.max_services_per_device, offloading, cfg.loadbalancing, cfg.server_id as u64)),
        _ => Box::new(ReactivePolicy::new(cfg.reactive.max_services_per_device, offloading, cfg.server_id as u64)),
    }
}

/// Dispatches to either a file-backed or in-memory collector, chosen at
/// startup from CLI flags. The scheduler only ever sees the `Collector` trait.
enum OutputCollector {
    Csv(CsvCollector),
    Mem(VecCollector),
}

impl Collector for OutputCollector {
    fn record_device(&mut self, record: DeviceRecord) {
        match self {
            OutputCollector::Csv(c) => c.record_device(record),
            OutputCollector::Mem(c) => c.record_device(record),
        }
    }

    fn record_service(&mut self, record: ServiceRecord) {
        match self {
            OutputCollector::Csv(c) => c.record_service(record),
            OutputCollector::Mem(c) => c.record_service(record),
        }
    }
}

fn main() {
    init_tracing();
    let cli = parse_args();

    #[cfg(feature = "api")]
    if cli.serve && cli.telemetry_out.is_some() {
        eprintln!("error: --serve and --telemetry-out are mutually exclusive");
        process::exit(1);
    }

    let mut scenario = if let Some(ref path) = cli.scenario_path {
        ScenarioConfig::from_toml_file(Path::new(path)).unwrap_or_else(|e| {
            eprintln!("{e}");
            process::exit(1);
        })
    } else if let Some(ref name) = cli.preset {
        ScenarioConfig::from_preset(name).unwrap_or_else(|e| {
            eprintln!("{e}");
            process::exit(1);
        })
    } else {
        ScenarioConfig::baseline()
    };

    if let Some(steps) = cli.steps_override {
        scenario.simulation.steps = steps;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let Some(topology_path) = cli.topology_path else {
        eprintln!("error: --topology is required");
        process::exit(1);
    };
    let topology = Topology::from_json_file(Path::new(&topology_path)).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });
    let fleet = topology.into_fleet(scenario.server_id).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    let edge_ids = fleet.edge_device_ids();
    let trace = match &cli.energy_input_path {
        Some(path) => load_energy_trace(Path::new(path), &edge_ids).unwrap_or_else(|e| {
            eprintln!("error: failed to load energy input: {e}");
            process::exit(1);
        }),
        None => EnergyTrace::default(),
    };

    let harvester = if scenario.battery.enabled {
        let c = &scenario.battery.characteristics;
        let battery = Battery::new(&edge_ids, c.ampere_hours, c.voltage, c.efficiency, c.depth_of_discharge, c.initial_charge);
        Harvester::Battery { trace, battery, power_required_w: scenario.battery.power_required }
    } else {
        Harvester::Trace(trace)
    };

    let seed = cli.seed_override.unwrap_or(scenario.server_id as u64);
    let policy = build_policy(&scenario, topology.transfer_time);

    #[cfg(feature = "api")]
    let want_serve = cli.serve;
    #[cfg(not(feature = "api"))]
    let want_serve = false;

    let collector = if let Some(ref prefix) = cli.telemetry_out {
        let device_path = format!("{prefix}_devices.csv");
        let service_path = format!("{prefix}_services.csv");
        OutputCollector::Csv(CsvCollector::create(Path::new(&device_path), Path::new(&service_path)).unwrap_or_else(|e| {
            eprintln!("error: failed to open telemetry output: {e}");
            process::exit(1);
        }))
    } else {
        OutputCollector::Mem(VecCollector::default())
    };

    let mut scheduler = Scheduler::new(fleet, harvester, policy, collector, seed);
    let steps = scenario.simulation.steps;
    scheduler.run(steps);

    tracing::info!(target: "status", steps, "simulation run complete");

    match scheduler.into_collector() {
        OutputCollector::Csv(mut csv) => {
            if let Err(e) = csv.flush() {
                eprintln!("error: failed to flush telemetry output: {e}");
                process::exit(1);
            }
            if let Some(ref prefix) = cli.telemetry_out {
                eprintln!("Telemetry written to {prefix}_devices.csv and {prefix}_services.csv");
            }
        }
        OutputCollector::Mem(mem) => {
            let last_tick = mem.devices.last().map(|d| d.tick).unwrap_or(0);
            for d in mem.devices.iter().filter(|d| d.tick == last_tick) {
                println!("tick={:>4} device={:>3} state={:<8} power={:>6.2}W source={:<7} services={:?}", d.tick, d.device_id, d.state, d.actual_power, d.power_source, d.service_ids);
            }

            if want_serve {
                #[cfg(feature = "api")]
                {
                    use std::sync::Arc;
                    let state = Arc::new(edgefleet_sim::api::AppState { devices: mem.devices, services: mem.services });
                    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], cli.port));
                    let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
                        eprintln!("error: failed to create tokio runtime: {e}");
                        process::exit(1);
                    });
                    rt.block_on(edgefleet_sim::api::serve(state, addr));
                }
            }
        }
    }
}
