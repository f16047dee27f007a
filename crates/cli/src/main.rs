//! AXI-Stream transfer source CLI.
//!
//! This binary runs JSON scenarios against an in-memory device. It performs:
//! 1. **Run:** Load a scenario, drive its transfers one edge at a time, and print the bus after each edge.
//! 2. **Example:** Print a starter scenario (one short packet after a reset pulse).
//!
//! Logging goes to stderr and is controlled with `RUST_LOG` (default `warn`).

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

use axis_transfer::bus::BusSnapshot;
use axis_transfer::config::{BusConfig, ResetPulse, Scenario, SourceConfig};
use axis_transfer::source::{EdgeOutcome, SourceHandle};
use axis_transfer::{Bits, Transfer};

#[derive(Parser, Debug)]
#[command(
    name = "axis-sim",
    author,
    version,
    about = "AXI-Stream transfer source simulator",
    long_about = "Drive a queue of AXI-Stream transfers onto an in-memory bus, one per clock edge.\n\nExamples:\n  axis-sim example > packet.json\n  axis-sim run packet.json\n  axis-sim run packet.json --cycles 40 --json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a scenario file and print the bus after every edge.
    Run {
        /// Scenario JSON file.
        scenario: PathBuf,

        /// Number of edges to run (overrides the scenario).
        #[arg(short, long)]
        cycles: Option<u64>,

        /// Print one JSON object per edge instead of text.
        #[arg(long)]
        json: bool,

        /// Log a bus snapshot at every edge (needs `RUST_LOG=trace`).
        #[arg(long)]
        trace_bus: bool,
    },

    /// Print an example scenario to stdout.
    Example,
}

/// One line of `--json` output.
#[derive(Serialize)]
struct EdgeReport<'a> {
    edge: u64,
    outcome: &'static str,
    #[serde(flatten)]
    snapshot: &'a BusSnapshot,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            scenario,
            cycles,
            json,
            trace_bus,
        } => cmd_run(&scenario, cycles, json, trace_bus),
        Commands::Example => cmd_example(),
    }
}

/// Runs a scenario: builds the device, enqueues every transfer, then steps the
/// source once per edge, applying the reset pulse and sink ready level first.
///
/// Exits with code 1 if the scenario cannot be loaded or a transfer fails to drive.
fn cmd_run(path: &Path, cycles: Option<u64>, json: bool, trace_bus: bool) {
    let mut scenario = Scenario::from_json_file(path).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });
    scenario.source.trace_bus |= trace_bus;
    let cycles = cycles.unwrap_or(scenario.cycles);

    let dut = scenario.bus.build_dut().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });
    let source = scenario
        .build_source(&dut)
        .map(SourceHandle::new)
        .unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            process::exit(1);
        });
    info!(path = %path.display(), cycles, "running scenario");

    if !json {
        println!("Scenario: {}", path.display());
        println!(
            "  Bus: {}  Signals: {}  Transfers: {}  Edges: {}",
            scenario.bus.prefix,
            dut.names().collect::<Vec<_>>().join(", "),
            scenario.transfers.len(),
            cycles
        );
        println!();
    }

    for edge in 0..cycles {
        scenario.drive_inputs(&dut, edge);
        match source.step() {
            Ok(outcome) => report(edge, &outcome, &source.snapshot(), json),
            Err(e) => {
                eprintln!("\n[!] FATAL: {e}");
                source.stop();
                println!("{}", source.stats());
                process::exit(1);
            }
        }
    }

    source.stop();
    if json {
        match serde_json::to_string(&source.stats()) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("Error: {e}"),
        }
    } else {
        println!();
        println!("{}", source.stats());
    }
}

fn report(edge: u64, outcome: &EdgeOutcome, snapshot: &BusSnapshot, json: bool) {
    let label = outcome_label(outcome);
    if json {
        let line = EdgeReport {
            edge,
            outcome: label,
            snapshot,
        };
        match serde_json::to_string(&line) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("Error: {e}"),
        }
    } else {
        println!("{edge:>6}  {label:<7}  {snapshot}");
    }
}

const fn outcome_label(outcome: &EdgeOutcome) -> &'static str {
    match outcome {
        EdgeOutcome::Driven(_) => "driven",
        EdgeOutcome::Paused => "paused",
        EdgeOutcome::Idle => "idle",
        EdgeOutcome::Reset => "reset",
        EdgeOutcome::Stopped => "stopped",
    }
}

/// Prints a scenario with an `aresetn` pulse followed by a three-beat packet.
fn cmd_example() {
    let beat = |name: &str, data: u64, last: bool| {
        Transfer::new(name)
            .with_data(Bits::from_u64(data, 64).unwrap_or_else(|_| Bits::zero(64)))
            .with_keep(Bits::from_u64(0xff, 8).unwrap_or_else(|_| Bits::zero(8)))
            .with_valid(true)
            .with_last(last)
    };

    let scenario = Scenario {
        source: SourceConfig {
            reset_active_level: true,
            areset: true,
            trace_bus: false,
        },
        bus: BusConfig {
            reset: Some("aresetn".to_owned()),
            ..BusConfig::default()
        },
        transfers: vec![
            beat("init", 0x0123_4567_89ab_cdef, false),
            beat("data", 0xdead_beef, false),
            beat("end", 0xcafe, true),
            Transfer::new("empty").with_valid(false).with_last(false),
        ],
        cycles: 12,
        sink_ready: Some(true),
        reset_pulse: Some(ResetPulse {
            start: 0,
            end: 2,
            level: false,
        }),
    };

    match serde_json::to_string_pretty(&scenario) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
