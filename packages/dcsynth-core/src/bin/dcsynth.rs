//! dcsynth CLI
//!
//! Reads an automaton document (`[controllers]`, `[states]`, `[events]`,
//! `[transitions]` sections) and runs one synthesis step on it.
//!
//! # Usage
//!
//! ```bash
//! # U-Structure with communications, as text
//! dcsynth compose plant.txt --communications
//!
//! # Smallest solving protocols as JSON
//! dcsynth --format json protocols plant.txt --mode smallest
//!
//! # Observability with ambiguity level, thorough preset
//! dcsynth --preset thorough observability plant.txt --level
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`.

use clap::{Parser, Subcommand, ValueEnum};
use dcsynth_core::config::{Preset, SynthesisConfig};
use dcsynth_core::features::protocol::{Protocol, ProtocolSearch};
use dcsynth_core::{
    Automaton, AutomatonView, CommunicationData, EventId, StateId, TextFormat, UStructure,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "dcsynth")]
#[command(about = "Decentralized control synthesis - U-Structures and communication protocols", long_about = None)]
struct Cli {
    /// YAML configuration file (overrides the preset)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Configuration preset (fast, balanced, thorough)
    #[arg(long, global = true, default_value = "balanced", value_parser = Preset::from_str)]
    preset: Preset,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SearchMode {
    /// Every feasible protocol
    All,
    /// Smallest protocols that solve the control problem
    Smallest,
    /// First feasible protocol in encounter order
    First,
    /// Cheapest protocols that solve the control problem
    LowestCost,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the U-Structure of a plant
    Compose {
        /// Automaton document
        input: PathBuf,

        /// Add potential / invalid communications
        #[arg(long)]
        communications: bool,
    },

    /// Search feasible communication protocols
    Protocols {
        /// Automaton document
        input: PathBuf,

        #[arg(long, value_enum, default_value_t = SearchMode::Smallest)]
        mode: SearchMode,

        /// Drop protocols that strictly contain another feasible protocol
        #[arg(long)]
        filter: bool,
    },

    /// Test observability of a plant
    Observability {
        /// Automaton document
        input: PathBuf,

        /// Also compute the ambiguity level
        #[arg(long)]
        level: bool,
    },

    /// Test controllability of a plant
    Controllability {
        /// Automaton document
        input: PathBuf,
    },
}

#[derive(Serialize)]
struct ControllabilityOutput {
    controllable: bool,
    uncontrollable: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => SynthesisConfig::from_yaml_file(path)?,
        None => SynthesisConfig::preset(cli.preset),
    };
    info!(preset = %config.preset, "configuration loaded");

    match cli.command {
        Commands::Compose {
            input,
            communications,
        } => {
            let plant = load(&input)?;
            let mut ustructure = plant.synchronized_composition()?;
            if communications {
                ustructure = ustructure.add_communications()?;
            }
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ustructure)?),
                OutputFormat::Text => print_ustructure(&ustructure),
            }
        }
        Commands::Protocols {
            input,
            mode,
            filter,
        } => {
            let ustructure = load(&input)?
                .synchronized_composition()?
                .add_communications()?;
            let candidates = ustructure.candidates();
            let search = ProtocolSearch::new(&ustructure, config.search.clone());
            let protocols = match mode {
                SearchMode::All => search.all_feasible(&candidates, filter)?,
                SearchMode::Smallest => search.smallest_feasible(&candidates)?,
                SearchMode::First => search.first_feasible(&candidates)?.into_iter().collect(),
                SearchMode::LowestCost => search.lowest_cost_feasible(&candidates)?,
            };
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&protocols)?),
                OutputFormat::Text => print_protocols(&ustructure, &protocols),
            }
        }
        Commands::Observability { input, level } => {
            let report = load(&input)?.observability_report(level, &config.inference)?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Text => {
                    println!("observable: {}", report.observable);
                    if level {
                        match report.ambiguity_level {
                            Some(l) => println!("ambiguity level: {}", l),
                            None => println!("ambiguity level: unresolved"),
                        }
                    }
                    for (violation, witness) in
                        report.unconditional_violations.iter().zip(&report.witnesses)
                    {
                        println!("violation {} via {} steps", violation, witness.len());
                    }
                }
            }
        }
        Commands::Controllability { input } => {
            let plant = load(&input)?;
            let offending = plant.uncontrollable_bad_transitions()?;
            let output = ControllabilityOutput {
                controllable: offending.is_empty(),
                uncontrollable: offending
                    .iter()
                    .map(|d| describe_transition(&plant, d.initial_state_id, d.event_id, d.target_state_id))
                    .collect(),
            };
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
                OutputFormat::Text => {
                    println!("controllable: {}", output.controllable);
                    for line in &output.uncontrollable {
                        println!("uncontrollable: {}", line);
                    }
                }
            }
        }
    }

    Ok(())
}

fn load(path: &Path) -> Result<Automaton, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    Ok(TextFormat::parse_document(&text)?)
}

fn print_ustructure(ustructure: &UStructure) {
    println!("[states]\n{}", ustructure.state_input());
    println!("[events]\n{}", ustructure.event_input());
    println!("[transitions]\n{}", ustructure.transition_input());
    let invalid = ustructure.invalid_communication_input();
    if !invalid.is_empty() {
        println!("[invalid communications]\n{}", invalid);
    }
}

fn print_protocols(ustructure: &UStructure, protocols: &[Protocol]) {
    println!("{} protocol(s)", protocols.len());
    for (i, protocol) in protocols.iter().enumerate() {
        println!("#{} ({} communications)", i + 1, protocol.len());
        for communication in protocol {
            println!("  {}", describe_communication(ustructure, communication));
        }
    }
}

fn describe_communication(ustructure: &UStructure, communication: &CommunicationData) -> String {
    let t = communication.transition;
    format!(
        "{} {}",
        describe_transition(ustructure.automaton(), t.initial_state_id, t.event_id, t.target_state_id),
        communication.roles_string()
    )
}

fn describe_transition(automaton: &Automaton, from: StateId, event: EventId, to: StateId) -> String {
    let state = |id: StateId| {
        automaton
            .state(id)
            .map_or_else(|| id.to_string(), |s| s.label.clone())
    };
    let event = automaton
        .event(event)
        .map_or_else(|| event.to_string(), |e| e.label.clone());
    format!("{},{},{}", state(from), event, state(to))
}
