//! rigkit CLI - Command-line interface for procedural rig authoring
//!
//! This binary realizes bone graph documents into rig files and mirrors bones
//! of existing rigs.

use clap::{ArgAction, Parser, Subcommand};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::process::ExitCode;

// Use modules from the library crate
use rigkit_cli::commands;

/// rigkit - Procedural Rig Authoring
#[derive(Parser)]
#[command(name = "rigkit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Realize a bone graph document into a rig file
    Realize {
        /// Path to the graph document (JSON)
        #[arg(short, long)]
        graph: String,

        /// Rig file to realize into (default: a new empty rig)
        #[arg(short, long)]
        rig: Option<String>,

        /// Output rig file path
        #[arg(short, long)]
        out: String,

        /// Keep the graph after realizing and include it in JSON output
        #[arg(long)]
        keep_graph: bool,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Mirror bones of a rig file across X
    Mirror {
        /// Path to the rig file
        #[arg(short, long)]
        rig: String,

        /// Bone to mirror (repeatable)
        #[arg(short, long = "bone", required = true)]
        bones: Vec<String>,

        /// Split constraints of bones without a side marker
        #[arg(long)]
        split: bool,

        /// JSON file with mirror options
        #[arg(long)]
        options: Option<String>,

        /// Output rig file path (default: overwrite the input)
        #[arg(short, long)]
        out: Option<String>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Print the mirrored form of bone names
    Flip {
        /// Names to flip
        #[arg(required = true)]
        names: Vec<String>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = TermLogger::init(
        log_level(cli.verbose),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("warning: logging disabled: {}", e);
    }

    let result = match cli.command {
        Commands::Realize {
            graph,
            rig,
            out,
            keep_graph,
            json,
        } => commands::realize::run(&graph, rig.as_deref(), &out, keep_graph, json),
        Commands::Mirror {
            rig,
            bones,
            split,
            options,
            out,
            json,
        } => commands::mirror::run(
            &rig,
            &bones,
            split,
            options.as_deref(),
            out.as_deref(),
            json,
        ),
        Commands::Flip { names, json } => commands::flip::run(&names, json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_mirror() {
        let cli = Cli::try_parse_from([
            "rigkit", "mirror", "--rig", "rig.json", "--bone", "Arm.L", "--bone", "Leg.L",
            "--split",
        ])
        .unwrap();
        match cli.command {
            Commands::Mirror {
                rig, bones, split, ..
            } => {
                assert_eq!(rig, "rig.json");
                assert_eq!(bones, ["Arm.L", "Leg.L"]);
                assert!(split);
            }
            _ => panic!("expected mirror command"),
        }
    }

    #[test]
    fn test_cli_mirror_requires_bone() {
        assert!(Cli::try_parse_from(["rigkit", "mirror", "--rig", "rig.json"]).is_err());
    }

    #[test]
    fn test_cli_verbose_is_global() {
        let cli = Cli::try_parse_from(["rigkit", "flip", "Arm.L", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(log_level(cli.verbose), LevelFilter::Debug);
    }

    #[test]
    fn test_cli_parses_realize() {
        let cli = Cli::try_parse_from([
            "rigkit", "realize", "-g", "graph.json", "-o", "out.json", "--keep-graph",
        ])
        .unwrap();
        match cli.command {
            Commands::Realize {
                graph,
                rig,
                out,
                keep_graph,
                json,
            } => {
                assert_eq!(graph, "graph.json");
                assert_eq!(rig, None);
                assert_eq!(out, "out.json");
                assert!(keep_graph);
                assert!(!json);
            }
            _ => panic!("expected realize command"),
        }
    }
}
