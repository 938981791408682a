use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use rxn_ledger::StateKind;

#[derive(Parser)]
#[command(
    name = "rxnet",
    about = "Reaction network identity, deduplication and provenance",
    version,
    before_help = crate::display::banner_for_help(),
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Add molecular structures (SDF/XYZ) to the network as states
    #[command(visible_alias = "i")]
    Ingest(IngestArgs),

    /// Summarize the network and list its states
    #[command(visible_alias = "s")]
    Show(ShowArgs),

    /// Trace the derivation history of an object back to its inputs
    #[command(visible_alias = "l")]
    Lineage(LineageArgs),

    /// Write the structure of a state as an XYZ frame
    Export(ExportArgs),

    /// Drop states no pathway or reaction refers to
    Prune,

    /// Print the relational schema backing snapshots
    Schema,
}

/// Options shared by every command.
#[derive(Args)]
pub struct GlobalOptions {
    /// Network snapshot to read and update
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "network.json",
        global = true
    )]
    pub snapshot: PathBuf,

    /// Network settings (TOML)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress output and logs below warnings (for scripting)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct IngestArgs {
    /// Structure files; format is inferred from the extension
    #[arg(value_name = "FILE", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Kind of state the structures describe
    #[arg(short, long, value_name = "KIND", default_value = "point")]
    pub kind: KindArg,

    /// Net molecular charge (derived from formal charges if omitted)
    #[arg(long, value_name = "Q", allow_hyphen_values = true)]
    pub charge: Option<i32>,

    /// Spin multiplicity 2S+1 (lowest consistent value if omitted)
    #[arg(long, value_name = "M")]
    pub spin: Option<u32>,

    /// Calculation method recorded in provenance
    #[arg(long, value_name = "METHOD")]
    pub method: Option<String>,

    /// Level of theory recorded in provenance
    #[arg(long, value_name = "LEVEL")]
    pub level: Option<String>,

    /// Build the network in memory without writing the snapshot
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Maximum number of states to list
    #[arg(long, value_name = "N", default_value = "25")]
    pub limit: usize,
}

#[derive(Args)]
pub struct LineageArgs {
    /// Identifier of a state, pathway, reaction or ensemble
    #[arg(value_name = "ID")]
    pub id: String,

    /// Also list alternate derivations of the object
    #[arg(short, long)]
    pub all: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Identifier of the state (merged aliases are followed)
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output file (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Point,
    Endpoint,
    #[value(alias = "ts")]
    TransitionState,
}

impl From<KindArg> for StateKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Point => StateKind::Point,
            KindArg::Endpoint => StateKind::Endpoint,
            KindArg::TransitionState => StateKind::TransitionState,
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ingest_accepts_ts_alias_and_negative_charge() {
        let cli = Cli::try_parse_from([
            "rxnet", "ingest", "a.xyz", "--kind", "ts", "--charge", "-1", "--spin", "2",
        ])
        .unwrap();
        let Command::Ingest(args) = cli.command else {
            panic!("expected ingest");
        };
        assert_eq!(args.kind, KindArg::TransitionState);
        assert_eq!(args.charge, Some(-1));
        assert_eq!(args.spin, Some(2));
        assert_eq!(StateKind::from(args.kind), StateKind::TransitionState);
    }

    #[test]
    fn global_options_follow_the_subcommand() {
        let cli = Cli::try_parse_from(["rxnet", "show", "-s", "net.json", "-vv"]).unwrap();
        assert_eq!(cli.global.snapshot, PathBuf::from("net.json"));
        assert_eq!(cli.global.verbose, 2);
    }

    #[test]
    fn ingest_requires_an_input() {
        assert!(Cli::try_parse_from(["rxnet", "ingest"]).is_err());
    }
}
