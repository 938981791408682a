mod ingest;
mod inspect;
mod prune;

use ingest::run_ingest;
use inspect::{run_export, run_lineage, run_schema, run_show};
use prune::run_prune;

use anyhow::Result;

use crate::cli::{Command, GlobalOptions};
use crate::display::Context;

pub fn dispatch(command: Command, global: &GlobalOptions, ctx: Context) -> Result<()> {
    match command {
        Command::Ingest(args) => run_ingest(args, global, ctx),
        Command::Show(args) => run_show(args, global),
        Command::Lineage(args) => run_lineage(args, global),
        Command::Export(args) => run_export(args, global),
        Command::Prune => run_prune(global, ctx),
        Command::Schema => run_schema(),
    }
}
