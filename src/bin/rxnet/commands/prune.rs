use std::io::{self, Write};

use anyhow::Result;
use tracing::info;

use crate::cli::GlobalOptions;
use crate::config::load_network_config;
use crate::display::{Context as DisplayContext, Progress};
use crate::io::{load_network, save_network};
use crate::util::text::plural;

pub fn run_prune(global: &GlobalOptions, ctx: DisplayContext) -> Result<()> {
    let config = load_network_config(global.config.as_deref())?;
    let mut progress = Progress::new(ctx.interactive, 2);

    progress.step("Pruning unreferenced states");
    let mut network = load_network(&global.snapshot, config)?;
    let removed = network.prune_unreferenced();
    progress.complete_step(
        "Pruning unreferenced states",
        &[
            format!("{} removed", plural(removed.len(), "state")),
            format!("{} kept", plural(network.state_count(), "state")),
        ],
    );

    progress.step("Writing snapshot");
    save_network(&network, &global.snapshot)?;
    progress.complete_step("Writing snapshot", &[global.snapshot.display().to_string()]);
    progress.finish("Prune complete");

    info!(removed = removed.len(), "pruned network");

    let mut out = io::stdout().lock();
    for id in &removed {
        writeln!(out, "{id}")?;
    }
    out.flush()?;
    Ok(())
}
