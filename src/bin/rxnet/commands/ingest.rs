use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use rxn_ledger::{Canonicalizer, Origin, Provenance, State, StateId, StateKind, Structure};

use crate::cli::{GlobalOptions, IngestArgs};
use crate::config::load_network_config;
use crate::display::{Context as DisplayContext, IngestRow, Progress, print_ingest_results};
use crate::io::{open_network, read_structure_file, save_network};
use crate::util::text::plural;

const TOTAL_STEPS: usize = 3;

pub fn run_ingest(args: IngestArgs, global: &GlobalOptions, ctx: DisplayContext) -> Result<()> {
    let config = load_network_config(global.config.as_deref())?;
    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    progress.step("Opening network");
    let (network, existed) = open_network(&global.snapshot, config)?;
    let opened = if existed {
        format!("Loaded {}", plural(network.state_count(), "state"))
    } else {
        "Started an empty network".to_string()
    };
    progress.complete_step("Opening network", &[opened]);

    progress.step("Admitting structures");
    let mut results = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        let (structure, format) = read_structure_file(path)?;
        let state = identify(structure, path, &args, network.canonicalizer())
            .with_context(|| format!("Failed to identify structure in {}", path.display()))?;
        let formula = state.formula().to_string();

        let admission = network
            .add_state(state)
            .with_context(|| format!("Failed to add {} to the network", path.display()))?;
        debug!(path = %path.display(), %format, state = %admission.id, new = admission.is_new, "admitted structure");

        results.push(IngestRow {
            source: file_label(path),
            formula,
            id: admission.id,
            is_new: admission.is_new,
        });
    }
    let added = results.iter().filter(|r| r.is_new).count();
    progress.complete_step(
        "Admitting structures",
        &[
            format!("{} new", plural(added, "state")),
            format!("{} merged into existing states", results.len() - added),
        ],
    );

    progress.step("Writing snapshot");
    if args.dry_run {
        progress.complete_step("Writing snapshot", &["Skipped (dry run)".to_string()]);
    } else {
        save_network(&network, &global.snapshot)?;
        progress.complete_step(
            "Writing snapshot",
            &[global.snapshot.display().to_string()],
        );
    }
    progress.finish("Ingest complete");

    info!(
        inputs = results.len(),
        added,
        states = network.state_count(),
        "ingest finished"
    );

    let mut out = io::stdout().lock();
    print_ingest_results(&mut out, &results)?;
    out.flush()?;
    Ok(())
}

/// Builds an input state whose provenance records the source file.
fn identify(
    structure: Structure,
    path: &Path,
    args: &IngestArgs,
    canonicalizer: &dyn Canonicalizer,
) -> Result<State> {
    let kind = StateKind::from(args.kind);
    let id = StateId::random();

    let mut record = Provenance::builder(kind.object_type(), id, Origin::Input).path(path);
    if let Some(method) = &args.method {
        record = record.calc_method(method.as_str());
    }
    if let Some(level) = &args.level {
        record = record.level_of_theory(level.as_str());
    }

    let mut builder = State::builder(structure)
        .kind(kind)
        .provenance(record.build()?);
    if let Some(charge) = args.charge {
        builder = builder.charge(charge);
    }
    if let Some(spin) = args.spin {
        builder = builder.spin_multiplicity(spin);
    }
    Ok(builder.build(canonicalizer)?)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::KindArg;
    use rxn_ledger::{Atom, Element, GraphCanonicalizer, ObjectType};
    use std::path::PathBuf;

    fn args(kind: KindArg) -> IngestArgs {
        IngestArgs {
            inputs: vec![PathBuf::from("h2.xyz")],
            kind,
            charge: None,
            spin: None,
            method: Some("xtb".to_string()),
            level: None,
            dry_run: true,
        }
    }

    fn hydrogen() -> Structure {
        Structure {
            atoms: vec![
                Atom::new(Element::H, [0.0, 0.0, 0.0]),
                Atom::new(Element::H, [0.0, 0.0, 0.74]),
            ],
            bonds: Vec::new(),
        }
    }

    #[test]
    fn identified_state_records_its_source() {
        let canonicalizer = GraphCanonicalizer::default();
        let state = identify(
            hydrogen(),
            Path::new("inputs/h2.xyz"),
            &args(KindArg::Endpoint),
            &canonicalizer,
        )
        .unwrap();

        assert_eq!(state.kind(), StateKind::Endpoint);
        assert_eq!(state.provenance().object_type(), ObjectType::Endpoint);
        assert_eq!(state.provenance().path(), Some(Path::new("inputs/h2.xyz")));
        assert_eq!(state.provenance().calc_method(), Some("xtb"));
        assert!(state.is_input());
    }

    #[test]
    fn impossible_spin_is_reported() {
        let canonicalizer = GraphCanonicalizer::default();
        let mut args = args(KindArg::Point);
        args.spin = Some(2);
        assert!(identify(hydrogen(), Path::new("h2.xyz"), &args, &canonicalizer).is_err());
    }

    #[test]
    fn label_is_the_file_name() {
        assert_eq!(file_label(Path::new("a/b/water.sdf")), "water.sdf");
    }
}
