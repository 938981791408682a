use std::io::{self, Write};

use anyhow::{Context, Result, anyhow};

use rxn_ledger::io::write_xyz;
use rxn_ledger::store::schema;
use rxn_ledger::{ObjectId, Provenance, ReactionNetwork, StateId};

use crate::cli::{ExportArgs, GlobalOptions, LineageArgs, ShowArgs};
use crate::config::load_network_config;
use crate::display::{print_lineage, print_network_summary, print_states};
use crate::io::{create_output, load_network};

pub fn run_show(args: ShowArgs, global: &GlobalOptions) -> Result<()> {
    let network = open(global)?;

    let mut out = io::stdout().lock();
    print_network_summary(&mut out, &network, &global.snapshot)?;
    writeln!(out)?;
    print_states(&mut out, &network, args.limit)?;
    out.flush()?;
    Ok(())
}

pub fn run_lineage(args: LineageArgs, global: &GlobalOptions) -> Result<()> {
    let id: ObjectId = args
        .id
        .parse()
        .with_context(|| format!("Invalid object id '{}'", args.id))?;
    let network = open(global)?;

    let (chain, alternates) = trace(&network, id, args.all)?;

    let mut out = io::stdout().lock();
    print_lineage(&mut out, &network, &chain, &alternates)?;
    out.flush()?;
    Ok(())
}

/// Lineage of `id` from its primary record to the root, plus alternate
/// derivations of the object itself when `with_alternates` is set.
fn trace(
    network: &ReactionNetwork,
    id: ObjectId,
    with_alternates: bool,
) -> Result<(Vec<Provenance>, Vec<Provenance>)> {
    let chain = network
        .lineage_of(id)
        .and_then(|lineage| lineage.collect::<Result<Vec<_>, _>>())
        .with_context(|| format!("Failed to trace lineage of {id}"))?;

    let alternates = match chain.first() {
        Some(primary) if with_alternates => network
            .records_for(primary.object_id())
            .into_iter()
            .filter(|record| record.id() != primary.id())
            .collect(),
        _ => Vec::new(),
    };
    Ok((chain, alternates))
}

pub fn run_export(args: ExportArgs, global: &GlobalOptions) -> Result<()> {
    let requested: StateId = args
        .id
        .parse()
        .with_context(|| format!("Invalid state id '{}'", args.id))?;
    let network = open(global)?;

    let state = network
        .resolve(requested)
        .and_then(|id| network.state(id))
        .ok_or_else(|| anyhow!("State {requested} is not in the network"))?;

    let comment = format!("{} {}", state.formula(), state.id());
    let mut out = create_output(args.output.as_deref())?;
    write_xyz(&mut out, state.structure(), &comment)
        .with_context(|| format!("Failed to export state {}", state.id()))?;
    out.flush()?;
    Ok(())
}

pub fn run_schema() -> Result<()> {
    let mut out = io::stdout().lock();
    write!(out, "{}", schema::ddl())?;
    out.flush()?;
    Ok(())
}

fn open(global: &GlobalOptions) -> Result<ReactionNetwork> {
    let config = load_network_config(global.config.as_deref())?;
    load_network(&global.snapshot, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxn_ledger::{
        Atom, Element, NetworkConfig, ObjectType, Origin, Parent, State, Structure,
    };

    fn water(offset: f64) -> Structure {
        Structure {
            atoms: vec![
                Atom::new(Element::O, [offset, 0.0, 0.0]),
                Atom::new(Element::H, [offset + 0.96, 0.0, 0.0]),
                Atom::new(Element::H, [offset - 0.24, 0.93, 0.0]),
            ],
            bonds: Vec::new(),
        }
    }

    #[test]
    fn trace_follows_merged_alias_and_lists_alternates() {
        let network = ReactionNetwork::new(NetworkConfig::default());
        let root = State::create(water(0.0), None, network.canonicalizer()).unwrap();
        let root_id = network.add_state(root).unwrap().id;

        let alias = StateId::random();
        let record = Provenance::create(
            ObjectType::State,
            alias,
            Origin::ConformerSearch,
            Some(Parent::new(ObjectType::State, root_id)),
        )
        .unwrap();
        let twin = State::create(water(5.0), Some(record), network.canonicalizer()).unwrap();
        let admission = network.add_state(twin).unwrap();
        assert!(!admission.is_new);

        let (chain, alternates) = trace(&network, alias.into(), true).unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].object_id(), ObjectId::from(root_id));
        assert_eq!(alternates.len(), 1);
        assert_eq!(alternates[0].origin(), Origin::ConformerSearch);
    }

    #[test]
    fn trace_of_unknown_id_fails() {
        let network = ReactionNetwork::default();
        assert!(trace(&network, ObjectId::random(), false).is_err());
    }
}
