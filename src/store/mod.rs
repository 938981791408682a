//! Persistence of a reaction network as relational rows.
//!
//! [`Snapshot`] holds one vector of rows per table in [`schema`]. It is
//! written and read as pretty-printed JSON; loading validates every row
//! before a single object is created, then rebuilds the network including
//! its dedup index.

mod error;
pub mod rows;
pub mod schema;

pub use error::Error;

use crate::canon::{Canonicalizer, GraphCanonicalizer};
use crate::model::ensemble::Ensemble;
use crate::model::ids::{ProvenanceId, StateId};
use crate::model::pathway::Pathway;
use crate::model::provenance::Provenance;
use crate::model::state::State;
use crate::network::{NetworkConfig, NetworkParts, ProvenanceLedger, ReactionNetwork};
use rows::{
    EnsembleReactionRow, EnsembleRow, PathwayRow, PathwayStateRow, ProvenanceRow, ReactionRow,
    StateAliasRow, StateRow,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Version written into every snapshot.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    pub version: u32,
    pub provenance: Vec<ProvenanceRow>,
    pub states: Vec<StateRow>,
    #[serde(default)]
    pub state_aliases: Vec<StateAliasRow>,
    #[serde(default)]
    pub pathways: Vec<PathwayRow>,
    #[serde(default)]
    pub pathway_states: Vec<PathwayStateRow>,
    #[serde(default)]
    pub reactions: Vec<ReactionRow>,
    #[serde(default)]
    pub ensembles: Vec<EnsembleRow>,
    #[serde(default)]
    pub ensemble_reactions: Vec<EnsembleReactionRow>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            provenance: Vec::new(),
            states: Vec::new(),
            state_aliases: Vec::new(),
            pathways: Vec::new(),
            pathway_states: Vec::new(),
            reactions: Vec::new(),
            ensembles: Vec::new(),
            ensemble_reactions: Vec::new(),
        }
    }
}

impl Snapshot {
    /// Converts every object in `network` into rows.
    pub fn capture(network: &ReactionNetwork) -> Result<Self, Error> {
        let mut snapshot = Self {
            provenance: network.with_ledger(|ledger| {
                ledger.iter().map(ProvenanceRow::from).collect::<Vec<_>>()
            }),
            ..Self::default()
        };

        for state in network.states() {
            snapshot.states.push(StateRow::from_state(&state)?);
        }
        snapshot.state_aliases = network
            .merged_aliases()
            .into_iter()
            .map(|(alias_id, canonical_id)| StateAliasRow {
                alias_id,
                canonical_id,
            })
            .collect();

        for pathway in network.pathways() {
            snapshot.pathways.push(PathwayRow {
                id: pathway.id(),
                provenance_id: pathway.provenance().id(),
            });
            snapshot
                .pathway_states
                .extend(pathway.states().iter().enumerate().map(|(position, &state_id)| {
                    PathwayStateRow {
                        pathway_id: pathway.id(),
                        position: position as u32,
                        state_id,
                    }
                }));
        }

        for reaction in network.reactions() {
            snapshot.reactions.push(ReactionRow::from_reaction(&reaction)?);
        }

        for ensemble in network.ensembles() {
            snapshot.ensembles.push(EnsembleRow::from(&ensemble));
            snapshot
                .ensemble_reactions
                .extend(ensemble.reactions().iter().enumerate().map(|(position, &reaction_id)| {
                    EnsembleReactionRow {
                        ensemble_id: ensemble.id(),
                        position: position as u32,
                        reaction_id,
                    }
                }));
        }

        Ok(snapshot)
    }

    /// Rebuilds a network using the built-in canonicalizer.
    pub fn restore(self, config: NetworkConfig) -> Result<ReactionNetwork, Error> {
        let canonicalizer = Arc::new(GraphCanonicalizer::new(config.canon.clone()));
        self.restore_with(config, canonicalizer)
    }

    /// Rebuilds a network backed by `canonicalizer`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Contract`] for rows that break the schema contract
    /// and [`Error::Network`] for objects that break network invariants.
    pub fn restore_with(
        self,
        config: NetworkConfig,
        canonicalizer: Arc<dyn Canonicalizer>,
    ) -> Result<ReactionNetwork, Error> {
        if self.version != SNAPSHOT_VERSION {
            return Err(Error::UnsupportedVersion {
                found: self.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        let mut ledger = ProvenanceLedger::new();
        for row in self.provenance {
            let record = row.into_record()?;
            if let Some(parent) = record.parent() {
                if ledger.primary_for(parent.object_id).is_none() {
                    return Err(Error::contract(
                        schema::PROVENANCE,
                        format!(
                            "record {} names parent {} before any record of it",
                            record.id(),
                            parent.object_id
                        ),
                    ));
                }
            }
            ledger.append(record)?;
        }
        let record = |table: &'static str, id: ProvenanceId| -> Result<Provenance, Error> {
            ledger
                .get(id)
                .cloned()
                .ok_or_else(|| Error::contract(table, format!("unknown provenance_id {id}")))
        };

        let mut states = Vec::with_capacity(self.states.len());
        for row in self.states {
            let provenance = record(schema::STATES, row.provenance_id)?;
            states.push(row.into_state(provenance)?);
        }

        let pathways = {
            let by_id: HashMap<StateId, &State> = states.iter().map(|s| (s.id(), s)).collect();
            let mut members = group_positions(
                schema::PATHWAY_STATES,
                self.pathway_states
                    .into_iter()
                    .map(|r| (r.pathway_id, r.position, r.state_id)),
            )?;

            let mut pathways = Vec::with_capacity(self.pathways.len());
            for row in self.pathways {
                let provenance = record(schema::PATHWAYS, row.provenance_id)?;
                let ids = members.remove(&row.id).unwrap_or_default();
                let mut chain = Vec::with_capacity(ids.len());
                for id in ids {
                    chain.push(*by_id.get(&id).ok_or_else(|| {
                        Error::contract(
                            schema::PATHWAY_STATES,
                            format!("pathway {} references unknown state {id}", row.id),
                        )
                    })?);
                }
                pathways.push(Pathway::create(&chain, Some(provenance))?);
            }
            if let Some(orphan) = members.keys().next() {
                return Err(Error::contract(
                    schema::PATHWAY_STATES,
                    format!("rows reference unknown pathway {orphan}"),
                ));
            }
            pathways
        };

        let mut reactions = Vec::with_capacity(self.reactions.len());
        for row in self.reactions {
            let provenance = record(schema::REACTIONS, row.provenance_id)?;
            reactions.push(row.into_reaction(provenance)?);
        }

        let mut members = group_positions(
            schema::ENSEMBLE_REACTIONS,
            self.ensemble_reactions
                .into_iter()
                .map(|r| (r.ensemble_id, r.position, r.reaction_id)),
        )?;
        let mut ensembles = Vec::with_capacity(self.ensembles.len());
        for row in self.ensembles {
            let provenance = record(schema::ENSEMBLES, row.provenance_id)?;
            let mut ensemble = Ensemble::create(row.name, Some(provenance))?;
            for reaction in members.remove(&row.id).unwrap_or_default() {
                if !ensemble.add_reaction(reaction) {
                    return Err(Error::contract(
                        schema::ENSEMBLE_REACTIONS,
                        format!("reaction {reaction} listed twice in ensemble {}", row.id),
                    ));
                }
            }
            ensembles.push(ensemble);
        }
        if let Some(orphan) = members.keys().next() {
            return Err(Error::contract(
                schema::ENSEMBLE_REACTIONS,
                format!("rows reference unknown ensemble {orphan}"),
            ));
        }

        let aliases = self
            .state_aliases
            .into_iter()
            .map(|row| (row.alias_id, row.canonical_id))
            .collect();

        let parts = NetworkParts {
            ledger,
            states,
            aliases,
            pathways,
            reactions,
            ensembles,
        };
        Ok(ReactionNetwork::from_parts(config, canonicalizer, parts)?)
    }

    pub fn to_writer(&self, writer: impl Write) -> Result<(), Error> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, Error> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        let mut writer = BufWriter::new(file);
        self.to_writer(&mut writer)?;
        writer.flush().map_err(|e| Error::io(path, e))
    }

    pub fn read_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        Self::from_reader(BufReader::new(file))
    }
}

/// Groups `(owner, position, member)` rows by owner, ordered by position.
///
/// Positions of each owner must be exactly `0..n`.
fn group_positions<O, M>(
    table: &'static str,
    rows: impl Iterator<Item = (O, u32, M)>,
) -> Result<BTreeMap<O, Vec<M>>, Error>
where
    O: Ord + Copy + std::fmt::Display,
{
    let mut grouped: BTreeMap<O, Vec<(u32, M)>> = BTreeMap::new();
    for (owner, position, member) in rows {
        grouped.entry(owner).or_default().push((position, member));
    }

    let mut ordered = BTreeMap::new();
    for (owner, mut entries) in grouped {
        entries.sort_by_key(|(position, _)| *position);
        for (expected, (position, _)) in entries.iter().enumerate() {
            if *position as usize != expected {
                return Err(Error::contract(
                    table,
                    format!("{owner} has position {position} where {expected} was expected"),
                ));
            }
        }
        ordered.insert(owner, entries.into_iter().map(|(_, m)| m).collect());
    }
    Ok(ordered)
}

/// Writes `network` to `path` as a JSON snapshot.
pub fn save(network: &ReactionNetwork, path: impl AsRef<Path>) -> Result<(), Error> {
    let path = path.as_ref();
    let snapshot = Snapshot::capture(network)?;
    snapshot.write_file(path)?;
    info!(
        path = %path.display(),
        states = snapshot.states.len(),
        reactions = snapshot.reactions.len(),
        records = snapshot.provenance.len(),
        "saved network snapshot"
    );
    Ok(())
}

/// Reads a JSON snapshot from `path` and rebuilds the network.
pub fn load(path: impl AsRef<Path>, config: NetworkConfig) -> Result<ReactionNetwork, Error> {
    let path = path.as_ref();
    let network = Snapshot::read_file(path)?.restore(config)?;
    info!(path = %path.display(), states = network.state_count(), "loaded network snapshot");
    Ok(network)
}
