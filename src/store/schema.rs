//! Relational schema for persisting a reaction network.
//!
//! The crate does not ship a database engine; these statements are the
//! contract a relational backend must implement. [`Snapshot`](super::Snapshot)
//! rows mirror the tables column for column.

pub const PROVENANCE: &str = "provenance";
pub const STATES: &str = "states";
pub const STATE_ALIASES: &str = "state_aliases";
pub const PATHWAYS: &str = "pathways";
pub const PATHWAY_STATES: &str = "pathway_states";
pub const REACTIONS: &str = "reactions";
pub const ENSEMBLES: &str = "ensembles";
pub const ENSEMBLE_REACTIONS: &str = "ensemble_reactions";

pub const CREATE_PROVENANCE_TABLE: &str = r#"
CREATE TABLE provenance (
    id                      TEXT NOT NULL PRIMARY KEY,
    object_type             INTEGER NOT NULL CHECK (object_type BETWEEN 1 AND 6),
    object_id               TEXT NOT NULL,
    origin_type             INTEGER NOT NULL CHECK (origin_type BETWEEN 1 AND 6),
    parent_type             INTEGER CHECK (parent_type BETWEEN 1 AND 6),
    parent_id               TEXT,
    calc_method             TEXT,
    level_of_theory         TEXT,
    "index"                 INTEGER,
    path                    TEXT,
    CHECK ((origin_type = 1) = (parent_type IS NULL AND parent_id IS NULL)),
    CHECK ((parent_type IS NULL) = (parent_id IS NULL))
);
"#;

pub const CREATE_STATE_TABLE: &str = r#"
CREATE TABLE states (
    id                      TEXT NOT NULL PRIMARY KEY,
    provenance_id           TEXT NOT NULL REFERENCES provenance (id),
    alphabetical_formula    TEXT NOT NULL,
    graph_hash              TEXT NOT NULL,
    canonical_notation      TEXT NOT NULL,
    alternate_canonical_id  TEXT NOT NULL,
    charge                  INTEGER NOT NULL,
    spin                    INTEGER NOT NULL CHECK (spin >= 1),
    energy                  REAL,
    enthalpy_298            REAL,
    entropy_298             REAL,
    free_energy_298         REAL,
    structure               TEXT NOT NULL
);
CREATE INDEX states_dedup ON states (graph_hash, charge, spin);
"#;

pub const CREATE_STATE_ALIAS_TABLE: &str = r#"
CREATE TABLE state_aliases (
    alias_id                TEXT NOT NULL PRIMARY KEY,
    canonical_id            TEXT NOT NULL REFERENCES states (id)
);
"#;

pub const CREATE_PATHWAY_TABLES: &str = r#"
CREATE TABLE pathways (
    id                      TEXT NOT NULL PRIMARY KEY,
    provenance_id           TEXT NOT NULL REFERENCES provenance (id)
);
CREATE TABLE pathway_states (
    pathway_id              TEXT NOT NULL REFERENCES pathways (id),
    position                INTEGER NOT NULL CHECK (position >= 0),
    state_id                TEXT NOT NULL REFERENCES states (id),
    PRIMARY KEY (pathway_id, position)
);
"#;

pub const CREATE_REACTION_TABLE: &str = r#"
CREATE TABLE reactions (
    id                      TEXT NOT NULL PRIMARY KEY,
    provenance_id           TEXT NOT NULL REFERENCES provenance (id),
    number_reactants        INTEGER NOT NULL CHECK (number_reactants BETWEEN 0 AND 3),
    number_products         INTEGER NOT NULL CHECK (number_products BETWEEN 0 AND 3),
    reactant_1_id           TEXT REFERENCES states (id),
    reactant_2_id           TEXT REFERENCES states (id),
    reactant_3_id           TEXT REFERENCES states (id),
    reactant_complex_id     TEXT NOT NULL REFERENCES states (id),
    product_1_id            TEXT REFERENCES states (id),
    product_2_id            TEXT REFERENCES states (id),
    product_3_id            TEXT REFERENCES states (id),
    product_complex_id      TEXT NOT NULL REFERENCES states (id),
    transition_state_id     TEXT REFERENCES states (id),
    pathway_id              TEXT REFERENCES pathways (id),
    dE                      REAL,
    dH_298                  REAL,
    dS_298                  REAL,
    dG_298                  REAL
);
CREATE INDEX reactions_counts ON reactions (number_reactants, number_products);
"#;

pub const CREATE_ENSEMBLE_TABLES: &str = r#"
CREATE TABLE ensembles (
    id                      TEXT NOT NULL PRIMARY KEY,
    provenance_id           TEXT NOT NULL REFERENCES provenance (id),
    name                    TEXT NOT NULL
);
CREATE TABLE ensemble_reactions (
    ensemble_id             TEXT NOT NULL REFERENCES ensembles (id),
    position                INTEGER NOT NULL CHECK (position >= 0),
    reaction_id             TEXT NOT NULL REFERENCES reactions (id),
    PRIMARY KEY (ensemble_id, position),
    UNIQUE (ensemble_id, reaction_id)
);
"#;

/// Every statement, in an order that satisfies foreign keys.
pub const ALL: [&str; 6] = [
    CREATE_PROVENANCE_TABLE,
    CREATE_STATE_TABLE,
    CREATE_STATE_ALIAS_TABLE,
    CREATE_PATHWAY_TABLES,
    CREATE_REACTION_TABLE,
    CREATE_ENSEMBLE_TABLES,
];

/// The whole schema as a single script.
pub fn ddl() -> String {
    ALL.iter().map(|s| s.trim()).collect::<Vec<_>>().join("\n\n")
}
