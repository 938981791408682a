use std::sync::{Arc, Barrier};
use std::thread;

use rxn_ledger::{
    Atom, Bond, BondOrder, DedupStatus, Element, Error, NetworkConfig, ObjectId, ObjectType,
    Origin, Parent, Pathway, Provenance, Reaction, ReactionNetwork, State, StateId, StateKind,
    Structure,
};

fn molecule(elements: &[Element], bonds: &[(usize, usize)]) -> Structure {
    Structure {
        atoms: elements.iter().copied().map(Atom::unplaced).collect(),
        bonds: bonds
            .iter()
            .map(|&(i, j)| Bond::new(i, j, BondOrder::Single))
            .collect(),
    }
}

fn water() -> Structure {
    molecule(&[Element::O, Element::H, Element::H], &[(0, 1), (0, 2)])
}

fn ammonia() -> Structure {
    molecule(
        &[Element::N, Element::H, Element::H, Element::H],
        &[(0, 1), (0, 2), (0, 3)],
    )
}

fn methanol() -> Structure {
    molecule(
        &[
            Element::C,
            Element::O,
            Element::H,
            Element::H,
            Element::H,
            Element::H,
        ],
        &[(0, 1), (0, 2), (0, 3), (0, 4), (1, 5)],
    )
}

fn hydroxylamine() -> Structure {
    molecule(
        &[Element::N, Element::O, Element::H, Element::H, Element::H],
        &[(0, 1), (0, 2), (0, 3), (1, 4)],
    )
}

fn neopentane() -> Structure {
    let mut elements = vec![Element::C];
    let mut bonds = Vec::new();
    for arm in 0..4 {
        let carbon = 1 + arm * 4;
        elements.push(Element::C);
        bonds.push((0, carbon));
        for h in 1..=3 {
            elements.push(Element::H);
            bonds.push((carbon, carbon + h));
        }
    }
    molecule(&elements, &bonds)
}

/// Two propane molecules in one complex.
fn propane_dimer() -> Structure {
    let mut elements = Vec::new();
    let mut bonds = Vec::new();
    for copy in 0..2 {
        let a = copy * 11;
        elements.extend([Element::C; 3]);
        elements.extend([Element::H; 8]);
        bonds.extend([(a, a + 1), (a + 1, a + 2)]);
        bonds.extend([(a, a + 3), (a, a + 4), (a, a + 5)]);
        bonds.extend([(a + 2, a + 6), (a + 2, a + 7), (a + 2, a + 8)]);
        bonds.extend([(a + 1, a + 9), (a + 1, a + 10)]);
    }
    molecule(&elements, &bonds)
}

fn input_state(network: &ReactionNetwork, structure: Structure) -> State {
    State::create(structure, None, network.canonicalizer()).unwrap()
}

fn derived_state(network: &ReactionNetwork, structure: Structure, parent: StateId) -> State {
    let id = StateId::random();
    let record = Provenance::create(
        ObjectType::State,
        id,
        Origin::Fragmentation,
        Some(Parent::new(ObjectType::State, parent)),
    )
    .unwrap();
    State::create(structure, Some(record), network.canonicalizer()).unwrap()
}

fn commit(network: &ReactionNetwork, state: State) -> StateId {
    let admission = network.add_state(state).unwrap();
    assert!(admission.is_new);
    admission.id
}

#[test]
fn relabeled_structure_is_the_same_state() {
    let network = ReactionNetwork::new(NetworkConfig::default());

    let first = network.add_state(input_state(&network, methanol())).unwrap();
    let reordered = methanol().relabeled(&[5, 4, 3, 2, 1, 0]).unwrap();
    let second = network.add_state(input_state(&network, reordered)).unwrap();

    assert!(first.is_new);
    assert!(!second.is_new);
    assert_eq!(second.id, first.id);
    assert_eq!(network.state_count(), 1);
}

#[test]
fn adding_equal_instances_twice_is_idempotent() {
    let network = ReactionNetwork::default();
    let a = input_state(&network, water());
    let b = input_state(&network, water());
    assert_ne!(a.id(), b.id());
    assert_eq!(a.graph_hash(), b.graph_hash());
    assert_eq!(a.canonical_notation(), b.canonical_notation());

    let first = network.add_state(a).unwrap();
    let alias = b.id();
    let second = network.add_state(b).unwrap();

    assert_eq!(second.id, first.id);
    assert!(!second.is_new);
    assert_eq!(network.status_of(alias), DedupStatus::Merged(first.id));
    assert_eq!(network.status_of(first.id), DedupStatus::Canonical);
}

#[test]
fn symmetric_molecules_and_homodimers_are_admitted() {
    let network = ReactionNetwork::default();

    let neo = commit(&network, input_state(&network, neopentane()));
    let reversed: Vec<usize> = (0..17).rev().collect();
    let again = input_state(&network, neopentane().relabeled(&reversed).unwrap());
    assert_eq!(network.add_state(again).unwrap().id, neo);

    let dimer = commit(&network, input_state(&network, propane_dimer()));
    let swapped: Vec<usize> = (11..22).chain(0..11).collect();
    let again = input_state(&network, propane_dimer().relabeled(&swapped).unwrap());
    let admission = network.add_state(again).unwrap();
    assert!(!admission.is_new);
    assert_eq!(admission.id, dimer);
    assert_eq!(network.state(dimer).unwrap().formula(), "C6 H16");
}

#[test]
fn two_to_one_reaction_is_accepted() {
    let network = ReactionNetwork::default();
    let water = network
        .state(commit(&network, input_state(&network, water())))
        .unwrap();
    let ammonia = network
        .state(commit(&network, input_state(&network, ammonia())))
        .unwrap();
    let product = commit(&network, input_state(&network, hydroxylamine()));

    let reaction = Reaction::builder()
        .reactants([water.id(), ammonia.id()])
        .product(product)
        .complexes(&water, &ammonia)
        .build(None)
        .unwrap();
    let id = network.add_reaction(reaction).unwrap();

    let stored = network.reaction(id).unwrap();
    assert_eq!(stored.number_reactants(), 2);
    assert_eq!(stored.number_products(), 1);
    assert_eq!(stored.transition_state(), None);
    assert_eq!(stored.pathway(), None);
    assert!(network.state(stored.reactant_complex()).is_some());
    assert!(network.state(stored.product_complex()).is_some());
    assert_eq!(
        stored.reactant_slots().iter().flatten().count(),
        stored.number_reactants()
    );
}

#[test]
fn repeated_consecutive_state_breaks_pathway_order() {
    let network = ReactionNetwork::default();
    let a = input_state(&network, water());
    let b = input_state(&network, water().relabeled(&[2, 1, 0]).unwrap());

    let err = Pathway::create(&[&a, &b], None).unwrap_err();
    assert!(matches!(err, Error::PathwayOrder { position: 1, .. }));
}

#[test]
fn reaction_with_unknown_state_is_dangling() {
    let network = ReactionNetwork::default();
    let water = network
        .state(commit(&network, input_state(&network, water())))
        .unwrap();
    let stranger = StateId::random();

    let reaction = Reaction::builder()
        .reactant(water.id())
        .product(stranger)
        .complexes(&water, &water)
        .build(None)
        .unwrap();

    let err = network.add_reaction(reaction).unwrap_err();
    assert!(matches!(
        err,
        Error::DanglingReference { kind: ObjectType::State, id } if id == ObjectId::from(stranger)
    ));
    assert_eq!(network.reaction_count(), 0);
}

#[test]
fn prune_keeps_inputs_and_drops_unreferenced_derivations() {
    let mut network = ReactionNetwork::default();
    let input = commit(&network, input_state(&network, water()));
    assert!(network.prune_unreferenced().is_empty());
    assert_eq!(network.state_count(), 1);

    let derived = derived_state(&network, ammonia(), input);
    let derived_record = derived.provenance().id();
    let derived = commit(&network, derived);

    assert_eq!(network.prune_unreferenced(), vec![derived]);
    assert!(network.state(derived).is_none());
    assert_eq!(network.status_of(derived), DedupStatus::Proposed);
    assert!(network.state(input).is_some());

    let audit = network.with_ledger(|ledger| ledger.get(derived_record).cloned());
    assert_eq!(audit.map(|r| r.object_id()), Some(ObjectId::from(derived)));
    assert!(
        network
            .states()
            .iter()
            .all(|s| s.provenance().id() != derived_record)
    );
}

#[test]
fn lineage_terminates_at_the_input() {
    let network = ReactionNetwork::default();
    let root = commit(&network, input_state(&network, methanol()));
    let child = commit(&network, derived_state(&network, water(), root));
    let grandchild = commit(&network, derived_state(&network, ammonia(), child));

    let chain: Vec<_> = network
        .lineage_of(grandchild)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    let objects: Vec<_> = chain.iter().map(Provenance::object_id).collect();

    assert_eq!(
        objects,
        vec![
            ObjectId::from(grandchild),
            ObjectId::from(child),
            ObjectId::from(root),
        ]
    );
    assert!(chain.last().unwrap().is_input());
}

#[test]
fn rediscovery_is_recorded_as_alternate_derivation() {
    let network = ReactionNetwork::default();
    let root = commit(&network, input_state(&network, methanol()));
    let water = commit(&network, input_state(&network, water()));

    let again = derived_state(&network, water_reordered(), root);
    let alias = again.id();
    let admission = network.add_state(again).unwrap();
    assert_eq!(admission.id, water);

    let records = network.records_for(water);
    assert_eq!(records.len(), 2);
    assert!(records[0].is_input());
    assert_eq!(records[1].origin(), Origin::Fragmentation);
    assert_eq!(records[1].object_id(), ObjectId::from(water));

    // The alias resolves to the canonical lineage.
    let chain: Vec<_> = network.lineage_of(alias).unwrap().collect::<Result<_, _>>().unwrap();
    assert_eq!(chain.len(), 1);
    assert_eq!(network.resolve(alias), Some(water));
}

fn water_reordered() -> Structure {
    water().relabeled(&[1, 0, 2]).unwrap()
}

#[test]
fn disabled_alternate_recording_leaves_ledger_untouched() {
    let config = NetworkConfig {
        record_alternate_provenance: false,
        ..NetworkConfig::default()
    };
    let network = ReactionNetwork::new(config);
    let root = commit(&network, input_state(&network, methanol()));
    let water = commit(&network, input_state(&network, water()));
    let before = network.provenance_count();

    let admission = network
        .add_state(derived_state(&network, water_reordered(), root))
        .unwrap();

    assert_eq!(admission.id, water);
    assert_eq!(network.provenance_count(), before);
}

#[test]
fn concurrent_admission_keeps_one_canonical_state() {
    const THREADS: usize = 8;

    let network = Arc::new(ReactionNetwork::default());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let network = Arc::clone(&network);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let structure = if i % 2 == 0 { methanol() } else { methanol_reordered() };
                let state = State::builder(structure)
                    .kind(StateKind::Point)
                    .build(network.canonicalizer())
                    .unwrap();
                barrier.wait();
                network.add_state(state).unwrap()
            })
        })
        .collect();

    let admissions: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(admissions.iter().filter(|a| a.is_new).count(), 1);
    let canonical = admissions[0].id;
    assert!(admissions.iter().all(|a| a.id == canonical));
    assert_eq!(network.state_count(), 1);
    assert_eq!(network.merged_aliases().len(), THREADS - 1);
    assert_eq!(network.records_for(canonical).len(), THREADS);
}

fn methanol_reordered() -> Structure {
    methanol().relabeled(&[1, 0, 5, 4, 3, 2]).unwrap()
}

#[test]
fn lineage_cannot_be_made_circular() {
    let network = ReactionNetwork::default();
    let root = commit(&network, input_state(&network, methanol()));
    let (a, b) = (StateId::random(), StateId::random());

    let record = |id: StateId, parent: StateId| {
        Provenance::create(
            ObjectType::State,
            id,
            Origin::Fragmentation,
            Some(Parent::new(ObjectType::State, parent)),
        )
        .unwrap()
    };
    let state = |structure: Structure, id: StateId, parent: StateId| {
        State::create(structure, Some(record(id, parent)), network.canonicalizer()).unwrap()
    };

    let err = network.add_state(state(water(), a, b)).unwrap_err();
    assert!(matches!(err, Error::DanglingReference { id, .. } if id == ObjectId::from(b)));

    // b is admitted from the root, after which a may point at it.
    assert!(network.add_state(state(ammonia(), b, root)).unwrap().is_new);
    assert!(network.add_state(state(water(), a, b)).unwrap().is_new);

    let chain: Vec<_> = network.lineage_of(a).unwrap().collect::<Result<_, _>>().unwrap();
    let objects: Vec<_> = chain.iter().map(Provenance::object_id).collect();
    assert_eq!(
        objects,
        vec![ObjectId::from(a), ObjectId::from(b), ObjectId::from(root)]
    );
}

#[test]
fn input_provenance_rules_are_enforced() {
    let id = StateId::random();
    let parent = Parent::new(ObjectType::State, StateId::random());

    assert!(matches!(
        Provenance::create(ObjectType::State, id, Origin::Input, Some(parent)),
        Err(Error::InvalidProvenance(_))
    ));
    assert!(matches!(
        Provenance::create(ObjectType::State, id, Origin::Recombination, None),
        Err(Error::InvalidProvenance(_))
    ));
}
