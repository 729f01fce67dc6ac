use crate::*;
use petgraph::graph::NodeIndex;

fn carbon(hydrogen_count: u8) -> Atom {
    Atom {
        element: Element::C,
        hydrogen_count,
        ..Atom::default()
    }
}

#[test]
fn mol_add_atoms_and_bonds() {
    let mut mol = Mol::<Atom, Bond>::new();
    let c = mol.add_atom(carbon(0));
    let o = mol.add_atom(Atom {
        element: Element::O,
        ..Atom::default()
    });
    let bond_idx = mol.add_bond(c, o, Bond::new(BondOrder::Double));

    assert_eq!(mol.atom_count(), 2);
    assert_eq!(mol.bond_count(), 1);
    assert_eq!(mol.atom(c).atomic_num(), 6);
    assert_eq!(mol.atom(o).atomic_num(), 8);
    assert_eq!(mol.bond(bond_idx).order, BondOrder::Double);
}

#[test]
fn mol_neighbors_and_bonds_of() {
    let mut mol = Mol::<Atom, Bond>::new();
    let a = mol.add_atom(carbon(2));
    let b = mol.add_atom(carbon(3));
    let c = mol.add_atom(carbon(3));
    mol.add_bond(a, b, Bond::default());
    mol.add_bond(a, c, Bond::default());

    assert_eq!(mol.neighbors(a).count(), 2);
    assert_eq!(mol.bonds_of(a).count(), 2);
    assert_eq!(mol.degree(b), 1);
    assert_eq!(mol.total_connections(a), 4);
}

#[test]
fn mol_bond_between_and_endpoints() {
    let mut mol = Mol::<Atom, Bond>::new();
    let a = mol.add_atom(Atom::default());
    let b = mol.add_atom(Atom::default());
    let c = mol.add_atom(Atom::default());
    let e = mol.add_bond(a, b, Bond::default());

    assert_eq!(mol.bond_between(a, b), Some(e));
    assert_eq!(mol.bond_between(b, a), Some(e));
    assert_eq!(mol.bond_between(a, c), None);

    let (src, dst) = mol.bond_endpoints(e).unwrap();
    assert!((src == a && dst == b) || (src == b && dst == a));
}

#[test]
fn mol_atom_mut() {
    let mut mol = Mol::<Atom, Bond>::new();
    let idx = mol.add_atom(Atom::default());
    mol.atom_mut(idx).element = Element::N;
    assert_eq!(mol.atom(idx).atomic_num(), 7);
}

#[test]
fn explicit_valence_counts_aromatic_as_one() {
    let mol = parse_smiles("c1ccccc1C=O").unwrap();
    assert_eq!(mol.explicit_valence(NodeIndex::new(0)), 2);
    assert_eq!(mol.explicit_valence(NodeIndex::new(5)), 3);
    assert_eq!(mol.explicit_valence(NodeIndex::new(6)), 3);
}

#[test]
fn atom_default() {
    let atom = Atom::default();
    assert_eq!(atom.element, Element::C);
    assert_eq!(atom.formal_charge, 0);
    assert_eq!(atom.isotope, 0);
    assert_eq!(atom.hydrogen_count, 0);
    assert!(!atom.is_aromatic);
}

#[test]
fn atom_mass_uses_isotope() {
    let c13 = Atom {
        isotope: 13,
        ..Atom::default()
    };
    assert!((c13.mass() - 13.003_354_835_07).abs() < 1e-9);
    assert!((Atom::default().mass() - 12.0).abs() < 1e-12);
}

#[test]
fn bond_order_default_is_single() {
    assert_eq!(BondOrder::default(), BondOrder::Single);
}

#[test]
fn mol_default() {
    let mol = Mol::<Atom, Bond>::default();
    assert_eq!(mol.atom_count(), 0);
    assert_eq!(mol.bond_count(), 0);
}

#[test]
fn mol_graph_access() {
    let mut mol = Mol::<Atom, Bond>::new();
    mol.add_atom(Atom::default());
    assert_eq!(mol.graph().node_count(), 1);
}

#[test]
fn pipeline_from_crate_root() {
    let pipeline = Pipeline::standard(PipelineConfig::default()).unwrap();
    let session = pipeline.session();
    pipeline.upload(&session, &["Nc1ccc(Br)cc1", "OCCO", "not a smiles"]);
    let eval = pipeline
        .evaluate(&session, &FilterCriteria::default().include(["Br"]))
        .unwrap();
    assert_eq!(eval.filtered.len(), 1);
    assert_eq!(eval.filtered.rows()[0].smiles(), "Nc1ccc(Br)cc1");
    assert_eq!(eval.similarity, vec![1.0]);
    assert_eq!(eval.summary.dropped, 1);
}

#[test]
fn mol_equality_compares_atoms_bonds_and_endpoints() {
    let ethanol = parse_smiles("CCO").unwrap();
    assert_eq!(ethanol, parse_smiles("CCO").unwrap());
    assert_ne!(ethanol, parse_smiles("OCC").unwrap());
    assert_ne!(ethanol, parse_smiles("CC=O").unwrap());
    assert_ne!(ethanol, parse_smiles("CC").unwrap());
}
