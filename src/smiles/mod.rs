mod builder;
pub mod error;
mod parse_tree;
mod tokenizer;

use crate::aromaticity::perceive_aromaticity;
use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::Mol;
use crate::rings::RingInfo;
pub use error::SmilesError;

/// Parses a SMILES string into a hydrogen-suppressed molecular graph.
///
/// Kekulé rings that satisfy Hückel's rule come back aromatic, so the two
/// spellings of benzene produce the same graph.
pub fn parse_smiles(s: &str) -> Result<Mol<Atom, Bond>, SmilesError> {
    parse_with_rings(s).map(|(mol, _)| mol)
}

/// Like [`parse_smiles`], also returning the ring perception that validation
/// and aromaticity already needed.
pub fn parse_with_rings(s: &str) -> Result<(Mol<Atom, Bond>, RingInfo), SmilesError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(SmilesError::EmptyInput);
    }
    let tokens = tokenizer::tokenize(trimmed)?;
    let tree = parse_tree::build_parse_tree(&tokens)?;
    let (mut mol, positions) = builder::build_mol(&tree)?;

    let rings = RingInfo::sssr(&mol);
    if let Some(stray) = mol
        .atoms()
        .find(|&a| mol.atom(a).is_aromatic && !rings.is_ring_atom(a))
    {
        return Err(SmilesError::AromaticOutsideRing {
            pos: positions.get(stray.index()).copied().unwrap_or(0),
        });
    }

    perceive_aromaticity(&mut mol, &rings);
    Ok((mol, rings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond::BondOrder;
    use crate::element::Element;
    use petgraph::graph::NodeIndex;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn atom(mol: &Mol<Atom, Bond>, i: usize) -> &Atom {
        mol.atom(n(i))
    }

    #[test]
    fn methane() {
        let mol = parse_smiles("C").unwrap();
        assert_eq!(mol.atom_count(), 1);
        assert_eq!(mol.bond_count(), 0);
        assert_eq!(atom(&mol, 0).element, Element::C);
        assert_eq!(atom(&mol, 0).hydrogen_count, 4);
    }

    #[test]
    fn ethyne() {
        let mol = parse_smiles("C#C").unwrap();
        assert_eq!(atom(&mol, 0).hydrogen_count, 1);
        let edge = mol.bond_between(n(0), n(1)).unwrap();
        assert_eq!(mol.bond(edge).order, BondOrder::Triple);
    }

    #[test]
    fn halides() {
        let cases = [
            ("F", Element::F),
            ("Cl", Element::Cl),
            ("Br", Element::Br),
            ("I", Element::I),
        ];
        for (smiles, element) in cases {
            let mol = parse_smiles(smiles).unwrap();
            assert_eq!(atom(&mol, 0).element, element);
            assert_eq!(atom(&mol, 0).hydrogen_count, 1);
        }
    }

    #[test]
    fn neopentane() {
        let mol = parse_smiles("CC(C)(C)C").unwrap();
        assert_eq!(mol.atom_count(), 5);
        assert_eq!(atom(&mol, 1).hydrogen_count, 0);
        assert_eq!(mol.degree(n(1)), 4);
    }

    #[test]
    fn charged_bracket_atoms() {
        let mol = parse_smiles("C[N+](=O)[O-]").unwrap();
        assert_eq!(atom(&mol, 1).formal_charge, 1);
        assert_eq!(atom(&mol, 3).formal_charge, -1);
        assert_eq!(atom(&mol, 3).hydrogen_count, 0);
    }

    #[test]
    fn isotopes() {
        assert_eq!(atom(&parse_smiles("[13CH4]").unwrap(), 0).isotope, 13);
        let mol = parse_smiles("[2H]").unwrap();
        assert_eq!(atom(&mol, 0).element, Element::H);
        assert_eq!(atom(&mol, 0).isotope, 2);
    }

    #[test]
    fn pyrrole_and_furan() {
        let mol = parse_smiles("[nH]1cccc1").unwrap();
        assert_eq!(atom(&mol, 0).hydrogen_count, 1);
        assert!(mol.atoms().all(|a| mol.atom(a).is_aromatic));
        let mol = parse_smiles("o1cccc1").unwrap();
        assert_eq!(atom(&mol, 0).hydrogen_count, 0);
    }

    #[test]
    fn salt_components() {
        let mol = parse_smiles("[Na+].[Cl-]").unwrap();
        assert_eq!(mol.atom_count(), 2);
        assert_eq!(mol.bond_count(), 0);
    }

    #[test]
    fn kekule_and_aromatic_spellings_agree() {
        let a = parse_smiles("C1=CC=CC=C1N").unwrap();
        let b = parse_smiles("c1ccccc1N").unwrap();
        for i in 0..7 {
            assert_eq!(atom(&a, i), atom(&b, i));
        }
    }

    #[test]
    fn caffeine() {
        let mol = parse_smiles("CN1C=NC2=C1C(=O)N(C(=O)N2C)C").unwrap();
        assert_eq!(mol.atom_count(), 14);
        assert_eq!(mol.bond_count(), 15);
    }

    #[test]
    fn whitespace_is_trimmed() {
        assert_eq!(parse_smiles("  CCO \n").unwrap().atom_count(), 3);
    }

    #[test]
    fn malformed_inputs() {
        assert!(matches!(parse_smiles(""), Err(SmilesError::EmptyInput)));
        assert!(matches!(parse_smiles("   "), Err(SmilesError::EmptyInput)));
        assert!(parse_smiles("C(C").is_err());
        assert!(parse_smiles("C)C").is_err());
        assert!(parse_smiles("C1CC").is_err());
        assert!(parse_smiles("X").is_err());
        assert!(parse_smiles("[C").is_err());
        assert!(parse_smiles("not-a-molecule").is_err());
    }

    #[test]
    fn aromatic_atom_outside_ring() {
        assert!(matches!(
            parse_smiles("Cc"),
            Err(SmilesError::AromaticOutsideRing { pos: 1 })
        ));
    }
}
