use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::element::Element;
use crate::mol::Mol;
use crate::smiles::error::SmilesError;
use crate::smiles::parse_tree::{ParseAtom, ParseTree};
use crate::smiles::tokenizer::BondToken;

/// Builds the heavy-atom graph from a parse tree.
///
/// Returns the molecule together with the input position of every atom, in
/// node order, so later validation can point back into the string.
pub fn build_mol(tree: &ParseTree) -> Result<(Mol<Atom, Bond>, Vec<usize>), SmilesError> {
    let hydrogens = tree
        .atoms
        .iter()
        .enumerate()
        .map(|(i, atom)| hydrogen_count(tree, i, atom))
        .collect::<Result<Vec<u8>, SmilesError>>()?;

    let folded: Vec<bool> = tree
        .atoms
        .iter()
        .map(|atom| is_foldable_hydrogen(tree, atom))
        .collect();

    let mut mol = Mol::new();
    let mut node_of: Vec<Option<NodeIndex>> = vec![None; tree.atoms.len()];
    let mut positions = Vec::with_capacity(tree.atoms.len());

    for (i, parse_atom) in tree.atoms.iter().enumerate() {
        if folded[i] {
            continue;
        }
        let atom = Atom {
            element: parse_atom.element,
            formal_charge: parse_atom.charge,
            isotope: parse_atom.isotope,
            hydrogen_count: hydrogens[i],
            is_aromatic: parse_atom.is_aromatic,
        };
        node_of[i] = Some(mol.add_atom(atom));
        positions.push(parse_atom.pos);
    }

    for (i, parse_atom) in tree.atoms.iter().enumerate() {
        for neighbor in &parse_atom.neighbors {
            let j = neighbor.atom_idx;
            if j < i {
                continue;
            }
            match (node_of[i], node_of[j]) {
                (Some(a), Some(b)) => {
                    let order = resolve_bond_order(
                        neighbor.bond,
                        parse_atom.is_aromatic,
                        tree.atoms[j].is_aromatic,
                    );
                    mol.add_bond(a, b, Bond::new(order));
                }
                (Some(heavy), None) | (None, Some(heavy)) => {
                    let atom = mol.atom_mut(heavy);
                    atom.hydrogen_count = atom.hydrogen_count.saturating_add(1);
                }
                (None, None) => {}
            }
        }
    }

    Ok((mol, positions))
}

/// A plain `[H]` with a single heavy neighbour becomes part of that
/// neighbour's hydrogen count.
fn is_foldable_hydrogen(tree: &ParseTree, atom: &ParseAtom) -> bool {
    atom.element == Element::H
        && atom.isotope == 0
        && atom.charge == 0
        && atom.hcount.unwrap_or(0) == 0
        && atom.neighbors.len() == 1
        && tree.atoms[atom.neighbors[0].atom_idx].element != Element::H
}

fn resolve_bond_order(
    bond_tok: Option<BondToken>,
    from_aromatic: bool,
    to_aromatic: bool,
) -> BondOrder {
    match bond_tok {
        Some(BondToken::Single) | Some(BondToken::Directional) => BondOrder::Single,
        Some(BondToken::Double) => BondOrder::Double,
        Some(BondToken::Triple) => BondOrder::Triple,
        Some(BondToken::Aromatic) => BondOrder::Aromatic,
        None if from_aromatic && to_aromatic => BondOrder::Aromatic,
        None => BondOrder::Single,
    }
}

fn bond_order_sum(tree: &ParseTree, idx: usize) -> u8 {
    let atom = &tree.atoms[idx];
    atom.neighbors
        .iter()
        .map(|n| {
            resolve_bond_order(n.bond, atom.is_aromatic, tree.atoms[n.atom_idx].is_aromatic)
                .valence_contribution()
        })
        .fold(0u8, |acc, v| acc.saturating_add(v))
}

/// Hydrogens carried by atom `idx` before `[H]` folding.
///
/// Bracket atoms state their count; organic-subset atoms take the smallest
/// default valence that fits their bonds, one less when aromatic.
fn hydrogen_count(tree: &ParseTree, idx: usize, atom: &ParseAtom) -> Result<u8, SmilesError> {
    if atom.is_bracket {
        return Ok(atom.hcount.unwrap_or(0));
    }

    let valences = atom.element.default_valences();
    let sum = bond_order_sum(tree, idx);
    let max = valences.iter().copied().max().unwrap_or(0);
    if sum > max {
        return Err(SmilesError::ValenceExceeded {
            pos: atom.pos,
            symbol: atom.element.symbol(),
            valence: sum,
        });
    }

    let target = valences.iter().copied().find(|&v| v >= sum).unwrap_or(sum);
    let mut h = target - sum;
    if atom.is_aromatic && h > 0 {
        h -= 1;
    }
    Ok(h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_tree::build_parse_tree;
    use crate::smiles::tokenizer::tokenize;

    fn build(s: &str) -> Result<Mol<Atom, Bond>, SmilesError> {
        let tree = build_parse_tree(&tokenize(s)?)?;
        build_mol(&tree).map(|(mol, _)| mol)
    }

    fn h(mol: &Mol<Atom, Bond>, i: usize) -> u8 {
        mol.atom(NodeIndex::new(i)).hydrogen_count
    }

    #[test]
    fn implicit_hydrogens() {
        let mol = build("CC(=O)O").unwrap();
        assert_eq!(h(&mol, 0), 3);
        assert_eq!(h(&mol, 1), 0);
        assert_eq!(h(&mol, 2), 0);
        assert_eq!(h(&mol, 3), 1);
    }

    #[test]
    fn bracket_atoms_keep_stated_count() {
        assert_eq!(h(&build("[CH4]").unwrap(), 0), 4);
        assert_eq!(h(&build("[C]").unwrap(), 0), 0);
        assert_eq!(h(&build("[NH4+]").unwrap(), 0), 4);
    }

    #[test]
    fn hypervalent_defaults() {
        let mol = build("CS(=O)(=O)O").unwrap();
        assert_eq!(h(&mol, 1), 0);
        let mol = build("CP(C)C").unwrap();
        assert_eq!(h(&mol, 1), 0);
    }

    #[test]
    fn aromatic_hydrogens() {
        let mol = build("c1ccncc1").unwrap();
        assert_eq!(h(&mol, 0), 1);
        assert_eq!(h(&mol, 3), 0);
        let mol = build("c1ccsc1").unwrap();
        assert_eq!(h(&mol, 3), 0);
    }

    #[test]
    fn explicit_hydrogen_is_folded() {
        let mol = build("[H]C([H])([H])[H]").unwrap();
        assert_eq!(mol.atom_count(), 1);
        assert_eq!(h(&mol, 0), 4);
        let mol = build("[H][H]").unwrap();
        assert_eq!(mol.atom_count(), 2);
    }

    #[test]
    fn pentavalent_carbon_rejected() {
        assert!(matches!(
            build("CC(C)(C)(C)C"),
            Err(SmilesError::ValenceExceeded { symbol: "C", valence: 5, .. })
        ));
    }

    #[test]
    fn aromatic_single_bond_kept() {
        let mol = build("c1ccccc1-c1ccccc1").unwrap();
        let link = mol
            .bond_between(NodeIndex::new(5), NodeIndex::new(6))
            .unwrap();
        assert_eq!(mol.bond(link).order, BondOrder::Single);
    }
}
