use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::element::Element;
use crate::mol::Mol;
use crate::rings::RingInfo;

const SP2_CAPABLE: [Element; 9] = [
    Element::B,
    Element::C,
    Element::N,
    Element::O,
    Element::P,
    Element::S,
    Element::As,
    Element::Se,
    Element::Te,
];

/// Marks Kekulé-form rings that satisfy Hückel's rule as aromatic.
///
/// Rings written with lowercase atoms are already aromatic and are left
/// alone. Perception repeats until no further ring changes, so a ring fused
/// to one that became aromatic in an earlier pass sees its neighbour's
/// aromatic bonds. Returns the number of rings converted.
pub fn perceive_aromaticity(mol: &mut Mol<Atom, Bond>, rings: &RingInfo) -> usize {
    let mut done: Vec<bool> = rings
        .rings()
        .iter()
        .map(|ring| is_fully_aromatic(mol, ring))
        .collect();
    let mut converted = 0;

    loop {
        let newly: Vec<usize> = rings
            .rings()
            .iter()
            .enumerate()
            .filter(|(i, ring)| !done[*i] && is_aromatic_ring(mol, rings, ring))
            .map(|(i, _)| i)
            .collect();
        if newly.is_empty() {
            break;
        }
        for i in newly {
            let ring = &rings.rings()[i];
            set_ring_aromatic(mol, ring);
            done[i] = true;
            converted += 1;
        }
    }

    converted
}

fn is_fully_aromatic(mol: &Mol<Atom, Bond>, ring: &[NodeIndex]) -> bool {
    ring.iter().all(|&a| mol.atom(a).is_aromatic)
        && ring_bond_orders(mol, ring).all(|o| o == BondOrder::Aromatic)
}

fn ring_bond_orders<'a>(
    mol: &'a Mol<Atom, Bond>,
    ring: &'a [NodeIndex],
) -> impl Iterator<Item = BondOrder> + 'a {
    let len = ring.len();
    (0..len).filter_map(move |i| {
        mol.bond_between(ring[i], ring[(i + 1) % len])
            .map(|e| mol.bond(e).order)
    })
}

fn set_ring_aromatic(mol: &mut Mol<Atom, Bond>, ring: &[NodeIndex]) {
    let len = ring.len();
    for i in 0..len {
        mol.atom_mut(ring[i]).is_aromatic = true;
        if let Some(edge) = mol.bond_between(ring[i], ring[(i + 1) % len]) {
            mol.bond_mut(edge).order = BondOrder::Aromatic;
        }
    }
}

fn is_aromatic_ring(mol: &Mol<Atom, Bond>, rings: &RingInfo, ring: &[NodeIndex]) -> bool {
    if ring.len() < 3 {
        return false;
    }
    if !ring
        .iter()
        .all(|&a| SP2_CAPABLE.contains(&mol.atom(a).element))
    {
        return false;
    }
    if ring_bond_orders(mol, ring).any(|o| o == BondOrder::Triple) {
        return false;
    }

    let mut pi_total: u8 = 0;
    for &atom in ring {
        match pi_electrons(mol, rings, atom, ring) {
            Some(e) => pi_total = pi_total.saturating_add(e),
            None => return false,
        }
    }
    is_huckel(pi_total)
}

enum DoubleBond {
    None,
    /// To an atom of this ring or of a fused ring.
    Ring,
    /// To a non-ring heteroatom, e.g. a carbonyl oxygen.
    ExocyclicHetero,
    Exocyclic,
}

fn double_bond_kind(mol: &Mol<Atom, Bond>, rings: &RingInfo, atom: NodeIndex) -> DoubleBond {
    let mut kind = DoubleBond::None;
    for edge in mol.bonds_of(atom) {
        if mol.bond(edge).order != BondOrder::Double {
            continue;
        }
        let Some((a, b)) = mol.bond_endpoints(edge) else {
            continue;
        };
        let partner = if a == atom { b } else { a };
        if rings.is_ring_bond(edge) {
            return DoubleBond::Ring;
        }
        kind = if rings.is_ring_atom(partner) {
            DoubleBond::Ring
        } else if matches!(
            mol.atom(partner).element,
            Element::O | Element::N | Element::S
        ) {
            DoubleBond::ExocyclicHetero
        } else {
            DoubleBond::Exocyclic
        };
    }
    kind
}

fn pi_electrons(
    mol: &Mol<Atom, Bond>,
    rings: &RingInfo,
    idx: NodeIndex,
    ring: &[NodeIndex],
) -> Option<u8> {
    let atom = mol.atom(idx);
    let charge = atom.formal_charge;
    let connections = mol.total_connections(idx);

    if atom.is_aromatic {
        return Some(match atom.element {
            Element::O | Element::S | Element::Se | Element::Te => 2,
            Element::N | Element::P if charge == 0 && connections == 3 => 2,
            Element::C if charge == -1 => 2,
            _ => 1,
        });
    }

    let in_ring_double = mol.bonds_of(idx).any(|e| {
        let order = mol.bond(e).order;
        let partner = mol
            .bond_endpoints(e)
            .map(|(a, b)| if a == idx { b } else { a });
        matches!(order, BondOrder::Double | BondOrder::Aromatic)
            && partner.is_some_and(|p| ring.contains(&p))
    });
    if in_ring_double {
        return Some(1);
    }

    match double_bond_kind(mol, rings, idx) {
        DoubleBond::Ring => return Some(1),
        DoubleBond::ExocyclicHetero if atom.element == Element::C => return Some(0),
        DoubleBond::ExocyclicHetero | DoubleBond::Exocyclic => return None,
        DoubleBond::None => {}
    }

    match atom.element {
        Element::C => match charge {
            -1 => Some(2),
            1 => Some(0),
            _ => None,
        },
        Element::N | Element::P | Element::As => {
            (charge == 0 && connections <= 3).then_some(2)
        }
        Element::O | Element::S | Element::Se | Element::Te => {
            (charge == 0 && mol.degree(idx) == 2).then_some(2)
        }
        Element::B => (charge == 0).then_some(0),
        _ => None,
    }
}

fn is_huckel(pi_electrons: u8) -> bool {
    pi_electrons >= 2 && (pi_electrons - 2) % 4 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_smiles;

    fn aromatic_flags(smiles: &str) -> Vec<bool> {
        let mol = parse_smiles(smiles).unwrap();
        mol.atoms().map(|a| mol.atom(a).is_aromatic).collect()
    }

    #[test]
    fn kekule_benzene_perceived() {
        assert!(aromatic_flags("C1=CC=CC=C1").iter().all(|&a| a));
    }

    #[test]
    fn kekule_bonds_become_aromatic() {
        let mol = parse_smiles("C1=CC=CC=C1").unwrap();
        assert!(mol.bonds().all(|e| mol.bond(e).order == BondOrder::Aromatic));
    }

    #[test]
    fn kekule_heterocycles() {
        assert!(aromatic_flags("C1=CC=NC=C1").iter().all(|&a| a));
        assert!(aromatic_flags("C1=CNC=C1").iter().all(|&a| a));
        assert!(aromatic_flags("C1=COC=C1").iter().all(|&a| a));
        assert!(aromatic_flags("C1=CSC=C1").iter().all(|&a| a));
    }

    #[test]
    fn kekule_naphthalene() {
        assert!(aromatic_flags("C1=CC=C2C=CC=CC2=C1").iter().all(|&a| a));
    }

    #[test]
    fn cyclopentadienyl_anion_aromatic() {
        assert!(aromatic_flags("[CH-]1C=CC=C1").iter().all(|&a| a));
    }

    #[test]
    fn phenol_oxygen_stays_aliphatic() {
        let flags = aromatic_flags("OC1=CC=CC=C1");
        assert!(!flags[0]);
        assert!(flags[1..].iter().all(|&a| a));
    }

    #[test]
    fn pyridone_is_aromatic() {
        let flags = aromatic_flags("O=C1C=CC=CN1");
        assert!(!flags[0]);
        assert!(flags[1..].iter().all(|&a| a));
    }

    #[test]
    fn non_aromatic_rings() {
        assert!(aromatic_flags("C1CCCCC1").iter().all(|&a| !a));
        assert!(aromatic_flags("C1=CCC=C1").iter().all(|&a| !a));
        assert!(aromatic_flags("C1=CC=CC=CC=C1").iter().all(|&a| !a));
        assert!(aromatic_flags("O=C1C=CC(=O)C=C1").iter().all(|&a| !a));
        assert!(aromatic_flags("C=C1C=CC=C1").iter().all(|&a| !a));
    }

    #[test]
    fn huckel_rule() {
        assert!(!is_huckel(0));
        assert!(!is_huckel(1));
        assert!(is_huckel(2));
        assert!(!is_huckel(4));
        assert!(is_huckel(6));
        assert!(!is_huckel(8));
        assert!(is_huckel(10));
        assert!(is_huckel(14));
    }
}
