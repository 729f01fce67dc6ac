use crate::element::Element;
use crate::smiles::error::SmilesError;
use crate::smiles::tokenizer::{AtomToken, BondToken, Token};

#[derive(Debug, Clone)]
pub struct ParseAtom {
    pub element: Element,
    pub is_aromatic: bool,
    pub isotope: u16,
    pub hcount: Option<u8>,
    pub charge: i8,
    pub is_bracket: bool,
    pub pos: usize,
    pub neighbors: Vec<Neighbor>,
}

#[derive(Debug, Clone)]
pub struct Neighbor {
    pub bond: Option<BondToken>,
    pub atom_idx: usize,
}

#[derive(Debug, Clone)]
pub struct ParseTree {
    pub atoms: Vec<ParseAtom>,
}

struct RingOpen {
    atom: usize,
    bond: Option<BondToken>,
}

pub fn build_parse_tree(tokens: &[Token]) -> Result<ParseTree, SmilesError> {
    let mut atoms: Vec<ParseAtom> = Vec::new();
    let mut stack: Vec<(usize, usize)> = Vec::new();
    let mut current: Option<usize> = None;
    let mut pending_bond: Option<(BondToken, usize)> = None;
    let mut ring_opens: Vec<Option<RingOpen>> = (0..100).map(|_| None).collect();

    for token in tokens {
        match token {
            Token::Atom(atom_tok) => {
                let idx = atoms.len();
                atoms.push(parse_atom_from_token(atom_tok));

                match current {
                    Some(cur) => {
                        let bond = pending_bond.take().map(|(b, _)| b);
                        connect(&mut atoms, cur, idx, bond);
                    }
                    None => {
                        if let Some((_, pos)) = pending_bond {
                            return Err(SmilesError::DanglingBond { pos });
                        }
                    }
                }

                current = Some(idx);
            }
            Token::Bond(b, pos) => {
                if current.is_none() || pending_bond.is_some() {
                    return Err(SmilesError::DanglingBond { pos: *pos });
                }
                pending_bond = Some((*b, *pos));
            }
            Token::RingClosure { bond, digit, pos } => {
                let cur = current.ok_or(SmilesError::InvalidRingBond {
                    digit: *digit,
                    pos: *pos,
                })?;
                let slot = &mut ring_opens[usize::from(*digit)];

                match slot.take() {
                    Some(open) => {
                        let ring_bond = match (*bond, open.bond) {
                            (None, None) => None,
                            (Some(b), None) | (None, Some(b)) => Some(b),
                            (Some(b1), Some(b2)) if b1 == b2 => Some(b1),
                            (Some(_), Some(_)) => {
                                return Err(SmilesError::RingBondConflict { digit: *digit });
                            }
                        };
                        if open.atom == cur
                            || atoms[cur].neighbors.iter().any(|n| n.atom_idx == open.atom)
                        {
                            return Err(SmilesError::DuplicateBond { digit: *digit });
                        }
                        connect(&mut atoms, open.atom, cur, ring_bond);
                    }
                    None => {
                        *slot = Some(RingOpen {
                            atom: cur,
                            bond: *bond,
                        });
                    }
                }
            }
            Token::OpenParen(pos) => {
                let cur = current.ok_or(SmilesError::UnmatchedParen { pos: *pos })?;
                if let Some((_, bond_pos)) = pending_bond {
                    return Err(SmilesError::DanglingBond { pos: bond_pos });
                }
                stack.push((cur, *pos));
            }
            Token::CloseParen(pos) => {
                if let Some((_, bond_pos)) = pending_bond {
                    return Err(SmilesError::DanglingBond { pos: bond_pos });
                }
                let (cur, _) = stack.pop().ok_or(SmilesError::UnmatchedParen { pos: *pos })?;
                current = Some(cur);
            }
            Token::Dot(pos) => {
                if pending_bond.is_some() {
                    return Err(SmilesError::DanglingBond { pos: *pos });
                }
                current = None;
            }
        }
    }

    if let Some((_, pos)) = stack.last() {
        return Err(SmilesError::UnmatchedParen { pos: *pos });
    }
    if let Some((_, pos)) = pending_bond {
        return Err(SmilesError::DanglingBond { pos });
    }
    if let Some(digit) = ring_opens.iter().position(Option::is_some) {
        return Err(SmilesError::UnclosedRing {
            digit: digit as u16,
        });
    }

    Ok(ParseTree { atoms })
}

fn connect(atoms: &mut [ParseAtom], a: usize, b: usize, bond: Option<BondToken>) {
    atoms[a].neighbors.push(Neighbor { bond, atom_idx: b });
    atoms[b].neighbors.push(Neighbor { bond, atom_idx: a });
}

fn parse_atom_from_token(tok: &AtomToken) -> ParseAtom {
    ParseAtom {
        element: tok.element,
        is_aromatic: tok.is_aromatic,
        isotope: tok.isotope,
        hcount: tok.hcount,
        charge: tok.charge,
        is_bracket: tok.is_bracket,
        pos: tok.pos,
        neighbors: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::tokenizer::tokenize;

    fn tree(s: &str) -> Result<ParseTree, SmilesError> {
        build_parse_tree(&tokenize(s)?)
    }

    #[test]
    fn ethane_tree() {
        let tree = tree("CC").unwrap();
        assert_eq!(tree.atoms.len(), 2);
        assert_eq!(tree.atoms[0].neighbors.len(), 1);
        assert_eq!(tree.atoms[0].neighbors[0].atom_idx, 1);
    }

    #[test]
    fn cyclohexane_tree() {
        let tree = tree("C1CCCCC1").unwrap();
        assert_eq!(tree.atoms.len(), 6);
        for atom in &tree.atoms {
            assert_eq!(atom.neighbors.len(), 2);
        }
    }

    #[test]
    fn branch_tree() {
        let tree = tree("CC(C)C").unwrap();
        assert_eq!(tree.atoms.len(), 4);
        assert_eq!(tree.atoms[1].neighbors.len(), 3);
    }

    #[test]
    fn ring_digits_after_branch() {
        // MIDA-style cage: ring bonds opened on a bracket atom after a branch.
        let tree = tree("CB12OC(=O)C[N+](C)1CC(=O)O2").unwrap();
        let boron = &tree.atoms[1];
        assert_eq!(boron.element, Element::B);
        assert_eq!(boron.neighbors.len(), 4);
    }

    #[test]
    fn unclosed_ring_error() {
        assert!(matches!(
            tree("C1CC"),
            Err(SmilesError::UnclosedRing { digit: 1 })
        ));
    }

    #[test]
    fn unmatched_paren_error() {
        assert!(matches!(tree("C(C"), Err(SmilesError::UnmatchedParen { .. })));
        assert!(matches!(tree("CC)C"), Err(SmilesError::UnmatchedParen { .. })));
    }

    #[test]
    fn dangling_bonds() {
        assert!(matches!(tree("CC="), Err(SmilesError::DanglingBond { .. })));
        assert!(matches!(tree("=CC"), Err(SmilesError::DanglingBond { .. })));
        assert!(matches!(tree("C=.C"), Err(SmilesError::DanglingBond { .. })));
    }

    #[test]
    fn conflicting_ring_bonds() {
        assert!(matches!(
            tree("C=1CCC#1"),
            Err(SmilesError::RingBondConflict { digit: 1 })
        ));
    }

    #[test]
    fn duplicate_ring_bond() {
        assert!(matches!(
            tree("C1C1"),
            Err(SmilesError::DuplicateBond { digit: 1 })
        ));
    }

    #[test]
    fn disconnected() {
        let tree = tree("[Na+].[Cl-]").unwrap();
        assert_eq!(tree.atoms.len(), 2);
        assert_eq!(tree.atoms[0].neighbors.len(), 0);
        assert_eq!(tree.atoms[1].neighbors.len(), 0);
    }
}
