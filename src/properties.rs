//! Scalar physicochemical descriptors.

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::element::Element;
use crate::mol::Mol;
use crate::rings::RingInfo;

const ELECTRON_MASS: f64 = 0.000_548_579_909_46;

/// Monoisotopic molecular weight in Da.
///
/// Every heavy atom contributes its isotope mass (most abundant isotope when
/// unlabelled), every attached hydrogen contributes the mass of ¹H, and each
/// unit of net positive charge removes one electron mass.
pub fn exact_weight(mol: &Mol<Atom, Bond>) -> f64 {
    let h_mass = Element::H.exact_mass();
    let mut total = 0.0;
    let mut charge = 0i32;
    for idx in mol.atoms() {
        let atom = mol.atom(idx);
        total += atom.mass() + f64::from(atom.hydrogen_count) * h_mass;
        charge += i32::from(atom.formal_charge);
    }
    total - f64::from(charge) * ELECTRON_MASS
}

/// Simplified Wildman-Crippen logP.
///
/// Heavy atoms are classified by element, aromaticity, charge, double bonds
/// and heteroatom neighbours; hydrogens contribute by the element they sit on.
pub fn crippen_log_p(mol: &Mol<Atom, Bond>, rings: &RingInfo) -> f64 {
    mol.atoms()
        .map(|idx| {
            let atom = mol.atom(idx);
            let h = f64::from(atom.hydrogen_count);
            let h_term = if atom.element == Element::C {
                h * 0.1230
            } else {
                h * -0.2677
            };
            atom_contribution(mol, rings, idx) + h_term
        })
        .sum()
}

fn atom_contribution(mol: &Mol<Atom, Bond>, rings: &RingInfo, idx: NodeIndex) -> f64 {
    let atom = mol.atom(idx);
    let degree = mol.degree(idx);
    let has_double_bond = mol
        .bonds_of(idx)
        .any(|e| mol.bond(e).order == BondOrder::Double);
    let has_hetero_neighbor = mol
        .neighbors(idx)
        .any(|n| !matches!(mol.atom(n).element, Element::C | Element::H));

    match atom.element {
        Element::C => {
            if atom.is_aromatic {
                if has_hetero_neighbor {
                    -0.14
                } else {
                    0.296
                }
            } else if has_double_bond {
                if has_hetero_neighbor {
                    -0.03
                } else {
                    0.08
                }
            } else if rings.is_ring_atom(idx) {
                0.1441
            } else {
                match degree {
                    0..=2 => 0.1441,
                    3 => 0.0,
                    _ => -0.04,
                }
            }
        }
        Element::N => {
            if atom.is_aromatic {
                -0.3187
            } else if atom.formal_charge > 0 {
                -1.0190
            } else if has_double_bond {
                -0.5262
            } else {
                -0.4458
            }
        }
        Element::O => {
            if atom.formal_charge < 0 {
                -1.189
            } else if has_double_bond {
                -0.3339
            } else if degree >= 2 {
                -0.2893
            } else {
                -0.3567
            }
        }
        Element::F => 0.4118,
        Element::P => 0.2836,
        Element::S => {
            if has_double_bond {
                -0.1084
            } else if atom.formal_charge != 0 {
                -0.5188
            } else {
                0.6237
            }
        }
        Element::Cl => 0.6895,
        Element::Br => 0.8813,
        Element::I => 1.050,
        _ => 0.0,
    }
}

/// Rounds half away from zero to `decimals` digits.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals.min(15) as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::{parse_smiles, parse_with_rings};

    fn weight(smiles: &str) -> f64 {
        exact_weight(&parse_smiles(smiles).unwrap())
    }

    fn log_p(smiles: &str) -> f64 {
        let (mol, rings) = parse_with_rings(smiles).unwrap();
        crippen_log_p(&mol, &rings)
    }

    #[test]
    fn small_molecule_weights() {
        assert!((weight("C") - 16.031_300_128_92).abs() < 1e-6);
        assert!((weight("O") - 18.010_564_684).abs() < 1e-6);
        assert!((weight("c1ccccc1") - 78.046_950_192).abs() < 1e-6);
    }

    #[test]
    fn isotopes_and_charges() {
        let deuterium_shift = 2.0 * (2.014_101_778_12 - 1.007_825_032_23);
        assert!((weight("[2H]O[2H]") - weight("O") - deuterium_shift).abs() < 1e-6);
        let ammonium = weight("[NH4+]");
        let neutral = 14.003_074_004_43 + 4.0 * 1.007_825_032_23;
        assert!((neutral - ammonium - ELECTRON_MASS).abs() < 1e-9);
    }

    #[test]
    fn salts_count_every_fragment() {
        assert!((weight("[Na+].[Cl-]") - (22.989_769_282 + 34.968_852_682)).abs() < 1e-6);
    }

    #[test]
    fn log_p_ordering() {
        assert!(log_p("CCCCCC") > log_p("CCO"));
        assert!(log_p("c1ccccc1Cl") > log_p("c1ccccc1"));
        assert!(log_p("OCC(O)CO") < 0.0);
    }

    #[test]
    fn log_p_reasonable_for_aspirin() {
        let lp = log_p("CC(=O)Oc1ccccc1C(=O)O");
        assert!(lp > -2.0 && lp < 5.0, "logP={lp}");
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(1.234_56, 4), 1.2346);
        assert_eq!(round_to(-0.000_04, 4), -0.0);
        assert_eq!(round_to(2.5, 0), 3.0);
    }
}
