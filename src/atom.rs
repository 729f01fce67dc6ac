use crate::element::Element;

/// A heavy atom of a parsed molecule.
///
/// Only intrinsic properties live here. Ring membership and connectivity are
/// derived from the graph by [`RingInfo`](crate::rings::RingInfo) and
/// [`Mol`](crate::mol::Mol) when a query needs them.
///
/// # Examples
///
/// ```
/// use moldb::{Atom, Element};
///
/// let carbon = Atom {
///     element: Element::C,
///     hydrogen_count: 3,
///     ..Atom::default()
/// };
/// assert_eq!(carbon.atomic_num(), 6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: Element,
    /// Formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Mass number. `0` means natural isotopic abundance.
    pub isotope: u16,
    /// Hydrogens attached to this atom that are not graph nodes.
    ///
    /// Explicit `[H]` atoms written in the input are folded into this count
    /// by the SMILES builder, so it is the total hydrogen count.
    pub hydrogen_count: u8,
    pub is_aromatic: bool,
}

impl Default for Atom {
    fn default() -> Self {
        Self {
            element: Element::C,
            formal_charge: 0,
            isotope: 0,
            hydrogen_count: 0,
            is_aromatic: false,
        }
    }
}

impl Atom {
    pub fn atomic_num(&self) -> u8 {
        self.element.atomic_num()
    }

    /// Monoisotopic mass of the atom itself, ignoring attached hydrogens.
    pub fn mass(&self) -> f64 {
        self.element.isotope_mass(self.isotope)
    }
}
