/// Chemical elements understood by the SMILES reader.
///
/// The set covers the organic subset, the main-group elements commonly seen
/// as counter-ions in building-block catalogues, and a handful of metals.
/// Any other symbol is rejected by the parser rather than silently given a
/// made-up mass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Element {
    H = 1,
    He = 2,
    Li = 3,
    Be = 4,
    B = 5,
    C = 6,
    N = 7,
    O = 8,
    F = 9,
    Ne = 10,
    Na = 11,
    Mg = 12,
    Al = 13,
    Si = 14,
    P = 15,
    S = 16,
    Cl = 17,
    Ar = 18,
    K = 19,
    Ca = 20,
    Sc = 21,
    Ti = 22,
    V = 23,
    Cr = 24,
    Mn = 25,
    Fe = 26,
    Co = 27,
    Ni = 28,
    Cu = 29,
    Zn = 30,
    Ga = 31,
    Ge = 32,
    As = 33,
    Se = 34,
    Br = 35,
    Kr = 36,
    Rb = 37,
    Sr = 38,
    Ag = 47,
    Cd = 48,
    Sn = 50,
    Sb = 51,
    Te = 52,
    I = 53,
    Xe = 54,
    Cs = 55,
    Ba = 56,
    Pt = 78,
    Au = 79,
    Hg = 80,
    Pb = 82,
    Bi = 83,
}

struct ElementData {
    element: Element,
    symbol: &'static str,
    /// Mass of the most abundant isotope, in Da.
    exact_mass: f64,
}

const TABLE: [ElementData; 52] = [
    ElementData { element: Element::H, symbol: "H", exact_mass: 1.007_825_032_23 },
    ElementData { element: Element::He, symbol: "He", exact_mass: 4.002_603_254_13 },
    ElementData { element: Element::Li, symbol: "Li", exact_mass: 7.016_003_436_6 },
    ElementData { element: Element::Be, symbol: "Be", exact_mass: 9.012_183_065 },
    ElementData { element: Element::B, symbol: "B", exact_mass: 11.009_305_36 },
    ElementData { element: Element::C, symbol: "C", exact_mass: 12.0 },
    ElementData { element: Element::N, symbol: "N", exact_mass: 14.003_074_004_43 },
    ElementData { element: Element::O, symbol: "O", exact_mass: 15.994_914_619_57 },
    ElementData { element: Element::F, symbol: "F", exact_mass: 18.998_403_162_73 },
    ElementData { element: Element::Ne, symbol: "Ne", exact_mass: 19.992_440_176_2 },
    ElementData { element: Element::Na, symbol: "Na", exact_mass: 22.989_769_282 },
    ElementData { element: Element::Mg, symbol: "Mg", exact_mass: 23.985_041_697 },
    ElementData { element: Element::Al, symbol: "Al", exact_mass: 26.981_538_53 },
    ElementData { element: Element::Si, symbol: "Si", exact_mass: 27.976_926_534_65 },
    ElementData { element: Element::P, symbol: "P", exact_mass: 30.973_761_998_42 },
    ElementData { element: Element::S, symbol: "S", exact_mass: 31.972_071_174_4 },
    ElementData { element: Element::Cl, symbol: "Cl", exact_mass: 34.968_852_682 },
    ElementData { element: Element::Ar, symbol: "Ar", exact_mass: 39.962_383_123_7 },
    ElementData { element: Element::K, symbol: "K", exact_mass: 38.963_706_486_4 },
    ElementData { element: Element::Ca, symbol: "Ca", exact_mass: 39.962_590_863 },
    ElementData { element: Element::Sc, symbol: "Sc", exact_mass: 44.955_908_28 },
    ElementData { element: Element::Ti, symbol: "Ti", exact_mass: 47.947_941_98 },
    ElementData { element: Element::V, symbol: "V", exact_mass: 50.943_957_04 },
    ElementData { element: Element::Cr, symbol: "Cr", exact_mass: 51.940_506_23 },
    ElementData { element: Element::Mn, symbol: "Mn", exact_mass: 54.938_043_91 },
    ElementData { element: Element::Fe, symbol: "Fe", exact_mass: 55.934_936_33 },
    ElementData { element: Element::Co, symbol: "Co", exact_mass: 58.933_194_29 },
    ElementData { element: Element::Ni, symbol: "Ni", exact_mass: 57.935_342_41 },
    ElementData { element: Element::Cu, symbol: "Cu", exact_mass: 62.929_597_72 },
    ElementData { element: Element::Zn, symbol: "Zn", exact_mass: 63.929_142_01 },
    ElementData { element: Element::Ga, symbol: "Ga", exact_mass: 68.925_573_5 },
    ElementData { element: Element::Ge, symbol: "Ge", exact_mass: 73.921_177_761 },
    ElementData { element: Element::As, symbol: "As", exact_mass: 74.921_594_57 },
    ElementData { element: Element::Se, symbol: "Se", exact_mass: 79.916_521_8 },
    ElementData { element: Element::Br, symbol: "Br", exact_mass: 78.918_337_6 },
    ElementData { element: Element::Kr, symbol: "Kr", exact_mass: 83.911_497_728_2 },
    ElementData { element: Element::Rb, symbol: "Rb", exact_mass: 84.911_789_737_9 },
    ElementData { element: Element::Sr, symbol: "Sr", exact_mass: 87.905_612_5 },
    ElementData { element: Element::Ag, symbol: "Ag", exact_mass: 106.905_091_6 },
    ElementData { element: Element::Cd, symbol: "Cd", exact_mass: 113.903_365_09 },
    ElementData { element: Element::Sn, symbol: "Sn", exact_mass: 119.902_201_63 },
    ElementData { element: Element::Sb, symbol: "Sb", exact_mass: 120.903_812 },
    ElementData { element: Element::Te, symbol: "Te", exact_mass: 129.906_222_748 },
    ElementData { element: Element::I, symbol: "I", exact_mass: 126.904_471_9 },
    ElementData { element: Element::Xe, symbol: "Xe", exact_mass: 131.904_155_085_6 },
    ElementData { element: Element::Cs, symbol: "Cs", exact_mass: 132.905_451_961 },
    ElementData { element: Element::Ba, symbol: "Ba", exact_mass: 137.905_247 },
    ElementData { element: Element::Pt, symbol: "Pt", exact_mass: 194.964_791_7 },
    ElementData { element: Element::Au, symbol: "Au", exact_mass: 196.966_568_79 },
    ElementData { element: Element::Hg, symbol: "Hg", exact_mass: 201.970_643_4 },
    ElementData { element: Element::Pb, symbol: "Pb", exact_mass: 207.976_652_5 },
    ElementData { element: Element::Bi, symbol: "Bi", exact_mass: 208.980_399_1 },
];

impl Element {
    fn data(self) -> &'static ElementData {
        // TABLE is ordered by atomic number, so binary search always hits.
        let idx = TABLE
            .binary_search_by_key(&(self as u8), |d| d.element as u8)
            .unwrap_or(0);
        &TABLE[idx]
    }

    pub fn from_atomic_num(n: u8) -> Option<Element> {
        TABLE
            .binary_search_by_key(&n, |d| d.element as u8)
            .ok()
            .map(|idx| TABLE[idx].element)
    }

    pub fn from_symbol(s: &str) -> Option<Element> {
        TABLE.iter().find(|d| d.symbol == s).map(|d| d.element)
    }

    pub fn atomic_num(self) -> u8 {
        self as u8
    }

    pub fn symbol(self) -> &'static str {
        self.data().symbol
    }

    pub fn exact_mass(self) -> f64 {
        self.data().exact_mass
    }

    /// Mass of a specific isotope. Known isotopes of the organic subset use
    /// tabulated values; anything else falls back to the mass number.
    pub fn isotope_mass(self, mass_number: u16) -> f64 {
        match (self, mass_number) {
            (_, 0) => self.exact_mass(),
            (Element::H, 2) => 2.014_101_778_12,
            (Element::H, 3) => 3.016_049_281_3,
            (Element::C, 13) => 13.003_354_835_07,
            (Element::C, 14) => 14.003_241_988_4,
            (Element::N, 15) => 15.000_108_898_88,
            (Element::O, 17) => 16.999_131_756_5,
            (Element::O, 18) => 17.999_159_612_86,
            (Element::F, 18) => 18.000_937_3,
            (Element::S, 34) => 33.967_867_004,
            (Element::Cl, 37) => 36.965_902_602,
            (Element::Br, 81) => 80.916_289_7,
            (Element::I, 125) => 124.904_630_2,
            _ => f64::from(mass_number),
        }
    }

    pub fn default_valences(self) -> &'static [u8] {
        match self {
            Element::H => &[1],
            Element::B => &[3],
            Element::C => &[4],
            Element::N => &[3, 5],
            Element::O => &[2],
            Element::F | Element::Cl | Element::Br => &[1],
            Element::Si | Element::Ge => &[4],
            Element::P | Element::As => &[3, 5],
            Element::S | Element::Se | Element::Te => &[2, 4, 6],
            Element::I => &[1, 3, 5, 7],
            _ => &[],
        }
    }

    pub fn is_organic_subset(self) -> bool {
        matches!(
            self,
            Element::B
                | Element::C
                | Element::N
                | Element::O
                | Element::P
                | Element::S
                | Element::F
                | Element::Cl
                | Element::Br
                | Element::I
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_by_atomic_number() {
        for pair in TABLE.windows(2) {
            assert!(pair[0].element < pair[1].element);
        }
    }

    #[test]
    fn symbol_round_trip() {
        for d in &TABLE {
            assert_eq!(Element::from_symbol(d.symbol), Some(d.element));
            assert_eq!(d.element.symbol(), d.symbol);
        }
    }

    #[test]
    fn lookup_by_atomic_number() {
        assert_eq!(Element::from_atomic_num(35), Some(Element::Br));
        assert_eq!(Element::from_atomic_num(0), None);
        assert_eq!(Element::from_atomic_num(92), None);
    }

    #[test]
    fn isotope_masses() {
        assert!((Element::C.isotope_mass(0) - 12.0).abs() < 1e-12);
        assert!((Element::H.isotope_mass(2) - 2.014_101_778_12).abs() < 1e-9);
        assert!((Element::Na.isotope_mass(24) - 24.0).abs() < 1e-12);
    }
}
