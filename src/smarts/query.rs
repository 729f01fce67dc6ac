use std::cell::RefCell;
use std::collections::HashMap;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::rings::RingInfo;

/// A compiled SMARTS pattern graph.
pub type QueryMol = Mol<AtomExpr, BondExpr>;

/// AST node for a SMARTS atom query expression.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomExpr {
    /// Wildcard `*`.
    True,
    /// `aromatic` is `None` for `#n`, `Some(true)` for `c`, `Some(false)` for `C`.
    Element {
        atomic_num: u8,
        aromatic: Option<bool>,
    },
    /// `a`
    Aromatic,
    /// `A`
    Aliphatic,
    Isotope(u16),
    /// Explicit connections in the graph (`D`).
    Degree(u8),
    /// Total valence, aromatic bonds counted as 1.5 (`v`).
    Valence(u8),
    /// Explicit connections plus attached hydrogens (`X`).
    Connectivity(u8),
    /// Total hydrogen count (`H`).
    TotalHCount(u8),
    /// Implicit hydrogen count (`h`). Hydrogens are never graph nodes after
    /// parsing, so this equals the total count.
    ImplicitHCount(u8),
    /// Number of SSSR rings containing the atom (`R<n>`, `R0` for acyclic).
    RingMembership(u8),
    /// Bare `R` or `r`.
    InRing,
    /// Smallest SSSR ring size (`r<n>`).
    SmallestRingSize(u8),
    /// Ring bonds on the atom (`x`).
    RingBondCount(u8),
    Charge(i8),
    /// `$(...)`; `id` is unique within one compiled pattern.
    Recursive { id: u32, query: Box<QueryMol> },
    /// Atom map class (`:n`); always matches.
    AtomMapClass(u16),
    And(Vec<AtomExpr>),
    Or(Vec<AtomExpr>),
    Not(Box<AtomExpr>),
}

/// AST node for a SMARTS bond query expression.
///
/// Implicit bonds default to [`BondExpr::SingleOrAromatic`].
#[derive(Debug, Clone, PartialEq)]
pub enum BondExpr {
    /// `~`
    True,
    /// `-`, also `/` and `\`.
    Single,
    Double,
    Triple,
    /// `:`
    Aromatic,
    /// `@`
    Ring,
    SingleOrAromatic,
    And(Vec<BondExpr>),
    Or(Vec<BondExpr>),
    Not(Box<BondExpr>),
}

/// Everything an expression needs to know about the target molecule.
pub struct MatchContext<'a> {
    pub mol: &'a Mol<Atom, Bond>,
    pub rings: &'a RingInfo,
    recursive_hits: RefCell<HashMap<(u32, NodeIndex), bool>>,
}

impl<'a> MatchContext<'a> {
    pub fn new(mol: &'a Mol<Atom, Bond>, rings: &'a RingInfo) -> Self {
        Self {
            mol,
            rings,
            recursive_hits: RefCell::new(HashMap::new()),
        }
    }

    /// Whether the recursive pattern `id` matches with its first atom placed
    /// on `idx`. Results are memoised for the lifetime of the context.
    fn recursive_hit(&self, id: u32, query: &QueryMol, idx: NodeIndex) -> bool {
        if let Some(&hit) = self.recursive_hits.borrow().get(&(id, idx)) {
            return hit;
        }
        let hit = super::rooted_match_exists(self, query, idx);
        self.recursive_hits.borrow_mut().insert((id, idx), hit);
        hit
    }
}

fn valence(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> u8 {
    let doubled: u32 = mol
        .bonds_of(idx)
        .map(|e| match mol.bond(e).order {
            BondOrder::Single => 2,
            BondOrder::Double => 4,
            BondOrder::Triple => 6,
            BondOrder::Aromatic => 3,
        })
        .sum();
    let total = doubled / 2 + u32::from(mol.atom(idx).hydrogen_count);
    total.min(u32::from(u8::MAX)) as u8
}

fn saturating_u8(n: usize) -> u8 {
    n.min(u8::MAX as usize) as u8
}

impl AtomExpr {
    pub fn matches(&self, ctx: &MatchContext, idx: NodeIndex) -> bool {
        let atom = ctx.mol.atom(idx);
        match self {
            AtomExpr::True | AtomExpr::AtomMapClass(_) => true,
            AtomExpr::Element {
                atomic_num,
                aromatic,
            } => atom.atomic_num() == *atomic_num && aromatic.is_none_or(|a| atom.is_aromatic == a),
            AtomExpr::Aromatic => atom.is_aromatic,
            AtomExpr::Aliphatic => !atom.is_aromatic,
            AtomExpr::Isotope(iso) => atom.isotope == *iso,
            AtomExpr::Degree(d) => saturating_u8(ctx.mol.degree(idx)) == *d,
            AtomExpr::Valence(v) => valence(ctx.mol, idx) == *v,
            AtomExpr::Connectivity(x) => saturating_u8(ctx.mol.total_connections(idx)) == *x,
            AtomExpr::TotalHCount(h) | AtomExpr::ImplicitHCount(h) => atom.hydrogen_count == *h,
            AtomExpr::RingMembership(n) => ctx.rings.ring_count(idx) == *n,
            AtomExpr::InRing => ctx.rings.is_ring_atom(idx),
            AtomExpr::SmallestRingSize(r) => {
                ctx.rings.smallest_ring_size(idx).unwrap_or(0) == usize::from(*r)
            }
            AtomExpr::RingBondCount(x) => ctx.rings.ring_connectivity(idx) == *x,
            AtomExpr::Charge(c) => atom.formal_charge == *c,
            AtomExpr::Recursive { id, query } => ctx.recursive_hit(*id, query, idx),
            AtomExpr::And(exprs) => exprs.iter().all(|e| e.matches(ctx, idx)),
            AtomExpr::Or(exprs) => exprs.iter().any(|e| e.matches(ctx, idx)),
            AtomExpr::Not(expr) => !expr.matches(ctx, idx),
        }
    }
}

impl BondExpr {
    pub fn matches(&self, ctx: &MatchContext, edge: EdgeIndex) -> bool {
        let order = ctx.mol.bond(edge).order;
        match self {
            BondExpr::True => true,
            BondExpr::Single => order == BondOrder::Single,
            BondExpr::Double => order == BondOrder::Double,
            BondExpr::Triple => order == BondOrder::Triple,
            BondExpr::Aromatic => order == BondOrder::Aromatic,
            BondExpr::Ring => ctx.rings.is_ring_bond(edge),
            BondExpr::SingleOrAromatic => {
                matches!(order, BondOrder::Single | BondOrder::Aromatic)
            }
            BondExpr::And(exprs) => exprs.iter().all(|e| e.matches(ctx, edge)),
            BondExpr::Or(exprs) => exprs.iter().any(|e| e.matches(ctx, edge)),
            BondExpr::Not(expr) => !expr.matches(ctx, edge),
        }
    }
}
