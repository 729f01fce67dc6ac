use std::collections::VecDeque;

use petgraph::algo::connected_components;
use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::mol::Mol;

/// Smallest set of smallest rings plus the per-atom and per-bond lookups
/// that SMARTS ring primitives (`R`, `r`, `x`, `@`) need.
#[derive(Debug, Clone, Default)]
pub struct RingInfo {
    rings: Vec<Vec<NodeIndex>>,
    atom_ring_count: Vec<u8>,
    atom_smallest: Vec<Option<usize>>,
    atom_ring_bonds: Vec<u8>,
    ring_bond: Vec<bool>,
}

impl RingInfo {
    pub fn sssr<A, B>(mol: &Mol<A, B>) -> Self {
        let num_expected = Self::expected_ring_count(mol);
        let rings = if num_expected == 0 {
            Vec::new()
        } else {
            let candidates = horton_candidates(mol);
            select_independent_rings(&candidates, num_expected, mol)
        };
        Self::from_rings(mol, rings)
    }

    fn from_rings<A, B>(mol: &Mol<A, B>, rings: Vec<Vec<NodeIndex>>) -> Self {
        let mut atom_ring_count = vec![0u8; mol.atom_count()];
        let mut atom_smallest: Vec<Option<usize>> = vec![None; mol.atom_count()];
        let mut ring_bond = vec![false; mol.bond_count()];

        for ring in &rings {
            for &atom in ring {
                let i = atom.index();
                atom_ring_count[i] = atom_ring_count[i].saturating_add(1);
                atom_smallest[i] = Some(atom_smallest[i].map_or(ring.len(), |s| s.min(ring.len())));
            }
            for edge in ring_edges(ring, mol) {
                ring_bond[edge.index()] = true;
            }
        }

        let atom_ring_bonds = mol
            .atoms()
            .map(|a| {
                mol.bonds_of(a)
                    .filter(|e| ring_bond[e.index()])
                    .count()
                    .min(u8::MAX as usize) as u8
            })
            .collect();

        Self {
            rings,
            atom_ring_count,
            atom_smallest,
            atom_ring_bonds,
            ring_bond,
        }
    }

    pub fn num_rings(&self) -> usize {
        self.rings.len()
    }

    pub fn rings(&self) -> &[Vec<NodeIndex>] {
        &self.rings
    }

    pub fn is_ring_atom(&self, atom: NodeIndex) -> bool {
        self.ring_count(atom) > 0
    }

    /// Number of SSSR rings containing `atom`.
    pub fn ring_count(&self, atom: NodeIndex) -> u8 {
        self.atom_ring_count.get(atom.index()).copied().unwrap_or(0)
    }

    pub fn is_ring_bond(&self, bond: EdgeIndex) -> bool {
        self.ring_bond.get(bond.index()).copied().unwrap_or(false)
    }

    /// Number of ring bonds touching `atom`.
    pub fn ring_connectivity(&self, atom: NodeIndex) -> u8 {
        self.atom_ring_bonds.get(atom.index()).copied().unwrap_or(0)
    }

    pub fn smallest_ring_size(&self, atom: NodeIndex) -> Option<usize> {
        self.atom_smallest.get(atom.index()).copied().flatten()
    }

    pub fn expected_ring_count<A, B>(mol: &Mol<A, B>) -> usize {
        let v = mol.atom_count();
        let e = mol.bond_count();
        let c = connected_components(mol.graph());
        (e + c).saturating_sub(v)
    }
}

fn ring_edges<'a, A, B>(
    ring: &'a [NodeIndex],
    mol: &'a Mol<A, B>,
) -> impl Iterator<Item = EdgeIndex> + 'a {
    let len = ring.len();
    (0..len).filter_map(move |i| mol.bond_between(ring[i], ring[(i + 1) % len]))
}

/// Shortest-path tree from one root: distance and predecessor per node.
struct PathTree {
    dist: Vec<u32>,
    pred: Vec<Option<NodeIndex>>,
}

impl PathTree {
    fn bfs<A, B>(mol: &Mol<A, B>, root: NodeIndex) -> Self {
        let n = mol.atom_count();
        let mut dist = vec![u32::MAX; n];
        let mut pred = vec![None; n];
        dist[root.index()] = 0;
        let mut queue = VecDeque::from([root]);
        while let Some(cur) = queue.pop_front() {
            let d = dist[cur.index()];
            for nb in mol.neighbors(cur) {
                if dist[nb.index()] == u32::MAX {
                    dist[nb.index()] = d + 1;
                    pred[nb.index()] = Some(cur);
                    queue.push_back(nb);
                }
            }
        }
        Self { dist, pred }
    }

    fn path_to(&self, root: NodeIndex, dst: NodeIndex) -> Vec<NodeIndex> {
        let mut path = vec![dst];
        let mut cur = dst;
        while cur != root {
            match self.pred[cur.index()] {
                Some(p) => {
                    path.push(p);
                    cur = p;
                }
                None => return Vec::new(),
            }
        }
        path.reverse();
        path
    }
}

/// Horton candidate cycles: for every root `w` and bond `(u, v)`, the cycle
/// made of the shortest paths `w..u`, `w..v` and the bond itself.
fn horton_candidates<A, B>(mol: &Mol<A, B>) -> Vec<Vec<NodeIndex>> {
    let trees: Vec<PathTree> = mol.atoms().map(|w| PathTree::bfs(mol, w)).collect();
    let mut candidates: Vec<Vec<NodeIndex>> = Vec::new();

    for edge in mol.bonds() {
        let Some((u, v)) = mol.bond_endpoints(edge) else {
            continue;
        };
        for w in mol.atoms() {
            let tree = &trees[w.index()];
            let (du, dv) = (tree.dist[u.index()], tree.dist[v.index()]);
            if du == u32::MAX || dv == u32::MAX || du as usize + dv as usize + 1 < 3 {
                continue;
            }
            let path_u = tree.path_to(w, u);
            let path_v = tree.path_to(w, v);
            if path_u.is_empty() || path_v.is_empty() {
                continue;
            }
            if path_u[1..].iter().any(|node| path_v[1..].contains(node)) {
                continue;
            }
            let mut ring = path_u;
            ring.extend(path_v[1..].iter().rev());
            candidates.push(normalize_ring(&ring));
        }
    }

    candidates.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    candidates.dedup();
    candidates
}

fn edge_bitvector<A, B>(ring: &[NodeIndex], mol: &Mol<A, B>) -> Vec<u64> {
    let mut bv = vec![0u64; mol.bond_count().div_ceil(64)];
    for edge in ring_edges(ring, mol) {
        let idx = edge.index();
        bv[idx / 64] |= 1u64 << (idx % 64);
    }
    bv
}

fn select_independent_rings<A, B>(
    candidates: &[Vec<NodeIndex>],
    num_needed: usize,
    mol: &Mol<A, B>,
) -> Vec<Vec<NodeIndex>> {
    let mut result = Vec::with_capacity(num_needed);
    let mut basis: Vec<Vec<u64>> = Vec::with_capacity(num_needed);

    for ring in candidates {
        if result.len() >= num_needed {
            break;
        }
        let bv = edge_bitvector(ring, mol);
        if try_add_to_basis(&mut basis, bv) {
            result.push(ring.clone());
        }
    }
    result
}

/// Gaussian elimination over GF(2); keeps `basis` in echelon form.
fn try_add_to_basis(basis: &mut Vec<Vec<u64>>, mut v: Vec<u64>) -> bool {
    for row in basis.iter() {
        if let Some(p) = leading_bit(row) {
            if v[p / 64] & (1u64 << (p % 64)) != 0 {
                for (vw, rw) in v.iter_mut().zip(row) {
                    *vw ^= *rw;
                }
            }
        }
    }
    if leading_bit(&v).is_none() {
        return false;
    }
    basis.push(v);
    basis.sort_by_key(|row| leading_bit(row));
    true
}

fn leading_bit(bv: &[u64]) -> Option<usize> {
    bv.iter()
        .enumerate()
        .find(|(_, w)| **w != 0)
        .map(|(i, w)| i * 64 + w.trailing_zeros() as usize)
}

/// Rotates the ring to start at its lowest index and fixes the direction.
fn normalize_ring(ring: &[NodeIndex]) -> Vec<NodeIndex> {
    let Some(min_pos) = ring
        .iter()
        .enumerate()
        .min_by_key(|&(_, idx)| idx)
        .map(|(i, _)| i)
    else {
        return Vec::new();
    };

    let len = ring.len();
    let mut normalized: Vec<NodeIndex> = (0..len).map(|i| ring[(min_pos + i) % len]).collect();
    if len > 2 && normalized[1] > normalized[len - 1] {
        normalized[1..].reverse();
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_smiles;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn rings_of(smiles: &str) -> RingInfo {
        RingInfo::sssr(&parse_smiles(smiles).unwrap())
    }

    #[test]
    fn cyclohexane() {
        let ri = rings_of("C1CCCCC1");
        assert_eq!(ri.num_rings(), 1);
        assert_eq!(ri.rings()[0].len(), 6);
    }

    #[test]
    fn acyclic() {
        let ri = rings_of("CCCC");
        assert_eq!(ri.num_rings(), 0);
        assert!(!ri.is_ring_atom(n(0)));
        assert_eq!(ri.smallest_ring_size(n(0)), None);
    }

    #[test]
    fn naphthalene_shares_fusion_atoms() {
        let ri = rings_of("c1ccc2ccccc2c1");
        assert_eq!(ri.num_rings(), 2);
        assert!(ri.rings().iter().all(|r| r.len() == 6));
        assert_eq!(ri.ring_count(n(3)), 2);
        assert_eq!(ri.ring_connectivity(n(3)), 3);
        assert_eq!(ri.ring_count(n(0)), 1);
    }

    #[test]
    fn norbornane() {
        let ri = rings_of("C1CC2CCC1C2");
        assert_eq!(ri.num_rings(), 2);
        let mut sizes: Vec<usize> = ri.rings().iter().map(Vec::len).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![5, 5]);
    }

    #[test]
    fn cubane_cyclomatic_number() {
        let ri = rings_of("C12C3C4C1C5C2C3C45");
        assert_eq!(ri.num_rings(), 5);
        assert!(ri.rings().iter().all(|r| r.len() == 4));
    }

    #[test]
    fn phenol_oxygen_not_in_ring() {
        let mol = parse_smiles("Oc1ccccc1").unwrap();
        let ri = RingInfo::sssr(&mol);
        assert!(!ri.is_ring_atom(n(0)));
        let exocyclic = mol.bond_between(n(0), n(1)).unwrap();
        assert!(!ri.is_ring_bond(exocyclic));
        let endocyclic = mol.bond_between(n(1), n(2)).unwrap();
        assert!(ri.is_ring_bond(endocyclic));
    }

    #[test]
    fn spiro_atom_in_two_rings() {
        let ri = rings_of("C1CCC2(C1)CCCC2");
        assert_eq!(ri.num_rings(), 2);
        assert_eq!(ri.ring_count(n(3)), 2);
        assert_eq!(ri.ring_connectivity(n(3)), 4);
        assert_eq!(ri.ring_count(n(4)), 1);
    }

    #[test]
    fn smallest_ring_size_in_fused_system() {
        let ri = rings_of("C1CC2CCCC12");
        assert_eq!(ri.smallest_ring_size(n(2)), Some(4));
    }
}
