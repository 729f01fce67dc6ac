use std::collections::HashSet;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::mol::Mol;

/// `(query atom, target atom)` pairs, ordered by query atom index.
pub type AtomMapping = Vec<(NodeIndex, NodeIndex)>;

/// Upper bound on the embeddings collected by one search.
pub const MAX_MATCHES: usize = 1000;

pub fn has_substruct_match_with<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    atom_match: impl Fn(NodeIndex, NodeIndex) -> bool,
    bond_match: impl Fn(EdgeIndex, EdgeIndex) -> bool,
) -> bool {
    get_substruct_match_with(target, query, atom_match, bond_match).is_some()
}

/// First embedding of `query` in `target`.
///
/// `atom_match` receives `(target atom, query atom)` and `bond_match`
/// receives `(target bond, query bond)`.
pub fn get_substruct_match_with<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    atom_match: impl Fn(NodeIndex, NodeIndex) -> bool,
    bond_match: impl Fn(EdgeIndex, EdgeIndex) -> bool,
) -> Option<AtomMapping> {
    Matcher::new(target, query, atom_match, bond_match)
        .run(None, 1, false)
        .into_iter()
        .next()
}

/// Every embedding, up to [`MAX_MATCHES`]. Symmetric queries yield one
/// mapping per automorphism.
pub fn get_substruct_matches_with<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    atom_match: impl Fn(NodeIndex, NodeIndex) -> bool,
    bond_match: impl Fn(EdgeIndex, EdgeIndex) -> bool,
) -> Vec<AtomMapping> {
    Matcher::new(target, query, atom_match, bond_match).run(None, MAX_MATCHES, false)
}

/// Embeddings with distinct target atom sets, up to [`MAX_MATCHES`].
pub fn get_unique_substruct_matches_with<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    atom_match: impl Fn(NodeIndex, NodeIndex) -> bool,
    bond_match: impl Fn(EdgeIndex, EdgeIndex) -> bool,
) -> Vec<AtomMapping> {
    Matcher::new(target, query, atom_match, bond_match).run(None, MAX_MATCHES, true)
}

/// Whether `query` embeds with its atom 0 placed on `root`.
pub fn has_rooted_match_with<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    root: NodeIndex,
    atom_match: impl Fn(NodeIndex, NodeIndex) -> bool,
    bond_match: impl Fn(EdgeIndex, EdgeIndex) -> bool,
) -> bool {
    if query.atom_count() == 0 || root.index() >= target.atom_count() {
        return false;
    }
    !Matcher::new(target, query, atom_match, bond_match)
        .run(Some(root), 1, false)
        .is_empty()
}

struct Matcher<'a, A1, B1, A2, B2, FA, FB> {
    target: &'a Mol<A1, B1>,
    query: &'a Mol<A2, B2>,
    atom_match: FA,
    bond_match: FB,
    /// Query atoms in breadth-first order, each with the already placed
    /// neighbour it was reached from.
    query_order: Vec<(NodeIndex, Option<NodeIndex>)>,
    query_map: Vec<Option<NodeIndex>>,
    target_used: Vec<bool>,
}

struct Search {
    root: Option<NodeIndex>,
    limit: usize,
    seen: Option<HashSet<Vec<NodeIndex>>>,
    results: Vec<AtomMapping>,
}

impl<'a, A1, B1, A2, B2, FA, FB> Matcher<'a, A1, B1, A2, B2, FA, FB>
where
    FA: Fn(NodeIndex, NodeIndex) -> bool,
    FB: Fn(EdgeIndex, EdgeIndex) -> bool,
{
    fn new(
        target: &'a Mol<A1, B1>,
        query: &'a Mol<A2, B2>,
        atom_match: FA,
        bond_match: FB,
    ) -> Self {
        Self {
            target,
            query,
            atom_match,
            bond_match,
            query_order: bfs_order(query),
            query_map: vec![None; query.atom_count()],
            target_used: vec![false; target.atom_count()],
        }
    }

    fn run(mut self, root: Option<NodeIndex>, limit: usize, unique: bool) -> Vec<AtomMapping> {
        let mut search = Search {
            root,
            limit,
            seen: unique.then(HashSet::new),
            results: Vec::new(),
        };
        self.recurse(0, &mut search);
        search.results
    }

    fn recurse(&mut self, depth: usize, search: &mut Search) {
        if search.results.len() >= search.limit {
            return;
        }
        if depth == self.query_order.len() {
            self.record(search);
            return;
        }

        let (query_node, parent) = self.query_order[depth];
        let mapped_parent = parent.and_then(|p| self.query_map[p.index()]);
        let candidates: Vec<NodeIndex> = match (mapped_parent, search.root) {
            (Some(t_parent), _) => self.target.neighbors(t_parent).collect(),
            (None, Some(root)) if depth == 0 => vec![root],
            _ => self.target.atoms().collect(),
        };

        for target_node in candidates {
            if self.target_used[target_node.index()] || !self.is_feasible(query_node, target_node) {
                continue;
            }

            self.query_map[query_node.index()] = Some(target_node);
            self.target_used[target_node.index()] = true;

            self.recurse(depth + 1, search);

            self.query_map[query_node.index()] = None;
            self.target_used[target_node.index()] = false;

            if search.results.len() >= search.limit {
                return;
            }
        }
    }

    fn record(&self, search: &mut Search) {
        let mapping: AtomMapping = self
            .query
            .atoms()
            .filter_map(|qn| self.query_map[qn.index()].map(|tn| (qn, tn)))
            .collect();
        if let Some(seen) = search.seen.as_mut() {
            let mut key: Vec<NodeIndex> = mapping.iter().map(|&(_, t)| t).collect();
            key.sort_unstable();
            if !seen.insert(key) {
                return;
            }
        }
        search.results.push(mapping);
    }

    fn is_feasible(&self, query_node: NodeIndex, target_node: NodeIndex) -> bool {
        if !(self.atom_match)(target_node, query_node) {
            return false;
        }

        for q_neighbor in self.query.neighbors(query_node) {
            let Some(t_mapped) = self.query_map[q_neighbor.index()] else {
                continue;
            };
            let Some(q_bond) = self.query.bond_between(query_node, q_neighbor) else {
                return false;
            };
            match self.target.bond_between(target_node, t_mapped) {
                Some(t_bond) if (self.bond_match)(t_bond, q_bond) => {}
                _ => return false,
            }
        }

        true
    }
}

/// Breadth-first traversal of every component, starting each component at
/// its lowest-numbered atom, so atom 0 always comes first.
fn bfs_order<A, B>(query: &Mol<A, B>) -> Vec<(NodeIndex, Option<NodeIndex>)> {
    let mut order = Vec::with_capacity(query.atom_count());
    let mut visited = vec![false; query.atom_count()];

    for start in query.atoms() {
        if visited[start.index()] {
            continue;
        }
        visited[start.index()] = true;
        let mut head = order.len();
        order.push((start, None));
        while head < order.len() {
            let (current, _) = order[head];
            head += 1;
            let mut next: Vec<NodeIndex> = query
                .neighbors(current)
                .filter(|n| !visited[n.index()])
                .collect();
            next.sort_unstable();
            for n in next {
                visited[n.index()] = true;
                order.push((n, Some(current)));
            }
        }
    }
    order
}
