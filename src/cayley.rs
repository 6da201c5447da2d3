//! Derivation of the left/right Cayley graph, D-class count and normal
//! forms from a finished [`crate::Stephen`] orbit.
//!
//! This is the one corner of the reference implementation that was never
//! finished: its own `left_cayley_graph` references a `path_from_root_to`
//! helper with no implementation in any retrieved draft, and its normal
//! form computation is a TODO. The choices made here are recorded in
//! `DESIGN.md`; the short version is that `path_from_root_to` is the
//! shortlex-shortest word reaching a node, and normal forms fall out of a
//! shortlex BFS over the resulting right Cayley graph.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::kosaraju_scc;
use petgraph::graph::DiGraph;

use crate::graph_ops::GraphOps;
use crate::node::{self, NodeId};
use crate::presentation::Presentation;
use crate::schutzenberger_graph::SchutzenbergerGraph;

/// A Cayley graph derived from a finished Stephen orbit: `nodes` flat
/// indices, each with one outgoing edge per letter of the alphabet.
#[derive(Debug, Clone)]
pub struct CayleyGraph {
    alphabet_len: usize,
    ranks: Vec<Vec<NodeId>>,
    offsets: Vec<usize>,
    edges: Vec<Vec<Option<usize>>>,
}

impl CayleyGraph {
    pub fn number_of_nodes(&self) -> usize {
        self.edges.len()
    }

    pub fn alphabet_len(&self) -> usize {
        self.alphabet_len
    }

    /// The node reached from `node` by the edge labelled `letter`, if any.
    pub fn target(&self, node: usize, letter: usize) -> Option<usize> {
        self.edges[node][letter]
    }

    pub(crate) fn flat_index(&self, orbit_idx: usize, node: NodeId) -> Option<usize> {
        self.ranks[orbit_idx]
            .iter()
            .position(|&n| n == node)
            .map(|rank| self.offsets[orbit_idx] + rank)
    }
}

/// The shortlex-shortest word labelling a path from the root to `target`.
/// Unimplemented in every retrieved draft of the reference code; resolved
/// here as a breadth-first search in ascending letter order, which is the
/// same notion normal forms already need.
fn path_from_root_to(graph: &SchutzenbergerGraph, target: NodeId, alphabet_len: usize) -> Vec<usize> {
    let root = node::root();
    if target == root {
        return Vec::new();
    }

    let mut came_from: HashMap<NodeId, (NodeId, usize)> = HashMap::new();
    let mut visited = HashSet::new();
    visited.insert(root);
    let mut queue = VecDeque::new();
    queue.push_back(root);

    while let Some(current) = queue.pop_front() {
        for letter in 0..alphabet_len {
            let (end, consumed) = GraphOps::last_node_on_path(graph, current, &[letter]);
            if consumed != 1 || !visited.insert(end) {
                continue;
            }
            came_from.insert(end, (current, letter));
            if end == target {
                let mut word = Vec::new();
                let mut walk = end;
                while walk != root {
                    let (prev, l) = came_from[&walk];
                    word.push(l);
                    walk = prev;
                }
                word.reverse();
                return word;
            }
            queue.push_back(end);
        }
    }

    panic!("GraphInconsistency: node {target:?} is unreachable from the root of its own Schützenberger graph");
}

fn node_ranks(orbit: &[SchutzenbergerGraph]) -> (Vec<Vec<NodeId>>, Vec<usize>) {
    let ranks: Vec<Vec<NodeId>> = orbit.iter().map(|g| g.active_node_ids()).collect();
    let mut offsets = Vec::with_capacity(ranks.len());
    let mut acc = 0;
    for r in &ranks {
        offsets.push(acc);
        acc += r.len();
    }
    (ranks, offsets)
}

/// Builds the left Cayley graph of a finished orbit: node `(i, j)` is the
/// `j`-th active node (in ascending id order) of `orbit[i]`; the edge
/// labelled `x` goes to the corresponding node of `orbit[graph_lift[i][x]]`.
pub(crate) fn left_cayley_graph(
    presentation: &Presentation,
    orbit: &[SchutzenbergerGraph],
    graph_lift: &[Vec<usize>],
) -> CayleyGraph {
    let alphabet_len = presentation.alphabet_len();
    let (ranks, offsets) = node_ranks(orbit);
    let total: usize = ranks.iter().map(Vec::len).sum();
    let mut edges = vec![vec![None; alphabet_len]; total];

    for (i, g_i) in orbit.iter().enumerate() {
        let w_i = g_i.rep().to_vec();
        for (j, &node_j) in ranks[i].iter().enumerate() {
            let flat = offsets[i] + j;
            let path_to_j = path_from_root_to(g_i, node_j, alphabet_len);
            let inv_path_to_j = presentation.inverse_word(&path_to_j);

            for x in 0..alphabet_len {
                let l = graph_lift[i][x];
                let g_l = &orbit[l];

                let mut lifted = Vec::with_capacity(w_i.len() + 1);
                lifted.push(x);
                lifted.extend_from_slice(&w_i);
                let Some(u) = g_l.path(node::root(), &lifted) else {
                    continue;
                };
                let Some(landed) = g_l.path(u, &inv_path_to_j) else {
                    continue;
                };
                if let Some(jp) = ranks[l].iter().position(|&n| n == landed) {
                    edges[flat][x] = Some(offsets[l] + jp);
                }
            }
        }
    }

    CayleyGraph {
        alphabet_len,
        ranks,
        offsets,
        edges,
    }
}

/// The right Cayley graph: the left one with every edge reversed.
pub(crate) fn right_cayley_graph(left: &CayleyGraph) -> CayleyGraph {
    let mut edges = vec![vec![None; left.alphabet_len]; left.edges.len()];
    for (node, row) in left.edges.iter().enumerate() {
        for (letter, target) in row.iter().enumerate() {
            if let Some(target) = target {
                edges[*target][letter] = Some(node);
            }
        }
    }
    CayleyGraph {
        alphabet_len: left.alphabet_len,
        ranks: left.ranks.clone(),
        offsets: left.offsets.clone(),
        edges,
    }
}

/// The number of D-classes: strongly connected components of the union of
/// the left and right Cayley graphs' edge sets.
pub(crate) fn number_of_d_classes(left: &CayleyGraph, right: &CayleyGraph) -> usize {
    let mut graph = DiGraph::<(), ()>::new();
    let indices: Vec<_> = (0..left.number_of_nodes()).map(|_| graph.add_node(())).collect();
    for node in 0..left.number_of_nodes() {
        for letter in 0..left.alphabet_len {
            if let Some(t) = left.edges[node][letter] {
                graph.add_edge(indices[node], indices[t], ());
            }
            if let Some(t) = right.edges[node][letter] {
                graph.add_edge(indices[node], indices[t], ());
            }
        }
    }
    kosaraju_scc(&graph).len()
}

/// Shortlex-shortest labels from node 0 of `right`, one per flat node.
pub(crate) fn normal_forms(presentation: &Presentation, right: &CayleyGraph) -> Vec<String> {
    let n = right.number_of_nodes();
    let mut words: Vec<Option<Vec<usize>>> = vec![None; n];
    if n == 0 {
        return Vec::new();
    }
    words[0] = Some(Vec::new());
    let mut queue = VecDeque::new();
    queue.push_back(0usize);
    while let Some(current) = queue.pop_front() {
        let w = words[current].clone().expect("enqueued only once labelled");
        for letter in 0..right.alphabet_len {
            if let Some(t) = right.edges[current][letter] {
                if words[t].is_none() {
                    let mut next = w.clone();
                    next.push(letter);
                    words[t] = Some(next);
                    queue.push_back(t);
                }
            }
        }
    }
    words
        .into_iter()
        .map(|w| presentation.string(&w.unwrap_or_default()))
        .collect()
}
