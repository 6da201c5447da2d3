use std::rc::Rc;

use index_vec::{Idx, IndexVec};

use crate::errors::StephenError;
use crate::graph_ops::GraphOps;
use crate::node::{self, NodeId};
use crate::presentation::Presentation;

/// A Schützenberger graph: a [`crate::WordGraph`] specialised to maintain
/// the involutive-inverse edge invariant (I2) required for deciding the
/// word problem in a finitely presented inverse monoid.
///
/// Every time a node is created, the formal-inverse back-edge is installed
/// alongside the forward edge. Everything else — saturation, merging,
/// elementary expansion — is identical to `WordGraph`.
#[derive(Debug, Clone)]
pub struct SchutzenbergerGraph {
    presentation: Rc<Presentation>,
    edges: IndexVec<NodeId, Vec<Option<NodeId>>>,
    active: IndexVec<NodeId, bool>,
    num_active: usize,
    kappa: Vec<(NodeId, NodeId)>,
    rep: Vec<usize>,
}

impl GraphOps for SchutzenbergerGraph {
    fn presentation(&self) -> &Presentation {
        &self.presentation
    }
    fn edges(&self) -> &IndexVec<NodeId, Vec<Option<NodeId>>> {
        &self.edges
    }
    fn edges_mut(&mut self) -> &mut IndexVec<NodeId, Vec<Option<NodeId>>> {
        &mut self.edges
    }
    fn active(&self) -> &IndexVec<NodeId, bool> {
        &self.active
    }
    fn active_mut(&mut self) -> &mut IndexVec<NodeId, bool> {
        &mut self.active
    }
    fn num_active(&self) -> usize {
        self.num_active
    }
    fn num_active_mut(&mut self) -> &mut usize {
        &mut self.num_active
    }
    fn kappa_mut(&mut self) -> &mut Vec<(NodeId, NodeId)> {
        &mut self.kappa
    }
    fn rep(&self) -> &[usize] {
        &self.rep
    }

    /// Installs the I2 back-edge `new_node --inverse(letter)--> source`.
    /// Panics (`GraphInconsistency`) if a conflicting back-edge already
    /// exists: that can only happen if a caller elsewhere violated I2,
    /// never from this method's own logic.
    fn after_node_created(&mut self, source: NodeId, letter: usize, new_node: NodeId) {
        let inverse_letter = self.presentation.inverse(letter);
        match self.edges[new_node][inverse_letter] {
            None => self.edges[new_node][inverse_letter] = Some(source),
            Some(existing) if existing == source => {}
            Some(other) => panic!(
                "GraphInconsistency: back-edge {new_node:?} --{inverse_letter}--> expected \
                 {source:?}, found {other:?}"
            ),
        }
    }
}

impl SchutzenbergerGraph {
    /// Constructs a Schützenberger graph from an inverse monoid
    /// presentation and a representative word.
    pub fn new(presentation: Rc<Presentation>, rep: &str) -> Result<Self, StephenError> {
        let rep = presentation.word(rep)?;
        let alphabet_len = presentation.alphabet_len();
        let mut graph = SchutzenbergerGraph {
            presentation,
            edges: IndexVec::from_vec(vec![vec![None; alphabet_len]]),
            active: IndexVec::from_vec(vec![true]),
            num_active: 1,
            kappa: Vec::new(),
            rep,
        };
        let mut current = node::root();
        for &letter in &graph.rep.clone() {
            current = graph.target(current, letter);
        }
        let _ = current;
        Ok(graph)
    }

    pub fn number_of_nodes(&self) -> usize {
        GraphOps::num_active(self)
    }

    pub fn target(&mut self, node: NodeId, letter: usize) -> NodeId {
        GraphOps::target(self, node, letter)
    }

    pub fn path(&self, node: NodeId, word: &[usize]) -> Option<NodeId> {
        GraphOps::path(self, node, word)
    }

    pub fn last_node_on_path(&self, node: NodeId, word: &[usize]) -> (NodeId, usize) {
        GraphOps::last_node_on_path(self, node, word)
    }

    pub fn active_node_ids(&self) -> Vec<NodeId> {
        GraphOps::active_node_ids(self)
    }

    pub fn rep(&self) -> &[usize] {
        GraphOps::rep(self)
    }

    pub fn run(&mut self) {
        GraphOps::run(self)
    }

    pub fn run_bounded(&mut self, max_steps: usize) -> Result<(), StephenError> {
        GraphOps::run_bounded(self, max_steps)
    }

    /// Saturates the graph, then reports whether `word` represents the
    /// same element of the inverse monoid as the representative this
    /// graph was constructed from.
    pub fn equal_to(&mut self, word: &str) -> Result<bool, StephenError> {
        GraphOps::equal_to(self, word)
    }

    /// Saturates the graph, then reports whether `word` and this graph's
    /// representative reach the same node from the root. Two words are
    /// R-related, in the inverse monoid defined by `presentation`, exactly
    /// when each one's Schützenberger graph accepts the other's
    /// representative.
    pub fn accepts(&mut self, word: &str) -> Result<bool, StephenError> {
        GraphOps::equal_to(self, word)
    }

    /// Saturates the graph, then reports whether `word` labels any defined
    /// path from the root (regardless of where it ends).
    pub fn contains(&mut self, word: &str) -> Result<bool, StephenError> {
        self.run();
        let w = self.presentation.word(word)?;
        Ok(self.path(node::root(), &w).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inverse_monoid(alphabet: &str, relations: &[(&str, &str)]) -> Rc<Presentation> {
        let mut p = Presentation::inverse_monoid();
        p.set_alphabet(alphabet).unwrap();
        for (u, v) in relations {
            p.add_relation(u, v).unwrap();
        }
        Rc::new(p)
    }

    #[test]
    fn free_inverse_monoid_accepts_symmetrically() {
        let p = inverse_monoid("abc", &[]);

        let mut g = SchutzenbergerGraph::new(p.clone(), "aBcAbC").unwrap();
        assert!(!g.accepts("BaAbaBcAbC").unwrap());
        assert!(g.accepts("aBcCbBcAbC").unwrap());

        let mut g = SchutzenbergerGraph::new(p.clone(), "aBcCbBcAbC").unwrap();
        assert!(g.accepts("aBcAbC").unwrap());

        let mut g = SchutzenbergerGraph::new(p, "BaAbaBcAbC").unwrap();
        assert!(g.accepts("aBcAbC").unwrap());
    }

    #[test]
    fn free_inverse_monoid_path_lands_on_expected_node() {
        let p = inverse_monoid("abc", &[]);
        let p_clone = p.clone();
        let mut g = SchutzenbergerGraph::new(p, "aBbcaABAabCc").unwrap();
        let w = p_clone.word("aBbcaABAabCc").unwrap();
        assert_eq!(g.path(node::root(), &w), Some(NodeId::from_usize(3)));
    }

    #[test]
    fn idempotent_generator_collapses_back_on_itself() {
        let p = inverse_monoid("xy", &[]);
        let mut g = SchutzenbergerGraph::new(p.clone(), "xxxyyy").unwrap();
        assert!(g.accepts("xxxyyyYYYXXXxxxyyy").unwrap());

        let mut g = SchutzenbergerGraph::new(p, "xxxyyyYYYXXXxxxyyy").unwrap();
        assert!(g.accepts("xxxyyy").unwrap());
        assert!(!g.accepts("xxx").unwrap());
    }

    #[test]
    fn one_relation_graph_matches_reference_node_and_edge_table() {
        let p = inverse_monoid("xy", &[("xyXxyX", "xyX")]);
        let p_clone = p.clone();
        let mut g = SchutzenbergerGraph::new(p, "xyXyy").unwrap();

        for i in 0..10 {
            let word = format!("x{}Xyy", "y".repeat(i));
            assert!(g.accepts(&word).unwrap());
        }
        assert!(!g.accepts("xXyx").unwrap());
        assert!(!g.accepts("xXxx").unwrap());
        assert!(!g.accepts("xXxy").unwrap());
        assert!(!g.accepts("xXxX").unwrap());
        assert!(!g.accepts("xXyY").unwrap());

        let w = p_clone.word("xyXyy").unwrap();
        assert_eq!(g.path(node::root(), &w), Some(NodeId::from_usize(5)));

        let active: Vec<usize> = g.active_node_ids().iter().map(|n| n.index()).collect();
        assert_eq!(active, vec![0, 1, 4, 5]);

        let expected: Vec<Vec<Option<usize>>> = vec![
            vec![Some(1), Some(4), None, None],
            vec![None, Some(1), Some(0), Some(1)],
            vec![None, Some(1), Some(3), Some(1)],
            vec![Some(1), Some(4), None, None],
            vec![None, Some(5), None, Some(0)],
            vec![None, None, None, Some(4)],
            vec![None, None, Some(3), Some(2)],
            vec![Some(6), None, None, None],
        ];
        for (row_idx, expected_row) in expected.iter().enumerate() {
            let actual_row: Vec<Option<usize>> = (0..4)
                .map(|letter| {
                    g.path(NodeId::from_usize(row_idx), &[letter])
                        .map(|n| n.index())
                })
                .collect();
            assert_eq!(&actual_row, expected_row, "row {row_idx}");
        }
    }

    #[test]
    fn two_relation_graph_collapses_to_a_single_node() {
        let p = inverse_monoid("xy", &[("xyXxyX", "xyX"), ("xyxy", "xy")]);
        let mut g = SchutzenbergerGraph::new(p.clone(), "xyXyy").unwrap();

        assert!(g.accepts("y").unwrap());
        assert!(g.accepts("xxxxxxxxxxxxx").unwrap());
        assert!(g.accepts("xyXxyxyxyxyxyXyy").unwrap());

        assert_eq!(g.active_node_ids(), vec![NodeId::from_usize(0)]);
        for letter in 0..4 {
            assert_eq!(
                g.path(node::root(), &[letter]),
                Some(NodeId::from_usize(0))
            );
        }
        let w = p.word("xyXyy").unwrap();
        assert_eq!(g.path(node::root(), &w), Some(NodeId::from_usize(0)));
    }

    fn small_inverse_monoid(seed: u8) -> (Rc<Presentation>, String) {
        let mut p = Presentation::inverse_monoid();
        p.set_alphabet("xy").unwrap();
        p.add_relation("xxx", "x").unwrap();
        p.add_relation("yyy", "y").unwrap();
        if seed % 2 == 0 {
            p.add_relation("xyy", "yxx").unwrap();
        }
        let rep_len = 1 + (seed as usize % 4);
        let alphabet = ['x', 'y', 'X', 'Y'];
        let rep: String = (0..rep_len)
            .map(|i| alphabet[(seed as usize + i) % alphabet.len()])
            .collect();
        (Rc::new(p), rep)
    }

    #[quickcheck_macros::quickcheck]
    fn back_edges_are_involutive_after_saturation(seed: u8) -> bool {
        let (p, rep) = small_inverse_monoid(seed);
        let mut g = match SchutzenbergerGraph::new(p, &rep) {
            Ok(g) => g,
            Err(_) => return true,
        };
        if g.run_bounded(500).is_err() {
            return true;
        }
        let alphabet_len = g.presentation.alphabet_len();
        g.active_node_ids().iter().all(|&n| {
            (0..alphabet_len).all(|letter| match g.path(n, &[letter]) {
                None => true,
                Some(m) => g.path(m, &[g.presentation.inverse(letter)]) == Some(n),
            })
        })
    }

    #[quickcheck_macros::quickcheck]
    fn accepts_is_symmetric_for_bounded_random_inverse_monoids(seed: u8) -> bool {
        let (p, rep) = small_inverse_monoid(seed);
        let other_seed = seed.wrapping_add(7);
        let (_, other_rep) = small_inverse_monoid(other_seed);

        let mut g1 = match SchutzenbergerGraph::new(p.clone(), &rep) {
            Ok(g) => g,
            Err(_) => return true,
        };
        let mut g2 = match SchutzenbergerGraph::new(p, &other_rep) {
            Ok(g) => g,
            Err(_) => return true,
        };
        if g1.run_bounded(500).is_err() || g2.run_bounded(500).is_err() {
            return true;
        }
        g1.accepts(&other_rep).unwrap() == g2.accepts(&rep).unwrap()
    }
}
