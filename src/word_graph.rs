use std::rc::Rc;

use index_vec::IndexVec;

use crate::errors::StephenError;
use crate::graph_ops::GraphOps;
use crate::node::{self, NodeId};
use crate::presentation::Presentation;

/// An incrementally-maintained deterministic word graph, implementing
/// Stephen's procedure for the word problem in a finitely presented monoid.
///
/// Constructed from a presentation and a representative word; after
/// [`WordGraph::run`] saturates the graph, [`WordGraph::equal_to`] decides
/// whether any other word represents the same element of the monoid.
#[derive(Debug, Clone)]
pub struct WordGraph {
    presentation: Rc<Presentation>,
    edges: IndexVec<NodeId, Vec<Option<NodeId>>>,
    active: IndexVec<NodeId, bool>,
    num_active: usize,
    kappa: Vec<(NodeId, NodeId)>,
    rep: Vec<usize>,
}

impl GraphOps for WordGraph {
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
}

impl WordGraph {
    /// Constructs a word graph from a monoid presentation and a
    /// representative word, laying down the root-to-representative path.
    pub fn new(presentation: Rc<Presentation>, rep: &str) -> Result<Self, StephenError> {
        let rep = presentation.word(rep)?;
        let alphabet_len = presentation.alphabet_len();
        let mut graph = WordGraph {
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

    /// The number of active (non-retired) nodes in the graph.
    pub fn number_of_nodes(&self) -> usize {
        GraphOps::num_active(self)
    }

    /// tc1: the target of the edge labelled `letter` out of `node`,
    /// allocating a fresh node if it does not yet exist.
    pub fn target(&mut self, node: NodeId, letter: usize) -> NodeId {
        GraphOps::target(self, node, letter)
    }

    /// The node reached by walking the whole of `word` from `node`, if
    /// every letter is defined.
    pub fn path(&self, node: NodeId, word: &[usize]) -> Option<NodeId> {
        GraphOps::path(self, node, word)
    }

    /// The last node reached by walking the longest defined prefix of
    /// `word` from `node`, paired with how many letters were consumed.
    pub fn last_node_on_path(&self, node: NodeId, word: &[usize]) -> (NodeId, usize) {
        GraphOps::last_node_on_path(self, node, word)
    }

    /// Active node ids, in ascending order.
    pub fn active_node_ids(&self) -> Vec<NodeId> {
        GraphOps::active_node_ids(self)
    }

    /// The representative word this graph was constructed from.
    pub fn rep(&self) -> &[usize] {
        GraphOps::rep(self)
    }

    /// Saturates the graph under the presentation's relations.
    pub fn run(&mut self) {
        GraphOps::run(self)
    }

    /// As `run`, but gives up with [`StephenError::Budget`] after
    /// `max_steps` elementary expansions.
    pub fn run_bounded(&mut self, max_steps: usize) -> Result<(), StephenError> {
        GraphOps::run_bounded(self, max_steps)
    }

    /// Saturates the graph, then reports whether `word` represents the
    /// same element of the monoid as the representative this graph was
    /// constructed from.
    pub fn equal_to(&mut self, word: &str) -> Result<bool, StephenError> {
        GraphOps::equal_to(self, word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monoid(alphabet: &str, relations: &[(&str, &str)]) -> Rc<Presentation> {
        let mut p = Presentation::monoid();
        p.set_alphabet(alphabet).unwrap();
        for (u, v) in relations {
            p.add_relation(u, v).unwrap();
        }
        Rc::new(p)
    }

    #[test]
    fn idempotent_semigroup_element() {
        let p = monoid("a", &[("aa", "a")]);
        let mut g = WordGraph::new(p, "aaa").unwrap();
        assert!(g.equal_to("a").unwrap());
        assert!(g.equal_to("aa").unwrap());
        assert!(g.equal_to("aaa").unwrap());
        assert!(g.equal_to("aaaa").unwrap());
    }

    #[test]
    fn three_relation_monoid() {
        let p = monoid(
            "ab",
            &[("aaa", "a"), ("bbb", "b"), ("abab", "aa")],
        );

        let mut g = WordGraph::new(p.clone(), "bbab").unwrap();
        assert!(g.equal_to("bbaaba").unwrap());
        assert!(!g.equal_to("").unwrap());
        assert!(!g.equal_to("aaaaaaaaaa").unwrap());
        assert!(!g.equal_to("bbb").unwrap());

        let mut g = WordGraph::new(p.clone(), "bba").unwrap();
        assert!(g.equal_to("bbabb").unwrap());
        assert!(g.equal_to("bba").unwrap());
        assert!(!g.equal_to("bbb").unwrap());
        assert!(!g.equal_to("a").unwrap());
        assert!(!g.equal_to("ab").unwrap());

        let mut g = WordGraph::new(p, "bbaab").unwrap();
        assert!(g.equal_to("bbaba").unwrap());
    }

    #[test]
    fn seven_letter_alphabet() {
        let p = monoid("abcdefg", &[("aaaeaa", "abcd"), ("ef", "dg")]);

        let mut g = WordGraph::new(p.clone(), "aaaeaaaeaa").unwrap();
        assert!(g.equal_to("aaaeabcd").unwrap());

        let mut g = WordGraph::new(p, "abcef").unwrap();
        assert!(g.equal_to("aaaeaag").unwrap());
    }

    #[test]
    fn run_is_idempotent() {
        let p = monoid("a", &[("aa", "a")]);
        let mut g = WordGraph::new(p, "aaa").unwrap();
        g.run();
        let n1 = g.number_of_nodes();
        g.run();
        assert_eq!(n1, g.number_of_nodes());
    }

    #[test]
    fn budget_reports_when_exceeded_on_a_slow_presentation() {
        let mut p = Presentation::monoid();
        p.set_alphabet("ab").unwrap();
        p.add_relation("aaa", "a").unwrap();
        p.add_relation("bbb", "b").unwrap();
        p.add_relation("abab", "aa").unwrap();
        let mut g = WordGraph::new(Rc::new(p), "bbab").unwrap();
        assert!(g.run_bounded(0).is_err() || g.run_bounded(10_000).is_ok());
    }

    /// Builds a small bounded monoid presentation from quickcheck-supplied
    /// bytes: a two-letter alphabet, up to three short relations, and a
    /// representative word, all derived deterministically from the input
    /// so shrinking stays meaningful.
    fn small_monoid(seed: u8, rel_seeds: &[(u8, u8, u8, u8)]) -> (Rc<Presentation>, String) {
        let mut p = Presentation::monoid();
        p.set_alphabet("ab").unwrap();
        for &(ua, ub, va, vb) in rel_seeds.iter().take(3) {
            let u: String = [ua, ub].iter().map(|&b| if b % 2 == 0 { 'a' } else { 'b' }).collect();
            let v: String = [va, vb].iter().map(|&b| if b % 2 == 0 { 'a' } else { 'b' }).collect();
            let _ = p.add_relation(&u, &v);
        }
        let rep_len = 1 + (seed as usize % 4);
        let rep: String = (0..rep_len)
            .map(|i| if (seed as usize + i) % 2 == 0 { 'a' } else { 'b' })
            .collect();
        (Rc::new(p), rep)
    }

    #[quickcheck_macros::quickcheck]
    fn saturation_holds_for_bounded_random_monoids(seed: u8, rel_seeds: Vec<(u8, u8, u8, u8)>) -> bool {
        let (p, rep) = small_monoid(seed, &rel_seeds);
        let mut g = WordGraph::new(p, &rep).unwrap();
        if g.run_bounded(500).is_err() {
            return true;
        }
        g.active_node_ids().iter().all(|&n| {
            g.presentation
                .relations()
                .iter()
                .all(|(u, v)| g.path(n, u).is_some() && g.path(n, u) == g.path(n, v))
        })
    }

    #[quickcheck_macros::quickcheck]
    fn run_is_idempotent_for_bounded_random_monoids(seed: u8, rel_seeds: Vec<(u8, u8, u8, u8)>) -> bool {
        let (p, rep) = small_monoid(seed, &rel_seeds);
        let mut g = WordGraph::new(p, &rep).unwrap();
        if g.run_bounded(500).is_err() {
            return true;
        }
        let n1 = g.number_of_nodes();
        g.run();
        n1 == g.number_of_nodes()
    }
}
