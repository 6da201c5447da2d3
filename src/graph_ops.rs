//! The saturation algorithm shared by [`crate::WordGraph`] and
//! [`crate::SchutzenbergerGraph`].
//!
//! The reference implementation this crate is translated from expresses the
//! relationship between the two as subclassing: `SchutzenbergerGraph`
//! overrides only `target`, and inherits `run`/`merge`/`elementary_expansion`
//! unchanged. Rust has no implementation inheritance, so this trait plays the
//! same role: a handful of required accessors onto a graph's fields, plus one
//! overridable hook (`after_node_created`), with the rest of Stephen's
//! procedure implemented once as default methods.

use index_vec::IndexVec;

use crate::errors::StephenError;
use crate::node::{self, NodeId};
use crate::presentation::Presentation;

pub(crate) trait GraphOps {
    fn presentation(&self) -> &Presentation;
    fn edges(&self) -> &IndexVec<NodeId, Vec<Option<NodeId>>>;
    fn edges_mut(&mut self) -> &mut IndexVec<NodeId, Vec<Option<NodeId>>>;
    fn active(&self) -> &IndexVec<NodeId, bool>;
    fn active_mut(&mut self) -> &mut IndexVec<NodeId, bool>;
    fn num_active(&self) -> usize;
    fn num_active_mut(&mut self) -> &mut usize;
    fn kappa_mut(&mut self) -> &mut Vec<(NodeId, NodeId)>;
    fn rep(&self) -> &[usize];

    /// Invoked immediately after `target` allocates `new_node` as the
    /// `letter`-successor of `source`. The default does nothing; the
    /// Schützenberger specialisation overrides this to install the I2
    /// back-edge.
    fn after_node_created(&mut self, _source: NodeId, _letter: usize, _new_node: NodeId) {}

    /// tc1: the target of the edge labelled `letter` out of `node`,
    /// allocating a fresh node if it does not yet exist.
    fn target(&mut self, node: NodeId, letter: usize) -> NodeId {
        if let Some(existing) = self.edges()[node][letter] {
            return existing;
        }
        let alphabet_len = self.presentation().alphabet_len();
        let new_node = self.edges_mut().push(vec![None; alphabet_len]);
        self.active_mut().push(true);
        *self.num_active_mut() += 1;
        self.edges_mut()[node][letter] = Some(new_node);
        log::trace!("tc1: created node {new_node:?} as {node:?} --{letter}--> {new_node:?}");
        self.after_node_created(node, letter, new_node);
        new_node
    }

    /// The last node reached by walking the longest prefix of `word` that is
    /// defined starting at `node`, paired with how many letters were
    /// consumed.
    fn last_node_on_path(&self, node: NodeId, word: &[usize]) -> (NodeId, usize) {
        let mut current = node;
        for (consumed, &letter) in word.iter().enumerate() {
            match self.edges()[current][letter] {
                Some(next) => current = next,
                None => return (current, consumed),
            }
        }
        (current, word.len())
    }

    /// The node reached by walking the whole of `word` from `node`, if
    /// every letter is defined.
    fn path(&self, node: NodeId, word: &[usize]) -> Option<NodeId> {
        let (end, consumed) = self.last_node_on_path(node, word);
        (consumed == word.len()).then_some(end)
    }

    /// Active node ids in ascending order.
    fn active_node_ids(&self) -> Vec<NodeId> {
        self.active()
            .iter_enumerated()
            .filter_map(|(id, &is_active)| is_active.then_some(id))
            .collect()
    }

    /// tc3: coalesce `p` and `q` into a single node, retaining the smaller
    /// id. May enqueue further pairs into the pending-merge queue.
    fn merge(&mut self, p: NodeId, q: NodeId) {
        if p == q {
            return;
        }
        let (lo, hi) = if p < q { (p, q) } else { (q, p) };
        log::trace!("tc3: merging {hi:?} into {lo:?}");
        let alphabet_len = self.presentation().alphabet_len();

        for letter in 0..alphabet_len {
            if let Some(hi_target) = self.edges()[hi][letter] {
                match self.edges()[lo][letter] {
                    None => self.edges_mut()[lo][letter] = Some(hi_target),
                    Some(lo_target) => self.kappa_mut().push((lo_target, hi_target)),
                }
            }
        }

        for node in self.active_node_ids() {
            for letter in 0..alphabet_len {
                if self.edges()[node][letter] == Some(hi) {
                    self.edges_mut()[node][letter] = Some(lo);
                }
            }
        }

        for (a, b) in self.kappa_mut().iter_mut() {
            if *a == hi {
                *a = lo;
            }
            if *b == hi {
                *b = lo;
            }
        }

        self.active_mut()[hi] = false;
        *self.num_active_mut() -= 1;
    }

    /// Performs an elementary expansion of `node` using the relation
    /// `(u, v)`. The caller must have already established that `path(node,
    /// u) != path(node, v)`, which guarantees at least one side is defined.
    fn elementary_expansion(&mut self, node: NodeId, u: &[usize], v: &[usize]) {
        if let Some(target_u) = self.path(node, u) {
            log::trace!("elementary expansion at {node:?}: completing the {v:?} side");
            let (mut m, consumed) = self.last_node_on_path(node, v);
            for &letter in &v[consumed..] {
                m = self.target(m, letter);
            }
            self.kappa_mut().push((m, target_u));
        } else {
            self.elementary_expansion(node, v, u);
        }
    }

    /// The first `(node, relation)` pair, in leftmost order (nodes
    /// ascending, relations in insertion order), at which the relation is
    /// violated, if any.
    fn first_violation(&self) -> Option<(NodeId, Vec<usize>, Vec<usize>)> {
        for node in self.active_node_ids() {
            for (u, v) in self.presentation().relations() {
                if self.path(node, u) != self.path(node, v) {
                    log::trace!("relation violated at {node:?}: {u:?} != {v:?}");
                    return Some((node, u.clone(), v.clone()));
                }
            }
        }
        None
    }

    /// Saturates the graph: repeatedly finds and resolves relation
    /// violations until none remain. May not terminate if the induced
    /// subgraph of the right Cayley graph is infinite.
    fn run(&mut self) {
        while let Some((node, u, v)) = self.first_violation() {
            self.elementary_expansion(node, &u, &v);
            while let Some((p, q)) = self.kappa_mut().pop() {
                self.merge(p, q);
            }
        }
    }

    /// As `run`, but gives up with [`StephenError::Budget`] after
    /// `max_steps` elementary expansions, leaving the graph in a
    /// consistent, resumable state.
    fn run_bounded(&mut self, max_steps: usize) -> Result<(), StephenError> {
        for _ in 0..max_steps {
            let Some((node, u, v)) = self.first_violation() else {
                return Ok(());
            };
            self.elementary_expansion(node, &u, &v);
            while let Some((p, q)) = self.kappa_mut().pop() {
                self.merge(p, q);
            }
        }
        if self.first_violation().is_some() {
            Err(StephenError::Budget)
        } else {
            Ok(())
        }
    }

    /// Saturates the graph, then reports whether `word` reaches the same
    /// node as the representative this graph was constructed from.
    fn equal_to(&mut self, word: &str) -> Result<bool, StephenError> {
        self.run();
        let w = self.presentation().word(word)?;
        let rep = self.rep().to_vec();
        Ok(self.path(node::root(), &w) == self.path(node::root(), &rep))
    }
}
