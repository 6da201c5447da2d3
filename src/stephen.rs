use std::rc::Rc;

use crate::cayley::{self, CayleyGraph};
use crate::errors::StephenError;
use crate::node;
use crate::presentation::Presentation;
use crate::schutzenberger_graph::SchutzenbergerGraph;

/// Explores the R-classes of a finitely presented inverse monoid.
///
/// Builds one [`SchutzenbergerGraph`] per R-class by left-multiplying
/// every existing class's representative by each generator and
/// deduplicating via mutual containment, starting from the R-class of the
/// identity (the empty word). Terminates only when the monoid is finite.
#[derive(Debug)]
pub struct Stephen {
    presentation: Rc<Presentation>,
    orbit: Vec<SchutzenbergerGraph>,
    graph_lift: Vec<Vec<usize>>,
    finished: bool,
}

impl Stephen {
    /// Seeds the orbit with the R-class of the identity.
    pub fn new(presentation: Rc<Presentation>) -> Result<Self, StephenError> {
        let seed = SchutzenbergerGraph::new(presentation.clone(), "")?;
        Ok(Stephen {
            presentation,
            orbit: vec![seed],
            graph_lift: Vec::new(),
            finished: false,
        })
    }

    /// Grows the orbit to a fixed point: one Schützenberger graph per
    /// R-class of the monoid. Idempotent.
    pub fn run(&mut self) -> Result<(), StephenError> {
        if self.finished {
            return Ok(());
        }
        let alphabet_len = self.presentation.alphabet_len();
        let mut i = 0;
        while i < self.orbit.len() {
            let w = self.orbit[i].rep().to_vec();
            let mut lifts = vec![0usize; alphabet_len];

            for a in 0..alphabet_len {
                let mut rep_prime = Vec::with_capacity(w.len() + 1);
                rep_prime.push(a);
                rep_prime.extend_from_slice(&w);
                let rep_prime_str = self.presentation.string(&rep_prime);
                let mut candidate =
                    SchutzenbergerGraph::new(self.presentation.clone(), &rep_prime_str)?;

                let mut home = None;
                for k in 0..self.orbit.len() {
                    let rep_k_str = self.presentation.string(self.orbit[k].rep());
                    if self.orbit[k].contains(&rep_prime_str)? && candidate.contains(&rep_k_str)? {
                        home = Some(k);
                        break;
                    }
                }

                lifts[a] = match home {
                    Some(k) => k,
                    None => {
                        self.orbit.push(candidate);
                        let new_index = self.orbit.len() - 1;
                        log::debug!(
                            "stephen: discovered R-class #{new_index} via generator {a} from class #{i}"
                        );
                        new_index
                    }
                };
            }

            self.graph_lift.push(lifts);
            i += 1;
        }
        self.finished = true;
        Ok(())
    }

    /// The size of the monoid: the sum of active-node counts across every
    /// R-class's Schützenberger graph.
    pub fn size(&mut self) -> Result<usize, StephenError> {
        self.run()?;
        Ok(self.orbit.iter().map(SchutzenbergerGraph::number_of_nodes).sum())
    }

    pub fn number_of_r_classes(&mut self) -> Result<usize, StephenError> {
        self.run()?;
        Ok(self.orbit.len())
    }

    pub fn schutzenberger_graphs(&mut self) -> Result<&[SchutzenbergerGraph], StephenError> {
        self.run()?;
        Ok(&self.orbit)
    }

    /// The R-class's Schützenberger graph whose language contains `w`, if
    /// any.
    pub fn schutzenberger_graph(
        &mut self,
        w: &str,
    ) -> Result<Option<&SchutzenbergerGraph>, StephenError> {
        self.run()?;
        for idx in 0..self.orbit.len() {
            if self.orbit[idx].contains(w)? {
                return Ok(Some(&self.orbit[idx]));
            }
        }
        Ok(None)
    }

    /// Whether `u` and `v` are R-related, tested independently of the
    /// orbit: builds a fresh Schützenberger graph for each and checks
    /// mutual acceptance.
    pub fn equal_to(&self, u: &str, v: &str) -> Result<bool, StephenError> {
        let mut gu = SchutzenbergerGraph::new(self.presentation.clone(), u)?;
        let mut gv = SchutzenbergerGraph::new(self.presentation.clone(), v)?;
        Ok(gu.accepts(v)? && gv.accepts(u)?)
    }

    pub fn left_cayley_graph(&mut self) -> Result<CayleyGraph, StephenError> {
        self.run()?;
        Ok(cayley::left_cayley_graph(
            &self.presentation,
            &self.orbit,
            &self.graph_lift,
        ))
    }

    pub fn right_cayley_graph(&mut self) -> Result<CayleyGraph, StephenError> {
        let left = self.left_cayley_graph()?;
        Ok(cayley::right_cayley_graph(&left))
    }

    pub fn number_of_d_classes(&mut self) -> Result<usize, StephenError> {
        let left = self.left_cayley_graph()?;
        let right = cayley::right_cayley_graph(&left);
        Ok(cayley::number_of_d_classes(&left, &right))
    }

    /// Shortlex-shortest representative of every R-class/node, indexed
    /// the same way as [`Stephen::left_cayley_graph`]'s flat node ids.
    pub fn normal_forms(&mut self) -> Result<Vec<String>, StephenError> {
        let right = self.right_cayley_graph()?;
        Ok(cayley::normal_forms(&self.presentation, &right))
    }

    /// Shortlex-shortest word representing the same element as `w`.
    pub fn normal_form(&mut self, w: &str) -> Result<String, StephenError> {
        self.run()?;
        let word = self.presentation.word(w)?;
        let (k, landed) = self
            .orbit
            .iter()
            .enumerate()
            .find_map(|(k, g)| g.path(node::root(), &word).map(|n| (k, n)))
            .expect("a finished orbit's Schützenberger graphs cover every word over the alphabet");

        let left = cayley::left_cayley_graph(&self.presentation, &self.orbit, &self.graph_lift);
        let flat = left
            .flat_index(k, landed)
            .expect("landed node is active in the R-class graph that produced it");
        let right = cayley::right_cayley_graph(&left);
        Ok(cayley::normal_forms(&self.presentation, &right)[flat].clone())
    }
}
