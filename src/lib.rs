mod cayley;
pub mod errors;
mod graph_ops;
pub mod node;
pub mod presentation;
pub mod schutzenberger_graph;
pub mod stephen;
pub mod word_graph;

pub use cayley::CayleyGraph;
pub use errors::StephenError;
pub use node::NodeId;
pub use presentation::{Kind, Presentation};
pub use schutzenberger_graph::SchutzenbergerGraph;
pub use stephen::Stephen;
pub use word_graph::WordGraph;

// #[cfg(test)]
// mod tests {
//     use std::rc::Rc;
//     use crate::{Presentation, Stephen};
//
//     #[test]
//     fn test_init() -> Result<(), crate::StephenError> {
//         let mut p = Presentation::inverse_monoid();
//         p.set_alphabet("x")?;
//         p.add_relation("xx", "xxxx")?;
//         let mut s = Stephen::new(Rc::new(p))?;
//         println!("{}", s.size()?);
//         Ok(())
//     }
// }
