#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StephenError {
    #[error("invalid alphabet: {0}")]
    InvalidAlphabet(String),
    #[error("undefined letter: {0}")]
    UndefinedLetter(String),
    #[error("exceeded step budget before the graph saturated")]
    Budget,
}
