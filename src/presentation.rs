use itertools::Itertools;

use crate::errors::StephenError;

/// Whether a [`Presentation`] describes an ordinary monoid, or an inverse
/// monoid (in which case the alphabet is doubled with formal inverses).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Monoid,
    Inverse,
}

/// A finite presentation `<A | R>`: an alphabet `A` together with a list of
/// relations `R`, each relation being a pair of words over `A`.
///
/// Letters are tracked internally as indices into the alphabet, not `char`s,
/// so that words and relations can be stored as plain `Vec<usize>`. In the
/// inverse variant the alphabet is implicitly doubled: `set_alphabet` is
/// given only the lower-case generators, and the upper-case mirror (the
/// formal inverses) is appended automatically.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Presentation {
    kind: Kind,
    alphabet: String,
    relations: Vec<(Vec<usize>, Vec<usize>)>,
}

impl Presentation {
    /// A presentation of an ordinary monoid.
    pub fn monoid() -> Self {
        Presentation {
            kind: Kind::Monoid,
            alphabet: String::new(),
            relations: Vec::new(),
        }
    }

    /// A presentation of an inverse monoid. Generators passed to
    /// `set_alphabet` must be lower case; their formal inverses (the
    /// corresponding upper-case letters) are added automatically.
    pub fn inverse_monoid() -> Self {
        Presentation {
            kind: Kind::Inverse,
            alphabet: String::new(),
            relations: Vec::new(),
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Sets the alphabet of this presentation. May only be called once.
    ///
    /// For an inverse monoid presentation, `alphabet` must contain only
    /// lower-case letters; the exposed alphabet afterwards is
    /// `alphabet` followed by its upper-case mirror.
    pub fn set_alphabet(&mut self, alphabet: &str) -> Result<(), StephenError> {
        if !self.alphabet.is_empty() {
            return Err(StephenError::InvalidAlphabet(
                "the alphabet has already been set".to_string(),
            ));
        }
        if let Some(letter) = alphabet.chars().duplicates().next() {
            return Err(StephenError::InvalidAlphabet(format!(
                "the alphabet must be duplicate free, found repeated letter '{letter}'"
            )));
        }
        if self.kind == Kind::Inverse {
            if let Some(letter) = alphabet.chars().find(|c| !c.is_lowercase()) {
                return Err(StephenError::InvalidAlphabet(format!(
                    "inverse monoid alphabets must be lower case, found '{letter}'"
                )));
            }
        }
        self.alphabet = alphabet.to_string();
        if self.kind == Kind::Inverse {
            self.alphabet
                .extend(alphabet.chars().flat_map(char::to_uppercase));
        }
        Ok(())
    }

    /// Adds the relation `u = v` to this presentation.
    pub fn add_relation(&mut self, u: &str, v: &str) -> Result<(), StephenError> {
        let u = self.word(u)?;
        let v = self.word(v)?;
        self.relations.push((u, v));
        Ok(())
    }

    pub fn relations(&self) -> &[(Vec<usize>, Vec<usize>)] {
        &self.relations
    }

    pub fn alphabet_len(&self) -> usize {
        self.alphabet.chars().count()
    }

    /// Converts a single character to its index in the alphabet.
    pub fn letter(&self, c: char) -> Result<usize, StephenError> {
        self.alphabet.chars().position(|x| x == c).ok_or_else(|| {
            StephenError::UndefinedLetter(format!(
                "'{c}' is not a letter of the alphabet '{}'",
                self.alphabet
            ))
        })
    }

    /// Converts a letter index back to its character. Panics if `index` is
    /// out of range: that can only happen via an internal bug, since every
    /// index handed back by this type is already alphabet-bounded.
    pub fn char(&self, index: usize) -> char {
        self.alphabet
            .chars()
            .nth(index)
            .expect("letter index out of range of the alphabet")
    }

    /// Converts a string to the corresponding word (a list of letter
    /// indices).
    pub fn word(&self, s: &str) -> Result<Vec<usize>, StephenError> {
        if self.alphabet.is_empty() {
            return Err(StephenError::UndefinedLetter(
                "no alphabet defined, call set_alphabet first".to_string(),
            ));
        }
        s.chars().map(|c| self.letter(c)).collect()
    }

    /// Converts a word (a list of letter indices) to the corresponding
    /// string.
    pub fn string(&self, word: &[usize]) -> String {
        word.iter().map(|&idx| self.char(idx)).collect()
    }

    /// The involution `i <-> i + |A|/2` pairing each generator with its
    /// formal inverse. Only meaningful once the alphabet has been doubled
    /// (i.e. for an inverse monoid presentation), but defined uniformly:
    /// nothing about the formula depends on `kind`.
    pub fn inverse(&self, letter: usize) -> usize {
        let half = self.alphabet_len() / 2;
        if letter < half {
            letter + half
        } else {
            letter - half
        }
    }

    /// The formal inverse of a word: reverse it and invert each letter.
    pub fn inverse_word(&self, word: &[usize]) -> Vec<usize> {
        word.iter().rev().map(|&l| self.inverse(l)).collect()
    }
}
