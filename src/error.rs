use core::fmt;

use crate::Key;

/// Why a mutating operation left the tree untouched.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// An insert named a key that is already in the tree.
    DuplicateKey(Key),
    /// A delete named a key that is not in the tree.
    KeyNotFound(Key),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DuplicateKey(key) => write!(f, "key {key} is already present"),
            Error::KeyNotFound(key) => write!(f, "key {key} not found"),
        }
    }
}

impl std::error::Error for Error {}
