//! Default extension type for the equivalence check.

use std::hash::{Hash, Hasher};

use crate::Bean;

/// A bean that is never equal to, and never hashes like, any bean under test.
///
/// Used as the second participant in the equivalence check when the caller
/// does not supply one.
#[derive(Debug, Clone, Default, PartialEq, Bean)]
#[bean(default)]
pub struct Unrelated {
    marker: Option<String>,
}

impl Unrelated {
    pub fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }
}

// The type tag keeps a fresh instance from colliding with beans whose fields
// all hash to nothing.
impl Hash for Unrelated {
    fn hash<H: Hasher>(&self, state: &mut H) {
        "beanprobe::Unrelated".hash(state);
        self.marker.hash(state);
    }
}
