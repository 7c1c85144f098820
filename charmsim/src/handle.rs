use std::{fmt, hash, rc::Rc};

/// Path naming one emitted event occurrence: `<owner>/on/<event>[<key>]`.
///
/// The owner is the charm name for user events and `framework` for the
/// lifecycle tail. The key is a counter the framework increments on every
/// emission, so handles are unique within one trigger cycle.
#[derive(Debug, Clone, PartialEq, Eq, hash::Hash)]
pub struct Handle {
    owner: Rc<str>,
    kind: Rc<str>,
    key: u64,
}

impl Handle {
    pub(crate) fn new(owner: Rc<str>, kind: Rc<str>, key: u64) -> Self {
        Self { owner, kind, key }
    }

    /// Charm name, or `framework` for lifecycle events.
    #[inline]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Event name, e.g. `start`.
    #[inline]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[inline]
    pub fn key(&self) -> u64 {
        self.key
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/on/{}[{}]", self.owner, self.kind, self.key)
    }
}
