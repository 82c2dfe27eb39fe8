use std::{fmt, rc::Rc};

/// Identity of one animal/object across frames or videos.
///
/// Tracks are compared by identity: clones share the identity, separately
/// created tracks never compare equal even when their names match.
#[derive(Clone)]
pub struct Track(Rc<str>);

impl Track {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Rc::from(name.as_ref()))
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for Track {
    fn default() -> Self {
        Self::new("")
    }
}

impl PartialEq for Track {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Track {}

impl fmt::Debug for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Track({:?})", self.name())
    }
}
