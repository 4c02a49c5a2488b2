use std::fmt;

/// Three-level evidence tag for a splice-junction criterion
///
/// The derived ordering (`No < L2 < L1`) makes the per-field aggregation
/// of condensed rows a plain lattice max: a field never downgrades once
/// stronger evidence has been seen.
///
/// # Example
///
/// ```rust
/// use config::Level;
///
/// let mut tag = Level::L2;
/// tag.upgrade(Level::L1);
/// assert_eq!(tag, Level::L1);
///
/// tag.upgrade(Level::No);
/// assert_eq!(tag, Level::L1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    No,
    L2,
    L1,
}

impl Level {
    /// A result passes at strictness k iff it is L1, or L2 with k >= 2
    #[inline(always)]
    pub fn passes(&self, strictness: u8) -> bool {
        matches!(self, Level::L1) || (matches!(self, Level::L2) && strictness >= 2)
    }

    #[inline(always)]
    pub fn upgrade(&mut self, other: Level) {
        *self = (*self).max(other);
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::L1 => write!(f, "L1"),
            Level::L2 => write!(f, "L2"),
            Level::No => write!(f, "No"),
        }
    }
}

/// Origin of a homology hit table
///
/// Only sequence-search hits drive residue checking; profile-domain hits
/// contribute to region construction and the query summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Profile,
    Sequence,
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchKind::Profile => write!(f, "rpsblast"),
            SearchKind::Sequence => write!(f, "mmseqs"),
        }
    }
}
