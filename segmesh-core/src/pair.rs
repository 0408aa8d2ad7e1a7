//! Order-independent pair keys.

/// An unordered pair stored in canonical `(min, max)` form.
///
/// Used to deduplicate undirected relations (shared edges, triangle pairs,
/// segment pairs) without encoding both ids into one integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct UnorderedPair<T> {
    low: T,
    high: T,
}

impl<T: Ord + Copy> UnorderedPair<T> {
    pub(crate) fn new(a: T, b: T) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    #[cfg(test)]
    #[rustfmt::skip]
    pub(crate) const fn low(&self) -> T { self.low }

    #[cfg(test)]
    #[rustfmt::skip]
    pub(crate) const fn high(&self) -> T { self.high }
}
