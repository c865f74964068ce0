//! Fetch status of a lazily populated child collection.

/// Either never fetched, or fetched (possibly empty).
///
/// `Fetched(vec![])` means the remote reported no children;
/// `NotFetched` means nobody asked yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchState<T> {
    /// No sync has populated the collection.
    #[default]
    NotFetched,
    /// Populated by the latest sync.
    Fetched(T),
}

impl<T> FetchState<T> {
    /// Returns `true` once populated.
    #[must_use]
    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Fetched(_))
    }

    /// The collection, if populated.
    #[must_use]
    pub fn fetched(&self) -> Option<&T> {
        match self {
            Self::NotFetched => None,
            Self::Fetched(value) => Some(value),
        }
    }

    /// Mutable access to the collection, if populated.
    pub fn fetched_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::NotFetched => None,
            Self::Fetched(value) => Some(value),
        }
    }

    /// Consume, yielding the collection if populated.
    pub fn into_fetched(self) -> Option<T> {
        match self {
            Self::NotFetched => None,
            Self::Fetched(value) => Some(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fetch_is_not_absence() {
        let never: FetchState<Vec<u8>> = FetchState::default();
        let empty: FetchState<Vec<u8>> = FetchState::Fetched(Vec::new());
        assert!(!never.is_fetched());
        assert!(empty.is_fetched());
        assert_ne!(never, empty);
        assert_eq!(empty.fetched().map(Vec::len), Some(0));
        assert_eq!(never.into_fetched(), None);
    }
}
