use std::cell::{Ref, RefCell};

/// A lazily recomputed value tagged with the generation it was computed for.
///
/// The owner bumps its generation on every mutation; a read with a newer
/// generation recomputes, any other read returns the stored value.
#[derive(Debug, Default)]
pub struct Cached<T> {
    entry: RefCell<Entry<T>>,
}

#[derive(Debug, Default)]
struct Entry<T> {
    generation: Option<u64>,
    value: T,
}

impl<T: Default> Cached<T> {
    /// Creates an empty cache that is stale for every generation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the stored value was computed for `generation`.
    #[must_use]
    pub fn is_valid(&self, generation: u64) -> bool {
        self.entry.borrow().generation == Some(generation)
    }

    /// Returns the value for `generation`, recomputing it with `compute` if stale.
    ///
    /// # Errors
    ///
    /// Propagates the error from `compute`; the stored value is left untouched.
    pub fn get_or_try_update<E>(
        &self,
        generation: u64,
        compute: impl FnOnce() -> Result<T, E>,
    ) -> Result<Ref<'_, T>, E> {
        if !self.is_valid(generation) {
            let value = compute()?;
            *self.entry.borrow_mut() = Entry {
                generation: Some(generation),
                value,
            };
        }
        Ok(Ref::map(self.entry.borrow(), |entry| &entry.value))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn recomputes_only_on_new_generation() {
        let cache: Cached<u32> = Cached::new();
        let calls = Cell::new(0);
        let compute = || -> Result<u32, ()> {
            calls.set(calls.get() + 1);
            Ok(calls.get() * 10)
        };

        assert!(!cache.is_valid(0));
        assert_eq!(*cache.get_or_try_update(0, compute).unwrap(), 10);
        assert_eq!(*cache.get_or_try_update(0, compute).unwrap(), 10);
        assert_eq!(calls.get(), 1);

        assert_eq!(*cache.get_or_try_update(1, compute).unwrap(), 20);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn failed_compute_keeps_cache_stale() {
        let cache: Cached<u32> = Cached::new();
        assert!(cache.get_or_try_update(3, || Err::<u32, _>("boom")).is_err());
        assert!(!cache.is_valid(3));
    }
}
