//! Round-robin composite over independently owned child sources
//!
//! A composite holds deep copies of the sources it is built from and hands
//! out one value per call, rotating through its children and skipping those
//! that have nothing left. Composites are themselves sources and can nest.
//!
//! Exhaustion is handled differently by the two read paths:
//! - [`Source::next`] returns `T::default()` once no child has a value, so a
//!   driver pulling a fixed number of values never fails on uneven children.
//! - [`Source::next_batch`] stops early instead and the short batch length
//!   tells the caller nothing was left.

use tracing::{debug, trace};

use datasource_core::{Error, Result, Source};

/// Source that interleaves its children in round-robin order
pub struct CompositeSource<T> {
    /// Owned children, never empty
    sources: Vec<Box<dyn Source<T>>>,

    /// Slot to try first on the next read
    current: usize,
}

impl<T: 'static> CompositeSource<T> {
    /// Build a composite from independent clones of `sources`
    ///
    /// The caller keeps its sources. If cloning any child fails, the clones
    /// made so far are dropped and the error is returned.
    pub fn new(sources: &[&dyn Source<T>]) -> Result<Self> {
        if sources.is_empty() {
            return Err(Error::InvalidArgument(
                "Composite source requires at least one child".into(),
            ));
        }

        let sources = sources
            .iter()
            .map(|source| source.try_clone_box())
            .collect::<Result<Vec<_>>>()?;

        debug!(children = sources.len(), "Created composite source");
        Ok(Self { sources, current: 0 })
    }

    /// Build a composite that takes ownership of already boxed sources
    pub fn from_sources(sources: Vec<Box<dyn Source<T>>>) -> Result<Self> {
        if sources.is_empty() {
            return Err(Error::InvalidArgument(
                "Composite source requires at least one child".into(),
            ));
        }

        debug!(children = sources.len(), "Created composite source");
        Ok(Self { sources, current: 0 })
    }

    /// Deep copy every child, keeping the rotation position
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            sources: clone_children(&self.sources)?,
            current: self.current,
        })
    }

    /// Replace this composite's children with clones of `other`'s
    ///
    /// All clones are made before anything is replaced, so on failure the
    /// receiver is unchanged.
    pub fn assign_from(&mut self, other: &Self) -> Result<()> {
        self.sources = clone_children(&other.sources)?;
        self.current = other.current;
        Ok(())
    }

    /// Number of children
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Always false, a composite has at least one child
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Slot that will be tried first on the next read
    pub fn position(&self) -> usize {
        self.current
    }

    /// Take one value from the first child with data, or `None` after a
    /// full rotation without finding one
    fn next_available(&mut self) -> Result<Option<T>> {
        let count = self.sources.len();
        for _ in 0..count {
            let slot = self.current;
            if self.sources[slot].has_next() {
                let value = self.sources[slot].next()?;
                self.current = (slot + 1) % count;
                return Ok(Some(value));
            }
            self.current = (slot + 1) % count;
        }
        Ok(None)
    }
}

fn clone_children<T>(sources: &[Box<dyn Source<T>>]) -> Result<Vec<Box<dyn Source<T>>>> {
    sources.iter().map(|source| source.try_clone_box()).collect()
}

impl<T> std::fmt::Debug for CompositeSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeSource")
            .field("children", &self.sources.len())
            .field("current", &self.current)
            .finish()
    }
}

impl<T> Source<T> for CompositeSource<T>
where
    T: Default + 'static,
{
    fn next(&mut self) -> Result<T> {
        Ok(self.next_available()?.unwrap_or_default())
    }

    fn next_batch(&mut self, count: usize) -> Result<Vec<T>> {
        if count == 0 {
            return Err(Error::InvalidArgument("Batch count must be non-zero".into()));
        }

        let mut values = Vec::new();
        while values.len() < count {
            match self.next_available()? {
                Some(value) => values.push(value),
                None => {
                    trace!(requested = count, produced = values.len(), "Composite exhausted");
                    break;
                }
            }
        }
        Ok(values)
    }

    fn has_next(&self) -> bool {
        self.sources.iter().any(|source| source.has_next())
    }

    fn reset(&mut self) -> bool {
        for (slot, source) in self.sources.iter_mut().enumerate() {
            if !source.reset() {
                debug!(slot, "Child source cannot reset");
                return false;
            }
        }

        self.current = 0;
        true
    }

    fn try_clone_box(&self) -> Result<Box<dyn Source<T>>> {
        Ok(Box::new(self.try_clone()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::ArraySource;
    use crate::file::FileSource;
    use crate::generator::{from_fn, GeneratorSource};
    use datasource_core::DefaultSource;
    use proptest::prelude::*;

    fn array(values: &[i32]) -> ArraySource<i32> {
        ArraySource::new(values).unwrap()
    }

    fn drain(source: &mut CompositeSource<i32>, count: usize) -> Vec<i32> {
        (0..count).map(|_| source.next().unwrap()).collect()
    }

    #[test]
    fn test_interleaves_equal_children() {
        let odd = array(&[1, 3, 5]);
        let even = array(&[2, 4, 6]);
        let mut composite = CompositeSource::new(&[&odd, &even]).unwrap();

        assert_eq!(drain(&mut composite, 6), vec![1, 2, 3, 4, 5, 6]);
        assert!(!composite.has_next());
    }

    #[test]
    fn test_uneven_children_then_defaults() {
        let short = array(&[1]);
        let long = array(&[2, 3, 4]);
        let mut composite = CompositeSource::new(&[&short, &long]).unwrap();

        assert_eq!(drain(&mut composite, 4), vec![1, 2, 3, 4]);
        assert_eq!(drain(&mut composite, 3), vec![0, 0, 0]);
    }

    #[test]
    fn test_does_not_alias_caller_sources() {
        let mut odd = array(&[1, 3]);
        let even = array(&[2, 4]);
        let mut composite = CompositeSource::new(&[&odd, &even]).unwrap();

        assert_eq!(odd.next().unwrap(), 1);
        assert_eq!(composite.next().unwrap(), 1);
        assert_eq!(odd.next().unwrap(), 3);
        assert_eq!(composite.next().unwrap(), 2);
    }

    #[test]
    fn test_empty_children_rejected() {
        let err = CompositeSource::<i32>::new(&[]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = CompositeSource::<i32>::from_sources(Vec::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_clone_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.txt");
        std::fs::write(&path, "1 2").unwrap();

        let file = FileSource::<i32>::open(&path).unwrap();
        let values = array(&[7]);
        std::fs::remove_file(&path).unwrap();

        let err = CompositeSource::new(&[&values, &file]).unwrap_err();
        assert!(matches!(err, Error::CannotOpen { .. }));
    }

    #[test]
    fn test_next_batch_stops_early() {
        let short = array(&[1]);
        let long = array(&[2, 3, 4]);
        let mut composite = CompositeSource::new(&[&short, &long]).unwrap();

        assert_eq!(composite.next_batch(3).unwrap(), vec![1, 2, 3]);
        assert_eq!(composite.next_batch(10).unwrap(), vec![4]);
        assert!(composite.next_batch(10).unwrap().is_empty());
    }

    #[test]
    fn test_next_batch_zero_rejected() {
        let only = array(&[1]);
        let mut composite = CompositeSource::new(&[&only]).unwrap();
        assert!(matches!(composite.next_batch(0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_rotation_skips_exhausted_child() {
        let a = array(&[1]);
        let b = array(&[10, 20]);
        let c = array(&[100, 200, 300]);
        let mut composite = CompositeSource::new(&[&a, &b, &c]).unwrap();

        assert_eq!(drain(&mut composite, 6), vec![1, 10, 100, 20, 200, 300]);
        assert_eq!(composite.position(), 0);
    }

    #[test]
    fn test_reset_restarts_rotation() {
        let odd = array(&[1, 3]);
        let even = array(&[2, 4]);
        let mut composite = CompositeSource::new(&[&odd, &even]).unwrap();
        drain(&mut composite, 3);

        assert!(composite.reset());
        assert_eq!(composite.position(), 0);
        assert_eq!(drain(&mut composite, 4), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_reset_fails_with_generator_child() {
        let values = array(&[1, 2, 3]);
        let naturals = from_fn({
            let mut n = 100;
            move || {
                n += 1;
                n
            }
        });
        let mut composite = CompositeSource::new(&[&values, &naturals]).unwrap();

        drain(&mut composite, 3);
        let before = composite.position();
        assert_eq!(before, 1);

        assert!(!composite.reset());
        assert_eq!(composite.position(), before);

        // The array child was reset before the generator refused
        assert_eq!(drain(&mut composite, 2), vec![102, 1]);
    }

    #[test]
    fn test_child_failure_propagates() {
        let values = array(&[1, 2]);
        let failing = GeneratorSource::new(|| -> Result<i32> { Err(Error::generator("boom")) });
        let mut composite = CompositeSource::new(&[&values, &failing]).unwrap();

        assert_eq!(composite.next().unwrap(), 1);
        assert!(matches!(composite.next(), Err(Error::Generator(_))));
        assert_eq!(composite.position(), 1);
        assert!(matches!(composite.next_batch(4), Err(Error::Generator(_))));
    }

    #[test]
    fn test_nested_composites() {
        let inner_a = array(&[1, 2]);
        let inner_b = array(&[3, 4]);
        let inner = CompositeSource::new(&[&inner_a, &inner_b]).unwrap();
        let outer_child = array(&[9, 9]);
        let mut outer = CompositeSource::new(&[&inner, &outer_child]).unwrap();

        assert_eq!(drain(&mut outer, 6), vec![1, 9, 3, 9, 2, 4]);
    }

    #[test]
    fn test_default_child_keeps_composite_alive() {
        let values = array(&[5]);
        let filler = DefaultSource::<i32>::new();
        let mut composite = CompositeSource::new(&[&values, &filler]).unwrap();

        assert_eq!(drain(&mut composite, 4), vec![5, 0, 0, 0]);
        assert!(composite.has_next());
        assert!(composite.reset());
    }

    #[test]
    fn test_clone_and_assign_are_independent() {
        let odd = array(&[1, 3, 5]);
        let even = array(&[2, 4, 6]);
        let mut composite = CompositeSource::new(&[&odd, &even]).unwrap();
        composite.next().unwrap();

        let mut copy = composite.try_clone().unwrap();
        assert_eq!(drain(&mut composite, 5), vec![2, 3, 4, 5, 6]);
        assert_eq!(copy.position(), 1);
        assert_eq!(drain(&mut copy, 2), vec![2, 3]);

        let child: Box<dyn Source<i32>> = Box::new(array(&[42]));
        let other = CompositeSource::from_sources(vec![child]).unwrap();
        copy.assign_from(&other).unwrap();
        assert_eq!(copy.len(), 1);
        assert_eq!(drain(&mut copy, 2), vec![42, 0]);
        assert_eq!(drain(&mut composite.try_clone().unwrap(), 1), vec![0]);
    }

    #[test]
    fn test_assign_failure_leaves_receiver() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.txt");
        std::fs::write(&path, "1 2").unwrap();
        let child: Box<dyn Source<i32>> = Box::new(FileSource::<i32>::open(&path).unwrap());
        let other = CompositeSource::from_sources(vec![child]).unwrap();
        std::fs::remove_file(&path).unwrap();

        let values = array(&[7, 8]);
        let mut composite = CompositeSource::new(&[&values]).unwrap();
        assert!(composite.assign_from(&other).is_err());
        assert_eq!(drain(&mut composite, 2), vec![7, 8]);
    }

    proptest! {
        #[test]
        fn prop_equal_children_interleave(
            children in prop::collection::vec(prop::collection::vec(any::<i32>(), 4), 1..6),
        ) {
            let sources: Vec<Box<dyn Source<i32>>> = children
                .iter()
                .map(|values| Box::new(array(values)) as Box<dyn Source<i32>>)
                .collect();
            let mut composite = CompositeSource::from_sources(sources).unwrap();

            let expected: Vec<i32> = (0..4)
                .flat_map(|row| children.iter().map(move |values| values[row]))
                .collect();
            prop_assert_eq!(composite.next_batch(expected.len() + 3).unwrap(), expected);
        }

        #[test]
        fn prop_clone_drains_identically(
            first in prop::collection::vec(any::<i32>(), 1..8),
            second in prop::collection::vec(any::<i32>(), 1..8),
            skip in 0usize..8,
        ) {
            let a = array(&first);
            let b = array(&second);
            let mut composite = CompositeSource::new(&[&a, &b]).unwrap();
            if skip > 0 {
                composite.next_batch(skip).unwrap();
            }

            let mut copy = composite.try_clone_box().unwrap();
            let total = first.len() + second.len();
            prop_assert_eq!(composite.next_batch(total).unwrap(), copy.next_batch(total).unwrap());
        }
    }
}
