//! Source trait and shared adapters for pulling typed values

use crate::error::Result;

/// A producer of typed values
///
/// Every variant (array, file, generator, composite) is driven through this
/// trait so callers can hold a `Box<dyn Source<T>>` without knowing what sits
/// behind it. Sources are single-consumer: they may be moved between threads
/// but are never shared.
pub trait Source<T>: Send {
    /// Produce the next value
    ///
    /// Finite sources fail with an exhaustion error (see
    /// [`Error::is_exhausted`](crate::Error::is_exhausted)) when nothing is left.
    fn next(&mut self) -> Result<T>;

    /// Produce up to `count` values
    ///
    /// The length of the returned vector is the number of values actually
    /// produced. Finite sources return a short batch once exhausted instead
    /// of failing. A failure while producing an element drops everything
    /// gathered so far and propagates the error.
    fn next_batch(&mut self, count: usize) -> Result<Vec<T>>;

    /// Whether a subsequent [`next`](Source::next) is expected to succeed
    fn has_next(&self) -> bool;

    /// Rewind to the initial state
    ///
    /// Returns `false` when the source cannot be rewound. A `false` return
    /// leaves the source as it was.
    fn reset(&mut self) -> bool;

    /// Create an independent deep copy behind a new handle
    ///
    /// The copy shares no buffers or handles with `self`.
    fn try_clone_box(&self) -> Result<Box<dyn Source<T>>>;

    /// Read the next value into `slot`, returning `self` for chaining
    fn read_into(&mut self, slot: &mut T) -> Result<&mut Self>
    where
        Self: Sized,
    {
        *slot = self.next()?;
        Ok(self)
    }

    /// Iterate over the remaining values
    ///
    /// The iterator stops as soon as [`has_next`](Source::has_next) reports
    /// false. Infinite sources yield forever.
    fn iter(&mut self) -> SourceIter<'_, T, Self>
    where
        Self: Sized,
    {
        SourceIter::new(self)
    }
}

impl<T> Source<T> for Box<dyn Source<T>> {
    fn next(&mut self) -> Result<T> {
        (**self).next()
    }

    fn next_batch(&mut self, count: usize) -> Result<Vec<T>> {
        (**self).next_batch(count)
    }

    fn has_next(&self) -> bool {
        (**self).has_next()
    }

    fn reset(&mut self) -> bool {
        (**self).reset()
    }

    fn try_clone_box(&self) -> Result<Box<dyn Source<T>>> {
        (**self).try_clone_box()
    }
}

/// Iterator over the values of a borrowed source
pub struct SourceIter<'a, T, S: ?Sized> {
    /// Source being drained
    source: &'a mut S,

    /// Set once a read fails so the error is reported only once
    failed: bool,

    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<'a, T, S> SourceIter<'a, T, S>
where
    S: Source<T> + ?Sized,
{
    /// Create an iterator that drains `source`
    pub fn new(source: &'a mut S) -> Self {
        Self {
            source,
            failed: false,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T, S> Iterator for SourceIter<'_, T, S>
where
    S: Source<T> + ?Sized,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || !self.source.has_next() {
            return None;
        }

        let item = self.source.next();
        self.failed = item.is_err();
        Some(item)
    }
}
