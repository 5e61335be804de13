//! A source that yields the default value of its item type forever

use std::marker::PhantomData;

use crate::error::Result;
use crate::source::Source;

/// Infinite source of `T::default()`
///
/// Useful as a placeholder child in composites and as a filler when a
/// caller needs a source but has no data.
#[derive(Debug)]
pub struct DefaultSource<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> DefaultSource<T> {
    /// Create a new default source
    pub fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<T> Default for DefaultSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for DefaultSource<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T: Default + 'static> Source<T> for DefaultSource<T> {
    fn next(&mut self) -> Result<T> {
        Ok(T::default())
    }

    fn next_batch(&mut self, count: usize) -> Result<Vec<T>> {
        Ok(std::iter::repeat_with(T::default).take(count).collect())
    }

    fn has_next(&self) -> bool {
        true
    }

    fn reset(&mut self) -> bool {
        true
    }

    fn try_clone_box(&self) -> Result<Box<dyn Source<T>>> {
        Ok(Box::new(self.clone()))
    }
}
