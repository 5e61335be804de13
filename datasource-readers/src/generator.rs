//! Source backed by a stateful generator callable

use std::marker::PhantomData;

use datasource_core::{Result, Source};

/// Infinite source that invokes a callable once per value
///
/// The callable is owned by the source and cloned with it, so a clone
/// continues from whatever state the generator has accumulated.
pub struct GeneratorSource<T, G> {
    /// The wrapped generator
    generator: G,

    _marker: PhantomData<fn() -> T>,
}

impl<T, G> GeneratorSource<T, G>
where
    G: FnMut() -> Result<T>,
{
    /// Wrap a fallible generator
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            _marker: PhantomData,
        }
    }
}

/// Wrap a generator that cannot fail
pub fn from_fn<T, F>(mut f: F) -> GeneratorSource<T, impl FnMut() -> Result<T> + Clone>
where
    F: FnMut() -> T + Clone,
{
    GeneratorSource::new(move || Ok(f()))
}

impl<T, G: Clone> Clone for GeneratorSource<T, G> {
    fn clone(&self) -> Self {
        Self {
            generator: self.generator.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, G> std::fmt::Debug for GeneratorSource<T, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorSource").finish_non_exhaustive()
    }
}

impl<T, G> Source<T> for GeneratorSource<T, G>
where
    T: 'static,
    G: FnMut() -> Result<T> + Clone + Send + 'static,
{
    fn next(&mut self) -> Result<T> {
        (self.generator)()
    }

    fn next_batch(&mut self, count: usize) -> Result<Vec<T>> {
        (0..count).map(|_| (self.generator)()).collect()
    }

    fn has_next(&self) -> bool {
        true
    }

    fn reset(&mut self) -> bool {
        false
    }

    fn try_clone_box(&self) -> Result<Box<dyn Source<T>>> {
        Ok(Box::new(self.clone()))
    }
}
