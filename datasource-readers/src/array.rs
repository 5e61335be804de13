//! In-memory source backed by an owned buffer
//!
//! The buffer is copied from the caller on construction, so the source never
//! borrows caller storage. Iteration is cursor based and can be rewound.

use std::ops::{Add, AddAssign};

use datasource_core::{Error, Result, Source};

/// Source that yields the elements of an owned buffer in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArraySource<T> {
    /// Owned copy of the data
    data: Vec<T>,

    /// Index of the next element to yield, always `<= data.len()`
    current: usize,
}

impl<T: Clone> ArraySource<T> {
    /// Create a source from a copy of `data`
    pub fn new(data: &[T]) -> Result<Self> {
        Self::from_vec(data.to_vec())
    }
}

impl<T> ArraySource<T> {
    /// Create a source that takes ownership of `data`
    pub fn from_vec(data: Vec<T>) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::InvalidArgument(
                "Array source requires at least one element".into(),
            ));
        }

        Ok(Self { data, current: 0 })
    }

    /// Append one element to the end of the buffer
    ///
    /// The cursor does not move, so an exhausted source has a value again.
    pub fn push(&mut self, value: T) {
        self.data.push(value);
    }

    /// Move the cursor back by one element, stopping at the start
    pub fn step_back(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    /// Total number of elements in the buffer
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Index of the next element to yield
    pub fn position(&self) -> usize {
        self.current
    }

    /// Number of elements left before exhaustion
    pub fn remaining(&self) -> usize {
        self.data.len() - self.current
    }

    /// View the whole buffer
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T> AddAssign<T> for ArraySource<T> {
    fn add_assign(&mut self, value: T) {
        self.push(value);
    }
}

impl<T: Clone> Add<T> for &ArraySource<T> {
    type Output = ArraySource<T>;

    fn add(self, value: T) -> ArraySource<T> {
        let mut result = self.clone();
        result.push(value);
        result
    }
}

impl<T> Add<T> for ArraySource<T> {
    type Output = ArraySource<T>;

    fn add(mut self, value: T) -> ArraySource<T> {
        self.push(value);
        self
    }
}

impl<T> Source<T> for ArraySource<T>
where
    T: Clone + Send + 'static,
{
    fn next(&mut self) -> Result<T> {
        let value = self.data.get(self.current).cloned().ok_or(Error::OutOfRange {
            index: self.current,
            len: self.data.len(),
        })?;
        self.current += 1;
        Ok(value)
    }

    fn next_batch(&mut self, count: usize) -> Result<Vec<T>> {
        let actual = count.min(self.remaining());
        let end = self.current + actual;
        let values = self.data[self.current..end].to_vec();
        self.current = end;
        Ok(values)
    }

    fn has_next(&self) -> bool {
        self.current < self.data.len()
    }

    fn reset(&mut self) -> bool {
        self.current = 0;
        true
    }

    fn try_clone_box(&self) -> Result<Box<dyn Source<T>>> {
        Ok(Box::new(self.clone()))
    }
}
