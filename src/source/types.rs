//! Source traits and adapters
//!
//! A source is an ordered sequence that can only be read through
//! skip/take windows, plus an expensive count query.

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Ordered sequence read through skip/take windows
///
/// `read` returns fewer than `take` items, possibly none, only at the end
/// of the sequence. Cursors call `count` at most once.
pub trait SequenceSource {
    /// Item type
    type Item;

    /// Read up to `take` items after skipping `skip`
    fn read(&self, skip: u64, take: usize) -> Result<Vec<Self::Item>>;

    /// Total number of items
    fn count(&self) -> Result<u64>;
}

impl<S: SequenceSource + ?Sized> SequenceSource for &S {
    type Item = S::Item;

    fn read(&self, skip: u64, take: usize) -> Result<Vec<Self::Item>> {
        (**self).read(skip, take)
    }

    fn count(&self) -> Result<u64> {
        (**self).count()
    }
}

impl<S: SequenceSource + ?Sized> SequenceSource for Box<S> {
    type Item = S::Item;

    fn read(&self, skip: u64, take: usize) -> Result<Vec<Self::Item>> {
        (**self).read(skip, take)
    }

    fn count(&self) -> Result<u64> {
        (**self).count()
    }
}

impl<S: SequenceSource + ?Sized> SequenceSource for Arc<S> {
    type Item = S::Item;

    fn read(&self, skip: u64, take: usize) -> Result<Vec<Self::Item>> {
        (**self).read(skip, take)
    }

    fn count(&self) -> Result<u64> {
        (**self).count()
    }
}

/// Async counterpart of [`SequenceSource`]
#[async_trait]
pub trait AsyncSequenceSource: Send + Sync {
    /// Item type
    type Item: Send;

    /// Read up to `take` items after skipping `skip`
    async fn read(&self, skip: u64, take: usize) -> Result<Vec<Self::Item>>;

    /// Total number of items
    async fn count(&self) -> Result<u64>;
}

#[async_trait]
impl<S: AsyncSequenceSource + ?Sized> AsyncSequenceSource for Box<S> {
    type Item = S::Item;

    async fn read(&self, skip: u64, take: usize) -> Result<Vec<Self::Item>> {
        (**self).read(skip, take).await
    }

    async fn count(&self) -> Result<u64> {
        (**self).count().await
    }
}

#[async_trait]
impl<S: AsyncSequenceSource + ?Sized> AsyncSequenceSource for Arc<S> {
    type Item = S::Item;

    async fn read(&self, skip: u64, take: usize) -> Result<Vec<Self::Item>> {
        (**self).read(skip, take).await
    }

    async fn count(&self) -> Result<u64> {
        (**self).count().await
    }
}

/// Exposes a synchronous source to the async cursor
///
/// Reads run inline on the calling task, so this suits in-memory and
/// embedded sources rather than network ones.
#[derive(Debug, Clone, Default)]
pub struct BlockingSource<S> {
    inner: S,
}

impl<S> BlockingSource<S> {
    /// Wrap a synchronous source
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// The wrapped source
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Unwrap the source
    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait]
impl<S> AsyncSequenceSource for BlockingSource<S>
where
    S: SequenceSource + Send + Sync,
    S::Item: Send,
{
    type Item = S::Item;

    async fn read(&self, skip: u64, take: usize) -> Result<Vec<Self::Item>> {
        self.inner.read(skip, take)
    }

    async fn count(&self) -> Result<u64> {
        self.inner.count()
    }
}
