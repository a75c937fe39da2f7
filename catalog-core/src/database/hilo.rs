//! High-low identifier allocation.
//!
//! A sequence hands out the low end of a block (`hi`); the allocator then
//! serves `hi..hi + block_size` from memory before asking again. Ids left in
//! a block when the process stops are never reused, so gaps are expected.

use std::{
    fmt,
    sync::atomic::{AtomicI64, Ordering},
};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::{
    cancellation::cancellable,
    error::{CatalogError, Result},
};

pub const DEFAULT_HILO_BLOCK_SIZE: i64 = 10;

pub const CATALOG_ITEM_HILO: &str = "catalog_item_hilo";
pub const CATALOG_BRAND_HILO: &str = "catalog_brand_hilo";

/// Supplies the start of the next reserved block.
#[async_trait]
pub trait HiLoSource: Send + Sync {
    async fn next_hi(&self, cancel: &CancellationToken) -> Result<i64>;
}

#[derive(Debug, Clone, Copy)]
struct Block {
    next: i64,
    end: i64,
}

pub struct HiLoAllocator<S> {
    source: S,
    block_size: i64,
    block: Mutex<Block>,
}

impl<S> fmt::Debug for HiLoAllocator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HiLoAllocator")
            .field("source", &std::any::type_name::<S>())
            .field("block_size", &self.block_size)
            .finish_non_exhaustive()
    }
}

impl<S: HiLoSource> HiLoAllocator<S> {
    pub fn new(source: S, block_size: i64) -> Self {
        Self {
            source,
            block_size: block_size.max(1),
            // Empty block: the first call reserves one.
            block: Mutex::new(Block { next: 0, end: 0 }),
        }
    }

    pub fn block_size(&self) -> i64 {
        self.block_size
    }

    pub async fn next_id(&self, cancel: &CancellationToken) -> Result<i64> {
        let mut block = cancellable(cancel, "hilo.next_id", self.block.lock()).await?;

        if block.next >= block.end {
            let hi = self.source.next_hi(cancel).await?;
            if hi <= 0 {
                return Err(CatalogError::Internal(format!(
                    "hi-lo sequence returned non-positive block start {hi}"
                )));
            }
            *block = Block {
                next: hi,
                end: hi + self.block_size,
            };
        }

        let id = block.next;
        block.next += 1;
        Ok(id)
    }
}

/// Process-local sequence mirroring `CREATE SEQUENCE ... INCREMENT BY n`.
#[derive(Debug)]
pub struct InMemorySequence {
    next: AtomicI64,
    increment: i64,
}

impl InMemorySequence {
    pub fn new(increment: i64) -> Self {
        Self {
            next: AtomicI64::new(1),
            increment: increment.max(1),
        }
    }
}

#[async_trait]
impl HiLoSource for InMemorySequence {
    async fn next_hi(&self, _cancel: &CancellationToken) -> Result<i64> {
        Ok(self.next.fetch_add(self.increment, Ordering::SeqCst))
    }
}

#[async_trait]
impl<T: HiLoSource + ?Sized> HiLoSource for std::sync::Arc<T> {
    async fn next_hi(&self, cancel: &CancellationToken) -> Result<i64> {
        (**self).next_hi(cancel).await
    }
}
