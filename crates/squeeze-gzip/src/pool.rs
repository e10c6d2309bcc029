//! Encoder pool
//!
//! Idle encoders sit on a mutex-protected free list. Taking one moves it out
//! of the list, so an encoder is never shared by two requests. Encoders are
//! reset when handed out and go back to the list when their
//! [`PooledEncoder`] guard drops, on every exit path.

use crate::encoder::GzipEncoder;
use crate::level::CompressionLevel;
use parking_lot::Mutex;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Default cap on idle encoders kept around
///
/// Each idle encoder holds roughly 256 KiB of deflate state.
pub const DEFAULT_MAX_IDLE: usize = 64;

/// Pool of reusable gzip encoders sharing one compression level
#[derive(Clone)]
pub struct GzipPool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    level: CompressionLevel,
    max_idle: usize,
    idle: Mutex<Vec<GzipEncoder>>,
    created: AtomicUsize,
}

impl GzipPool {
    /// Create an empty pool
    pub fn new(level: CompressionLevel) -> Self {
        Self::with_max_idle(level, DEFAULT_MAX_IDLE)
    }

    /// Create an empty pool keeping at most `max_idle` idle encoders
    pub fn with_max_idle(level: CompressionLevel, max_idle: usize) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                level,
                max_idle,
                idle: Mutex::new(Vec::new()),
                created: AtomicUsize::new(0),
            }),
        }
    }

    /// Construct up to `count` idle encoders ahead of the first request
    pub fn prewarm(&self, count: usize) {
        let count = count.min(self.inner.max_idle);
        let mut idle = self.inner.idle.lock();
        while idle.len() < count {
            idle.push(self.inner.create());
        }
    }

    /// Take an encoder, reusing an idle one when available
    pub fn acquire(&self) -> PooledEncoder {
        let reused = self.inner.idle.lock().pop();
        let encoder = match reused {
            Some(mut encoder) => {
                encoder.reset();
                trace!(level = %self.inner.level, "Reusing pooled gzip encoder");
                encoder
            }
            None => self.inner.create(),
        };

        PooledEncoder {
            encoder: Some(encoder),
            pool: Arc::clone(&self.inner),
        }
    }

    /// Compression level of every encoder in this pool
    pub fn level(&self) -> CompressionLevel {
        self.inner.level
    }

    /// Number of idle encoders
    pub fn idle(&self) -> usize {
        self.inner.idle.lock().len()
    }

    /// Number of encoders constructed over the pool's lifetime
    pub fn created(&self) -> usize {
        self.inner.created.load(Ordering::Relaxed)
    }
}

impl PoolInner {
    fn create(&self) -> GzipEncoder {
        let total = self.created.fetch_add(1, Ordering::Relaxed) + 1;
        trace!(level = %self.level, total, "Creating gzip encoder");
        GzipEncoder::new(self.level)
    }

    fn release(&self, encoder: GzipEncoder) {
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(encoder);
        }
    }
}

impl fmt::Debug for GzipPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GzipPool")
            .field("level", &self.inner.level)
            .field("max_idle", &self.inner.max_idle)
            .field("idle", &self.idle())
            .field("created", &self.created())
            .finish()
    }
}

/// Encoder checked out of a [`GzipPool`]
///
/// Returned to the pool on drop.
pub struct PooledEncoder {
    // Always `Some` until `drop` moves the encoder back into the pool
    encoder: Option<GzipEncoder>,
    pool: Arc<PoolInner>,
}

const PRESENT_UNTIL_DROP: &str = "pooled encoder is present until drop";

impl Deref for PooledEncoder {
    type Target = GzipEncoder;

    fn deref(&self) -> &GzipEncoder {
        self.encoder.as_ref().expect(PRESENT_UNTIL_DROP)
    }
}

impl DerefMut for PooledEncoder {
    fn deref_mut(&mut self) -> &mut GzipEncoder {
        self.encoder.as_mut().expect(PRESENT_UNTIL_DROP)
    }
}

impl Drop for PooledEncoder {
    fn drop(&mut self) {
        if let Some(encoder) = self.encoder.take() {
            self.pool.release(encoder);
        }
    }
}

impl fmt::Debug for PooledEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledEncoder")
            .field("encoder", &self.encoder)
            .finish()
    }
}
