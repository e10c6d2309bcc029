//! Middleware trait and chain

use crate::{Context, Result};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Middleware trait for request/response processing
#[async_trait]
pub trait Middleware: Send + Sync + fmt::Debug {
    /// Process a request
    ///
    /// # Arguments
    ///
    /// * `ctx` - The request and its response writer
    /// * `next` - The next middleware/handler in the chain
    ///
    /// Middleware that does not call `next` ends the chain.
    async fn call(&self, ctx: &mut Context, next: Next) -> Result<()>;
}

/// Represents the next middleware/handler in the chain
pub struct Next {
    middleware_stack: Arc<[Arc<dyn Middleware>]>,
    index: usize,
}

impl Next {
    /// Create a new Next from a middleware stack
    pub fn new(middleware_stack: Arc<[Arc<dyn Middleware>]>) -> Self {
        Self {
            middleware_stack,
            index: 0,
        }
    }

    /// A `Next` with nothing left to run
    pub fn end() -> Self {
        Self::new(Arc::new([]))
    }

    /// Run the next middleware
    ///
    /// Returns `Ok(())` once the chain is exhausted or the context was aborted.
    pub async fn run(self, ctx: &mut Context) -> Result<()> {
        if ctx.is_aborted() {
            return Ok(());
        }

        match self.middleware_stack.get(self.index) {
            Some(middleware) => {
                let next = Self {
                    middleware_stack: Arc::clone(&self.middleware_stack),
                    index: self.index + 1,
                };
                middleware.call(ctx, next).await
            }
            None => Ok(()),
        }
    }

    /// Number of middleware still to run
    pub fn remaining(&self) -> usize {
        self.middleware_stack.len().saturating_sub(self.index)
    }
}

impl Clone for Next {
    fn clone(&self) -> Self {
        Self {
            middleware_stack: Arc::clone(&self.middleware_stack),
            index: self.index,
        }
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("index", &self.index)
            .field("remaining", &self.remaining())
            .finish()
    }
}
