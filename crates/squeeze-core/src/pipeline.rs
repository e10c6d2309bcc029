//! Middleware pipeline
//!
//! A [`Pipeline`] owns an immutable middleware stack and runs it once per
//! request against a fresh [`BufferedWriter`](crate::BufferedWriter).

use crate::{Body, Context, Middleware, Next, Result};
use bytes::Bytes;
use http::{Request, Response};
use std::fmt;
use std::sync::Arc;

/// Middleware pipeline builder
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    /// Add middleware
    #[must_use]
    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Add shared middleware
    #[must_use]
    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Get the number of middlewares in the chain
    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Check if the chain is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Build the pipeline
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stack: self.middlewares.into(),
        }
    }
}

/// Immutable middleware pipeline, cheap to clone
#[derive(Clone)]
pub struct Pipeline {
    stack: Arc<[Arc<dyn Middleware>]>,
}

impl Pipeline {
    /// Start building a pipeline
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Run the chain for one request
    ///
    /// Errors from the chain are returned as-is; the caller decides how to
    /// render them.
    pub async fn handle(&self, request: Request<Bytes>) -> Result<Response<Body>> {
        let mut ctx = Context::buffered(request);
        self.run(&mut ctx).await?;
        ctx.writer_mut().close()?;
        ctx.into_response()
    }

    /// Run the chain against an existing context
    pub async fn run(&self, ctx: &mut Context) -> Result<()> {
        Next::new(Arc::clone(&self.stack)).run(ctx).await
    }

    /// Number of middleware in the pipeline
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Whether the pipeline has no middleware
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("middleware_count", &self.stack.len())
            .finish()
    }
}
