//! HTTP/1 server running a [`Pipeline`] per request

use crate::shutdown::ShutdownSignal;
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper_util::rt::TokioIo;
use squeeze_core::{Body, Error, Pipeline, Result};
use std::convert::Infallible;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Accept loop serving one pipeline
#[derive(Debug)]
pub(crate) struct Server {
    listen: SocketAddr,
    pipeline: Pipeline,
    max_body_size: usize,
    shutdown: ShutdownSignal,
}

impl Server {
    pub(crate) fn new(listen: SocketAddr, pipeline: Pipeline, max_body_size: usize) -> Self {
        Self {
            listen,
            pipeline,
            max_body_size,
            shutdown: ShutdownSignal::new(),
        }
    }

    pub(crate) fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Bind the listen address and serve until shutdown
    pub(crate) async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.listen)
            .await
            .map_err(|e| Error::Internal(format!("Failed to bind to {}: {e}", self.listen)))?;

        self.serve(listener).await
    }

    /// Serve connections from an already bound listener
    pub(crate) async fn serve(self, listener: TcpListener) -> Result<()> {
        tracing::info!(listen = %listener.local_addr()?, "Server listening");
        let mut shutdown_rx = self.shutdown.subscribe();
        let max_body_size = self.max_body_size;

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            tracing::trace!("Accepted connection from {}", addr);
                            let pipeline = self.pipeline.clone();

                            tokio::spawn(async move {
                                let service = hyper::service::service_fn(move |req| {
                                    let pipeline = pipeline.clone();
                                    async move {
                                        Ok::<_, Infallible>(handle(&pipeline, req, max_body_size).await)
                                    }
                                });

                                let io = TokioIo::new(stream);
                                if let Err(e) = hyper::server::conn::http1::Builder::new()
                                    .serve_connection(io, service)
                                    .await
                                {
                                    tracing::error!("HTTP connection error: {}", e);
                                }
                            });
                        }
                        Err(e) => {
                            tracing::error!("Failed to accept connection: {}", e);
                        }
                    }
                }

                _ = shutdown_rx.recv() => {
                    tracing::info!("Shutdown signal received");
                    break;
                }
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }
}

/// Buffer the request body, run the pipeline and render errors
async fn handle(
    pipeline: &Pipeline,
    req: Request<Incoming>,
    max_body_size: usize,
) -> Response<Body> {
    let result = match read_request(req, max_body_size).await {
        Ok(request) => pipeline.handle(request).await,
        Err(e) => Err(e),
    };

    result.unwrap_or_else(|e| {
        tracing::error!("Request handler error: {}", e);
        let mut response = Response::new(Full::new(Bytes::from(format!("Error: {e}"))));
        *response.status_mut() = e.to_status_code();
        response
    })
}

async fn read_request(req: Request<Incoming>, max_body_size: usize) -> Result<Request<Bytes>> {
    let (parts, body) = req.into_parts();
    let body = Limited::new(body, max_body_size)
        .collect()
        .await
        .map_err(|e| {
            if e.is::<LengthLimitError>() {
                tracing::warn!(limit = max_body_size, "Request body exceeds limit");
                return Error::PayloadTooLarge(max_body_size);
            }
            match e.downcast::<hyper::Error>() {
                Ok(e) => Error::Http(*e),
                Err(e) => Error::InvalidRequest(e.to_string()),
            }
        })?
        .to_bytes();
    Ok(Request::from_parts(parts, body))
}
