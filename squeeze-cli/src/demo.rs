//! Demo responder served behind the gzip middleware

use async_trait::async_trait;
use http::StatusCode;
use squeeze_core::{Context, Middleware, Next, Result};

/// Terminal middleware describing the request it received
#[derive(Debug, Clone, Default)]
pub(crate) struct DemoResponder;

#[async_trait]
impl Middleware for DemoResponder {
    async fn call(&self, ctx: &mut Context, _next: Next) -> Result<()> {
        let request = ctx.request();
        let body = format!(
            "method: {}\npath: {}\nbody bytes: {}\n",
            request.method(),
            request.uri().path(),
            request.body().len()
        );

        ctx.text(StatusCode::OK, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::header::CONTENT_TYPE;
    use http::Request;
    use http_body_util::BodyExt;
    use squeeze_core::Pipeline;

    #[tokio::test]
    async fn test_describes_request() {
        let pipeline = Pipeline::builder().with(DemoResponder).build();
        let request = Request::builder()
            .method("PUT")
            .uri("/items/7?verbose=1")
            .body(Bytes::from_static(b"12345"))
            .unwrap();

        let response = pipeline.handle(request).await.unwrap();
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(
            &body[..],
            b"method: PUT\npath: /items/7\nbody bytes: 5\n"
        );
    }
}
