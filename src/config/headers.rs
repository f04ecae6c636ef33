use axum::http::{header, HeaderValue, Request, Response};
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Header values stamped on every response
const ANY_ORIGIN: &str = "*";
const NOSNIFF: &str = "nosniff";

/// Adds a permissive `Access-Control-Allow-Origin` to every response,
/// including errors and responses to requests without an `Origin` header.
#[derive(Clone, Default)]
pub struct ResponseHeadersLayer;

impl ResponseHeadersLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for ResponseHeadersLayer {
    type Service = ResponseHeadersService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ResponseHeadersService { inner }
    }
}

#[derive(Clone)]
pub struct ResponseHeadersService<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for ResponseHeadersService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = ResponseHeadersFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        ResponseHeadersFuture {
            future: self.inner.call(request),
        }
    }
}

#[pin_project::pin_project]
pub struct ResponseHeadersFuture<F> {
    #[pin]
    future: F,
}

impl<F, ResBody, E> std::future::Future for ResponseHeadersFuture<F>
where
    F: std::future::Future<Output = Result<Response<ResBody>, E>>,
{
    type Output = Result<Response<ResBody>, E>;

    fn poll(self: std::pin::Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        match this.future.poll(cx) {
            Poll::Ready(Ok(mut response)) => {
                let headers = response.headers_mut();
                headers.insert(
                    header::ACCESS_CONTROL_ALLOW_ORIGIN,
                    HeaderValue::from_static(ANY_ORIGIN),
                );
                headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static(NOSNIFF));
                Poll::Ready(Ok(response))
            }
            other => other,
        }
    }
}

pub fn create_response_headers_layer() -> ResponseHeadersLayer {
    ResponseHeadersLayer::new()
}
