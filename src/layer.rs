//! Tower-native retry layer.
//!
//! Applies the same decision procedure as [`Call::run`](crate::Call::run) to an async
//! [`Service`]: each failed attempt is either returned as-is or, when budget remains and the
//! predicate accepts it, followed by the retry hook and a fresh call with a cloned request.
//! Every request gets its own budget.
//!
//! The hook returns a future that is awaited before the next attempt, so a backoff placed there
//! (`tokio::time::sleep`) yields to the runtime instead of blocking the worker thread.
//!
//! Before each retry the inner service must become ready again. If readiness fails, that error
//! replaces the last attempt's failure and no further attempts are made.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::ServiceExt;
use tower_layer::Layer;
use tower_service::Service;

type SharedPredicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;
type SharedHook = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Layer wrapping a service with retry-call semantics.
///
/// A readiness error between attempts is returned in place of the last attempt's failure.
///
/// ```rust
/// use retry_call::RetryLayer;
/// use tower::{service_fn, Layer, ServiceExt};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let layer = RetryLayer::new(2).is_retryable(|e: &std::io::Error| {
///     e.kind() == std::io::ErrorKind::Interrupted
/// });
/// let svc = layer.layer(service_fn(|n: u32| async move { Ok::<_, std::io::Error>(n * 2) }));
/// assert_eq!(svc.oneshot(21).await.unwrap(), 42);
/// # });
/// ```
pub struct RetryLayer<E> {
    max_retry: usize,
    is_retryable: Option<SharedPredicate<E>>,
    on_retry: Option<SharedHook>,
}

impl<E> RetryLayer<E> {
    /// Allow `max_retry` additional attempts per request.
    pub fn new(max_retry: usize) -> Self {
        Self { max_retry, is_retryable: None, on_retry: None }
    }

    /// Predicate deciding whether a failure is worth another attempt.
    pub fn is_retryable<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.is_retryable = Some(Arc::new(predicate));
        self
    }

    /// Async hook awaited right before each retry, typically a sleep.
    ///
    /// A readiness error from the inner service after the hook replaces the last attempt's
    /// failure.
    pub fn on_retry<H, Fut>(mut self, hook: H) -> Self
    where
        H: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_retry = Some(Arc::new(move || hook().boxed()));
        self
    }

    /// Configured per-request retry budget.
    pub fn max_retry_budget(&self) -> usize {
        self.max_retry
    }

    fn retryable(&self, err: &E) -> bool {
        match &self.is_retryable {
            Some(predicate) => predicate(err),
            None => true,
        }
    }
}

impl<E> Clone for RetryLayer<E> {
    fn clone(&self) -> Self {
        Self {
            max_retry: self.max_retry,
            is_retryable: self.is_retryable.clone(),
            on_retry: self.on_retry.clone(),
        }
    }
}

impl<E> fmt::Debug for RetryLayer<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryLayer")
            .field("max_retry", &self.max_retry)
            .field("is_retryable", &self.is_retryable.as_ref().map(|_| "<predicate>"))
            .field("on_retry", &self.on_retry.as_ref().map(|_| "<hook>"))
            .finish()
    }
}

impl<S, E> Layer<S> for RetryLayer<E> {
    type Service = RetryService<S, E>;

    fn layer(&self, service: S) -> Self::Service {
        RetryService { inner: service, layer: self.clone() }
    }
}

/// Retry service produced by [`RetryLayer`].
pub struct RetryService<S, E> {
    inner: S,
    layer: RetryLayer<E>,
}

impl<S: Clone, E> Clone for RetryService<S, E> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone(), layer: self.layer.clone() }
    }
}

impl<S: fmt::Debug, E> fmt::Debug for RetryService<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryService")
            .field("inner", &self.inner)
            .field("layer", &self.layer)
            .finish()
    }
}

impl<S, E, Request> Service<Request> for RetryService<S, E>
where
    Request: Clone + Send + 'static,
    S: Service<Request, Error = E> + Clone + Send + 'static,
    S::Response: Send + 'static,
    S::Future: Send + 'static,
    E: Send + 'static,
{
    type Response = S::Response;
    type Error = E;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        // The ready instance goes into the future; the clone stays behind for the next poll_ready.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let layer = self.layer.clone();

        Box::pin(async move {
            let mut remaining = layer.max_retry;
            let mut attempt = 1usize;

            loop {
                let err = match inner.call(req.clone()).await {
                    Ok(response) => return Ok(response),
                    Err(err) => err,
                };

                if remaining == 0 {
                    if layer.max_retry > 0 {
                        tracing::debug!(attempts = attempt, "retry budget exhausted");
                    }
                    return Err(err);
                }
                if !layer.retryable(&err) {
                    tracing::trace!(attempt, "failure is not retryable");
                    return Err(err);
                }

                remaining -= 1;
                attempt += 1;
                tracing::debug!(attempt, remaining, "retrying request");

                if let Some(hook) = &layer.on_retry {
                    hook().await;
                }

                if let Err(err) = ServiceExt::<Request>::ready(&mut inner).await {
                    return Err(err);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Never;

    #[test]
    fn layer_clone_shares_closures() {
        let layer = RetryLayer::<Never>::new(3).is_retryable(|_| false).on_retry(|| async {});
        let cloned = layer.clone();
        assert_eq!(cloned.max_retry_budget(), 3);
        assert!(!cloned.retryable(&Never));
    }

    #[test]
    fn unset_predicate_accepts_everything() {
        let layer = RetryLayer::<Never>::new(1);
        assert!(layer.retryable(&Never));
    }

    #[test]
    fn debug_elides_closures() {
        let layer = RetryLayer::<Never>::new(2).on_retry(|| async {});
        let rendered = format!("{:?}", layer);
        assert!(rendered.contains("max_retry: 2"));
        assert!(rendered.contains("<hook>"));
        assert!(rendered.contains("is_retryable: None"));
    }
}
