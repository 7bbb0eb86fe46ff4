//! Compile-time prelude coverage test.
use retry_call::prelude::*;
use tower::{service_fn, Layer, ServiceExt};

#[tokio::test]
async fn prelude_reexports_core_types() {
    let value = Call::new(|| Ok::<_, std::io::Error>(5)).max_retry(1).run().expect("call");
    assert_eq!(value, 5);

    let value = (|| Ok::<_, std::io::Error>(6)).retrying(1).run().expect("call ext");
    assert_eq!(value, 6);

    let layer: RetryLayer<std::io::Error> = RetryLayer::new(1);
    let svc: RetryService<_, std::io::Error> =
        layer.layer(service_fn(|_req: ()| async { Ok::<_, std::io::Error>(()) }));
    svc.oneshot(()).await.expect("service call failed");
}
