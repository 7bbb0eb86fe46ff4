//! Minimal retry-only example with a caller-side backoff in the retry hook.
use retry_call::prelude::*;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
enum FetchError {
    #[error("upstream busy")]
    Busy,
    #[error("bad request")]
    BadRequest,
}

fn main() -> Result<(), FetchError> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let query = std::env::args().nth(1).unwrap_or_else(|| "ping".to_string());
    let mut been_there = 0;
    let mut delay = Duration::from_millis(50);

    let value = Call::new(|| {
        println!("been there: {}", been_there);
        if query.is_empty() {
            return Err(FetchError::BadRequest);
        }
        if been_there == 2 {
            return Ok("hello from retry");
        }
        been_there += 1;
        Err(FetchError::Busy)
    })
    .max_retry(3)
    .is_retryable(|e| !matches!(e, FetchError::BadRequest))
    .on_retry(|| {
        println!("retrying in {:?}", delay);
        std::thread::sleep(delay);
        delay *= 2;
    })
    .run()?;

    println!("{}", value);
    Ok(())
}
