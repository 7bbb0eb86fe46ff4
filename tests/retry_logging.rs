use retry_call::Call;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone)]
struct SharedWriter(Arc<Mutex<Vec<u8>>>);

impl<'a> MakeWriter<'a> for SharedWriter {
    type Writer = SharedGuard;
    fn make_writer(&'a self) -> Self::Writer {
        SharedGuard(self.0.clone())
    }
}

struct SharedGuard(Arc<Mutex<Vec<u8>>>);
impl std::io::Write for SharedGuard {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut guard = self.0.lock().unwrap();
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn capture<F: FnOnce()>(f: F) -> String {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let writer = SharedWriter(buffer.clone());
    let subscriber = tracing_subscriber::fmt()
        .with_writer(BoxMakeWriter::new(writer))
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(true)
        .without_time()
        .finish();
    {
        let _guard = tracing::subscriber::set_default(subscriber);
        f();
    }
    let logs = buffer.lock().unwrap().clone();
    String::from_utf8(logs).unwrap()
}

#[test]
fn retries_and_exhaustion_are_logged() {
    let logs = capture(|| {
        let _ = Call::new(|| Err::<(), _>("boom")).max_retry(2).run();
    });

    assert_eq!(logs.matches("retrying call").count(), 2, "logs: {logs}");
    assert!(logs.contains("remaining=0"), "logs: {logs}");
    assert!(logs.contains("retry budget exhausted"), "logs: {logs}");
    assert!(logs.contains("attempts=3"), "logs: {logs}");
}

#[test]
fn first_try_success_logs_nothing_at_debug() {
    let logs = capture(|| {
        let _ = Call::new(|| Ok::<_, &str>(1)).max_retry(2).run();
    });

    assert!(!logs.contains("retrying call"), "logs: {logs}");
    assert!(!logs.contains("exhausted"), "logs: {logs}");
}
