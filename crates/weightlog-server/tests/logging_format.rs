use std::io;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;
use weightlog_api::SignupRequest;
use weightlog_server::services::auth::signup;
use weightlog_server::{AppState, MemoryMailer, ServerConfig};
use weightlog_store::SqliteStore;

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl<'a> MakeWriter<'a> for SharedBuffer {
    type Writer = BufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        BufferWriter(Arc::clone(&self.0))
    }
}

impl io::Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "lock poisoned"))?;
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn log_lines(sink: &SharedBuffer) -> Vec<Value> {
    let bytes = sink.0.lock().expect("lock output").clone();
    String::from_utf8(bytes)
        .expect("utf8 log output")
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("json log line"))
        .collect()
}

fn state(audit: bool) -> AppState {
    let mut config = ServerConfig::default();
    config.auth.bcrypt_cost = 4;
    config.api.enable_audit_log = audit;
    AppState::new(
        Arc::new(SqliteStore::open_in_memory().expect("store")),
        Arc::new(MemoryMailer::default()),
        config,
    )
}

fn signup_request(email: &str) -> SignupRequest {
    serde_json::from_value(json!({"email": email, "password": "secret-pass"})).expect("request")
}

#[tokio::test]
async fn signup_emits_structured_audit_event() {
    let sink = SharedBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(sink.clone())
        .json()
        .with_max_level(Level::INFO)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    signup(&state(true), signup_request("audit@example.com"))
        .await
        .expect("signup");

    let lines = log_lines(&sink);
    let audit = lines
        .iter()
        .find(|l| l.get("target").and_then(Value::as_str) == Some("weightlog_audit"))
        .expect("audit line");
    assert_eq!(audit.get("level").and_then(Value::as_str), Some("INFO"));
    let fields = audit.get("fields").expect("fields object");
    assert_eq!(fields.get("event").and_then(Value::as_str), Some("signup"));
    assert_eq!(fields.get("request_id").and_then(Value::as_str), Some("req-unknown"));
    assert!(fields.get("user_id").and_then(Value::as_str).is_some());
}

#[tokio::test]
async fn audit_events_can_be_disabled() {
    let sink = SharedBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(sink.clone())
        .json()
        .with_max_level(Level::INFO)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    signup(&state(false), signup_request("quiet@example.com"))
        .await
        .expect("signup");

    assert!(log_lines(&sink)
        .iter()
        .all(|l| l.get("target").and_then(Value::as_str) != Some("weightlog_audit")));
}
