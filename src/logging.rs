//! Structured JSON-line logging.
//!
//! Every record is one JSON object on stderr. When `LOG_DIR` is set, records
//! are also appended under `<LOG_DIR>/<RUN_ID>/`: trace and debug go to
//! `trace.jsonl`, everything else to `events.jsonl`.
//!
//! Response bodies can hold account data, so they are logged as a SHA-256
//! digest plus length, never verbatim.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl Level {
    pub fn from_env() -> Self {
        match std::env::var("LOG_LEVEL").as_deref() {
            Ok("trace") => Level::Trace,
            Ok("debug") => Level::Debug,
            Ok("info") => Level::Info,
            Ok("warn") => Level::Warn,
            Ok("error") => Level::Error,
            Ok("fatal") => Level::Fatal,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

// =============================================================================
// Log Domains (categories for filtering)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Decode,   // Wire shape coercion and record resolution
    Validate, // Cross-field order rules
    Encode,   // Outbound form fields
    Classify, // Error channel selection
    Client,   // Endpoint dispatch
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Decode => "decode",
            Domain::Validate => "validate",
            Domain::Encode => "encode",
            Domain::Classify => "classify",
            Domain::Client => "client",
        }
    }

    pub fn is_enabled(&self) -> bool {
        // LOG_DOMAINS: comma-separated list or "all"
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

// =============================================================================
// Run sink
// =============================================================================

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static RUN_SINK: OnceLock<Option<RunSink>> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

/// JSONL files for one run.
#[derive(Debug)]
pub struct RunSink {
    run_id: String,
    dir: PathBuf,
    events: Mutex<BufWriter<File>>,
    trace: Mutex<BufWriter<File>>,
}

impl RunSink {
    pub fn open(base: &Path, run_id: &str) -> io::Result<Self> {
        let dir = base.join(run_id);
        create_dir_all(&dir)?;
        let open = |name: &str| -> io::Result<Mutex<BufWriter<File>>> {
            let file = OpenOptions::new().create(true).append(true).open(dir.join(name))?;
            Ok(Mutex::new(BufWriter::new(file)))
        };
        Ok(Self {
            run_id: run_id.to_string(),
            events: open("events.jsonl")?,
            trace: open("trace.jsonl")?,
            dir,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write(&self, level: Level, line: &str) {
        let writer = match level {
            Level::Trace | Level::Debug => &self.trace,
            _ => &self.events,
        };
        if let Ok(mut w) = writer.lock() {
            let _ = writeln!(w, "{}", line);
            let _ = w.flush();
        }
    }
}

fn run_sink() -> Option<&'static RunSink> {
    RUN_SINK
        .get_or_init(|| {
            let base = std::env::var("LOG_DIR").ok()?;
            let run_id = std::env::var("RUN_ID")
                .unwrap_or_else(|_| format!("r-{}-{}", ts_epoch_ms(), process::id()));
            match RunSink::open(Path::new(&base), &run_id) {
                Ok(sink) => Some(sink),
                Err(err) => {
                    eprintln!("[log] failed to open run dir under {}: {}", base, err);
                    None
                }
            }
        })
        .as_ref()
}

fn sanitize_fields(mut fields: Map<String, Value>) -> Map<String, Value> {
    let redacted = Value::String("[REDACTED]".to_string());
    for key in ["authorization", "Authorization", "access_token", "account_id"] {
        if fields.contains_key(key) {
            fields.insert(key.to_string(), redacted.clone());
        }
    }
    fields
}

// =============================================================================
// Core logging functions
// =============================================================================

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn ts_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// Emit a structured log entry
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    let min_level = Level::from_env();
    if level < min_level || !domain.is_enabled() {
        return;
    }

    let sink = run_sink();
    let run_id = sink.map(|s| s.run_id.as_str());
    let line = format_record(level, domain, event, run_id, fields);
    if let Some(sink) = sink {
        sink.write(level, &line);
    }
    eprintln!("{}", line);
}

/// Render one record. `msg` is lifted to the top level, the rest goes under `data`.
pub fn format_record(
    level: Level,
    domain: Domain,
    event: &str,
    run_id: Option<&str>,
    fields: Map<String, Value>,
) -> String {
    let mut data = sanitize_fields(fields);
    let msg = data.remove("msg").unwrap_or(Value::String(String::new()));

    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    if let Some(run_id) = run_id {
        entry.insert("run_id".to_string(), json!(run_id));
    }
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("component".to_string(), json!(domain.as_str()));
    entry.insert("event".to_string(), json!(event));
    entry.insert("msg".to_string(), msg);
    entry.insert("data".to_string(), Value::Object(data));
    Value::Object(entry).to_string()
}

// =============================================================================
// Helpers
// =============================================================================

/// Hex SHA-256 of a payload, for logging bodies without their content.
pub fn body_digest(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}
