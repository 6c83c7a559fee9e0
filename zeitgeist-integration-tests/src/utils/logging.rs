//! Testing utilities to work with logs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr};
use std::{
    collections::HashMap,
    io::Write,
    sync::{Arc, Mutex, PoisonError},
};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// Collects the JSON lines written by a `tracing_subscriber` JSON layer, so
/// tests can make assertions about the events that were logged.
#[derive(Default)]
pub struct LogWatcher {
    /// Bytes written by the subscriber that have not been parsed yet. May end
    /// with a partial line.
    buf: Arc<Mutex<Vec<u8>>>,

    /// Every complete event parsed so far.
    events: Vec<TracingJsonEvent>,
}

impl LogWatcher {
    /// Make a watcher that already holds `events`. Primarily for testing
    /// LogWatcher itself.
    #[must_use]
    pub fn with_events(events: Vec<TracingJsonEvent>) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    /// Iterate over the events collected so far.
    pub fn events(&mut self) -> std::slice::Iter<TracingJsonEvent> {
        self.parse_complete_lines();
        self.events.iter()
    }

    /// Test if any event received so far matches `predicate`.
    ///
    /// # Example
    ///
    /// ```
    /// # use zeitgeist_integration_tests::{LogWatcher, TracingJsonEvent};
    /// # use tracing::Level;
    /// # let mut fields = std::collections::HashMap::new();
    /// # fields.insert("message".to_string(), serde_json::json!("Batch completed"));
    /// # fields.insert("type".to_string(), serde_json::json!("web.batch.completed"));
    /// # let mut log_watcher = LogWatcher::with_events(vec![
    /// #     TracingJsonEvent {
    /// #         fields,
    /// #         level: Level::INFO,
    /// #         target: String::new(),
    /// #         timestamp: String::new(),
    /// #     }
    /// # ]);
    /// assert!(log_watcher.has(|event| event.has_type("web.batch.completed")));
    /// assert!(!log_watcher.has(|event| event.level == Level::ERROR));
    /// ```
    #[must_use = "LogWatcher::has does not make assertions alone, you probably want to wrap it in assert!()"]
    pub fn has<F>(&mut self, predicate: F) -> bool
    where
        F: FnMut(&TracingJsonEvent) -> bool,
    {
        self.events().any(predicate)
    }

    /// Move every complete line out of the buffer and into `events`.
    fn parse_complete_lines(&mut self) {
        let mut buf = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        let complete = match buf.iter().rposition(|byte| *byte == b'\n') {
            Some(last_newline) => buf.drain(..=last_newline).collect::<Vec<u8>>(),
            None => return,
        };
        drop(buf);

        let text = String::from_utf8(complete).expect("log output was not UTF-8");
        self.events.extend(
            text.lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| {
                    serde_json::from_str(line)
                        .unwrap_or_else(|error| panic!("Bad JSON in log line {:?}: {}", line, error))
                }),
        );
    }
}

impl<'a> MakeWriter<'a> for LogWatcher {
    type Writer = LogWatcherWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWatcherWriter {
            buf: self.buf.clone(),
        }
    }
}

/// The half of a [`LogWatcher`] handed to the subscriber, which writes into
/// the watcher's buffer.
#[derive(Clone)]
pub struct LogWatcherWriter {
    /// The parent watcher's buffer.
    buf: Arc<Mutex<Vec<u8>>>,
}

impl Write for LogWatcherWriter {
    fn write(&mut self, new_bytes: &[u8]) -> std::io::Result<usize> {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(new_bytes);
        Ok(new_bytes.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// A deserialization of [`tracing_subscriber::fmt::format::Json`]'s output format.
#[serde_as]
#[derive(Debug, Deserialize, Serialize)]
pub struct TracingJsonEvent {
    /// The key-value fields logged on the event, usually including `message`.
    pub fields: HashMap<String, Value>,
    /// The level the event was emitted at.
    #[serde_as(as = "DisplayFromStr")]
    pub level: Level,
    /// The target of the event.
    pub target: String,
    /// The time the event was emitted.
    pub timestamp: String,
}

impl TracingJsonEvent {
    /// Test if the field named `field_name` is a string that contains `pat`.
    pub fn field_contains(&self, field_name: &str, pat: &str) -> bool {
        self.fields
            .get(field_name)
            .and_then(Value::as_str)
            .map_or(false, |value| value.contains(pat))
    }

    /// Test if the event was logged with `r#type = event_type`.
    pub fn has_type(&self, event_type: &str) -> bool {
        self.fields.get("type").and_then(Value::as_str) == Some(event_type)
    }
}
