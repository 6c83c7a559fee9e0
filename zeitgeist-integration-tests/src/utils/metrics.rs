//! Tools to help testing metrics

use cadence::{SpyMetricSink, StatsdClient};
use crossbeam_channel::Receiver;
use statsd_parser::{Message, Metric};

/// Collects the metrics sent by the server under test, to make assertions
/// about them.
pub struct MetricsWatcher {
    /// Receives each metric line as bytes.
    rx: Receiver<Vec<u8>>,

    /// Metrics received so far.
    messages: Vec<Message>,
}

impl MetricsWatcher {
    /// Make a new metrics watcher, attach it to a [`StatsdClient`] and return both.
    pub fn new_with_client() -> (Self, StatsdClient) {
        let (rx, spy_sink) = SpyMetricSink::new();
        let metrics_client = StatsdClient::from_sink("", spy_sink);
        let metrics_watcher = Self {
            rx,
            messages: vec![],
        };

        (metrics_watcher, metrics_client)
    }

    /// Parse every metric waiting in `rx`. Lines the parser doesn't
    /// understand are skipped.
    fn process_events(&mut self) {
        self.messages.extend(
            self.rx
                .try_iter()
                .filter_map(|bytes| String::from_utf8(bytes).ok())
                .filter_map(|line| statsd_parser::parse(line).ok()),
        );
    }

    /// Get a list of all the metrics seen by this watcher, primarily for debugging.
    pub fn all_messages(&mut self) -> &[Message] {
        self.process_events();
        self.messages.as_slice()
    }

    /// Test if any metric this watcher received matches `predicate`.
    pub fn has<F>(&mut self, predicate: F) -> bool
    where
        F: FnMut(&Message) -> bool,
    {
        self.all_messages().iter().any(predicate)
    }

    /// Test if a counter named `name` was incremented.
    pub fn has_counter(&mut self, name: &str) -> bool {
        self.has(|msg| msg.name == name && matches!(msg.metric, Metric::Counter(_)))
    }

    /// Test if any metric this watcher received was a histogram with the given name and value.
    ///
    /// Values are compared by taking the absolute difference between them, and
    /// checking if it less than an epsilon of 0.0001.
    pub fn has_histogram(&mut self, name: &str, expected_value: f64) -> bool {
        self.has(|msg| {
            msg.name == name
                && match &msg.metric {
                    Metric::Histogram(histogram) => {
                        (histogram.value - expected_value).abs() <= 0.0001
                    }
                    _ => false,
                }
        })
    }
}
