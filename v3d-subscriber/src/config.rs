//! Subscriber configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where to subscribe and how the worker paces itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriberConfig {
    /// Publisher endpoint, e.g. `tcp://127.0.0.1:5556`
    pub address: String,
    /// Topic prefix filter; empty receives everything
    pub topic: String,
    /// Upper bound on how long one receive poll blocks
    pub poll_interval_ms: u64,
    /// How long `stop` waits for the worker before detaching it
    pub stop_timeout_ms: u64,
    /// Capacity of the hand-off channel to the consumer
    pub handoff_capacity: usize,
}

impl SubscriberConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn topic_bytes(&self) -> &[u8] {
        self.topic.as_bytes()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            address: "tcp://127.0.0.1:5556".to_string(),
            topic: String::new(),
            poll_interval_ms: 200,
            stop_timeout_ms: 500,
            handoff_capacity: 1,
        }
    }
}
