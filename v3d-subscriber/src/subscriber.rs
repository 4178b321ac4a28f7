//! Background subscriber worker

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, info, warn};
use v3d_core::{Error, Result};

use crate::config::SubscriberConfig;
use crate::error::{DecodeError, TransportError};
use crate::transport::{strip_topic, MessageSource};

/// What the worker hands to the consuming thread
#[derive(Debug, Clone, PartialEq)]
pub enum SubscriberEvent {
    /// A payload that parsed as JSON
    Document(Value),
    /// Non-fatal, human-readable status (connected, bad message, ...)
    Status(String),
    /// The worker hit an unrecoverable error and has exited
    Failed(String),
}

/// Parse one received message: strip the topic prefix, decode UTF-8, parse JSON
pub fn decode_payload(topic: &[u8], message: &[u8]) -> std::result::Result<Value, DecodeError> {
    let body = strip_topic(topic, message);
    let text = std::str::from_utf8(body)?;
    Ok(serde_json::from_str(text)?)
}

/// Handle to a running subscriber worker.
///
/// Only one worker runs per handle. Dropping the handle stops the worker
/// with the configured bounded wait.
pub struct Subscriber {
    config: SubscriberConfig,
    stop_requested: Arc<AtomicBool>,
    events: flume::Receiver<SubscriberEvent>,
    finished: flume::Receiver<()>,
    handle: Option<JoinHandle<()>>,
}

impl Subscriber {
    /// Start a ZeroMQ SUB worker for `config`
    #[cfg(feature = "zmq")]
    pub fn start(config: SubscriberConfig) -> Result<Self> {
        Self::spawn(config, |config: &SubscriberConfig| {
            crate::transport::ZmqSource::connect(&config.address, config.topic_bytes())
        })
    }

    /// Start a worker whose transport is created by `connect` on the worker
    /// thread. A connect failure is reported as a [`SubscriberEvent::Failed`]
    /// event, not returned here; only failing to spawn the thread is.
    pub fn spawn<S, C>(config: SubscriberConfig, connect: C) -> Result<Self>
    where
        S: MessageSource + 'static,
        C: FnOnce(&SubscriberConfig) -> std::result::Result<S, TransportError> + Send + 'static,
    {
        let (event_tx, events) = flume::bounded(config.handoff_capacity.max(1));
        let (finished_tx, finished) = flume::bounded(1);
        let stop_requested = Arc::new(AtomicBool::new(false));

        let worker = Worker {
            config: config.clone(),
            stop_requested: Arc::clone(&stop_requested),
            events: event_tx,
        };

        let handle = thread::Builder::new()
            .name("v3d-subscriber".to_string())
            .spawn(move || {
                let _finished = FinishedGuard(finished_tx);
                worker.run(connect);
            })
            .map_err(|e| Error::Transport(format!("failed to spawn subscriber thread: {}", e)))?;

        info!(address = %config.address, topic = %config.topic, "subscriber started");

        Ok(Self {
            config,
            stop_requested,
            events,
            finished,
            handle: Some(handle),
        })
    }

    pub fn config(&self) -> &SubscriberConfig {
        &self.config
    }

    pub fn address(&self) -> &str {
        &self.config.address
    }

    /// Whether the worker thread is still alive
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Receiver for worker events, for consumers that integrate it into
    /// their own select loop
    pub fn events(&self) -> &flume::Receiver<SubscriberEvent> {
        &self.events
    }

    /// Next pending event, without blocking
    pub fn try_recv(&self) -> Option<SubscriberEvent> {
        self.events.try_recv().ok()
    }

    /// Wait up to `timeout` for the next event
    pub fn recv_timeout(&self, timeout: Duration) -> Option<SubscriberEvent> {
        self.events.recv_timeout(timeout).ok()
    }

    /// All events pending right now
    pub fn drain(&self) -> Vec<SubscriberEvent> {
        self.events.try_iter().collect()
    }

    /// Ask the worker to exit and wait at most the configured stop timeout.
    ///
    /// Returns `true` if the worker exited in time. A worker that does not
    /// is detached; it still exits at its next poll.
    pub fn stop(&mut self) -> bool {
        self.stop_requested.store(true, Ordering::Release);
        let Some(handle) = self.handle.take() else {
            return true;
        };

        match self.finished.recv_timeout(self.config.stop_timeout()) {
            Ok(()) | Err(flume::RecvTimeoutError::Disconnected) => {
                if handle.join().is_err() {
                    warn!("subscriber worker panicked");
                }
                info!(address = %self.config.address, "subscriber stopped");
                true
            }
            Err(flume::RecvTimeoutError::Timeout) => {
                warn!(
                    timeout_ms = self.config.stop_timeout_ms,
                    "subscriber worker did not exit in time, detaching"
                );
                false
            }
        }
    }
}

impl Drop for Subscriber {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Signals the owning handle when the worker thread ends, including by panic
struct FinishedGuard(flume::Sender<()>);

impl Drop for FinishedGuard {
    fn drop(&mut self) {
        let _ = self.0.try_send(());
    }
}

struct Worker {
    config: SubscriberConfig,
    stop_requested: Arc<AtomicBool>,
    events: flume::Sender<SubscriberEvent>,
}

impl Worker {
    fn should_stop(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    fn run<S, C>(&self, connect: C)
    where
        S: MessageSource,
        C: FnOnce(&SubscriberConfig) -> std::result::Result<S, TransportError>,
    {
        let mut source = match connect(&self.config) {
            Ok(source) => source,
            Err(e) => {
                error!(error = %e, "subscriber failed to connect");
                self.deliver(SubscriberEvent::Failed(format!("Subscriber thread error: {}", e)));
                return;
            }
        };

        self.deliver(SubscriberEvent::Status(format!("Connected -> {}", self.config.address)));

        let interval = self.config.poll_interval();
        let topic = self.config.topic_bytes();
        while !self.should_stop() {
            let message = match source.poll(interval) {
                Ok(Some(message)) => message,
                Ok(None) => continue,
                Err(e) => {
                    error!(error = %e, "subscriber receive loop failed");
                    self.deliver(SubscriberEvent::Failed(format!("Subscriber thread error: {}", e)));
                    break;
                }
            };

            let event = match decode_payload(topic, &message) {
                Ok(document) => SubscriberEvent::Document(document),
                Err(e) => {
                    warn!(error = %e, bytes = message.len(), "dropping malformed payload");
                    SubscriberEvent::Status(format!("Bad message: {}", e))
                }
            };
            if !self.deliver(event) {
                break;
            }
        }

        // the source is dropped here, closing the connection
        drop(source);
        debug!("subscriber worker exiting");
    }

    /// Hand an event to the consumer. Blocks while the channel is full but
    /// keeps observing the stop flag. Returns `false` if the event could not
    /// be delivered because of a stop request or a vanished consumer.
    fn deliver(&self, mut event: SubscriberEvent) -> bool {
        let interval = self.config.poll_interval();
        loop {
            match self.events.send_timeout(event, interval) {
                Ok(()) => return true,
                Err(flume::SendTimeoutError::Timeout(pending)) => {
                    if self.should_stop() {
                        return false;
                    }
                    event = pending;
                }
                Err(flume::SendTimeoutError::Disconnected(_)) => return false,
            }
        }
    }
}
