//! Message transports
//!
//! The worker only needs one capability from the network: wait a bounded
//! time for the next whole message. [`MessageSource`] is that seam; the
//! ZeroMQ SUB socket is the production implementation and
//! [`InProcessSource`] feeds messages from another thread without a network.

use std::time::Duration;

use crate::error::TransportError;

/// A source of whole messages, one document per message
pub trait MessageSource: Send {
    /// Wait at most `timeout` for the next message.
    ///
    /// Returns `Ok(None)` when nothing arrived in time. An `Err` is terminal
    /// for the subscriber that owns the source.
    fn poll(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>, TransportError>;
}

impl<S: MessageSource + ?Sized> MessageSource for Box<S> {
    fn poll(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>, TransportError> {
        (**self).poll(timeout)
    }
}

/// Prefix `payload` with `topic` the way a topic-filtered publisher frames
/// a message: `<topic> <payload>`. An empty topic leaves the payload as is.
pub fn frame_message(topic: &[u8], payload: &[u8]) -> Vec<u8> {
    if topic.is_empty() {
        return payload.to_vec();
    }
    let mut framed = Vec::with_capacity(topic.len() + 1 + payload.len());
    framed.extend_from_slice(topic);
    framed.push(b' ');
    framed.extend_from_slice(payload);
    framed
}

/// Remove the topic prefix and a single separating space, if present
pub fn strip_topic<'a>(topic: &[u8], message: &'a [u8]) -> &'a [u8] {
    if topic.is_empty() {
        return message;
    }
    let body = message.strip_prefix(topic).unwrap_or(message);
    body.strip_prefix(b" ").unwrap_or(body)
}

/// Sending half of an in-process transport
#[derive(Clone)]
pub struct InProcessPublisher {
    tx: flume::Sender<Vec<u8>>,
}

impl InProcessPublisher {
    pub fn send(&self, payload: impl Into<Vec<u8>>) -> Result<(), TransportError> {
        self.tx
            .send(payload.into())
            .map_err(|_| TransportError::Disconnected)
    }
}

/// Receiving half of an in-process transport. Once every publisher handle
/// is dropped, polling fails with [`TransportError::Disconnected`].
pub struct InProcessSource {
    rx: flume::Receiver<Vec<u8>>,
}

/// Create a connected in-process publisher/source pair
pub fn in_process() -> (InProcessPublisher, InProcessSource) {
    let (tx, rx) = flume::unbounded();
    (InProcessPublisher { tx }, InProcessSource { rx })
}

impl MessageSource for InProcessSource {
    fn poll(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>, TransportError> {
        match self.rx.recv_timeout(timeout) {
            Ok(message) => Ok(Some(message)),
            Err(flume::RecvTimeoutError::Timeout) => Ok(None),
            Err(flume::RecvTimeoutError::Disconnected) => Err(TransportError::Disconnected),
        }
    }
}

#[cfg(feature = "zmq")]
pub use self::zmq_transport::{ZmqPublisher, ZmqSource};

#[cfg(feature = "zmq")]
mod zmq_transport {
    use std::time::Duration;

    use tracing::debug;

    use super::{frame_message, MessageSource};
    use crate::error::TransportError;

    /// ZeroMQ SUB socket connected to one publisher.
    ///
    /// Field order matters: the socket must be closed before its context is
    /// terminated.
    pub struct ZmqSource {
        socket: zmq::Socket,
        _context: zmq::Context,
    }

    impl ZmqSource {
        /// Connect outward to `address` and subscribe to `topic`
        /// (empty subscribes to everything)
        pub fn connect(address: &str, topic: &[u8]) -> Result<Self, TransportError> {
            let connect_error = |e: zmq::Error| TransportError::Connect {
                address: address.to_string(),
                message: e.to_string(),
            };

            let context = zmq::Context::new();
            let socket = context.socket(zmq::SUB).map_err(connect_error)?;
            socket.set_linger(0).map_err(connect_error)?;
            socket.set_subscribe(topic).map_err(connect_error)?;
            socket.connect(address).map_err(connect_error)?;
            debug!(address, "SUB socket connected");

            Ok(Self {
                socket,
                _context: context,
            })
        }
    }

    impl MessageSource for ZmqSource {
        fn poll(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>, TransportError> {
            let ready = self
                .socket
                .poll(zmq::POLLIN, timeout.as_millis() as i64)
                .map_err(|e| TransportError::Receive(e.to_string()))?;
            if ready == 0 {
                return Ok(None);
            }
            self.socket
                .recv_bytes(0)
                .map(Some)
                .map_err(|e| TransportError::Receive(e.to_string()))
        }
    }

    /// ZeroMQ PUB socket, used by the demo publisher and in tests
    pub struct ZmqPublisher {
        socket: zmq::Socket,
        _context: zmq::Context,
    }

    impl ZmqPublisher {
        pub fn bind(address: &str) -> Result<Self, TransportError> {
            let connect_error = |e: zmq::Error| TransportError::Connect {
                address: address.to_string(),
                message: e.to_string(),
            };

            let context = zmq::Context::new();
            let socket = context.socket(zmq::PUB).map_err(connect_error)?;
            socket.set_linger(0).map_err(connect_error)?;
            socket.bind(address).map_err(connect_error)?;
            debug!(address, "PUB socket bound");

            Ok(Self {
                socket,
                _context: context,
            })
        }

        /// Publish one document, framed with `topic` when it is not empty
        pub fn send(&self, topic: &[u8], payload: &[u8]) -> Result<(), TransportError> {
            self.socket
                .send(frame_message(topic, payload), 0)
                .map_err(|e| TransportError::Send(e.to_string()))
        }
    }
}
