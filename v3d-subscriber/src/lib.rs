//! # v3d Subscriber
//!
//! Receives scene documents from a publisher on a dedicated worker thread
//! and hands them to the thread that owns the scene.
//!
//! The worker never touches the scene model. It only parses payloads and
//! sends [`SubscriberEvent`]s through a bounded channel; the owning thread
//! drains them with [`Subscriber::try_recv`] or [`Subscriber::drain`] and
//! applies each document itself.
//!
//! ```rust,no_run
//! use v3d_subscriber::{Subscriber, SubscriberConfig, SubscriberEvent};
//!
//! # fn main() -> v3d_core::Result<()> {
//! let mut sub = Subscriber::start(SubscriberConfig::default())?;
//! for event in sub.drain() {
//!     match event {
//!         SubscriberEvent::Document(doc) => println!("scene: {}", doc),
//!         SubscriberEvent::Status(text) | SubscriberEvent::Failed(text) => println!("{}", text),
//!     }
//! }
//! sub.stop();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod subscriber;
pub mod transport;

pub use config::*;
pub use error::*;
pub use subscriber::*;
pub use transport::*;
