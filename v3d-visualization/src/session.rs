//! Viewer session: the scene, its renderer and the live subscription
//!
//! Everything here runs on the UI context. The subscriber worker only ever
//! talks to the session through its event channel, which
//! [`ViewerSession::pump_events`] drains.

use std::collections::VecDeque;
use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};
use v3d_core::{RandomSceneParams, Result, SceneModel};
use v3d_subscriber::{Subscriber, SubscriberEvent};

use crate::backend::RenderBackend;
use crate::config::ViewerConfig;
use crate::renderer::SceneRenderer;

/// Oldest status lines are dropped past this many
const HISTORY_LIMIT: usize = 1000;

pub struct ViewerSession<B: RenderBackend> {
    config: ViewerConfig,
    model: SceneModel,
    renderer: SceneRenderer<B>,
    subscriber: Option<Subscriber>,
    status: String,
    history: VecDeque<String>,
}

impl<B: RenderBackend> ViewerSession<B> {
    pub fn new(backend: B, config: ViewerConfig) -> Result<Self> {
        let renderer = SceneRenderer::new(backend, config.renderer.clone())?;
        Ok(Self {
            config,
            model: SceneModel::new(),
            renderer,
            subscriber: None,
            status: "Ready".to_string(),
            history: VecDeque::new(),
        })
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn model(&self) -> &SceneModel {
        &self.model
    }

    pub fn renderer(&self) -> &SceneRenderer<B> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut SceneRenderer<B> {
        &mut self.renderer
    }

    /// Latest status line
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Every status line reported so far, oldest first
    pub fn history(&self) -> &VecDeque<String> {
        &self.history
    }

    pub fn counts_text(&self) -> String {
        let (points, segments) = self.model.counts();
        format!("Points: {}    Segments: {}", points, segments)
    }

    fn report(&mut self, status: impl Into<String>) {
        let status = status.into();
        info!(target: "v3d::status", "{}", status);
        if self.history.len() >= HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(status.clone());
        self.status = status;
    }

    /// Replace the scene with a document file. On failure the current scene
    /// is kept.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> bool {
        let path = path.as_ref();
        match v3d_io::load_into(&mut self.model, path) {
            Ok(()) => {
                self.renderer.render(&self.model);
                self.report(format!("Loaded: {}", path.display()));
                true
            }
            Err(e) => {
                self.report(format!("Load error: {}", e));
                false
            }
        }
    }

    pub fn export_file<P: AsRef<Path>>(&mut self, path: P) -> bool {
        let path = path.as_ref();
        match v3d_io::export_model(&self.model, path) {
            Ok(()) => {
                self.report(format!("Exported scene to: {}", path.display()));
                true
            }
            Err(e) => {
                self.report(format!("Export error: {}", e));
                false
            }
        }
    }

    pub fn clear(&mut self) {
        self.model.clear();
        self.renderer.clear();
        self.report("Cleared");
    }

    /// Random scene with the configured parameters
    pub fn generate(&mut self) {
        let params = self.config.random_scene.clone();
        self.generate_with(&params);
    }

    pub fn generate_with(&mut self, params: &RandomSceneParams) {
        self.model.randomize(params);
        self.renderer.render(&self.model);
        self.report("Generated random test data");
    }

    /// Apply one received document. Anything but a JSON object is rejected
    /// and leaves the scene as it is.
    pub fn apply_document(&mut self, document: &Value) -> bool {
        if !document.is_object() {
            self.report("Received unknown message type");
            return false;
        }
        self.model.set_from_value(document);
        self.renderer.render(&self.model);
        self.report("Scene updated");
        true
    }

    /// Pick at a viewport pixel and update the selection
    pub fn pick(&mut self, screen_x: f32, screen_y: f32, multi: bool) -> Option<usize> {
        let index = self.renderer.pick_and_select(screen_x, screen_y, multi);
        if let Some(index) = index {
            let label = self
                .model
                .points()
                .get(index)
                .and_then(|p| p.id.as_ref().map(|id| id.to_string()))
                .unwrap_or_else(|| format!("#{}", index));
            self.report(format!("Picked point {}", label));
        }
        index
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscriber.is_some()
    }

    /// Adopt an already started subscriber, stopping any active one first
    pub fn start_subscription_with(&mut self, subscriber: Subscriber) {
        self.stop_worker();
        let address = subscriber.address().to_string();
        self.subscriber = Some(subscriber);
        self.report(format!("Subscribing {}", address));
    }

    /// Subscribe to `address` with the configured topic and timings
    #[cfg(feature = "zmq")]
    pub fn start_subscription(&mut self, address: &str) -> bool {
        let address = address.trim();
        if address.is_empty() {
            self.report("Invalid addr");
            return false;
        }

        let mut config = self.config.subscriber.clone();
        config.address = address.to_string();
        self.stop_worker();
        match Subscriber::start(config) {
            Ok(subscriber) => {
                self.start_subscription_with(subscriber);
                true
            }
            Err(e) => {
                self.report(format!("Subscriber thread error: {}", e));
                false
            }
        }
    }

    /// Stop the active subscription, or start one on `address`
    #[cfg(feature = "zmq")]
    pub fn toggle_subscription(&mut self, address: &str) -> bool {
        if self.is_subscribed() {
            self.stop_subscription();
            false
        } else {
            self.start_subscription(address)
        }
    }

    pub fn stop_subscription(&mut self) {
        if self.stop_worker() {
            self.report("Subscriber stopped");
        }
    }

    /// Returns whether a worker was active
    fn stop_worker(&mut self) -> bool {
        match self.subscriber.take() {
            Some(mut subscriber) => {
                if !subscriber.stop() {
                    warn!(address = subscriber.address(), "subscriber detached without exiting");
                }
                true
            }
            None => false,
        }
    }

    /// Apply every event the worker has handed over since the last call.
    /// Returns the number of events handled.
    pub fn pump_events(&mut self) -> usize {
        let events = match &self.subscriber {
            Some(subscriber) => subscriber.drain(),
            None => return 0,
        };

        let handled = events.len();
        for event in events {
            match event {
                SubscriberEvent::Document(document) => {
                    self.apply_document(&document);
                }
                SubscriberEvent::Status(status) => self.report(status),
                SubscriberEvent::Failed(status) => {
                    self.report(status);
                    self.stop_worker();
                }
            }
        }
        handled
    }
}
