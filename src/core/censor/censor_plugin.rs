// Censor plugin - lifecycle and the two message-side hooks.
//
// `start()` installs everything the plugin touches in the host: the render
// hook for image elements, and the send/receive message hooks when enabled
// by configuration. `stop()` tears the same hooks down in reverse order and
// is safe to call twice. Evaluations already in flight when `stop()` runs
// complete on their own; there is no cancellation.

use super::censor_models::{CensorConfig, Element, ElementKind};
use super::censor_service::{CensorService, ImageFetcher, SafetyClassifier};
use super::render_pipeline::{Registration, RenderHook, RenderRegistry, TransformOutcome};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// One hook installed by `start()`, recorded so `stop()` can undo it.
enum InstalledHook {
    Render(Registration),
    Send,
    Receive,
}

/// The moderation plugin: owns the service, the registry registrations, and
/// the armed/disarmed state of the message hooks.
pub struct CensorPlugin<F: ImageFetcher, C: SafetyClassifier> {
    service: Arc<CensorService<F, C>>,
    registry: Arc<RenderRegistry>,
    config: CensorConfig,
    started: AtomicBool,
    send_armed: AtomicBool,
    receive_armed: AtomicBool,
    installed: Mutex<Vec<InstalledHook>>,
}

impl<F, C> CensorPlugin<F, C>
where
    F: ImageFetcher + 'static,
    C: SafetyClassifier + 'static,
{
    pub fn new(
        service: Arc<CensorService<F, C>>,
        registry: Arc<RenderRegistry>,
        config: CensorConfig,
    ) -> Self {
        Self {
            service,
            registry,
            config,
            started: AtomicBool::new(false),
            send_armed: AtomicBool::new(false),
            receive_armed: AtomicBool::new(false),
            installed: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &CensorConfig {
        &self.config
    }

    /// Install every hook the configuration asks for. Idempotent: a second
    /// call while started is a no-op.
    pub fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }

        let mut installed = self
            .installed
            .lock()
            .expect("censor plugin teardown list poisoned");

        let registration = self.registry.register(
            ElementKind::Image,
            Arc::clone(&self.service) as Arc<dyn RenderHook>,
        );
        installed.push(InstalledHook::Render(registration));

        if self.config.censor_send {
            self.send_armed.store(true, Ordering::SeqCst);
            installed.push(InstalledHook::Send);
        }

        if self.config.censor_message {
            self.receive_armed.store(true, Ordering::SeqCst);
            installed.push(InstalledHook::Receive);
        }

        tracing::info!(
            censor_send = self.config.censor_send,
            censor_message = self.config.censor_message,
            watched_channels = self.config.scope.len(),
            "Image censor started"
        );
    }

    /// Remove every hook `start()` installed, most recent first. Idempotent:
    /// stopping an already-stopped plugin does nothing.
    pub fn stop(&self) {
        if !self.started.swap(false, Ordering::SeqCst) {
            return;
        }

        let mut installed = self
            .installed
            .lock()
            .expect("censor plugin teardown list poisoned");

        while let Some(hook) = installed.pop() {
            match hook {
                InstalledHook::Render(registration) => self.registry.unregister(&registration),
                InstalledHook::Send => self.send_armed.store(false, Ordering::SeqCst),
                InstalledHook::Receive => self.receive_armed.store(false, Ordering::SeqCst),
            }
        }

        tracing::info!("Image censor stopped");
    }

    /// Render one element through the interception registry. This path is
    /// always active while the plugin is started, independent of the
    /// send/receive hooks.
    pub async fn render(&self, element: Element) -> Element {
        self.registry.render(element).await
    }

    /// Outbound hook: filter a content tree before it leaves the bot.
    /// Disarmed (censor_send off, or stopped) means pass-through.
    pub async fn filter_outgoing(&self, elements: Vec<Element>) -> TransformOutcome {
        if !self.send_armed.load(Ordering::SeqCst) {
            return TransformOutcome::untouched(elements);
        }

        let outcome = self.registry.transform(elements).await;
        if outcome.changed {
            tracing::info!("Blocked an image from being sent");
        }
        outcome
    }

    /// Inbound hook: filter a received content tree. Only channels on the
    /// scope allow-list are inspected; everything else passes untouched.
    pub async fn filter_incoming(
        &self,
        channel_id: u64,
        elements: Vec<Element>,
    ) -> TransformOutcome {
        if !self.receive_armed.load(Ordering::SeqCst) || !self.config.scope.contains(&channel_id) {
            return TransformOutcome::untouched(elements);
        }

        self.registry.transform(elements).await
    }
}

// ============================================================================
// TESTS
// ============================================================================
