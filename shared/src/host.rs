//! In-process shell for desktop builds and integration tests.
//!
//! One task owns the [`Core`] and pulls commands and location fixes off a
//! single queue, so transitions are applied strictly in arrival order.
//! Every render is published as a full [`ViewModel`] snapshot.

use std::collections::VecDeque;

use crux_core::{Core, Request};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, instrument, trace};

use crate::app::App;
use crate::capabilities::{Effect, Fix, LocationOperation, LocationResponse};
use crate::config::CoreConfig;
use crate::error::CoreError;
use crate::event::Event;
use crate::persistence::{self, WaypointStore};
use crate::view::ViewModel;

pub const VIEW_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug)]
pub enum HostInput {
    Event(Event),
    /// A report from the device provider for the live subscription.
    Location(LocationResponse),
}

/// Cloneable sender side of the host queue.
#[derive(Clone, Debug)]
pub struct HostHandle {
    tx: mpsc::Sender<HostInput>,
}

impl HostHandle {
    pub async fn send(&self, event: Event) -> Result<(), CoreError> {
        self.tx
            .send(HostInput::Event(event))
            .await
            .map_err(|_| CoreError::HostClosed)
    }

    pub async fn push_location(&self, response: LocationResponse) -> Result<(), CoreError> {
        self.tx
            .send(HostInput::Location(response))
            .await
            .map_err(|_| CoreError::HostClosed)
    }
}

#[must_use]
pub fn inbox(capacity: usize) -> (HostHandle, mpsc::Receiver<HostInput>) {
    let (tx, rx) = mpsc::channel(capacity);
    (HostHandle { tx }, rx)
}

pub struct Host<S> {
    core: Core<Effect, App>,
    store: S,
    views: broadcast::Sender<ViewModel>,
    /// Outstanding watch request; resolved once per pushed response.
    watch: Option<Request<LocationOperation>>,
    last_fix: Option<Fix>,
}

impl<S> Host<S>
where
    S: WaypointStore,
{
    pub fn new(store: S) -> Self {
        let (views, _) = broadcast::channel(VIEW_CHANNEL_CAPACITY);
        Self {
            core: Core::new(),
            store,
            views,
            watch: None,
            last_fix: None,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewModel> {
        self.views.subscribe()
    }

    pub fn view(&self) -> ViewModel {
        self.core.view()
    }

    #[must_use]
    pub fn is_watching(&self) -> bool {
        self.watch.is_some()
    }

    /// Applies `config` and loads the persisted list.
    pub async fn start(&mut self, config: CoreConfig) -> Result<(), CoreError> {
        config.validate()?;
        self.dispatch(Event::Configure { config }).await;
        self.dispatch(Event::Initialize).await;
        Ok(())
    }

    #[instrument(skip_all, fields(event = event.name()))]
    pub async fn dispatch(&mut self, event: Event) {
        let effects = self.core.process_event(event);
        self.drain(effects).await;
    }

    /// Feeds a provider report into the live subscription. Reports arriving
    /// while nothing is subscribed only refresh the cached last-known fix.
    pub async fn push_location(&mut self, response: LocationResponse) {
        if let LocationResponse::Fix(fix) = &response {
            self.last_fix = Some(*fix);
        }

        let Some(mut request) = self.watch.take() else {
            trace!("no live location subscription");
            return;
        };

        let terminal = response.is_terminal();
        let effects = self.core.resolve(&mut request, response);
        if !terminal {
            self.watch = Some(request);
        }
        self.drain(effects).await;
    }

    /// Serves the queue until every [`HostHandle`] is dropped.
    pub async fn run(mut self, mut inbox: mpsc::Receiver<HostInput>) {
        info!("host started");
        while let Some(input) = inbox.recv().await {
            match input {
                HostInput::Event(event) => self.dispatch(event).await,
                HostInput::Location(response) => self.push_location(response).await,
            }
        }
        info!("host inbox closed");
    }

    async fn drain(&mut self, effects: Vec<Effect>) {
        let mut queue: VecDeque<Effect> = effects.into();

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Render(_) => {
                    // No subscribers is fine; the view can still be pulled.
                    let _ = self.views.send(self.core.view());
                }
                Effect::Storage(mut request) => {
                    let result = persistence::execute(&self.store, &request.operation).await;
                    queue.extend(self.core.resolve(&mut request, result));
                }
                Effect::Location(mut request) => match &request.operation {
                    LocationOperation::Watch { .. } => {
                        debug!("location subscription opened");
                        self.watch = Some(request);
                    }
                    LocationOperation::LastKnown => {
                        let response = self
                            .last_fix
                            .map_or(LocationResponse::NoFix, LocationResponse::Fix);
                        queue.extend(self.core.resolve(&mut request, response));
                    }
                    LocationOperation::Stop => {
                        debug!("location subscription closed");
                        self.watch = None;
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UnixTimeMs;
    use crate::persistence::MemoryStore;

    fn fix(latitude: f64, longitude: f64) -> LocationResponse {
        LocationResponse::Fix(Fix {
            latitude,
            longitude,
            accuracy_m: Some(3.0),
            timestamp: UnixTimeMs(1),
        })
    }

    #[tokio::test]
    async fn fixes_before_subscription_only_seed_last_known() {
        let mut host = Host::new(MemoryStore::new());
        host.start(CoreConfig::default()).await.unwrap();

        host.push_location(fix(1.0, 2.0)).await;
        assert!(!host.view().location_enabled);

        host.dispatch(Event::LastKnownLocationRequested).await;
        let view = host.view();
        assert_eq!(view.header.status, "1.00000, 2.00000");
        assert!(!view.location_enabled);
        assert!(!view.recenter.requested);
    }

    #[tokio::test]
    async fn terminal_response_closes_subscription() {
        let mut host = Host::new(MemoryStore::new());
        host.start(CoreConfig::default()).await.unwrap();
        host.dispatch(Event::LocationPermissionResult {
            fine: true,
            coarse: true,
        })
        .await;
        assert!(host.is_watching());

        host.push_location(LocationResponse::Unavailable(
            crate::error::LocationError::ProviderDisabled,
        ))
        .await;
        assert!(!host.is_watching());
        assert!(!host.view().location_enabled);
    }

    #[tokio::test]
    async fn start_rejects_invalid_config() {
        let mut host = Host::new(MemoryStore::new());
        let config = CoreConfig {
            update_interval_ms: 0,
            ..CoreConfig::default()
        };
        assert!(matches!(
            host.start(config).await,
            Err(CoreError::Config(_))
        ));
    }
}
