use std::pin::pin;

use crux_core::capability::{Capability, CapabilityContext, Operation};
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::error::LocationError;
use crate::model::{GeoPoint, UnixTimeMs};

/// A single position report from the platform provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: Option<f64>,
    pub timestamp: UnixTimeMs,
}

impl Fix {
    #[must_use]
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationOperation {
    /// Open a subscription. The shell answers with a stream of
    /// [`LocationResponse`] until it reports a terminal response.
    Watch {
        interval_ms: u64,
        min_interval_ms: u64,
        high_accuracy: bool,
    },
    /// One-shot cached position.
    LastKnown,
    /// Cancel the live subscription.
    Stop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LocationResponse {
    Fix(Fix),
    NoFix,
    Unavailable(LocationError),
}

impl LocationResponse {
    /// Terminal responses close a watch subscription.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl Operation for LocationOperation {
    type Output = LocationResponse;
}

#[derive(Clone)]
pub struct Location<Ev> {
    context: CapabilityContext<LocationOperation, Ev>,
}

impl<Ev> Capability<Ev> for Location<Ev> {
    type Operation = LocationOperation;
    type MappedSelf<MappedEv> = Location<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Location::new(self.context.map_event(f))
    }
}

impl<Ev> Location<Ev>
where
    Ev: Send + 'static,
{
    pub fn new(context: CapabilityContext<LocationOperation, Ev>) -> Self {
        Self { context }
    }

    /// Streams responses into the app. A stream that closes without a
    /// terminal response is reported as [`LocationError::StreamEnded`].
    pub fn watch<F>(
        &self,
        interval_ms: u64,
        min_interval_ms: u64,
        high_accuracy: bool,
        make_event: F,
    ) where
        F: Fn(LocationResponse) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let mut responses = pin!(ctx.stream_from_shell(LocationOperation::Watch {
                interval_ms,
                min_interval_ms,
                high_accuracy,
            }));

            loop {
                let Some(response) = responses.next().await else {
                    ctx.update_app(make_event(LocationResponse::Unavailable(
                        LocationError::StreamEnded,
                    )));
                    break;
                };
                let terminal = response.is_terminal();
                ctx.update_app(make_event(response));
                if terminal {
                    break;
                }
            }
        });
    }

    pub fn last_known<F>(&self, make_event: F)
    where
        F: FnOnce(LocationResponse) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let response = ctx.request_from_shell(LocationOperation::LastKnown).await;
            ctx.update_app(make_event(response));
        });
    }

    pub fn stop(&self) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(LocationOperation::Stop).await;
        });
    }
}
