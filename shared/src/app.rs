use tracing::{debug, error, info, trace, warn};

use crate::capabilities::{Capabilities, LocationResponse, StorageOutput, StorageResult};
use crate::event::Event;
use crate::model::{GeoPoint, Model, PermissionState, UnixTimeMs, WaypointId};
use crate::persistence::{decode_waypoints, encode_waypoints};
use crate::view::ViewModel;

#[derive(Default)]
pub struct App;

impl App {
    fn load(model: &Model, caps: &Capabilities) {
        caps.storage.get(&model.config.storage_key, |result| {
            Event::WaypointsLoaded(Box::new(result))
        });
    }

    /// Full-list replace of the current in-memory list. Fire-and-forget.
    ///
    /// The list is written whole, so one record the encoder refuses (a
    /// non-finite coordinate) blocks every write until it is deleted. Edits
    /// made meanwhile live only in memory.
    fn persist(model: &Model, caps: &Capabilities) {
        match encode_waypoints(&model.state.waypoints) {
            Ok(bytes) => caps
                .storage
                .replace(&model.config.storage_key, bytes, |result| {
                    Event::WaypointsPersisted(Box::new(result))
                }),
            Err(e) => error!(
                error = %e,
                count = model.state.waypoints.len(),
                "waypoint list cannot be encoded, changes are not saved"
            ),
        }
    }

    fn loaded_waypoints(result: StorageResult) -> Vec<crate::model::Waypoint> {
        match result {
            Ok(StorageOutput::Value(bytes)) => decode_waypoints(&bytes),
            Ok(StorageOutput::Missing) => Vec::new(),
            Ok(StorageOutput::Written) => {
                warn!("unexpected storage output for read");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "waypoint read failed");
                Vec::new()
            }
        }
    }

    fn start_location(model: &mut Model, caps: &Capabilities) {
        if model.location_permission == PermissionState::Denied {
            debug!("location permission denied, not subscribing");
            model.state = model.state.with_location_lost();
            return;
        }
        if model.location_subscription.is_some() {
            trace!("location updates already running");
            return;
        }

        model.subscriptions_started = model.subscriptions_started.wrapping_add(1);
        let subscription = model.subscriptions_started;
        model.location_subscription = Some(subscription);
        info!(subscription, "starting location updates");

        caps.location.watch(
            model.config.update_interval_ms,
            model.config.min_update_interval_ms,
            model.config.high_accuracy,
            move |response| Event::LocationUpdated {
                subscription,
                response,
            },
        );
    }

    fn stop_location(model: &mut Model, caps: &Capabilities) {
        if let Some(subscription) = model.location_subscription.take() {
            info!(subscription, "stopping location updates");
            caps.location.stop();
        }
        model.state = model.state.with_location_lost();
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        let event_name = event.name();
        if event.is_user_initiated() {
            debug!(event = event_name, "user action");
        } else {
            trace!(event = event_name, "event");
        }

        match event {
            Event::Configure { config } => match config.validate() {
                Ok(()) => {
                    info!(key = %config.storage_key, "configuration applied");
                    model.config = config;
                }
                Err(e) => warn!(error = %e, "ignoring invalid configuration"),
            },

            Event::Initialize | Event::ReloadRequested => Self::load(model, caps),

            Event::WaypointsLoaded(result) => {
                let waypoints = Self::loaded_waypoints(*result);
                info!(count = waypoints.len(), "waypoints loaded");
                model.state = model.state.with_loaded(waypoints);
            }

            Event::WaypointsPersisted(result) => {
                match *result {
                    Ok(_) => debug!(count = model.state.waypoints.len(), "waypoints persisted"),
                    Err(e) => warn!(error = %e, "waypoint write failed"),
                }
                return;
            }

            Event::LocationPermissionResult { fine, coarse } => {
                if fine && coarse {
                    model.location_permission = PermissionState::Granted;
                    Self::start_location(model, caps);
                } else {
                    info!(fine, coarse, "location permission not granted");
                    model.location_permission = PermissionState::Denied;
                    Self::stop_location(model, caps);
                }
            }

            Event::StartLocationUpdates => Self::start_location(model, caps),

            Event::StopLocationUpdates => Self::stop_location(model, caps),

            Event::LastKnownLocationRequested => {
                caps.location.last_known(Event::LastKnownLocation);
            }

            Event::LocationUpdated {
                subscription,
                response,
            } => {
                if model.location_subscription != Some(subscription) {
                    trace!(subscription, "dropping response from stale subscription");
                    return;
                }
                match response {
                    LocationResponse::Fix(fix) => {
                        model.state = model.state.with_location_fix(fix.position());
                    }
                    LocationResponse::NoFix => return,
                    LocationResponse::Unavailable(e) => {
                        warn!(error = %e, subscription, "location unavailable");
                        model.location_subscription = None;
                        model.state = model.state.with_location_lost();
                    }
                }
            }

            Event::LastKnownLocation(response) => match response {
                LocationResponse::Fix(fix) => {
                    model.state = model.state.with_last_known(fix.position());
                }
                LocationResponse::NoFix => {
                    debug!("no last known location");
                    return;
                }
                LocationResponse::Unavailable(e) => {
                    debug!(error = %e, "last known location unavailable");
                    return;
                }
            },

            Event::AddWaypoint {
                latitude,
                longitude,
            } => {
                let id = WaypointId::generate();
                debug!(%id, "adding waypoint");
                model.state = model.state.with_waypoint_added(
                    id,
                    GeoPoint::new(latitude, longitude),
                    UnixTimeMs::now(),
                );
                caps.render.render();
                Self::persist(model, caps);
                return;
            }

            Event::SelectWaypoint { id } => {
                model.state = model.state.with_selection(id.as_ref());
            }

            Event::StartEditing => model.state = model.state.with_editing_started(),

            Event::CancelEditing => model.state = model.state.with_editing_cancelled(),

            Event::SaveEdit { id, name, notes } => {
                if model.state.find(&id).is_none() {
                    warn!(%id, "saving edit for unknown waypoint");
                }
                model.state = model.state.with_edit_saved(&id, &name, &notes);
                caps.render.render();
                Self::persist(model, caps);
                return;
            }

            Event::DeleteWaypoint { id } => {
                debug!(%id, "deleting waypoint");
                model.state = model.state.with_waypoint_deleted(&id);
                caps.render.render();
                Self::persist(model, caps);
                return;
            }

            Event::RequestRecenter => model.state = model.state.with_recenter_requested(),

            Event::RecenterHandled => model.state = model.state.with_recenter_handled(),
        }

        caps.render.render();
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel::from(&model.state)
    }
}
