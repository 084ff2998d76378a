#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod capabilities;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod geo;
pub mod host;
pub mod model;
pub mod persistence;
pub mod validation;
pub mod view;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::CoreConfig;
pub use crux_core::{render::Render, App as CruxApp};
pub use error::{ConfigError, CoreError, LocationError, StoreError};
pub use event::Event;
pub use model::{GeoPoint, Model, SelectionPhase, UnixTimeMs, Waypoint, WaypointId, WaypointState};
pub use view::ViewModel;
