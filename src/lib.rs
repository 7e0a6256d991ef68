// src/lib.rs
//! Gesture-driven camera control: turns per-frame hand landmarks into zoom,
//! yaw, pitch and debounced discrete toggles.

pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod gesture;
pub mod hand;
pub mod rotation;
pub mod selection;
pub mod session;
pub mod smoothing;
pub mod source;
pub mod state;
pub mod synthetic;
pub mod toggles;
pub mod zoom;

pub use config::{ControlConfig, OutputPaths};
pub use controller::GestureController;
pub use export::{ControlSnapshot, SnapshotWriter};
pub use gesture::Gesture;
pub use hand::{HandLabel, HandObservation};
pub use session::SessionRecorder;
pub use source::{Frame, HandSource, ReplaySource, SimulatedSource};
pub use state::CameraControlState;
