//! gestref – gesture recognition and arbitration for UI input streams.
//!
//! Recognizers live in an arena owned by a [`GestureEngine`]. Input samples
//! are fanned out to the recognizers entered into the scope of each finger,
//! and the [`GestureReferee`] decides which of the competing gestures wins.

pub mod arena;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod event;
pub mod geometry;
pub mod group;
pub mod processor;
pub mod recognizer;
pub mod referee;
pub mod scene;
pub mod velocity;

pub use config::{GestrefError, GestureSettings, Thresholds};
pub use engine::GestureEngine;
pub use event::{AxisEvent, AxisPhase, GestureEvent, GestureKind, SourceType, TouchEvent, TouchPhase};
pub use group::{GroupMode, RecognizerGroup};
pub use processor::{GestureDesc, GestureProcessor, GestureVariant};
pub use recognizer::{
    GestureDisposal, GestureMask, GesturePriority, NodeId, Recognizer, RecognizerId, RefereeState,
};
pub use referee::{GestureReferee, GestureScope};
