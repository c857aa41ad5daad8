//! Input samples consumed by recognizers and the gesture events they emit.
//!
//! Input values are produced by the platform dispatch layer and are never
//! mutated once constructed. Everything here is plain data with no
//! side-effects.
use std::time::Duration;

use serde::Deserialize;
use strum::{Display, EnumString, IntoStaticStr};

use crate::geometry::{Offset, Point};

/// Phase of a touch or mouse-button sample.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TouchPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// Phase of an axis (wheel, trackpad scroll, pinch) sample.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AxisPhase {
    None,
    Begin,
    Update,
    End,
    Cancel,
}

/// Device class the sample originated from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumString,
    IntoStaticStr,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    #[default]
    Touch,
    Mouse,
    TouchPad,
    Keyboard,
}

/// Physical tool that produced the sample.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumString,
    IntoStaticStr,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SourceTool {
    #[default]
    Unknown,
    Finger,
    Pen,
    Mouse,
    TouchPad,
}

/// One touch sample for a single finger/pointer id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub id: i32,
    pub position: Point,
    /// Monotonic timestamp.
    pub time: Duration,
    pub phase: TouchPhase,
    pub source: SourceType,
    pub tool: SourceTool,
    pub tilt_x: Option<f64>,
    pub tilt_y: Option<f64>,
}

impl TouchEvent {
    pub fn new(id: i32, phase: TouchPhase, x: f64, y: f64, time: Duration) -> Self {
        Self {
            id,
            position: Point::new(x, y),
            time,
            phase,
            source: SourceType::Touch,
            tool: SourceTool::Finger,
            tilt_x: None,
            tilt_y: None,
        }
    }

    pub fn down(id: i32, x: f64, y: f64, ms: u64) -> Self {
        Self::new(id, TouchPhase::Down, x, y, Duration::from_millis(ms))
    }

    pub fn moved(id: i32, x: f64, y: f64, ms: u64) -> Self {
        Self::new(id, TouchPhase::Move, x, y, Duration::from_millis(ms))
    }

    pub fn up(id: i32, x: f64, y: f64, ms: u64) -> Self {
        Self::new(id, TouchPhase::Up, x, y, Duration::from_millis(ms))
    }

    pub fn cancel(id: i32, x: f64, y: f64, ms: u64) -> Self {
        Self::new(id, TouchPhase::Cancel, x, y, Duration::from_millis(ms))
    }

    pub fn with_source(mut self, source: SourceType, tool: SourceTool) -> Self {
        self.source = source;
        self.tool = tool;
        self
    }

    pub fn with_tilt(mut self, tilt_x: f64, tilt_y: f64) -> Self {
        self.tilt_x = Some(tilt_x);
        self.tilt_y = Some(tilt_y);
        self
    }

    /// Same sample re-tagged with another phase, used when a sequence group
    /// replays held fingers into its next child.
    pub(crate) fn with_phase(mut self, phase: TouchPhase, time: Duration) -> Self {
        self.phase = phase;
        self.time = time;
        self
    }
}

/// One axis sample (mouse wheel, trackpad two-finger scroll or pinch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisEvent {
    pub id: i32,
    pub position: Point,
    pub time: Duration,
    pub phase: AxisPhase,
    pub source: SourceType,
    pub tool: SourceTool,
    /// Horizontal scroll delta in pixels.
    pub horizontal: f64,
    /// Vertical scroll delta in pixels.
    pub vertical: f64,
    /// Hardware reported pinch scale, `0.0` when absent.
    pub pinch_scale: f64,
    /// Ctrl modifier held while the sample was produced.
    pub ctrl: bool,
}

impl AxisEvent {
    pub fn new(id: i32, phase: AxisPhase, x: f64, y: f64, time: Duration) -> Self {
        Self {
            id,
            position: Point::new(x, y),
            time,
            phase,
            source: SourceType::Mouse,
            tool: SourceTool::Mouse,
            horizontal: 0.0,
            vertical: 0.0,
            pinch_scale: 0.0,
            ctrl: false,
        }
    }

    pub fn with_scroll(mut self, horizontal: f64, vertical: f64) -> Self {
        self.horizontal = horizontal;
        self.vertical = vertical;
        self
    }

    pub fn with_pinch(mut self, scale: f64, ctrl: bool) -> Self {
        self.pinch_scale = scale;
        self.ctrl = ctrl;
        self
    }

    pub fn with_source(mut self, source: SourceType, tool: SourceTool) -> Self {
        self.source = source;
        self.tool = tool;
        self
    }

    pub fn scroll(&self) -> Offset {
        Offset::new(self.horizontal, self.vertical)
    }
}

/// Gesture family of a recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum GestureKind {
    Click,
    LongPress,
    Pan,
    Pinch,
    Rotation,
    Swipe,
    ExclusiveGroup,
    ParallelGroup,
    SequenceGroup,
}

/// A finger taking part in a recognized gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FingerInfo {
    pub id: i32,
    pub global: Point,
    pub local: Point,
}

/// Value passed to the UI callbacks of a recognizer.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureEvent {
    pub kind: GestureKind,
    pub time: Duration,
    pub source: SourceType,
    pub tool: SourceTool,
    pub position: Point,
    pub local_position: Point,
    pub fingers: Vec<FingerInfo>,
    pub repeat: bool,
    pub tap_count: u32,
    /// Total displacement since the gesture started.
    pub offset: Offset,
    /// Displacement since the previous report.
    pub delta: Offset,
    pub velocity: Offset,
    pub speed: f64,
    pub scale: f64,
    pub pinch_center: Point,
    /// Rotation or swipe angle in degrees.
    pub angle: f64,
    pub tilt_x: Option<f64>,
    pub tilt_y: Option<f64>,
}

impl GestureEvent {
    pub fn new(kind: GestureKind, time: Duration, source: SourceType) -> Self {
        Self {
            kind,
            time,
            source,
            tool: SourceTool::Unknown,
            position: Point::ORIGIN,
            local_position: Point::ORIGIN,
            fingers: Vec::new(),
            repeat: false,
            tap_count: 0,
            offset: Offset::ZERO,
            delta: Offset::ZERO,
            velocity: Offset::ZERO,
            speed: 0.0,
            scale: 1.0,
            pinch_center: Point::ORIGIN,
            angle: 0.0,
            tilt_x: None,
            tilt_y: None,
        }
    }
}
