//! Declarative gesture descriptions and their materialization into
//! recognizer trees.
use std::time::Duration;

use log::debug;
use serde::Deserialize;

use crate::config::GestrefError;
use crate::engine::GestureEngine;
use crate::event::SourceType;
use crate::geometry::Matrix;
use crate::group::GroupMode;
use crate::recognizer::{
    ClickRecognizer, GestureMask, GesturePriority, LongPressRecognizer, NodeId, PanDirection,
    PanRecognizer, PinchRecognizer, Recognizer, RecognizerId, RecognizerKind, RotationRecognizer,
    SwipeDirection, SwipeRecognizer,
};

/// One gesture (or group of gestures) as declared by a UI node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GestureDesc {
    #[serde(default)]
    pub priority: GesturePriority,
    #[serde(default)]
    pub mask: GestureMask,
    #[serde(default)]
    pub tag: Option<String>,
    /// Empty allows every pointer source.
    #[serde(default)]
    pub allowed_sources: Vec<SourceType>,
    #[serde(flatten)]
    pub gesture: GestureVariant,
}

/// Variant-specific parameters. Unset thresholds fall back to the
/// configured ones for the session's source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GestureVariant {
    Tap {
        #[serde(default = "one")]
        count: u32,
        #[serde(default = "one_finger")]
        fingers: usize,
        #[serde(default)]
        distance: Option<f64>,
    },
    LongPress {
        #[serde(default = "one_finger")]
        fingers: usize,
        #[serde(default)]
        duration_ms: Option<u64>,
        #[serde(default)]
        repeat: bool,
        #[serde(default)]
        disable_mouse_left: bool,
    },
    Pan {
        #[serde(default = "one_finger")]
        fingers: usize,
        #[serde(default)]
        direction: PanDirection,
        #[serde(default)]
        distance: Option<f64>,
        #[serde(default)]
        axis_distance: Option<f64>,
    },
    Pinch {
        #[serde(default = "two_fingers")]
        fingers: usize,
        #[serde(default)]
        distance: Option<f64>,
    },
    Rotation {
        #[serde(default = "two_fingers")]
        fingers: usize,
        #[serde(default)]
        angle: Option<f64>,
    },
    Swipe {
        #[serde(default = "one_finger")]
        fingers: usize,
        #[serde(default)]
        direction: SwipeDirection,
        #[serde(default)]
        speed: Option<f64>,
    },
    Group {
        #[serde(default)]
        mode: GroupMode,
        gestures: Vec<GestureDesc>,
    },
}

fn one() -> u32 {
    1
}

fn one_finger() -> usize {
    1
}

fn two_fingers() -> usize {
    2
}

impl GestureDesc {
    pub fn new(gesture: GestureVariant) -> Self {
        Self {
            priority: GesturePriority::default(),
            mask: GestureMask::default(),
            tag: None,
            allowed_sources: Vec::new(),
            gesture,
        }
    }

    pub fn with_priority(mut self, priority: GesturePriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_mask(mut self, mask: GestureMask) -> Self {
        self.mask = mask;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    fn label(&self) -> &str {
        self.tag.as_deref().unwrap_or(match &self.gesture {
            GestureVariant::Tap { .. } => "tap",
            GestureVariant::LongPress { .. } => "long_press",
            GestureVariant::Pan { .. } => "pan",
            GestureVariant::Pinch { .. } => "pinch",
            GestureVariant::Rotation { .. } => "rotation",
            GestureVariant::Swipe { .. } => "swipe",
            GestureVariant::Group { .. } => "group",
        })
    }

    /// Reject descriptions no recognizer could ever satisfy.
    pub fn validate(&self) -> Result<(), GestrefError> {
        let invalid = |what: &str| -> Result<(), GestrefError> {
            Err(GestrefError::InvalidGesture(format!("{}: {what}", self.label())))
        };
        match &self.gesture {
            GestureVariant::Tap { count, fingers, .. } => {
                if *count == 0 {
                    return invalid("count must be at least 1");
                }
                if *fingers == 0 {
                    return invalid("fingers must be at least 1");
                }
            }
            GestureVariant::LongPress { fingers, .. }
            | GestureVariant::Pan { fingers, .. }
            | GestureVariant::Pinch { fingers, .. }
            | GestureVariant::Rotation { fingers, .. }
            | GestureVariant::Swipe { fingers, .. } => {
                if *fingers == 0 {
                    return invalid("fingers must be at least 1");
                }
            }
            GestureVariant::Group { gestures, .. } => {
                if gestures.is_empty() {
                    return invalid("group has no gestures");
                }
                for child in gestures {
                    child.validate()?;
                }
            }
        }
        let thresholds = match &self.gesture {
            GestureVariant::Tap { distance, .. }
            | GestureVariant::Pan { distance, .. }
            | GestureVariant::Pinch { distance, .. } => *distance,
            GestureVariant::Rotation { angle, .. } => *angle,
            GestureVariant::Swipe { speed, .. } => *speed,
            _ => None,
        };
        if thresholds.is_some_and(|v| !v.is_finite() || v < 0.0) {
            return invalid("threshold must be a non-negative number");
        }
        Ok(())
    }
}

/// Materializes gesture descriptions into an engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct GestureProcessor;

impl GestureProcessor {
    /// Build an unattached recognizer tree.
    pub fn build(
        engine: &mut GestureEngine,
        desc: &GestureDesc,
    ) -> Result<RecognizerId, GestrefError> {
        desc.validate()?;
        Ok(Self::materialize(engine, desc, None))
    }

    /// Build a recognizer tree attached to `node`, whose local matrices up
    /// to the root are `transforms`.
    pub fn build_for_node(
        engine: &mut GestureEngine,
        desc: &GestureDesc,
        node: NodeId,
        transforms: &[Matrix],
    ) -> Result<RecognizerId, GestrefError> {
        desc.validate()?;
        let id = Self::materialize(engine, desc, Some((node, transforms)));
        debug!("node {}: built {}", node.0, desc.label());
        Ok(id)
    }

    fn materialize(
        engine: &mut GestureEngine,
        desc: &GestureDesc,
        node: Option<(NodeId, &[Matrix])>,
    ) -> RecognizerId {
        let id = match &desc.gesture {
            GestureVariant::Group { mode, gestures } => {
                let children: Vec<RecognizerId> = gestures
                    .iter()
                    .map(|child| Self::materialize(engine, child, node))
                    .collect();
                engine.insert_group(*mode, &children)
            }
            leaf => {
                let (fingers, kind) = leaf_kind(leaf);
                let rec = Recognizer::new(engine.core(fingers), kind);
                engine.insert(rec)
            }
        };
        if let Some(rec) = engine.recognizer_mut(id) {
            rec.set_priority(desc.priority);
            rec.set_mask(desc.mask);
            rec.set_allowed_sources(desc.allowed_sources.clone());
            if let Some(tag) = &desc.tag {
                rec.set_tag(tag.clone());
            }
            if let Some((node, transforms)) = node {
                rec.attach_node(node, transforms.to_vec());
            }
        }
        id
    }
}

fn leaf_kind(gesture: &GestureVariant) -> (usize, RecognizerKind) {
    match gesture {
        GestureVariant::Tap {
            count,
            fingers,
            distance,
        } => (
            *fingers,
            RecognizerKind::Click(ClickRecognizer::new(*count, *distance)),
        ),
        GestureVariant::LongPress {
            fingers,
            duration_ms,
            repeat,
            disable_mouse_left,
        } => (
            *fingers,
            RecognizerKind::LongPress(LongPressRecognizer::new(
                duration_ms.map(Duration::from_millis),
                *repeat,
                *disable_mouse_left,
            )),
        ),
        GestureVariant::Pan {
            fingers,
            direction,
            distance,
            axis_distance,
        } => (
            *fingers,
            RecognizerKind::Pan(PanRecognizer::new(*direction, *distance, *axis_distance)),
        ),
        GestureVariant::Pinch { fingers, distance } => (
            *fingers,
            RecognizerKind::Pinch(PinchRecognizer::new(*distance)),
        ),
        GestureVariant::Rotation { fingers, angle } => (
            *fingers,
            RecognizerKind::Rotation(RotationRecognizer::new(*angle)),
        ),
        GestureVariant::Swipe {
            fingers,
            direction,
            speed,
        } => (
            *fingers,
            RecognizerKind::Swipe(SwipeRecognizer::new(*direction, *speed)),
        ),
        GestureVariant::Group { mode, .. } => (
            1,
            RecognizerKind::Group(crate::group::RecognizerGroup::new(*mode)),
        ),
    }
}
