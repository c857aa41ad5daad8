//! Scene files for the replay tool: a node tree with gestures plus a
//! scripted event stream.
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use log::{debug, info};
use serde::Deserialize;
use strum::IntoEnumIterator;

use crate::config::{GestrefError, GestureSettings};
use crate::dispatch::{HitNode, dispatch_axis, dispatch_touch};
use crate::engine::GestureEngine;
use crate::event::{
    AxisEvent, AxisPhase, GestureEvent, GestureKind, SourceTool, SourceType, TouchEvent,
    TouchPhase,
};
use crate::geometry::{Matrix, Point, transform};
use crate::processor::{GestureDesc, GestureProcessor};
use crate::recognizer::{CallbackSlot, NodeId, RecognizerId};

/// Root of a scene file.
#[derive(Debug, Clone, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub nodes: Vec<SceneNode>,
    #[serde(default)]
    pub events: Vec<SceneEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SceneNode {
    pub id: u64,
    #[serde(default)]
    pub parent: Option<u64>,
    /// `[x, y, width, height]` in the node's local space.
    pub rect: [f64; 4],
    /// Local matrix `[a, b, c, d, e, f]` mapping this node's space into its
    /// parent's.
    #[serde(default = "identity")]
    pub transform: [f64; 6],
    #[serde(default)]
    pub gestures: Vec<GestureDesc>,
}

fn identity() -> [f64; 6] {
    [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]
}

impl SceneNode {
    fn matrix(&self) -> Matrix {
        let [a, b, c, d, e, f] = self.transform;
        Matrix::new(a, b, c, d, e, f)
    }

    fn contains_local(&self, p: Point) -> bool {
        let [x, y, w, h] = self.rect;
        p.x >= x && p.x <= x + w && p.y >= y && p.y <= y + h
    }
}

/// One scripted input.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SceneEvent {
    Touch {
        phase: TouchPhase,
        #[serde(default)]
        id: i32,
        x: f64,
        y: f64,
        t_ms: u64,
        #[serde(default)]
        source: SourceType,
        #[serde(default)]
        tool: SourceTool,
    },
    Axis {
        phase: AxisPhase,
        #[serde(default)]
        id: i32,
        x: f64,
        y: f64,
        t_ms: u64,
        #[serde(default)]
        horizontal: f64,
        #[serde(default)]
        vertical: f64,
        /// `0.0` when the device reports no pinch.
        #[serde(default)]
        pinch_scale: f64,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        source: SourceType,
        #[serde(default)]
        tool: SourceTool,
    },
    Tick {
        t_ms: u64,
    },
}

/// Parse scene TOML text. `path` is only used for error messages.
pub fn parse_scene_str(text: &str, path: &Path) -> Result<Scene, GestrefError> {
    let scene: Scene = toml::from_str(text).map_err(|e| GestrefError::SceneParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    for node in &scene.nodes {
        if let Some(parent) = node.parent {
            if !scene.nodes.iter().any(|n| n.id == parent) {
                return Err(GestrefError::UnknownNode(parent));
            }
        }
    }
    Ok(scene)
}

pub fn parse_scene_file(path: &Path) -> Result<Scene, GestrefError> {
    let text = fs::read_to_string(path).map_err(|e| GestrefError::SceneReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_scene_str(&text, path)
}

/// A callback fired during a replay.
#[derive(Debug, Clone, PartialEq)]
pub struct FiredCallback {
    pub node: u64,
    pub label: String,
    pub slot: CallbackSlot,
    pub event: GestureEvent,
}

impl FiredCallback {
    /// One-line summary printed by the replay tool.
    pub fn summary(&self) -> String {
        let ev = &self.event;
        let mut line = format!(
            "{:>6}ms node {} {} {}: at ({:.1}, {:.1})",
            ev.time.as_millis(),
            self.node,
            self.label,
            self.slot,
            ev.position.x,
            ev.position.y
        );
        match ev.kind {
            GestureKind::Click => line += &format!(" taps {}", ev.tap_count),
            GestureKind::Pan => {
                line += &format!(" offset ({:.1}, {:.1})", ev.offset.dx, ev.offset.dy)
            }
            GestureKind::Pinch => line += &format!(" scale {:.3}", ev.scale),
            GestureKind::Rotation => line += &format!(" angle {:.1}", ev.angle),
            GestureKind::Swipe => {
                line += &format!(" speed {:.1} angle {:.1}", ev.speed, ev.angle)
            }
            GestureKind::LongPress if ev.repeat => line += " repeat",
            _ => {}
        }
        line
    }
}

/// Replays a scene's event script against its node tree.
pub struct Replay {
    engine: GestureEngine,
    nodes: Vec<SceneNode>,
    /// Local matrices from each node up to the root.
    chains: HashMap<u64, Vec<Matrix>>,
    gestures: HashMap<u64, Vec<RecognizerId>>,
    events: Vec<SceneEvent>,
    fired: Rc<RefCell<Vec<FiredCallback>>>,
}

impl Replay {
    pub fn new(scene: Scene, settings: GestureSettings) -> Result<Self, GestrefError> {
        let mut engine = GestureEngine::new(settings);
        let fired = Rc::new(RefCell::new(Vec::new()));
        let by_id: HashMap<u64, &SceneNode> = scene.nodes.iter().map(|n| (n.id, n)).collect();

        let mut chains = HashMap::new();
        for node in &scene.nodes {
            let mut chain = Vec::new();
            let mut cursor = Some(node);
            while let Some(n) = cursor {
                if chain.len() > scene.nodes.len() {
                    break;
                }
                chain.push(n.matrix());
                cursor = match n.parent {
                    Some(p) => Some(*by_id.get(&p).ok_or(GestrefError::UnknownNode(p))?),
                    None => None,
                };
            }
            chains.insert(node.id, chain);
        }

        let mut gestures = HashMap::new();
        for node in &scene.nodes {
            let chain = chains.get(&node.id).cloned().unwrap_or_default();
            let mut ids = Vec::new();
            for desc in &node.gestures {
                let id = GestureProcessor::build_for_node(&mut engine, desc, NodeId(node.id), &chain)?;
                for leaf in engine.arena().get_group_recognizer(id) {
                    record_callbacks(&mut engine, leaf, node.id, &fired);
                }
                ids.push(id);
            }
            gestures.insert(node.id, ids);
        }

        Ok(Self {
            engine,
            nodes: scene.nodes,
            chains,
            gestures,
            events: scene.events,
            fired,
        })
    }

    pub fn engine(&self) -> &GestureEngine {
        &self.engine
    }

    /// Hit chain under `point`, innermost node first.
    pub fn hit_test(&self, point: Point) -> Vec<HitNode> {
        let depth = |id: u64| self.chains.get(&id).map_or(0, Vec::len);
        let hit = |node: &SceneNode| {
            let chain = self.chains.get(&node.id).map_or(&[][..], Vec::as_slice);
            node.contains_local(transform(point, chain))
        };
        let Some(innermost) = self
            .nodes
            .iter()
            .filter(|n| hit(n))
            .max_by_key(|n| depth(n.id))
        else {
            return Vec::new();
        };

        let mut result = Vec::new();
        let mut cursor = Some(innermost);
        while let Some(node) = cursor {
            if result.len() > self.nodes.len() {
                break;
            }
            result.push(HitNode {
                node: NodeId(node.id),
                recognizers: self.gestures.get(&node.id).cloned().unwrap_or_default(),
            });
            cursor = node
                .parent
                .and_then(|p| self.nodes.iter().find(|n| n.id == p));
        }
        result
    }

    /// Run the whole script and return every callback fired, in order.
    pub fn run(&mut self) -> Vec<FiredCallback> {
        let events = std::mem::take(&mut self.events);
        for ev in &events {
            self.step(ev);
        }
        self.fired.borrow().clone()
    }

    pub fn step(&mut self, ev: &SceneEvent) {
        match *ev {
            SceneEvent::Touch {
                phase,
                id,
                x,
                y,
                t_ms,
                source,
                tool,
            } => {
                let touch = TouchEvent::new(id, phase, x, y, Duration::from_millis(t_ms))
                    .with_source(source, tool);
                let hits = if phase == TouchPhase::Down {
                    self.hit_test(touch.position)
                } else {
                    Vec::new()
                };
                debug!("{t_ms}ms touch {id} {phase} ({x}, {y}), {} nodes hit", hits.len());
                dispatch_touch(&mut self.engine, &touch, &hits);
            }
            SceneEvent::Axis {
                phase,
                id,
                x,
                y,
                t_ms,
                horizontal,
                vertical,
                pinch_scale,
                ctrl,
                source,
                tool,
            } => {
                let axis = AxisEvent::new(id, phase, x, y, Duration::from_millis(t_ms))
                    .with_scroll(horizontal, vertical)
                    .with_pinch(pinch_scale, ctrl)
                    .with_source(source, tool);
                let hits = if phase == AxisPhase::Begin {
                    self.hit_test(axis.position)
                } else {
                    Vec::new()
                };
                debug!("{t_ms}ms axis {id} {phase} ({horizontal}, {vertical})");
                dispatch_axis(&mut self.engine, &axis, &hits);
            }
            SceneEvent::Tick { t_ms } => self.engine.tick(Duration::from_millis(t_ms)),
        }
    }

    pub fn fired(&self) -> Vec<FiredCallback> {
        self.fired.borrow().clone()
    }
}

fn record_callbacks(
    engine: &mut GestureEngine,
    id: RecognizerId,
    node: u64,
    fired: &Rc<RefCell<Vec<FiredCallback>>>,
) {
    let Some(rec) = engine.recognizer_mut(id) else {
        return;
    };
    let label = rec
        .tag()
        .map_or_else(|| rec.gesture_kind().to_string(), str::to_string);
    for slot in CallbackSlot::iter() {
        let fired = Rc::clone(fired);
        let label = label.clone();
        rec.callbacks_mut().set(
            slot,
            Box::new(move |event: &GestureEvent| {
                let entry = FiredCallback {
                    node,
                    label: label.clone(),
                    slot,
                    event: event.clone(),
                };
                info!("{}", entry.summary());
                fired.borrow_mut().push(entry);
            }),
        );
    }
}
