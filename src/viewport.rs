//! Pan/zoom state for a diagram viewport.
//!
//! All state lives in [`ViewportState`]; the handler functions below take it
//! explicitly, so any number of viewports can coexist and the state machine
//! can be driven without a UI.
//!
//! - Commands: [`zoom_in`], [`zoom_out`], [`reset`]
//! - Wheel: [`wheel`] zooms around the cursor
//! - Pointer: [`pointer_down`] / [`pointer_move`] / [`pointer_up`] pan

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// `translate(translate_x, translate_y)` followed by `scale(scale)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        scale: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    /// Map a content-space point to screen space.
    pub fn apply(&self, p: Point) -> Point {
        Point {
            x: p.x * self.scale + self.translate_x,
            y: p.y * self.scale + self.translate_y,
        }
    }

    /// CSS `transform` value. Assumes `transform-origin: 0 0`.
    pub fn css(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.translate_x, self.translate_y, self.scale
        )
    }

    pub fn zoom_percent(&self) -> i64 {
        (self.scale * 100.0).round() as i64
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanState {
    Idle,
    /// `anchor` is the pan origin in content space: pointer minus translation
    /// at the moment the drag started.
    Panning { anchor: Point },
}

/// Multiplicative zoom steps. All must be positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomSteps {
    pub zoom_in: f64,
    pub zoom_out: f64,
    pub wheel_in: f64,
    pub wheel_out: f64,
}

impl Default for ZoomSteps {
    fn default() -> Self {
        Self {
            zoom_in: 1.2,
            zoom_out: 0.8,
            wheel_in: 1.1,
            wheel_out: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewportState {
    transform: Transform,
    pan: PanState,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewportState {
    pub fn new() -> Self {
        Self {
            transform: Transform::IDENTITY,
            pan: PanState::Idle,
        }
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn scale(&self) -> f64 {
        self.transform.scale
    }

    pub fn translate_x(&self) -> f64 {
        self.transform.translate_x
    }

    pub fn translate_y(&self) -> f64 {
        self.transform.translate_y
    }

    pub fn pan(&self) -> PanState {
        self.pan
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.pan, PanState::Panning { .. })
    }

    pub fn drag_anchor(&self) -> Option<Point> {
        match self.pan {
            PanState::Panning { anchor } => Some(anchor),
            PanState::Idle => None,
        }
    }

    #[cfg(test)]
    fn with_transform(transform: Transform) -> Self {
        Self {
            transform,
            pan: PanState::Idle,
        }
    }
}

pub fn zoom_in(state: &mut ViewportState, steps: &ZoomSteps) {
    state.transform.scale *= steps.zoom_in;
}

pub fn zoom_out(state: &mut ViewportState, steps: &ZoomSteps) {
    state.transform.scale *= steps.zoom_out;
}

/// Back to the identity transform. An in-flight pan is left alone.
pub fn reset(state: &mut ViewportState) {
    state.transform = Transform::IDENTITY;
}

/// Zoom one wheel step around `at` (container-relative), keeping the content
/// point under the cursor fixed on screen. Negative `delta` zooms in.
pub fn wheel(state: &mut ViewportState, steps: &ZoomSteps, at: Point, delta: f64) {
    let t = &mut state.transform;
    let old_scale = t.scale;

    t.scale *= if delta < 0.0 {
        steps.wheel_in
    } else {
        steps.wheel_out
    };

    let ratio = t.scale / old_scale - 1.0;
    t.translate_x -= (at.x - t.translate_x) * ratio;
    t.translate_y -= (at.y - t.translate_y) * ratio;
}

/// Start a pan. Returns false (and changes nothing) if one is already running.
pub fn pointer_down(state: &mut ViewportState, at: Point) -> bool {
    if state.is_panning() {
        return false;
    }
    state.pan = PanState::Panning {
        anchor: Point {
            x: at.x - state.transform.translate_x,
            y: at.y - state.transform.translate_y,
        },
    };
    true
}

/// Re-derive the translation from the drag anchor. No-op when idle.
pub fn pointer_move(state: &mut ViewportState, at: Point) -> bool {
    match state.pan {
        PanState::Panning { anchor } => {
            state.transform.translate_x = at.x - anchor.x;
            state.transform.translate_y = at.y - anchor.y;
            true
        }
        PanState::Idle => false,
    }
}

/// End a pan. Returns whether one was running.
pub fn pointer_up(state: &mut ViewportState) -> bool {
    let was_panning = state.is_panning();
    state.pan = PanState::Idle;
    was_panning
}
