//! The UI host a viewer runs inside.
//!
//! A host delivers input events and owns the container the rendered diagram
//! is mounted in. Listeners are registered per [`EventKind`]; the host then
//! forwards matching events to [`Viewer::dispatch`](crate::viewer::Viewer::dispatch)
//! one at a time, in delivery order.

use crate::render::Drawable;
use crate::viewport::{Point, Transform};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("Failed to attach {kind:?} listener: {reason}")]
    Attach { kind: EventKind, reason: String },
    #[error("Failed to detach {kind:?} listener: {reason}")]
    Detach { kind: EventKind, reason: String },
    #[error("Host surface error: {0}")]
    Surface(String),
}

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// The viewport container.
    Container,
    /// The whole document, so drags that leave the container still end.
    Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerDown,
    PointerMove,
    PointerUp,
    Wheel,
    KeyDown,
}

impl EventKind {
    /// Every listener a live viewer holds.
    pub const ALL: [EventKind; 5] = [
        EventKind::PointerDown,
        EventKind::Wheel,
        EventKind::PointerMove,
        EventKind::PointerUp,
        EventKind::KeyDown,
    ];

    pub fn target(self) -> Target {
        match self {
            Self::PointerDown | Self::Wheel => Target::Container,
            Self::PointerMove | Self::PointerUp | Self::KeyDown => Target::Document,
        }
    }

    pub fn dom_name(self) -> &'static str {
        match self {
            Self::PointerDown => "mousedown",
            Self::PointerMove => "mousemove",
            Self::PointerUp => "mouseup",
            Self::Wheel => "wheel",
            Self::KeyDown => "keydown",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { at: Point },
    PointerMove { at: Point },
    PointerUp,
    /// `at` is relative to the container's top-left corner.
    Wheel { at: Point, delta: f64 },
    KeyDown { key: String },
}

impl InputEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PointerDown { .. } => EventKind::PointerDown,
            Self::PointerMove { .. } => EventKind::PointerMove,
            Self::PointerUp => EventKind::PointerUp,
            Self::Wheel { .. } => EventKind::Wheel,
            Self::KeyDown { .. } => EventKind::KeyDown,
        }
    }
}

pub trait Host {
    /// Handle returned by [`Host::listen`], given back to [`Host::unlisten`].
    type Listener;

    fn listen(&mut self, kind: EventKind) -> Result<Self::Listener, HostError>;

    fn unlisten(&mut self, listener: Self::Listener) -> Result<(), HostError>;

    fn mount(&mut self, content: &Drawable) -> Result<(), HostError>;

    /// Replace the container contents with a failure indication.
    fn show_failure(&mut self, message: &str);

    fn apply_transform(&mut self, transform: &Transform);

    fn print(&mut self, content: &Drawable) -> Result<(), HostError>;

    /// Remove the container. Must not fail.
    fn teardown(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_targets() {
        let on_container: Vec<EventKind> = EventKind::ALL
            .into_iter()
            .filter(|k| k.target() == Target::Container)
            .collect();

        assert_eq!(on_container, [EventKind::PointerDown, EventKind::Wheel]);
        assert_eq!(EventKind::PointerUp.target(), Target::Document);
    }

    #[test]
    fn test_event_kind() {
        let wheel = InputEvent::Wheel {
            at: Point::new(1.0, 2.0),
            delta: -3.0,
        };

        assert_eq!(wheel.kind(), EventKind::Wheel);
        assert_eq!(wheel.kind().dom_name(), "wheel");
        assert_eq!(
            InputEvent::KeyDown { key: "Escape".to_string() }.kind(),
            EventKind::KeyDown
        );
    }
}
