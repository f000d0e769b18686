//! Interactive diagram viewer.
//!
//! Opening a viewer runs the whole pipeline: compile the schema, serialize it
//! for the renderer, render, mount the result in the host container and attach
//! input listeners. From then on the host feeds events to [`Viewer::dispatch`]
//! and the caller may issue commands until the viewer is closed.
//!
//! ```text
//!            pointer down (container)
//!   Idle ────────────────────────────▶ Panning
//!    ▲ ◀──────────────────────────────── │
//!    │       pointer up (anywhere)       │
//!    │                                   │
//!    └──── close / Escape ──▶ Closed ◀───┘
//! ```
//!
//! `Closed` is terminal: events are ignored and commands fail.

use crate::config::{ConfigError, ViewerConfig};
use crate::host::{EventKind, Host, HostError, InputEvent};
use crate::ir::compile;
use crate::render::{Drawable, RenderError, Renderer};
use crate::schema::SchemaMetadata;
use crate::serializer::serialize;
use crate::viewport::{self, Transform, ViewportState, ZoomSteps};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("Render failed: {0}")]
    Render(#[from] RenderError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Viewer is closed")]
    Closed,
}

/// Outcome of dispatching one input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Nothing changed (closed viewer, idle pointer move, unrelated key).
    Ignored,
    Handled,
    /// The close key was pressed; the viewer is now closed.
    CloseRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CloseReport {
    pub released: usize,
    pub failed: usize,
}

pub struct Viewer<H: Host> {
    host: H,
    steps: ZoomSteps,
    close_key: String,
    state: ViewportState,
    content: Drawable,
    listeners: Vec<H::Listener>,
    closed: bool,
}

impl<H: Host> Viewer<H> {
    /// Render `schema` and enter the viewport.
    ///
    /// On render failure the host shows a failure indication and no listener
    /// is attached. There is no retry; call `open` again to retry.
    pub fn open<R: Renderer + ?Sized>(
        schema: &SchemaMetadata,
        renderer: &R,
        mut host: H,
        config: &ViewerConfig,
    ) -> Result<Self, ViewerError> {
        config.validate()?;

        let text = serialize(&compile(schema), config.diagram.grammar);
        log::debug!("rendering {} bytes of {:?}", text.len(), config.diagram.grammar);

        let content = match renderer.render(&text) {
            Ok(content) => content,
            Err(e) => {
                log::error!("diagram render failed: {e}");
                host.show_failure(&e.to_string());
                return Err(e.into());
            }
        };

        if let Err(e) = host.mount(&content) {
            log::error!("failed to mount diagram: {e}");
            host.show_failure(&e.to_string());
            return Err(e.into());
        }

        let mut viewer = Self {
            host,
            steps: config.viewport.steps(),
            close_key: config.viewport.close_key.clone(),
            state: ViewportState::new(),
            content,
            listeners: Vec::new(),
            closed: false,
        };

        for kind in EventKind::ALL {
            match viewer.host.listen(kind) {
                Ok(listener) => viewer.listeners.push(listener),
                Err(e) => {
                    log::error!("{e}");
                    viewer.shutdown();
                    return Err(e.into());
                }
            }
        }

        viewer.host.apply_transform(&Transform::IDENTITY);
        log::debug!("viewer opened with {} listeners", viewer.listeners.len());
        Ok(viewer)
    }

    pub fn transform(&self) -> Transform {
        self.state.transform()
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn content(&self) -> &Drawable {
        &self.content
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn zoom_in(&mut self) -> Result<Transform, ViewerError> {
        self.ensure_open()?;
        viewport::zoom_in(&mut self.state, &self.steps);
        Ok(self.commit())
    }

    pub fn zoom_out(&mut self) -> Result<Transform, ViewerError> {
        self.ensure_open()?;
        viewport::zoom_out(&mut self.state, &self.steps);
        Ok(self.commit())
    }

    pub fn reset(&mut self) -> Result<Transform, ViewerError> {
        self.ensure_open()?;
        viewport::reset(&mut self.state);
        Ok(self.commit())
    }

    /// Print the rendered content as-is; pan and zoom are not applied.
    pub fn print(&mut self) -> Result<&Drawable, ViewerError> {
        self.ensure_open()?;
        self.host.print(&self.content)?;
        Ok(&self.content)
    }

    /// Release every listener and tear the container down.
    pub fn close(&mut self) -> Result<CloseReport, ViewerError> {
        self.ensure_open()?;
        Ok(self.shutdown())
    }

    /// Handle one input event from the host.
    pub fn dispatch(&mut self, event: &InputEvent) -> Dispatch {
        if self.closed {
            log::trace!("ignoring {:?} on closed viewer", event.kind());
            return Dispatch::Ignored;
        }

        let before = self.state.transform();
        let handled = match event {
            InputEvent::PointerDown { at } => viewport::pointer_down(&mut self.state, *at),
            InputEvent::PointerMove { at } => viewport::pointer_move(&mut self.state, *at),
            InputEvent::PointerUp => viewport::pointer_up(&mut self.state),
            InputEvent::Wheel { at, delta } => {
                viewport::wheel(&mut self.state, &self.steps, *at, *delta);
                true
            }
            InputEvent::KeyDown { key } if *key == self.close_key => {
                self.shutdown();
                return Dispatch::CloseRequested;
            }
            InputEvent::KeyDown { .. } => false,
        };

        if self.state.transform() != before {
            self.host.apply_transform(&self.state.transform());
        }

        if handled {
            Dispatch::Handled
        } else {
            Dispatch::Ignored
        }
    }

    fn ensure_open(&self) -> Result<(), ViewerError> {
        if self.closed {
            Err(ViewerError::Closed)
        } else {
            Ok(())
        }
    }

    fn commit(&mut self) -> Transform {
        let transform = self.state.transform();
        self.host.apply_transform(&transform);
        transform
    }

    /// Best-effort teardown: every listener gets a removal attempt and the
    /// container is torn down regardless of failures.
    fn shutdown(&mut self) -> CloseReport {
        let mut report = CloseReport::default();

        viewport::pointer_up(&mut self.state);
        for listener in self.listeners.drain(..) {
            match self.host.unlisten(listener) {
                Ok(()) => report.released += 1,
                Err(e) => {
                    log::warn!("{e}");
                    report.failed += 1;
                }
            }
        }
        self.host.teardown();
        self.closed = true;

        log::debug!(
            "viewer closed: {} listeners released, {} failed",
            report.released,
            report.failed
        );
        report
    }
}

impl<H: Host> Drop for Viewer<H> {
    fn drop(&mut self) {
        if !self.closed {
            self.shutdown();
        }
    }
}
