//! `#[wasm_bindgen]` browser API.
//!
//! ```ts
//! const viewer = new SchemaViewer(container, tables, (text) => renderToSvg(text), {
//!   diagram: { grammar: 'mermaid' },
//! });
//! viewer.onClose(() => modal.hide());
//! zoomLabel.textContent = `${viewer.zoomPercent()}%`;
//! ```
//!
//! The render callback must return markup synchronously; async renderers
//! have to be resolved by the caller before the viewer is opened.

pub mod dom;
pub mod logger;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::config::ViewerConfig;
use crate::host::InputEvent;
use crate::ir::compile;
use crate::render::{Drawable, RenderError, Renderer};
use crate::schema::SchemaMetadata;
use crate::serializer::{Grammar, serialize};
use crate::viewer::{Dispatch, Viewer};
use dom::{DomHost, EventSink, js_reason};

/// Renderer backed by a JS function `(text: string) => string`.
pub struct JsRenderer {
    render: js_sys::Function,
}

impl JsRenderer {
    pub fn new(render: js_sys::Function) -> Self {
        Self { render }
    }
}

impl Renderer for JsRenderer {
    fn render(&self, text: &str) -> Result<Drawable, RenderError> {
        let value = self
            .render
            .call1(&JsValue::NULL, &JsValue::from_str(text))
            .map_err(|e| RenderError::Rejected(js_reason(&e)))?;

        match value.as_string() {
            Some(markup) if markup.is_empty() => Err(RenderError::Empty),
            Some(markup) => Ok(Drawable::new(markup)),
            None => Err(RenderError::Rejected(
                "render callback did not return a string".to_string(),
            )),
        }
    }
}

/// Shared between the wasm handle and the DOM listeners. Listeners hold it
/// weakly, so dropping the handle drops the viewer.
#[derive(Default)]
struct ViewerCell {
    viewer: RefCell<Option<Viewer<DomHost>>>,
    on_close: RefCell<Option<js_sys::Function>>,
}

impl ViewerCell {
    fn deliver(&self, event: InputEvent) {
        let outcome = match self.viewer.try_borrow_mut() {
            Ok(mut slot) => match slot.as_mut() {
                Some(viewer) => viewer.dispatch(&event),
                None => return,
            },
            Err(_) => {
                log::debug!("dropping {:?}: viewer busy", event.kind());
                return;
            }
        };

        if outcome == Dispatch::CloseRequested {
            self.notify_close();
        }
    }

    fn notify_close(&self) {
        let callback = self.on_close.borrow().clone();
        if let Some(callback) = callback {
            if let Err(e) = callback.call0(&JsValue::NULL) {
                log::warn!("onClose callback failed: {}", js_reason(&e));
            }
        }
    }

    fn with_viewer<T>(
        &self,
        f: impl FnOnce(&mut Viewer<DomHost>) -> Result<T, crate::viewer::ViewerError>,
    ) -> Result<T, JsError> {
        let mut slot = self.viewer.borrow_mut();
        let viewer = slot
            .as_mut()
            .ok_or_else(|| JsError::new("viewer is not open"))?;
        f(viewer).map_err(|e| JsError::new(&e.to_string()))
    }
}

/// Pan/zoom viewer for a rendered schema diagram.
#[wasm_bindgen]
pub struct SchemaViewer {
    cell: Rc<ViewerCell>,
}

#[wasm_bindgen]
impl SchemaViewer {
    /// Compile `schema`, render it with `render` and mount it in `container`.
    ///
    /// Throws if rendering fails; the container then shows the failure.
    #[wasm_bindgen(constructor)]
    pub fn new(
        container: HtmlElement,
        schema: JsValue,
        render: js_sys::Function,
        options: JsValue,
    ) -> Result<SchemaViewer, JsError> {
        let schema: SchemaMetadata = serde_wasm_bindgen::from_value(schema)
            .map_err(|e| JsError::new(&format!("Invalid schema: {e}")))?;
        let config = parse_options(options)?;

        let cell = Rc::new(ViewerCell::default());
        let weak = Rc::downgrade(&cell);
        let sink: EventSink = Rc::new(move |event: InputEvent| {
            if let Some(cell) = weak.upgrade() {
                cell.deliver(event);
            }
        });

        let host = DomHost::new(container, sink).map_err(|e| JsError::new(&e.to_string()))?;
        let viewer = Viewer::open(&schema, &JsRenderer::new(render), host, &config)
            .map_err(|e| JsError::new(&e.to_string()))?;
        *cell.viewer.borrow_mut() = Some(viewer);

        Ok(SchemaViewer { cell })
    }

    /// Called once when the viewer closes via Escape or `close()`.
    #[wasm_bindgen(js_name = "onClose")]
    pub fn on_close(&self, callback: js_sys::Function) {
        *self.cell.on_close.borrow_mut() = Some(callback);
    }

    #[wasm_bindgen(js_name = "zoomIn")]
    pub fn zoom_in(&self) -> Result<(), JsError> {
        self.cell.with_viewer(|v| v.zoom_in().map(|_| ()))
    }

    #[wasm_bindgen(js_name = "zoomOut")]
    pub fn zoom_out(&self) -> Result<(), JsError> {
        self.cell.with_viewer(|v| v.zoom_out().map(|_| ()))
    }

    pub fn reset(&self) -> Result<(), JsError> {
        self.cell.with_viewer(|v| v.reset().map(|_| ()))
    }

    pub fn print(&self) -> Result<(), JsError> {
        self.cell.with_viewer(|v| v.print().map(|_| ()))
    }

    pub fn close(&self) -> Result<(), JsError> {
        let report = self.cell.with_viewer(|v| v.close())?;
        if report.failed > 0 {
            log::warn!("{} listeners could not be removed", report.failed);
        }
        self.cell.notify_close();
        Ok(())
    }

    #[wasm_bindgen(js_name = "isClosed")]
    pub fn is_closed(&self) -> bool {
        self.cell
            .viewer
            .borrow()
            .as_ref()
            .is_none_or(|v| v.is_closed())
    }

    /// `{ scale, translateX, translateY }`
    pub fn transform(&self) -> Result<JsValue, JsError> {
        let transform = self.cell.with_viewer(|v| Ok(v.transform()))?;
        serde_wasm_bindgen::to_value(&transform).map_err(|e| JsError::new(&e.to_string()))
    }

    #[wasm_bindgen(js_name = "zoomPercent")]
    pub fn zoom_percent(&self) -> Result<f64, JsError> {
        self.cell
            .with_viewer(|v| Ok(v.transform().zoom_percent() as f64))
    }
}

/// Compile schema metadata (array of tables) to diagram text.
#[wasm_bindgen(js_name = "schemaToDiagram")]
pub fn schema_to_diagram(schema: JsValue, grammar: Option<String>) -> Result<String, JsError> {
    let schema: SchemaMetadata = serde_wasm_bindgen::from_value(schema)
        .map_err(|e| JsError::new(&format!("Invalid schema: {e}")))?;

    let grammar = match grammar.as_deref() {
        Some(name) => Grammar::from_str(name)
            .ok_or_else(|| JsError::new(&format!("Unknown grammar: {name}")))?,
        None => Grammar::default(),
    };

    Ok(serialize(&compile(&schema), grammar))
}

fn parse_options(options: JsValue) -> Result<ViewerConfig, JsError> {
    if options.is_undefined() || options.is_null() {
        return Ok(ViewerConfig::default());
    }
    let config: ViewerConfig = serde_wasm_bindgen::from_value(options)
        .map_err(|e| JsError::new(&format!("Invalid options: {e}")))?;
    config
        .validate()
        .map_err(|e| JsError::new(&e.to_string()))?;
    Ok(config)
}
