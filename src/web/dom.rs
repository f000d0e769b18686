//! [`Host`] backed by a DOM element.
//!
//! The rendered markup goes into a `div` inside the container; the viewport
//! transform is applied to that `div` with `transform-origin: 0 0`.

use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Document, Event, EventTarget, HtmlElement, KeyboardEvent, MouseEvent,
    WheelEvent,
};

use crate::host::{EventKind, Host, HostError, InputEvent, Target};
use crate::render::Drawable;
use crate::viewport::{Point, Transform};

/// Receives translated input events.
pub type EventSink = Rc<dyn Fn(InputEvent)>;

pub struct DomListener {
    kind: EventKind,
    target: EventTarget,
    closure: Closure<dyn FnMut(Event)>,
}

pub struct DomHost {
    container: HtmlElement,
    content: HtmlElement,
    document: Document,
    sink: EventSink,
    /// Detached closures. Kept alive because a listener may be removed from
    /// inside its own callback (close on Escape).
    retired: Vec<Closure<dyn FnMut(Event)>>,
}

impl DomHost {
    pub fn new(container: HtmlElement, sink: EventSink) -> Result<Self, HostError> {
        let document = container
            .owner_document()
            .ok_or_else(|| HostError::Surface("container has no owner document".to_string()))?;

        let content: HtmlElement = document
            .create_element("div")
            .map_err(surface_error)?
            .dyn_into()
            .map_err(|_| HostError::Surface("created element is not an HtmlElement".to_string()))?;
        content.set_class_name("schemaview-content");
        content
            .style()
            .set_property("transform-origin", "0 0")
            .map_err(surface_error)?;
        container
            .style()
            .set_property("overflow", "hidden")
            .map_err(surface_error)?;

        Ok(Self {
            container,
            content,
            document,
            sink,
            retired: Vec::new(),
        })
    }
}

impl Host for DomHost {
    type Listener = DomListener;

    fn listen(&mut self, kind: EventKind) -> Result<DomListener, HostError> {
        let target: EventTarget = match kind.target() {
            Target::Container => self.container.clone().into(),
            Target::Document => self.document.clone().into(),
        };

        let sink = Rc::clone(&self.sink);
        let container = self.container.clone();
        let closure = Closure::wrap(Box::new(move |event: Event| {
            if let Some(input) = translate(kind, &event, &container) {
                sink(input);
            }
        }) as Box<dyn FnMut(Event)>);

        let callback: &js_sys::Function = closure.as_ref().unchecked_ref();
        let added = if kind == EventKind::Wheel {
            // Non-passive so the page does not scroll while zooming.
            let options = AddEventListenerOptions::new();
            options.set_passive(false);
            target.add_event_listener_with_callback_and_add_event_listener_options(
                kind.dom_name(),
                callback,
                &options,
            )
        } else {
            target.add_event_listener_with_callback(kind.dom_name(), callback)
        };

        added.map_err(|e| HostError::Attach {
            kind,
            reason: js_reason(&e),
        })?;

        Ok(DomListener {
            kind,
            target,
            closure,
        })
    }

    fn unlisten(&mut self, listener: DomListener) -> Result<(), HostError> {
        let DomListener {
            kind,
            target,
            closure,
        } = listener;

        let removed = target
            .remove_event_listener_with_callback(kind.dom_name(), closure.as_ref().unchecked_ref());
        self.retired.push(closure);

        removed.map_err(|e| HostError::Detach {
            kind,
            reason: js_reason(&e),
        })
    }

    fn mount(&mut self, content: &Drawable) -> Result<(), HostError> {
        self.content.set_inner_html(content.as_str());
        self.container
            .append_child(&self.content)
            .map_err(surface_error)?;
        Ok(())
    }

    fn show_failure(&mut self, message: &str) {
        self.container.set_inner_html(&format!(
            r#"<div class="schemaview-error">Failed to render diagram: {}</div>"#,
            escape_html(message)
        ));
    }

    fn apply_transform(&mut self, transform: &Transform) {
        if let Err(e) = self
            .content
            .style()
            .set_property("transform", &transform.css())
        {
            log::warn!("failed to apply transform: {}", js_reason(&e));
        }
    }

    fn print(&mut self, content: &Drawable) -> Result<(), HostError> {
        let window =
            web_sys::window().ok_or_else(|| HostError::Surface("no window".to_string()))?;
        let popup = window
            .open_with_url_and_target("", "_blank")
            .map_err(surface_error)?
            .ok_or_else(|| HostError::Surface("print window was blocked".to_string()))?;
        let body = popup
            .document()
            .and_then(|d| d.body())
            .ok_or_else(|| HostError::Surface("print window has no body".to_string()))?;

        body.set_inner_html(content.as_str());
        popup.print().map_err(surface_error)
    }

    fn teardown(&mut self) {
        self.content.remove();
        self.container.set_inner_html("");
    }
}

fn translate(kind: EventKind, event: &Event, container: &HtmlElement) -> Option<InputEvent> {
    match kind {
        EventKind::PointerDown => {
            let e = event.dyn_ref::<MouseEvent>()?;
            // keeps text selection from starting mid-drag
            e.prevent_default();
            Some(InputEvent::PointerDown { at: client_point(e) })
        }
        EventKind::PointerMove => {
            let e = event.dyn_ref::<MouseEvent>()?;
            Some(InputEvent::PointerMove { at: client_point(e) })
        }
        EventKind::PointerUp => Some(InputEvent::PointerUp),
        EventKind::Wheel => {
            let e = event.dyn_ref::<WheelEvent>()?;
            e.prevent_default();
            let rect = container.get_bounding_client_rect();
            Some(InputEvent::Wheel {
                at: Point::new(
                    f64::from(e.client_x()) - rect.left(),
                    f64::from(e.client_y()) - rect.top(),
                ),
                delta: e.delta_y(),
            })
        }
        EventKind::KeyDown => {
            let e = event.dyn_ref::<KeyboardEvent>()?;
            Some(InputEvent::KeyDown { key: e.key() })
        }
    }
}

fn client_point(e: &MouseEvent) -> Point {
    Point::new(f64::from(e.client_x()), f64::from(e.client_y()))
}

fn surface_error(e: JsValue) -> HostError {
    HostError::Surface(js_reason(&e))
}

pub(crate) fn js_reason(e: &JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{e:?}"))
}

pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"a" & b</b>"#),
            "&lt;b&gt;&quot;a&quot; &amp; b&lt;/b&gt;"
        );
    }
}
