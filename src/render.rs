//! Capability interface for the external diagram renderer.
//!
//! The renderer turns serialized diagram text into drawable markup. Its
//! output is opaque: the viewer only mounts and prints it.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Renderer rejected diagram: {0}")]
    Rejected(String),
    #[error("Renderer returned no content")]
    Empty,
}

/// Drawable content produced by a renderer (typically SVG markup).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drawable(String);

impl Drawable {
    pub fn new(content: impl Into<String>) -> Self {
        Self(content.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

pub trait Renderer {
    fn render(&self, text: &str) -> Result<Drawable, RenderError>;
}

/// Adapts a closure into a [`Renderer`].
pub struct FnRenderer<F>(pub F);

impl<F> Renderer for FnRenderer<F>
where
    F: Fn(&str) -> Result<Drawable, RenderError>,
{
    fn render(&self, text: &str) -> Result<Drawable, RenderError> {
        (self.0)(text)
    }
}

impl<R: Renderer + ?Sized> Renderer for &R {
    fn render(&self, text: &str) -> Result<Drawable, RenderError> {
        (**self).render(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_renderer() {
        let renderer = FnRenderer(|text: &str| -> Result<Drawable, RenderError> {
            Ok(Drawable::new(format!("<svg>{}</svg>", text.len())))
        });
        let drawable = renderer.render("erDiagram\n").unwrap();

        assert_eq!(drawable.as_str(), "<svg>10</svg>");
    }

    #[test]
    fn test_fn_renderer_error() {
        let renderer = FnRenderer(|_: &str| -> Result<Drawable, RenderError> {
            Err(RenderError::Rejected("syntax".to_string()))
        });
        let err = renderer.render("bogus").unwrap_err();

        assert_eq!(err.to_string(), "Renderer rejected diagram: syntax");
    }
}
