//! Per-render context supplied by the host application.

/// Context the surrounding application hands to a render.
///
/// The only signal the wrapper consumes today is the output format inferred
/// from the request being served (e.g. the `_format` route attribute of a web
/// framework). It is deliberately a plain value: the wrapper never talks to a
/// request object directly.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    request_format: Option<String>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the format inferred from the surrounding request.
    pub fn with_request_format(mut self, format: impl Into<String>) -> Self {
        self.request_format = Some(format.into());
        self
    }

    pub fn request_format(&self) -> Option<&str> {
        self.request_format.as_deref()
    }
}
