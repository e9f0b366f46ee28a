use serde::{Deserialize, Serialize};

/// Default style applied at the document level.
///
/// Templates pass this as a plain JSON object, so every field is optional and
/// unknown keys are rejected to catch typos early.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Style {
    pub font_name: Option<String>,
    pub font_size: Option<f64>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

impl Style {
    pub fn is_default(&self) -> bool {
        *self == Style::default()
    }
}
