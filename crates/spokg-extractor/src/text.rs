//! Document text preparation
//!
//! Normalizes raw document text before segmentation: optional trimming of
//! front matter up to a start marker, removal of underscore emphasis, and
//! whitespace collapsing.

/// Cleans raw text into the single-spaced form the segmenters expect
#[derive(Debug, Clone)]
pub struct TextPreparer {
    /// Text before the first occurrence of this marker is dropped
    start_marker: Option<String>,

    /// Remove `_` emphasis markers
    strip_underscores: bool,
}

impl Default for TextPreparer {
    fn default() -> Self {
        Self {
            start_marker: None,
            strip_underscores: true,
        }
    }
}

impl TextPreparer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything before `marker` (e.g. a Gutenberg header before "STAVE I")
    pub fn with_start_marker(mut self, marker: impl Into<String>) -> Self {
        self.start_marker = Some(marker.into()).filter(|m: &String| !m.is_empty());
        self
    }

    pub fn with_strip_underscores(mut self, strip: bool) -> Self {
        self.strip_underscores = strip;
        self
    }

    /// Prepare raw text. A marker that is absent leaves the text whole.
    pub fn prepare(&self, raw: &str) -> String {
        let body = match &self.start_marker {
            Some(marker) => match raw.find(marker.as_str()) {
                Some(start) => &raw[start..],
                None => {
                    tracing::debug!(marker = %marker, "Start marker not found, keeping full text");
                    raw
                }
            },
            None => raw,
        };

        let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
        if self.strip_underscores {
            collapsed.replace('_', "")
        } else {
            collapsed
        }
    }
}
