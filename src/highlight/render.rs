//! Output side of highlighting: the stream handed to a view layer.
//!
//! Views implement [`RenderSink`] and receive one call per token followed by
//! a single [`RenderSink::end_of_content`]. Mapping classifications to
//! colors or styles is entirely the sink's business.

use super::tokenizer::Token;
use serde::Serialize;

/// Extra presentation hint attached to a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Marker {
    SelectedBracket,
}

pub trait RenderSink {
    fn span(&mut self, text: &str, classification: Option<&str>, marker: Option<Marker>);

    /// Called once after the last span.
    fn end_of_content(&mut self);
}

/// Feed `tokens` to `sink` in order and terminate the stream.
pub fn render_tokens<S: RenderSink + ?Sized>(tokens: &[Token<'_>], sink: &mut S) {
    for token in tokens {
        sink.span(token.text, token.classification, token.marker());
    }
    sink.end_of_content();
}

/// One unit of a collected render stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RenderUnit {
    Span {
        text: String,
        classification: Option<String>,
        #[serde(rename = "extraMarker")]
        extra_marker: Option<Marker>,
    },
    EndOfContent,
}

/// Sink that records the stream, e.g. for JSON output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RenderStream {
    units: Vec<RenderUnit>,
}

impl RenderStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn units(&self) -> &[RenderUnit] {
        &self.units
    }

    pub fn into_units(self) -> Vec<RenderUnit> {
        self.units
    }

    /// Concatenated span text, which equals the highlighted source.
    pub fn text(&self) -> String {
        self.units
            .iter()
            .filter_map(|unit| match unit {
                RenderUnit::Span { text, .. } => Some(text.as_str()),
                RenderUnit::EndOfContent => None,
            })
            .collect()
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.units.last(), Some(RenderUnit::EndOfContent))
    }
}

impl RenderSink for RenderStream {
    fn span(&mut self, text: &str, classification: Option<&str>, marker: Option<Marker>) {
        self.units.push(RenderUnit::Span {
            text: text.to_string(),
            classification: classification.map(str::to_string),
            extra_marker: marker,
        });
    }

    fn end_of_content(&mut self) {
        self.units.push(RenderUnit::EndOfContent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stream_serializes_units() {
        let mut stream = RenderStream::new();
        stream.span("(", Some("paren"), Some(Marker::SelectedBracket));
        stream.span(" x", None, None);
        stream.end_of_content();

        assert!(stream.is_terminated());
        assert_eq!(stream.text(), "( x");
        assert_eq!(
            serde_json::to_value(&stream).unwrap(),
            json!([
                {"kind": "span", "text": "(", "classification": "paren", "extraMarker": "selected-bracket"},
                {"kind": "span", "text": " x", "classification": null, "extraMarker": null},
                {"kind": "end-of-content"},
            ])
        );
    }
}
