//! Styled reply text
//!
//! A reply is a run of plain and highlighted segments. Highlights mark
//! every case-insensitive occurrence of the trigger word, all in the one
//! color chosen for that reveal.

use std::sync::LazyLock;

use rand::Rng;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::state::TRIGGER_PHRASE;

static TRIGGER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(&regex::escape(TRIGGER_PHRASE))
        .case_insensitive(true)
        .build()
        .expect("escaped trigger phrase is a valid pattern")
});

/// Highlight colors a reveal can use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    Red,
    Green,
    Blue,
    Yellow,
}

impl Palette {
    pub const ALL: [Palette; 4] = [Palette::Red, Palette::Green, Palette::Blue, Palette::Yellow];

    /// Uniformly pick a color
    pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// CSS class name used by the HTML rendering
    pub fn class_name(&self) -> &'static str {
        match self {
            Palette::Red => "red",
            Palette::Green => "green",
            Palette::Blue => "blue",
            Palette::Yellow => "yellow",
        }
    }
}

impl std::fmt::Display for Palette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.class_name())
    }
}

/// One run of reply text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Plain(String),
    Highlight { text: String, color: Palette },
}

/// Text for the display surface
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledText {
    segments: Vec<Segment>,
}

impl StyledText {
    /// Unstyled text
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return Self::default();
        }
        Self {
            segments: vec![Segment::Plain(text)],
        }
    }

    /// Wrap every case-insensitive occurrence of the trigger phrase in
    /// `color`.
    ///
    /// Matched text keeps its original casing.
    pub fn highlighted(text: &str, color: Palette) -> Self {
        let mut segments = Vec::new();
        let mut last = 0;
        for found in TRIGGER_PATTERN.find_iter(text) {
            if found.start() > last {
                segments.push(Segment::Plain(text[last..found.start()].to_string()));
            }
            segments.push(Segment::Highlight {
                text: found.as_str().to_string(),
                color,
            });
            last = found.end();
        }
        if last < text.len() {
            segments.push(Segment::Plain(text[last..].to_string()));
        }

        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of highlighted spans
    pub fn highlight_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Highlight { .. }))
            .count()
    }

    /// Inline markup for a web display surface
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Plain(text) => html.push_str(&escape_html(text)),
                Segment::Highlight { text, color } => {
                    html.push_str(&format!(
                        r#"<span class="why-color {}">{}</span>"#,
                        color.class_name(),
                        escape_html(text)
                    ));
                }
            }
        }
        html
    }
}

impl std::fmt::Display for StyledText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Plain(text) | Segment::Highlight { text, .. } => f.write_str(text)?,
            }
        }
        Ok(())
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replies::CATALOG;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_every_occurrence_highlighted_with_one_color() {
        let styled =
            StyledText::highlighted("And what's behind that 'why' for you? Why?", Palette::Blue);
        assert_eq!(styled.highlight_count(), 2);
        for segment in styled.segments() {
            if let Segment::Highlight { color, .. } = segment {
                assert_eq!(*color, Palette::Blue);
            }
        }
        assert_eq!(styled.to_string(), "And what's behind that 'why' for you? Why?");
    }

    #[test]
    fn test_highlight_keeps_original_casing() {
        let styled = StyledText::highlighted("WHY not? why, Why", Palette::Red);
        let matches: Vec<_> = styled
            .segments()
            .iter()
            .filter_map(|s| match s {
                Segment::Highlight { text, .. } => Some(text.as_str()),
                Segment::Plain(_) => None,
            })
            .collect();
        assert_eq!(matches, vec!["WHY", "why", "Why"]);
    }

    #[test]
    fn test_catalog_span_counts() {
        for reply in CATALOG {
            let expected = reply.to_lowercase().matches("why").count();
            let styled = StyledText::highlighted(reply, Palette::Green);
            assert_eq!(styled.highlight_count(), expected, "{reply}");
            let spans = styled.to_html().matches(r#"<span class="why-color green">"#).count();
            assert_eq!(spans, expected);
        }
    }

    #[test]
    fn test_trigger_pattern_is_case_insensitive_literal() {
        assert_eq!(TRIGGER_PATTERN.as_str(), "why");
        assert_eq!(TRIGGER_PATTERN.find_iter("wHy WHY whY").count(), 3);
        assert_eq!(StyledText::highlighted("", Palette::Red), StyledText::default());
    }

    #[test]
    fn test_no_occurrence_is_plain() {
        let styled = StyledText::highlighted("Tell me more.", Palette::Yellow);
        assert_eq!(styled.highlight_count(), 0);
        assert_eq!(styled, StyledText::plain("Tell me more."));
    }

    #[test]
    fn test_html_rendering() {
        let styled = StyledText::highlighted("Why <that>?", Palette::Red);
        assert_eq!(
            styled.to_html(),
            r#"<span class="why-color red">Why</span> &lt;that&gt;?"#
        );
    }

    #[test]
    fn test_palette_pick() {
        assert_eq!(Palette::pick(&mut StepRng::new(0, 0)), Palette::Red);

        let mut rng = StdRng::seed_from_u64(11);
        let seen: std::collections::HashSet<_> =
            (0..200).map(|_| Palette::pick(&mut rng)).collect();
        assert_eq!(seen.len(), Palette::ALL.len());
    }
}
