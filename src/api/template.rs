//! Redirect Page Template
//!
//! The page is split once into literal text and `{{Field}}` placeholders so
//! rendering is a single pass of appends.

use crate::error::{RedirectError, Result};
use crate::resolver::ResolvedItem;

/// Page embedded into the binary
pub const DEFAULT_TEMPLATE: &str = include_str!("../../templates/redirect.html");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    TargetUrl,
    AboutUrl,
}

impl Field {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "Title" => Some(Field::Title),
            "TargetUrl" => Some(Field::TargetUrl),
            "AboutUrl" => Some(Field::AboutUrl),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

/// Pre-parsed redirect page.
#[derive(Debug, Clone)]
pub struct RedirectPage {
    segments: Vec<Segment>,
    /// Escaped once at construction
    about_url: String,
}

impl RedirectPage {
    /// Parses `template`, failing on unknown or unterminated placeholders.
    pub fn parse(template: &str, about_url: Option<&str>) -> Result<Self> {
        let mut segments = Vec::new();
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            let after_open = &rest[start + 2..];
            let end = after_open.find("}}").ok_or_else(|| {
                RedirectError::InvalidConfig("unterminated template placeholder".to_string())
            })?;
            let name = &after_open[..end];
            let field = Field::parse(name).ok_or_else(|| {
                RedirectError::InvalidConfig(format!("unknown template placeholder '{name}'"))
            })?;

            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            segments.push(Segment::Field(field));
            rest = &after_open[end + 2..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            segments,
            about_url: escape_html(about_url.unwrap_or_default()),
        })
    }

    /// Parses the embedded page.
    pub fn embedded(about_url: Option<&str>) -> Result<Self> {
        Self::parse(DEFAULT_TEMPLATE, about_url)
    }

    /// Renders the page for a resolved item.
    pub fn render(&self, item: &ResolvedItem) -> String {
        let title = escape_html(&item.title);
        let target_url = escape_html(&item.url);

        let mut out = String::with_capacity(self.len_hint() + 4 * title.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(Field::Title) => out.push_str(&title),
                Segment::Field(Field::TargetUrl) => out.push_str(&target_url),
                Segment::Field(Field::AboutUrl) => out.push_str(&self.about_url),
            }
        }
        out
    }

    fn len_hint(&self) -> usize {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.len(),
                Segment::Field(_) => 0,
            })
            .sum()
    }
}

/// Escapes text for use in HTML content and quoted attributes.
fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
