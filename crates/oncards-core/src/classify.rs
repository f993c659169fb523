// Copyright 2025 the oncards authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Classification of raw outline fragments into typed nodes.
//!
//! A fragment of rich text is classified by the styling of its runs: a bold
//! run marks a concept (the bold run is the stem, the rest is the body), an
//! underlined run marks a grouping, and plain visible text is a standard
//! point. Fragments that render as visually blank but carry a MathML payload
//! are equations. Image and table fragments are recognized structurally by
//! the tree builder and passed through here as their own variants.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

/// The MathML namespace carried by equation payloads.
pub const MATHML_NS: &str = "http://www.w3.org/1998/Math/MathML";

/// The conditional-comment marker wrapping standalone equation payloads.
const MATHML_MARKER: &str = "mathML";

static BOLD_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<span[^>]*font-weight:\s*bold[^>]*>(.*?)</span>").expect("invalid regex")
});

static UNDERLINE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<span[^>]*text-decoration:\s*underline[^>]*>(.*?)</span>")
        .expect("invalid regex")
});

static BOLD_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"font-weight:\s*bold").expect("invalid regex"));

static UNDERLINE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"text-decoration:\s*underline").expect("invalid regex"));

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("invalid regex"));

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("invalid regex"));

static INDICATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+) ?\|").expect("invalid regex"));

/// The kind of a classified node. Assigned once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A point with a bold stem: the unit of knowledge cards are made of.
    Concept,
    /// A point with an underlined stem: a label over a set of children.
    Grouping,
    /// Plain visible text with no styled run.
    Standard,
    /// An embedded image payload.
    Image,
    /// A standalone MathML formula.
    Equation,
    /// A table.
    Table,
    /// Nothing renderable.
    Blank,
}

/// A raw content fragment, as extracted by the outline parser.
#[derive(Debug, Clone, PartialEq)]
pub enum RawContent {
    /// Rich-text markup (the raw CDATA payload of a text run).
    Text(String),
    /// Base64-encoded image bytes.
    Image(String),
    /// A table. Cell contents are not converted.
    Table,
    /// No content.
    Empty,
}

impl Default for RawContent {
    fn default() -> Self {
        RawContent::Empty
    }
}

/// The classifier's verdict on one fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub kind: NodeKind,
    /// The raw payload: markup for text kinds, base64 for images.
    pub data: String,
    /// Visible text of the styled run, for concepts and groupings.
    pub stem: String,
    /// Visible text of the fragment with the styled run removed.
    pub body: String,
    /// Single-character flags parsed from a `"XY|"` stem prefix.
    pub indicators: Vec<char>,
}

impl Classification {
    fn of_kind(kind: NodeKind, data: impl Into<String>) -> Self {
        Classification {
            kind,
            data: data.into(),
            stem: String::new(),
            body: String::new(),
            indicators: Vec::new(),
        }
    }
}

/// Classifies raw fragments into node kinds.
#[derive(Debug, Clone)]
pub struct Classifier {
    /// Whether a visually blank fragment must carry the `mathML`
    /// conditional-comment marker, in addition to the MathML namespace, to
    /// classify as an equation.
    pub require_equation_marker: bool,
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier {
            require_equation_marker: true,
        }
    }
}

impl Classifier {
    pub fn classify(&self, content: &RawContent) -> Classification {
        match content {
            RawContent::Text(markup) => self.classify_text(markup),
            RawContent::Image(payload) => Classification::of_kind(NodeKind::Image, payload.clone()),
            RawContent::Table => Classification::of_kind(NodeKind::Table, ""),
            RawContent::Empty => Classification::of_kind(NodeKind::Blank, ""),
        }
    }

    fn classify_text(&self, markup: &str) -> Classification {
        let visible = visible_text(markup);
        if visible.trim().is_empty() {
            if markup.contains(MATHML_NS)
                && (!self.require_equation_marker || markup.contains(MATHML_MARKER))
            {
                return Classification::of_kind(NodeKind::Equation, markup);
            }
            return Classification::of_kind(NodeKind::Blank, markup);
        }
        if BOLD_MARKER.is_match(markup) {
            if let Some(classification) = styled(markup, &BOLD_RUN, NodeKind::Concept) {
                return classification;
            }
            debug!("bold styling present but no extractable run, treating as standard text");
        }
        if UNDERLINE_MARKER.is_match(markup) {
            if let Some(classification) = styled(markup, &UNDERLINE_RUN, NodeKind::Grouping) {
                return classification;
            }
            debug!("underline styling present but no extractable run, treating as standard text");
        }
        Classification::of_kind(NodeKind::Standard, markup)
    }
}

fn styled(markup: &str, run: &Regex, kind: NodeKind) -> Option<Classification> {
    let captures = run.captures(markup)?;
    let full = captures.get(0)?.as_str();
    let inner = captures.get(1)?.as_str();
    let stem = visible_text(inner);
    let body = visible_text(&markup.replacen(full, "", 1));
    let indicators = indicators(&stem);
    Some(Classification {
        kind,
        data: markup.to_string(),
        stem,
        body,
        indicators,
    })
}

fn indicators(stem: &str) -> Vec<char> {
    match INDICATOR.captures(stem) {
        Some(captures) => captures
            .get(1)
            .map(|m| m.as_str().chars().collect())
            .unwrap_or_default(),
        None => Vec::new(),
    }
}

/// The text a reader would see: markup with comments and tags stripped and
/// entities decoded.
pub fn visible_text(markup: &str) -> String {
    let stripped = COMMENT.replace_all(markup, "");
    let stripped = TAG.replace_all(&stripped, "");
    stripped
        .replace("&nbsp;", "\u{a0}")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
