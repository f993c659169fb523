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

//! HTML element generation.
//!
//! Every rendered node becomes a `<span>` (optionally wrapped in a `<li>`)
//! with explicit font and color styling, so cards look the same regardless
//! of the flashcard application's own stylesheet. Content is embedded raw:
//! node payloads are markup already, and inline MathML is converted to TeX
//! on the way through.

use maud::PreEscaped;
use maud::html;

use crate::mathml::MathMode;
use crate::mathml::convert_math;
use crate::tree::Bullet;

/// De-emphasis color for sibling and ancestor context.
pub const GRAY: &str = "#e8e8e8";

/// Default text color. Set explicitly so list items keep their color when
/// an outer bullet is greyed.
pub const BLACK: &str = "#000000";

/// Builder for one styled HTML element.
#[derive(Debug, Clone)]
pub struct Fragment {
    content: String,
    bold: bool,
    underline: bool,
    italic: bool,
    color: Option<String>,
}

impl Fragment {
    pub fn new(content: impl Into<String>) -> Self {
        Fragment {
            content: content.into(),
            bold: false,
            underline: false,
            italic: false,
            color: None,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn grey(self) -> Self {
        self.color(GRAY)
    }

    /// Render as a bare styled `<span>`.
    pub fn span(&self) -> String {
        let mut style = String::from("font-family:Calibri;");
        if self.bold {
            style.push_str("font-weight:bold;");
        }
        if self.underline {
            style.push_str("text-decoration:underline;");
        }
        if self.italic {
            style.push_str("font-style:italic;");
        }
        style.push_str("color:");
        style.push_str(self.color.as_deref().unwrap_or(BLACK));
        style.push(';');
        let content = convert_math(&self.content, MathMode::Inline);
        html! { span style=(style) { (PreEscaped(content)) } }.into_string()
    }

    /// Render as a `<li>`-wrapped styled span, with a trailing newline.
    pub fn item(&self, bullet: &Bullet) -> String {
        let color = self.color.as_deref().unwrap_or(BLACK);
        let span = self.span();
        let markup = match bullet {
            Bullet::Unordered => html! {
                li style=(format!("color:{color}")) { (PreEscaped(span)) }
            },
            Bullet::Ordered { restart_at } => html! {
                li value=[restart_at.map(|n| n.to_string())]
                    style=(format!("list-style-type: decimal; color:{color}")) {
                    (PreEscaped(span))
                }
            },
        };
        let mut item = markup.into_string();
        item.push('\n');
        item
    }
}

/// Insert `insertion` in front of the last occurrence of `needle` in `text`.
/// Without a match, non-empty `text` is returned unchanged; empty `text`
/// yields the needle itself.
pub fn insert_before_last(text: &str, needle: &str, insertion: &str) -> String {
    match text.rfind(needle) {
        Some(index) => format!("{}{}{}", &text[..index], insertion, &text[index..]),
        None if !text.is_empty() => text.to_string(),
        None => needle.to_string(),
    }
}
