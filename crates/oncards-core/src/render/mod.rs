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

//! The per-entry-point renderer.
//!
//! A [`Renderer`] is created fresh for every card entry point and produces a
//! front/back HTML pair in two phases. Phase one walks the entry point's
//! sibling list in document order: the entry node itself is rendered at
//! entry level with its direct children nested inside its list item, other
//! siblings are rendered greyed for context, and image siblings are
//! deferred to the end of the list so they do not interleave with the text
//! flow. Phase two wraps the result in one list layer per ancestor, nearest
//! first, then prepends the page/header annotation to both sides.
//!
//! Dispatch is an exhaustive match over `(kind, side, level)`. Indicator
//! overrides (`C` for cloze prompts, `L` for listed attributes) are
//! consulted before the default dispatch; at levels they do not specialize
//! they fall back to the grouping rendering.

pub mod html;

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;

use crate::classify::NodeKind;
use crate::error::Fallible;
use crate::mathml::MathMode;
use crate::mathml::convert_math;
use crate::media::MediaSink;
use crate::render::html::Fragment;
use crate::render::html::GRAY;
use crate::render::html::insert_before_last;
use crate::tree::Point;
use crate::tree::PointId;
use crate::tree::Tree;

/// Which side of the card is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Front,
    Back,
}

/// A node's position relative to the entry point being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Entry,
    DirectChild,
    Sibling,
}

/// The finished HTML pair for one entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCard {
    pub front: String,
    pub back: String,
}

static PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\W_]+").expect("invalid regex"));

/// Renders one entry point. Owns the image counters for the card, so image
/// names are unique within it: direct-child and sibling images count in
/// separate streams.
pub struct Renderer<'a> {
    tree: &'a Tree,
    entry: PointId,
    media: &'a mut dyn MediaSink,
    img_count_child: u32,
    img_count_sibling: u32,
}

impl<'a> Renderer<'a> {
    pub fn new(tree: &'a Tree, entry: PointId, media: &'a mut dyn MediaSink) -> Self {
        Renderer {
            tree,
            entry,
            media,
            img_count_child: 0,
            img_count_sibling: 0,
        }
    }

    pub fn render(&mut self) -> Fallible<RenderedCard> {
        let (front, back) = self.render_body()?;
        Ok(self.wrap_context(front, back))
    }

    fn render_body(&mut self) -> Fallible<(String, String)> {
        let mut front = String::from("<ul>\n");
        let mut back = String::from("<ul>\n");
        let siblings = self.tree.point(self.entry).siblings.clone();
        let mut deferred_images = Vec::new();
        for id in siblings {
            if id == self.entry {
                front.push_str(&self.render_point(id, Side::Front, Level::Entry)?);
                back.push_str(&self.render_point(id, Side::Back, Level::Entry)?);
                let children = self.tree.point(id).children.clone();
                if !children.is_empty() {
                    let mut child_front = String::from("\n<ul>\n");
                    let mut child_back = String::from("\n<ul>\n");
                    for child in children {
                        child_front
                            .push_str(&self.render_point(child, Side::Front, Level::DirectChild)?);
                        child_back
                            .push_str(&self.render_point(child, Side::Back, Level::DirectChild)?);
                    }
                    child_front.push_str("</ul>\n");
                    child_back.push_str("</ul>\n");
                    front = insert_before_last(&front, "</li>", &child_front);
                    back = insert_before_last(&back, "</li>", &child_back);
                }
            } else if self.tree.point(id).kind == NodeKind::Image {
                deferred_images.push(id);
            } else {
                front.push_str(&self.render_point(id, Side::Front, Level::Sibling)?);
                back.push_str(&self.render_point(id, Side::Back, Level::Sibling)?);
            }
        }
        for id in deferred_images {
            front.push_str(&self.render_point(id, Side::Front, Level::Sibling)?);
            back.push_str(&self.render_point(id, Side::Back, Level::Sibling)?);
        }
        front.push_str("</ul>\n");
        back.push_str("</ul>\n");
        Ok((front, back))
    }

    fn render_point(&mut self, id: PointId, side: Side, level: Level) -> Fallible<String> {
        if let Some(overridden) = self.render_override(id, side, level) {
            return Ok(overridden);
        }
        let kind = self.tree.point(id).kind;
        match kind {
            NodeKind::Concept => Ok(render_concept(self.tree, id, side, level)),
            NodeKind::Grouping => Ok(render_grouping(self.tree, id, side, level)),
            NodeKind::Standard => Ok(render_standard(self.tree, id, side, level)),
            NodeKind::Image => self.render_image(id, side, level),
            NodeKind::Equation => Ok(render_equation(self.tree.point(id), side, level)),
            NodeKind::Table => Ok(render_table(self.tree.point(id), side, level)),
            NodeKind::Blank => Ok(String::new()),
        }
    }

    /// Indicator-driven rendering variants, consulted ahead of the default
    /// dispatch. Only concepts and groupings carry usable indicators.
    fn render_override(&self, id: PointId, side: Side, level: Level) -> Option<String> {
        let point = self.tree.point(id);
        if !matches!(point.kind, NodeKind::Concept | NodeKind::Grouping) {
            return None;
        }
        if point.indicators.contains(&'C') {
            Some(self.render_cloze(id, side, level))
        } else if point.indicators.contains(&'L') {
            Some(self.render_listed(id, side, level))
        } else {
            None
        }
    }

    /// Cloze variant: the direct-child front shows only the indicator
    /// prefix as a prompt; its back reveals the stem and greys the body.
    fn render_cloze(&self, id: PointId, side: Side, level: Level) -> String {
        let point = self.tree.point(id);
        match (side, level) {
            (Side::Front, Level::DirectChild) => {
                let indicators: String = point.indicators.iter().collect();
                Fragment::new(format!("{indicators} |____:"))
                    .underline()
                    .item(&point.bullet)
            }
            (Side::Back, Level::DirectChild) => {
                let styled = format!(
                    "{}{}",
                    Fragment::new(&point.stem).underline().span(),
                    Fragment::new(&point.body).grey().span()
                );
                Fragment::new(styled).item(&point.bullet)
            }
            _ => render_grouping(self.tree, id, side, level),
        }
    }

    /// Listed variant: the direct-child front is rendered as if the node
    /// were itself an entry-level grouping, and its back stays ungreyed.
    fn render_listed(&self, id: PointId, side: Side, level: Level) -> String {
        let point = self.tree.point(id);
        match (side, level) {
            (Side::Front, Level::DirectChild) => {
                render_grouping(self.tree, id, Side::Front, Level::Entry)
            }
            (Side::Back, Level::DirectChild) => {
                let text = format!("{}{}", children_prefix(point), point.data);
                Fragment::new(text).item(&point.bullet)
            }
            _ => render_grouping(self.tree, id, side, level),
        }
    }

    fn render_image(&mut self, id: PointId, side: Side, level: Level) -> Fallible<String> {
        let point = self.tree.point(id);
        match (side, level) {
            (_, Level::Entry) => Ok(String::new()),
            (Side::Front, _) => Ok(Fragment::new("Image").italic().item(&point.bullet)),
            (Side::Back, Level::DirectChild) => {
                self.img_count_child += 1;
                self.write_image(id, self.img_count_child)
            }
            (Side::Back, Level::Sibling) => {
                self.img_count_sibling += 1;
                self.write_image(id, self.img_count_sibling)
            }
        }
    }

    fn write_image(&mut self, id: PointId, count: u32) -> Fallible<String> {
        let point = self.tree.point(id);
        let name = format!("{}{}.png", image_name(self.tree, point), count);
        let payload: String = point.data.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD.decode(payload.as_bytes())?;
        self.media.write_image(&name, &bytes)?;
        Ok(Fragment::new(format!("<img src='{name}' style='max-width:600px'>")).item(&point.bullet))
    }

    fn wrap_context(&self, mut front: String, mut back: String) -> RenderedCard {
        let entry = self.tree.point(self.entry);
        for (index, &ancestor_id) in entry.ancestors.iter().enumerate() {
            let ancestor = self.tree.point(ancestor_id);
            // Only entry-point kinds contribute a context layer.
            if !matches!(ancestor.kind, NodeKind::Concept | NodeKind::Grouping) {
                continue;
            }
            // The immediate parent of a grouping entry stays readable: its
            // label is the question's subject, not hidden context.
            let ungreyed = entry.kind == NodeKind::Grouping && index == 0;
            let mut front_fragment = match ancestor.kind {
                NodeKind::Concept => Fragment::new(&ancestor.stem).bold(),
                _ => Fragment::new(&ancestor.stem).underline(),
            };
            let mut back_fragment = Fragment::new(&ancestor.data);
            if !ungreyed {
                front_fragment = front_fragment.grey();
                back_fragment = back_fragment.grey();
            }
            let layer_front = format!("<ul>\n{}</ul>\n", front_fragment.item(&ancestor.bullet));
            let layer_back = format!("<ul>\n{}</ul>\n", back_fragment.item(&ancestor.bullet));
            front = insert_before_last(&layer_front, "</li>", &format!("\n{front}"));
            back = insert_before_last(&layer_back, "</li>", &format!("\n{back}"));
        }
        let annotation = self.header_annotation();
        RenderedCard {
            front: format!("{annotation}{front}"),
            back: format!("{annotation}{back}"),
        }
    }

    /// The greyed page/header line prepended to both sides: page title with
    /// its ancestor pages, then the bracketed header chain, hyperlinked
    /// back to the source when a link is available.
    fn header_annotation(&self) -> String {
        let header = self.tree.header(self.tree.point(self.entry).header);
        let mut title_line = header.page_title.clone();
        for page in &header.ancestor_pages {
            title_line.push_str(&format!(" - {page}"));
        }
        let mut annotation = Fragment::new(title_line).italic().grey().span();
        annotation.push_str("<br>\n");
        let linked = match &header.link {
            Some(link) => format!("<a href='{link}' style='color:{GRAY}'>{}</a>", header.text),
            None => header.text.clone(),
        };
        annotation.push_str(&Fragment::new(format!("[{linked}]")).underline().grey().span());
        for &ancestor in &header.ancestor_headers {
            annotation.push_str(&format!(" - [{}]", self.tree.header(ancestor).text));
        }
        let mut wrapped = Fragment::new(annotation).grey().span();
        wrapped.push_str("<br><br>\n");
        wrapped
    }
}

fn children_prefix(point: &Point) -> &'static str {
    if point.children.is_empty() { "" } else { "(+)" }
}

fn render_concept(tree: &Tree, id: PointId, side: Side, level: Level) -> String {
    let point = tree.point(id);
    match (side, level) {
        (Side::Front, Level::Entry) => Fragment::new(format!("\u{3010}{}\u{3011}", point.stem))
            .bold()
            .item(&point.bullet),
        (Side::Front, Level::DirectChild) => {
            if point.is_empty_childless() {
                String::new()
            } else {
                Fragment::new("____:").bold().item(&point.bullet)
            }
        }
        (Side::Front, Level::Sibling) => {
            if point.is_empty_childless() {
                String::new()
            } else {
                Fragment::new(&point.stem).bold().grey().item(&point.bullet)
            }
        }
        (Side::Back, Level::Entry) => {
            Fragment::new(format!("\u{3010}{}\u{3011}", point.data)).item(&point.bullet)
        }
        (Side::Back, Level::DirectChild) => {
            if point.is_empty_childless() {
                String::new()
            } else {
                let styled = format!(
                    "{}{}",
                    Fragment::new(&point.stem).bold().span(),
                    Fragment::new(&point.body).grey().span()
                );
                Fragment::new(styled).item(&point.bullet)
            }
        }
        (Side::Back, Level::Sibling) => {
            if point.is_empty_childless() {
                String::new()
            } else {
                Fragment::new(format!("{}{}", children_prefix(point), point.data))
                    .grey()
                    .item(&point.bullet)
            }
        }
    }
}

fn render_grouping(tree: &Tree, id: PointId, side: Side, level: Level) -> String {
    let point = tree.point(id);
    match (side, level) {
        (Side::Front, Level::Entry) => Fragment::new(format!("\u{3010}{}:\u{3011}", point.stem))
            .underline()
            .item(&point.bullet),
        (Side::Front, Level::DirectChild) => String::new(),
        (Side::Front, Level::Sibling) => {
            if point.is_empty_childless() {
                String::new()
            } else {
                Fragment::new(&point.stem)
                    .underline()
                    .grey()
                    .item(&point.bullet)
            }
        }
        (Side::Back, Level::Entry) => {
            Fragment::new(format!("\u{3010}{}\u{3011}", point.data)).item(&point.bullet)
        }
        (Side::Back, Level::DirectChild) | (Side::Back, Level::Sibling) => {
            if point.is_empty_childless() {
                String::new()
            } else {
                Fragment::new(format!("{}{}", children_prefix(point), point.data))
                    .grey()
                    .item(&point.bullet)
            }
        }
    }
}

fn render_standard(tree: &Tree, id: PointId, side: Side, level: Level) -> String {
    let point = tree.point(id);
    match (side, level) {
        (_, Level::Entry) => String::new(),
        (Side::Front, Level::DirectChild) => {
            Fragment::new("Subpoint").italic().item(&point.bullet)
        }
        (Side::Front, Level::Sibling) => String::new(),
        (Side::Back, Level::DirectChild) => render_recursive(tree, id, None),
        (Side::Back, Level::Sibling) => render_recursive(tree, id, Some(GRAY)),
    }
}

/// Render a standard node and its whole subtree in original formatting,
/// nesting child lists inside their parent's list item.
fn render_recursive(tree: &Tree, id: PointId, color: Option<&str>) -> String {
    let point = tree.point(id);
    let renderable = |kind: NodeKind| {
        matches!(
            kind,
            NodeKind::Concept | NodeKind::Grouping | NodeKind::Standard
        )
    };
    let mut rendered = String::new();
    if renderable(point.kind) && !point.data.trim().is_empty() {
        let mut fragment = Fragment::new(&point.data);
        if let Some(color) = color {
            fragment = fragment.color(color);
        }
        rendered = fragment.item(&point.bullet);
    }
    let has_renderable_children = point
        .children
        .iter()
        .any(|&child| renderable(tree.point(child).kind));
    if has_renderable_children {
        let mut child_html = String::from("\n<ul>\n");
        for &child in &point.children {
            child_html.push_str(&render_recursive(tree, child, color));
        }
        child_html.push_str("</ul>\n");
        rendered = insert_before_last(&rendered, "</li>", &child_html);
    }
    rendered
}

fn render_equation(point: &Point, side: Side, level: Level) -> String {
    match (side, level) {
        (_, Level::Entry) => String::new(),
        (Side::Front, _) => Fragment::new("Equation").italic().item(&point.bullet),
        (Side::Back, _) => {
            Fragment::new(convert_math(&point.data, MathMode::Display)).item(&point.bullet)
        }
    }
}

fn render_table(point: &Point, side: Side, level: Level) -> String {
    match (side, level) {
        (Side::Front, _) => String::new(),
        (Side::Back, Level::Entry) => String::new(),
        (Side::Back, _) => Fragment::new("Table").italic().item(&point.bullet),
    }
}

/// Deterministic image name: punctuation-stripped page title, header chain,
/// and ancestor stems, truncated to stay well under filesystem path limits.
/// The caller appends the per-stream counter and extension.
fn image_name(tree: &Tree, point: &Point) -> String {
    let truncated = |text: &str, limit: usize| -> String {
        PUNCT.replace_all(text, "").chars().take(limit).collect()
    };
    let header = tree.header(point.header);
    let mut name = truncated(&header.page_title, 30);
    name.push_str(&truncated(&header.text, 20));
    for &ancestor in &header.ancestor_headers {
        name.push_str(&truncated(&tree.header(ancestor).text, 20));
    }
    for &ancestor in &point.ancestors {
        let ancestor = tree.point(ancestor);
        if matches!(ancestor.kind, NodeKind::Concept | NodeKind::Grouping) {
            name.push_str(&truncated(&ancestor.stem, 20));
        }
    }
    name.chars().take(190).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classifier;
    use crate::classify::RawContent;
    use crate::error::Fallible;
    use crate::media::MemorySink;
    use crate::tree::RawHeader;
    use crate::tree::RawPage;
    use crate::tree::RawPoint;

    // "hello" in base64.
    const IMAGE_DATA: &str = "aGVsbG8=";

    fn text(markup: &str) -> RawPoint {
        RawPoint {
            content: RawContent::Text(markup.to_string()),
            ..RawPoint::default()
        }
    }

    fn concept(stem: &str, body: &str) -> RawPoint {
        text(&format!(
            "<span style='font-weight:bold'>{stem}</span>{body}"
        ))
    }

    fn grouping(stem: &str, body: &str) -> RawPoint {
        text(&format!(
            "<span style='text-decoration:underline'>{stem}</span>{body}"
        ))
    }

    fn image() -> RawPoint {
        RawPoint {
            content: RawContent::Image(IMAGE_DATA.to_string()),
            ..RawPoint::default()
        }
    }

    fn build(points: Vec<RawPoint>) -> Tree {
        let page = RawPage {
            title: "Page".to_string(),
            ancestor_pages: Vec::new(),
            headers: vec![RawHeader {
                text: "Header".to_string(),
                level: Some(1),
                points,
                ..RawHeader::default()
            }],
        };
        Tree::build(page, &Classifier::default())
    }

    fn render_first(tree: &Tree, media: &mut MemorySink) -> Fallible<RenderedCard> {
        let (_, header) = tree.headers().next().unwrap();
        let entry = header.children[0];
        Renderer::new(tree, entry, media).render()
    }

    /// A lone concept renders to a single bracketed item per side, with no
    /// ancestor layers, under the page/header annotation.
    #[test]
    fn test_lone_concept() -> Fallible<()> {
        let tree = build(vec![concept("Photosynthesis", ": light to sugar")]);
        let mut media = MemorySink::default();
        let card = render_first(&tree, &mut media)?;

        assert!(card.front.starts_with("<span style=\"font-family:Calibri;color:#e8e8e8;\">"));
        assert!(card.front.contains("[Header]"));
        let front_body = concat!(
            "<ul>\n",
            "<li style=\"color:#000000\">",
            "<span style=\"font-family:Calibri;font-weight:bold;color:#000000;\">",
            "\u{3010}Photosynthesis\u{3011}</span></li>\n",
            "</ul>\n"
        );
        assert!(card.front.ends_with(front_body));
        assert!(card.back.contains(
            "\u{3010}<span style='font-weight:bold'>Photosynthesis</span>: light to sugar\u{3011}"
        ));
        // One <ul> per side: no ancestor wrapping happened.
        assert_eq!(card.front.matches("<ul>").count(), 1);
        Ok(())
    }

    /// The entry's own content is never greyed on the back; sibling
    /// context always is.
    #[test]
    fn test_greying_invariant() -> Fallible<()> {
        let tree = build(vec![
            concept("Entry", ": answer"),
            concept("Other", ": context"),
        ]);
        let mut media = MemorySink::default();
        let card = render_first(&tree, &mut media)?;

        let entry_item = "\u{3010}<span style='font-weight:bold'>Entry</span>: answer\u{3011}";
        let entry_index = card.back.find(entry_item).unwrap();
        let enclosing = &card.back[..entry_index];
        let li_start = enclosing.rfind("<li").unwrap();
        assert!(card.back[li_start..entry_index].contains("color:#000000"));

        let sibling_index = card.back.find("Other</span>: context").unwrap();
        let sibling_li = card.back[..sibling_index].rfind("<li").unwrap();
        assert!(card.back[sibling_li..sibling_index].contains("color:#e8e8e8"));
        Ok(())
    }

    /// A grouping entry keeps its immediate parent ungreyed even when the
    /// parent is a concept; more distant ancestors are greyed.
    #[test]
    fn test_ungreyed_immediate_parent_of_grouping() -> Fallible<()> {
        let mut grandparent = concept("Far", ": far data");
        let mut parent = concept("Near", ": near data");
        parent.children = vec![grouping("Kinds", " of things")];
        grandparent.children = vec![parent];
        let tree = build(vec![grandparent]);

        let (_, header) = tree.headers().next().unwrap();
        let far_id = header.children[0];
        let near_id = tree.point(far_id).children[0];
        let entry = tree.point(near_id).children[0];
        let mut media = MemorySink::default();
        let card = Renderer::new(&tree, entry, &mut media).render()?;

        assert!(card.front.contains(
            "<span style=\"font-family:Calibri;font-weight:bold;color:#000000;\">Near</span>"
        ));
        assert!(card.front.contains(
            "<span style=\"font-family:Calibri;font-weight:bold;color:#e8e8e8;\">Far</span>"
        ));
        Ok(())
    }

    /// A concept entry greys all ancestor layers, immediate parent included.
    #[test]
    fn test_concept_entry_greys_immediate_parent() -> Fallible<()> {
        let mut parent = grouping("Parent", " label");
        parent.children = vec![concept("Child", ": data")];
        let tree = build(vec![parent]);

        let (_, header) = tree.headers().next().unwrap();
        let parent_id = header.children[0];
        let entry = tree.point(parent_id).children[0];
        let mut media = MemorySink::default();
        let card = Renderer::new(&tree, entry, &mut media).render()?;

        assert!(card.front.contains(concat!(
            "<span style=\"font-family:Calibri;text-decoration:underline;color:#e8e8e8;\">",
            "Parent</span>"
        )));
        Ok(())
    }

    /// Image siblings are deferred behind all non-image siblings,
    /// preserving their relative order.
    #[test]
    fn test_image_siblings_render_last() -> Fallible<()> {
        let mut first_image = image();
        first_image.source_id = Some("img-one".to_string());
        let mut second_image = image();
        second_image.source_id = Some("img-two".to_string());
        let tree = build(vec![
            concept("Entry", ": e"),
            first_image,
            text("trailing note"),
            second_image,
        ]);
        let mut media = MemorySink::default();
        let card = render_first(&tree, &mut media)?;

        let note_index = card.back.find("trailing note").unwrap();
        let first_img = card.back.find("PageHeader1.png").unwrap();
        let second_img = card.back.find("PageHeader2.png").unwrap();
        assert!(note_index < first_img);
        assert!(first_img < second_img);
        assert_eq!(media.images.len(), 2);
        assert_eq!(media.images[0].0, "PageHeader1.png");
        assert_eq!(media.images[1].0, "PageHeader2.png");
        assert_eq!(media.images[0].1, b"hello");
        Ok(())
    }

    /// Direct-child and sibling images count in independent streams.
    #[test]
    fn test_image_counter_streams() -> Fallible<()> {
        let mut entry = concept("Entry", ": e");
        entry.children = vec![image()];
        let tree = build(vec![entry, image()]);
        let mut media = MemorySink::default();
        render_first(&tree, &mut media)?;

        let names: Vec<&str> = media.images.iter().map(|(name, _)| name.as_str()).collect();
        // Both are the first image of their stream.
        assert_eq!(names, vec!["PageHeaderEntry1.png", "PageHeader1.png"]);
        Ok(())
    }

    /// Rendering the same entry twice with fresh renderers is
    /// byte-identical: counters restart per renderer.
    #[test]
    fn test_idempotent_rendering() -> Fallible<()> {
        let mut entry = concept("Entry", ": e");
        entry.children = vec![image(), grouping("Group", " label")];
        let tree = build(vec![entry, text("note")]);

        let mut first_media = MemorySink::default();
        let first = render_first(&tree, &mut first_media)?;
        let mut second_media = MemorySink::default();
        let second = render_first(&tree, &mut second_media)?;
        assert_eq!(first, second);
        assert_eq!(first_media.images, second_media.images);
        Ok(())
    }

    /// Cloze indicator: the direct-child front prompts with the indicator
    /// characters, the back reveals the stem and greys the body.
    #[test]
    fn test_cloze_direct_child() -> Fallible<()> {
        let mut entry = concept("Entry", ": e");
        let mut cloze = grouping("C |Mechanism", ": step one");
        cloze.children = vec![text("detail")];
        entry.children = vec![cloze];
        let tree = build(vec![entry]);
        let mut media = MemorySink::default();
        let card = render_first(&tree, &mut media)?;

        assert!(card.front.contains(concat!(
            "<span style=\"font-family:Calibri;text-decoration:underline;color:#000000;\">",
            "C |____:</span>"
        )));
        assert!(!card.front.contains("Mechanism"));
        assert!(card.back.contains(concat!(
            "<span style=\"font-family:Calibri;text-decoration:underline;color:#000000;\">",
            "C |Mechanism</span>"
        )));
        assert!(card.back.contains(
            "<span style=\"font-family:Calibri;color:#e8e8e8;\">: step one</span>"
        ));
        Ok(())
    }

    /// Listed indicator: the direct-child front renders like an entry-level
    /// grouping, and the back stays ungreyed.
    #[test]
    fn test_listed_direct_child() -> Fallible<()> {
        let mut entry = concept("Entry", ": e");
        entry.children = vec![grouping("L|Kinds", " of anemia")];
        let tree = build(vec![entry]);
        let mut media = MemorySink::default();
        let card = render_first(&tree, &mut media)?;

        assert!(card.front.contains("\u{3010}L|Kinds:\u{3011}"));
        let back_item = "<span style='text-decoration:underline'>L|Kinds</span> of anemia";
        let index = card.back.find(back_item).unwrap();
        let li_start = card.back[..index].rfind("<li").unwrap();
        assert!(card.back[li_start..index].contains("color:#000000"));
        Ok(())
    }

    /// Equation as a direct child: italic placeholder up front, converted
    /// display formula on the back.
    #[test]
    fn test_equation_direct_child() -> Fallible<()> {
        let mut entry = concept("Entry", ": e");
        let equation = concat!(
            "<!--[if mathML]><mml:math xmlns:mml=\"http://www.w3.org/1998/Math/MathML\">",
            "<mml:mfrac><mml:mi>a</mml:mi><mml:mi>b</mml:mi></mml:mfrac></mml:math><![endif]-->"
        );
        entry.children = vec![text(equation)];
        let tree = build(vec![entry]);
        let mut media = MemorySink::default();
        let card = render_first(&tree, &mut media)?;

        assert!(card.front.contains(
            "<span style=\"font-family:Calibri;font-style:italic;color:#000000;\">Equation</span>"
        ));
        let back_index = card.back.find("\\[\\frac{a}{b}\\]").unwrap();
        let li_start = card.back[..back_index].rfind("<li").unwrap();
        assert!(li_start < back_index);
        Ok(())
    }

    /// Standard direct child: placeholder front, full recursive subtree on
    /// the back with nested lists inside the parent's item.
    #[test]
    fn test_standard_direct_child_recursive_back() -> Fallible<()> {
        let mut entry = concept("Entry", ": e");
        let mut note = text("outer note");
        note.children = vec![text("inner note")];
        entry.children = vec![note];
        let tree = build(vec![entry]);
        let mut media = MemorySink::default();
        let card = render_first(&tree, &mut media)?;

        assert!(card.front.contains("Subpoint"));
        assert!(!card.front.contains("outer note"));
        let outer = card.back.find("outer note").unwrap();
        let inner = card.back.find("inner note").unwrap();
        assert!(outer < inner);
        // The inner list nests within the outer item.
        let between = &card.back[outer..inner];
        assert!(between.contains("<ul>"));
        assert!(!between.contains("</li>"));
        Ok(())
    }

    /// Collapsed children are marked with a (+) prefix on greyed backs.
    #[test]
    fn test_children_prefix_on_greyed_back() -> Fallible<()> {
        let mut sibling = grouping("Group", " label");
        sibling.children = vec![text("hidden detail")];
        let tree = build(vec![concept("Entry", ": e"), sibling]);
        let mut media = MemorySink::default();
        let card = render_first(&tree, &mut media)?;

        assert!(card.back.contains("(+)<span style='text-decoration:underline'>Group</span>"));
        assert!(!card.back.contains("hidden detail"));
        Ok(())
    }

    /// Empty childless siblings disappear from both sides.
    #[test]
    fn test_empty_childless_sibling_skipped() -> Fallible<()> {
        let tree = build(vec![concept("Entry", ": e"), concept("Hollow", "")]);
        let mut media = MemorySink::default();
        let card = render_first(&tree, &mut media)?;
        assert!(!card.front.contains("Hollow"));
        // The raw data still shows nowhere on the back either.
        assert!(!card.back.contains("Hollow</span>"));
        Ok(())
    }

    /// A bad image payload fails the card instead of emitting broken HTML.
    #[test]
    fn test_bad_image_payload_fails() {
        let mut entry = concept("Entry", ": e");
        entry.children = vec![RawPoint {
            content: RawContent::Image("not@base64!".to_string()),
            ..RawPoint::default()
        }];
        let tree = build(vec![entry]);
        let (_, header) = tree.headers().next().unwrap();
        let mut media = MemorySink::default();
        let result = Renderer::new(&tree, header.children[0], &mut media).render();
        assert!(result.is_err());
    }

    /// The table placeholder shows on backs only.
    #[test]
    fn test_table_sibling() -> Fallible<()> {
        let tree = build(vec![
            concept("Entry", ": e"),
            RawPoint {
                content: RawContent::Table,
                ..RawPoint::default()
            },
        ]);
        let mut media = MemorySink::default();
        let card = render_first(&tree, &mut media)?;
        assert!(!card.front.contains("Table"));
        assert!(card.back.contains("Table"));
        Ok(())
    }

    /// Header ancestry and page ancestry show up in the annotation.
    #[test]
    fn test_header_annotation() -> Fallible<()> {
        let page = RawPage {
            title: "Cells".to_string(),
            ancestor_pages: vec!["Unit 1".to_string(), "Biology".to_string()],
            headers: vec![
                RawHeader {
                    text: "Top".to_string(),
                    level: Some(1),
                    ..RawHeader::default()
                },
                RawHeader {
                    text: "Organelles".to_string(),
                    level: Some(3),
                    link: Some("onenote:#section-id".to_string()),
                    points: vec![concept("Mitochondria", ": powerhouse")],
                    ..RawHeader::default()
                },
            ],
        };
        let tree = Tree::build(page, &Classifier::default());
        let (_, header) = tree
            .headers()
            .find(|(_, header)| header.text == "Organelles")
            .unwrap();
        let mut media = MemorySink::default();
        let card = Renderer::new(&tree, header.children[0], &mut media).render()?;

        assert!(card.front.contains("Cells - Unit 1 - Biology"));
        assert!(card.front.contains("<a href='onenote:#section-id' style='color:#e8e8e8'>Organelles</a>"));
        assert!(card.front.contains(" - [Top]"));
        assert!(card.front.contains("<br><br>\n"));
        Ok(())
    }
}
