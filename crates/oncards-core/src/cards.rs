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

//! Card assembly.
//!
//! Walks every header's points in pre-order, renders one card per entry
//! point, and collects the results as proto-notes for the flashcard store.
//! Recursion descends only through entry points: a concept nested under a
//! plain text point is context, not a card of its own. An entry point whose
//! rendering fails (a bad image payload, a failing media sink) is skipped
//! and reported; the rest of the page still converts.

use log::warn;
use serde::Serialize;

use crate::media::MediaSink;
use crate::render::Renderer;
use crate::tree::Header;
use crate::tree::PointId;
use crate::tree::Tree;

/// A finished note, ready for the flashcard store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtoNote {
    pub front: String,
    pub back: String,
    pub deck: String,
    pub tags: Vec<String>,
}

/// A skipped entry point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderWarning {
    /// Source identifier of the failed node, when the export carried one.
    pub source_id: Option<String>,
    pub message: String,
}

/// The outcome of converting one page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Conversion {
    pub notes: Vec<ProtoNote>,
    pub warnings: Vec<RenderWarning>,
}

/// Deck and tag assignment for generated notes.
#[derive(Debug, Clone)]
pub struct AssemblyOptions {
    /// Overrides the deck derived from the page hierarchy.
    pub deck: Option<String>,
    pub tags: Vec<String>,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        AssemblyOptions {
            deck: None,
            tags: vec!["Auto".to_string()],
        }
    }
}

/// Render every entry point in the tree into a proto-note.
pub fn generate_cards(
    tree: &Tree,
    media: &mut dyn MediaSink,
    options: &AssemblyOptions,
) -> Conversion {
    let mut conversion = Conversion::default();
    for (_, header) in tree.headers() {
        let deck = options.deck.clone().unwrap_or_else(|| deck_path(header));
        visit(tree, &header.children, &deck, options, media, &mut conversion);
    }
    conversion
}

/// Deck name from the page hierarchy, outermost page first.
fn deck_path(header: &Header) -> String {
    let mut segments: Vec<&str> = header
        .ancestor_pages
        .iter()
        .rev()
        .map(|page| page.as_str())
        .collect();
    segments.push(&header.page_title);
    segments.join("::")
}

fn visit(
    tree: &Tree,
    ids: &[PointId],
    deck: &str,
    options: &AssemblyOptions,
    media: &mut dyn MediaSink,
    conversion: &mut Conversion,
) {
    for &id in ids {
        if !tree.is_entry_point(id) {
            continue;
        }
        let point = tree.point(id);
        let mut renderer = Renderer::new(tree, id, media);
        match renderer.render() {
            Ok(card) => conversion.notes.push(ProtoNote {
                front: card.front,
                back: card.back,
                deck: deck.to_string(),
                tags: options.tags.clone(),
            }),
            Err(e) => {
                warn!("skipping entry point {:?}: {e}", point.source_id);
                conversion.warnings.push(RenderWarning {
                    source_id: point.source_id.clone(),
                    message: e.to_string(),
                });
            }
        }
        visit(tree, &point.children, deck, options, media, conversion);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classifier;
    use crate::classify::RawContent;
    use crate::error::Fallible;
    use crate::error::fail;
    use crate::media::MemorySink;
    use crate::tree::RawHeader;
    use crate::tree::RawPage;
    use crate::tree::RawPoint;

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

    fn page(points: Vec<RawPoint>) -> RawPage {
        RawPage {
            title: "Cells".to_string(),
            ancestor_pages: vec!["Unit 1".to_string(), "Biology".to_string()],
            headers: vec![RawHeader {
                text: "Organelles".to_string(),
                level: Some(1),
                points,
                ..RawHeader::default()
            }],
        }
    }

    /// Every concept and grouping yields exactly one card, in pre-order,
    /// and nothing else does.
    #[test]
    fn test_entry_point_completeness() -> Fallible<()> {
        let mut first = concept("First", ": f");
        let mut nested_group = grouping("Second", " group");
        nested_group.children = vec![concept("Third", ": deep")];
        first.children = vec![nested_group, text("not a card")];
        let tree = Tree::build(page(vec![first, text("note")]), &Classifier::default());

        let mut media = MemorySink::default();
        let conversion = generate_cards(&tree, &mut media, &AssemblyOptions::default());
        assert!(conversion.warnings.is_empty());
        assert_eq!(conversion.notes.len(), 3);
        assert!(conversion.notes[0].front.contains("\u{3010}First\u{3011}"));
        assert!(conversion.notes[1].front.contains("\u{3010}Second:\u{3011}"));
        assert!(conversion.notes[2].front.contains("\u{3010}Third\u{3011}"));
        Ok(())
    }

    /// Entry points below a non-entry node are not reached.
    #[test]
    fn test_recursion_only_through_entry_points() -> Fallible<()> {
        let mut note = text("plain");
        note.children = vec![concept("Buried", ": unreachable")];
        let tree = Tree::build(page(vec![note]), &Classifier::default());

        let mut media = MemorySink::default();
        let conversion = generate_cards(&tree, &mut media, &AssemblyOptions::default());
        assert!(conversion.notes.is_empty());
        Ok(())
    }

    #[test]
    fn test_deck_from_page_hierarchy() -> Fallible<()> {
        let tree = Tree::build(page(vec![concept("A", ": a")]), &Classifier::default());
        let mut media = MemorySink::default();
        let conversion = generate_cards(&tree, &mut media, &AssemblyOptions::default());
        assert_eq!(conversion.notes[0].deck, "Biology::Unit 1::Cells");
        assert_eq!(conversion.notes[0].tags, vec!["Auto".to_string()]);
        Ok(())
    }

    #[test]
    fn test_deck_override() -> Fallible<()> {
        let tree = Tree::build(page(vec![concept("A", ": a")]), &Classifier::default());
        let mut media = MemorySink::default();
        let options = AssemblyOptions {
            deck: Some("Inbox".to_string()),
            tags: vec!["Auto".to_string(), "Term".to_string()],
        };
        let conversion = generate_cards(&tree, &mut media, &options);
        assert_eq!(conversion.notes[0].deck, "Inbox");
        assert_eq!(conversion.notes[0].tags.len(), 2);
        Ok(())
    }

    /// A failing entry point is reported and skipped; the rest convert.
    #[test]
    fn test_failed_entry_point_is_skipped() -> Fallible<()> {
        let mut broken = concept("Broken", ": b");
        broken.children = vec![RawPoint {
            content: RawContent::Image("%%%".to_string()),
            ..RawPoint::default()
        }];
        broken.source_id = Some("oe-42".to_string());
        let tree = Tree::build(
            page(vec![broken, concept("Fine", ": f")]),
            &Classifier::default(),
        );

        let mut media = MemorySink::default();
        let conversion = generate_cards(&tree, &mut media, &AssemblyOptions::default());
        assert_eq!(conversion.notes.len(), 1);
        assert!(conversion.notes[0].front.contains("\u{3010}Fine\u{3011}"));
        assert_eq!(conversion.warnings.len(), 1);
        assert_eq!(conversion.warnings[0].source_id, Some("oe-42".to_string()));
        Ok(())
    }

    struct FailingSink;

    impl crate::media::MediaSink for FailingSink {
        fn write_image(&mut self, _name: &str, _bytes: &[u8]) -> Fallible<()> {
            fail("disk full")
        }
    }

    /// Sink failures surface the same way as decode failures.
    #[test]
    fn test_sink_failure_is_reported() -> Fallible<()> {
        let mut entry = concept("Entry", ": e");
        entry.children = vec![RawPoint {
            content: RawContent::Image("aGVsbG8=".to_string()),
            ..RawPoint::default()
        }];
        let tree = Tree::build(page(vec![entry]), &Classifier::default());

        let mut media = FailingSink;
        let conversion = generate_cards(&tree, &mut media, &AssemblyOptions::default());
        assert!(conversion.notes.is_empty());
        assert_eq!(conversion.warnings.len(), 1);
        assert!(conversion.warnings[0].message.contains("disk full"));
        Ok(())
    }

    /// Proto-notes serialize to the JSON shape the store integration reads.
    #[test]
    fn test_serialization() -> Fallible<()> {
        let note = ProtoNote {
            front: "f".to_string(),
            back: "b".to_string(),
            deck: "D".to_string(),
            tags: vec!["Auto".to_string()],
        };
        let json = serde_json::to_string(&note)?;
        assert_eq!(
            json,
            "{\"front\":\"f\",\"back\":\"b\",\"deck\":\"D\",\"tags\":[\"Auto\"]}"
        );
        Ok(())
    }
}
