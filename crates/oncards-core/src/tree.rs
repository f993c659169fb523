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

//! The node tree.
//!
//! All points and headers live in two arenas inside [`Tree`]; navigational
//! links (children, siblings, ancestors, owning header) are arena indices.
//! The builder consumes a nested [`RawPage`] produced by an outline parser
//! and populates every node's context before its children are visited, so
//! render-time lookups never miss.

use crate::classify::Classifier;
use crate::classify::NodeKind;
use crate::classify::RawContent;

/// Index of a [`Point`] in its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointId(usize);

/// Index of a [`Header`] in its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderId(usize);

/// List styling carried by a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bullet {
    #[default]
    Unordered,
    Ordered {
        /// An explicit renumbering of the list at this item, if any.
        restart_at: Option<u32>,
    },
}

/// An unclassified point from the outline parser.
#[derive(Debug, Clone, Default)]
pub struct RawPoint {
    /// Stable identifier from the source document, if present.
    pub source_id: Option<String>,
    pub content: RawContent,
    pub bullet: Bullet,
    pub children: Vec<RawPoint>,
}

/// A header from the outline parser, with its top-level points.
#[derive(Debug, Clone, Default)]
pub struct RawHeader {
    pub source_id: Option<String>,
    pub text: String,
    /// Style level of the header. `None` for unstyled headers, which take
    /// part in iteration but not in the header hierarchy.
    pub level: Option<u32>,
    /// Source-application object link, used to hyperlink the context
    /// annotation back to the header.
    pub link: Option<String>,
    pub points: Vec<RawPoint>,
}

/// One parsed page: the input contract of the tree builder.
#[derive(Debug, Clone, Default)]
pub struct RawPage {
    pub title: String,
    /// Names of the pages above this one in the notebook, nearest first.
    pub ancestor_pages: Vec<String>,
    pub headers: Vec<RawHeader>,
}

/// A classified point with its navigational context.
#[derive(Debug, Clone)]
pub struct Point {
    pub source_id: Option<String>,
    pub kind: NodeKind,
    /// Raw payload: markup for text kinds, base64 for images.
    pub data: String,
    pub stem: String,
    pub body: String,
    pub indicators: Vec<char>,
    pub bullet: Bullet,
    pub children: Vec<PointId>,
    /// All points at this point's level, in document order, self included.
    pub siblings: Vec<PointId>,
    /// Parent points, nearest first.
    pub ancestors: Vec<PointId>,
    /// The header this point lives under.
    pub header: HeaderId,
}

impl Point {
    /// True when the point has no body text and no children. Such points
    /// carry nothing worth prompting for and are skipped in context rows.
    pub fn is_empty_childless(&self) -> bool {
        self.body.trim().is_empty() && self.children.is_empty()
    }
}

/// A header with its inherited page context.
#[derive(Debug, Clone)]
pub struct Header {
    pub source_id: Option<String>,
    pub text: String,
    pub page_title: String,
    pub level: Option<u32>,
    pub link: Option<String>,
    /// Hierarchically higher headers above this one, nearest first.
    pub ancestor_headers: Vec<HeaderId>,
    /// Names of the pages above this one in the notebook, nearest first.
    pub ancestor_pages: Vec<String>,
    /// Top-level points under this header.
    pub children: Vec<PointId>,
}

/// The classified node tree of one page.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    points: Vec<Point>,
    headers: Vec<Header>,
}

impl Tree {
    /// Classify every fragment of `page` and link the resulting nodes.
    pub fn build(page: RawPage, classifier: &Classifier) -> Tree {
        let mut tree = Tree::default();
        for raw_header in page.headers {
            let ancestor_headers = tree.header_ancestors(raw_header.level);
            let header_id = HeaderId(tree.headers.len());
            tree.headers.push(Header {
                source_id: raw_header.source_id,
                text: raw_header.text,
                page_title: page.title.clone(),
                level: raw_header.level,
                link: raw_header.link,
                ancestor_headers,
                ancestor_pages: page.ancestor_pages.clone(),
                children: Vec::new(),
            });
            let children = tree.add_points(raw_header.points, header_id, &[], classifier);
            tree.headers[header_id.0].children = children;
        }
        tree
    }

    /// The chain of already-built headers hierarchically above one at
    /// `level`: scan backward, keeping each header whose level is lower
    /// than any seen so far. Unstyled headers have no ancestry.
    fn header_ancestors(&self, level: Option<u32>) -> Vec<HeaderId> {
        let Some(mut current) = level else {
            return Vec::new();
        };
        let mut ancestors = Vec::new();
        for (index, header) in self.headers.iter().enumerate().rev() {
            if let Some(candidate) = header.level {
                if candidate < current {
                    current = candidate;
                    ancestors.push(HeaderId(index));
                }
            }
        }
        ancestors
    }

    fn add_points(
        &mut self,
        raw_points: Vec<RawPoint>,
        header: HeaderId,
        ancestors: &[PointId],
        classifier: &Classifier,
    ) -> Vec<PointId> {
        let mut ids = Vec::with_capacity(raw_points.len());
        let mut pending = Vec::with_capacity(raw_points.len());
        for raw in raw_points {
            let classification = classifier.classify(&raw.content);
            let id = PointId(self.points.len());
            self.points.push(Point {
                source_id: raw.source_id,
                kind: classification.kind,
                data: classification.data,
                stem: classification.stem,
                body: classification.body,
                indicators: classification.indicators,
                bullet: raw.bullet,
                children: Vec::new(),
                siblings: Vec::new(),
                ancestors: ancestors.to_vec(),
                header,
            });
            ids.push(id);
            pending.push((id, raw.children));
        }
        // Sibling context must be in place before descending: children may
        // be rendered in the same pass as their parent.
        for &id in &ids {
            self.points[id.0].siblings = ids.clone();
        }
        for (id, children) in pending {
            let mut child_ancestors = Vec::with_capacity(ancestors.len() + 1);
            child_ancestors.push(id);
            child_ancestors.extend_from_slice(ancestors);
            let child_ids = self.add_points(children, header, &child_ancestors, classifier);
            self.points[id.0].children = child_ids;
        }
        ids
    }

    pub fn point(&self, id: PointId) -> &Point {
        &self.points[id.0]
    }

    pub fn header(&self, id: HeaderId) -> &Header {
        &self.headers[id.0]
    }

    /// All headers with their ids, in document order.
    pub fn headers(&self) -> impl Iterator<Item = (HeaderId, &Header)> {
        self.headers
            .iter()
            .enumerate()
            .map(|(index, header)| (HeaderId(index), header))
    }

    /// Whether the point qualifies as a card entry point.
    pub fn is_entry_point(&self, id: PointId) -> bool {
        matches!(
            self.point(id).kind,
            NodeKind::Concept | NodeKind::Grouping
        )
    }
}
