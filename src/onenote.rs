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

//! Parser for OneNote page exports.
//!
//! A page export is one `Page` element: a `Title`, then one or more
//! `Outline` boxes whose first-level `OE` elements are the headers. Each
//! header's `OEChildren` holds the points, nested arbitrarily deep. Rich
//! text lives in `T` elements as CDATA-wrapped markup, images in
//! `Image/Data` as base64, and list numbering in `List/Number`.
//!
//! The optional notebook outline export lists every page with a `pageLevel`
//! attribute; the pages above the converted one are resolved from it by
//! scanning backward for strictly higher levels.

use log::warn;

use oncards_core::Bullet;
use oncards_core::Fallible;
use oncards_core::RawContent;
use oncards_core::RawHeader;
use oncards_core::RawPage;
use oncards_core::RawPoint;
use oncards_core::xml;
use oncards_core::xml::Element;

/// Quick style index of normal text. Headers styled with it (or not at
/// all) take part in iteration but not in the header hierarchy.
const UNSTYLED_HEADER_INDEX: u32 = 2;

/// Parse a page export, resolving ancestor pages against the notebook
/// outline export when one is given.
pub fn parse_page(page_xml: &str, outline_xml: Option<&str>) -> Fallible<RawPage> {
    let root = xml::parse(page_xml)?;
    let title = root
        .descend(&["Title", "OE", "T"])
        .map(|t| t.text.clone())
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| "Untitled".to_string());
    let ancestor_pages = match (outline_xml, root.attr("ID")) {
        (Some(outline), Some(id)) => ancestor_pages(outline, id)?,
        _ => Vec::new(),
    };
    let mut headers = Vec::new();
    for outline_box in root.children_named("Outline") {
        for children in outline_box.children_named("OEChildren") {
            for oe in children.children_named("OE") {
                if let Some(header) = parse_header(oe) {
                    headers.push(header);
                }
            }
        }
    }
    Ok(RawPage {
        title,
        ancestor_pages,
        headers,
    })
}

fn parse_header(oe: &Element) -> Option<RawHeader> {
    let text = oe.child("T").map(|t| t.text.clone())?;
    if text.trim().is_empty() {
        return None;
    }
    let level = oe
        .attr("quickStyleIndex")
        .and_then(|index| index.parse::<u32>().ok())
        .filter(|&index| index != UNSTYLED_HEADER_INDEX);
    let points = oe
        .child("OEChildren")
        .map(parse_points)
        .unwrap_or_default();
    Some(RawHeader {
        source_id: oe.attr("objectID").map(str::to_string),
        text,
        level,
        link: oe.attr("objectLink").map(str::to_string),
        points,
    })
}

fn parse_points(children: &Element) -> Vec<RawPoint> {
    children
        .children_named("OE")
        .map(|oe| RawPoint {
            source_id: oe.attr("objectID").map(str::to_string),
            content: content(oe),
            bullet: bullet(oe),
            children: oe
                .child("OEChildren")
                .map(parse_points)
                .unwrap_or_default(),
        })
        .collect()
}

fn content(oe: &Element) -> RawContent {
    if let Some(t) = oe.child("T") {
        if !t.text.is_empty() {
            return RawContent::Text(t.text.clone());
        }
    }
    if let Some(data) = oe.descend(&["Image", "Data"]) {
        if !data.text.trim().is_empty() {
            return RawContent::Image(data.text.trim().to_string());
        }
    }
    if let Some(table) = oe.child("Table") {
        if table.child("Row").is_some() {
            return RawContent::Table;
        }
    }
    RawContent::Empty
}

fn bullet(oe: &Element) -> Bullet {
    match oe.descend(&["List", "Number"]) {
        Some(number) => Bullet::Ordered {
            restart_at: number
                .attr("restartNumberingAt")
                .and_then(|value| value.parse().ok()),
        },
        None => Bullet::Unordered,
    }
}

/// Names of the pages above `page_id` in the notebook, nearest first:
/// scanning backward from the page, each page with a strictly higher
/// hierarchy position (lower `pageLevel`) than any seen so far is an
/// ancestor. Pages prefer their nickname over their name.
fn ancestor_pages(outline_xml: &str, page_id: &str) -> Fallible<Vec<String>> {
    let root = xml::parse(outline_xml)?;
    let mut pages = Vec::new();
    root.descendants_named("Page", &mut pages);
    let Some(index) = pages.iter().position(|page| page.attr("ID") == Some(page_id)) else {
        warn!("page {page_id} not found in the outline export");
        return Ok(Vec::new());
    };
    let mut current_level = page_level(pages[index]);
    let mut ancestors = Vec::new();
    for page in pages[..index].iter().rev() {
        let level = page_level(page);
        if level < current_level {
            current_level = level;
            if let Some(name) = page_name(page) {
                ancestors.push(name);
            }
        }
    }
    Ok(ancestors)
}

fn page_level(page: &Element) -> u32 {
    page.attr("pageLevel")
        .and_then(|level| level.parse().ok())
        .unwrap_or(1)
}

fn page_name(page: &Element) -> Option<String> {
    page.attr("nickname")
        .filter(|nickname| !nickname.is_empty())
        .or_else(|| page.attr("name"))
        .map(str::to_string)
}
