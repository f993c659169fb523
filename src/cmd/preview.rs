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

use std::fs::read_to_string;
use std::fs::write;

use log::info;

use oncards_core::AssemblyOptions;
use oncards_core::Classifier;
use oncards_core::Conversion;
use oncards_core::Fallible;
use oncards_core::MemorySink;
use oncards_core::Tree;
use oncards_core::generate_cards;

use crate::onenote::parse_page;

/// Render every card of a page into one HTML document for eyeballing,
/// collecting images in memory instead of touching the media directory.
pub fn preview_page(page: String, outline: Option<String>, output: String) -> Fallible<()> {
    let page_xml = read_to_string(&page)?;
    let outline_xml = match &outline {
        Some(path) => Some(read_to_string(path)?),
        None => None,
    };
    let raw_page = parse_page(&page_xml, outline_xml.as_deref())?;
    let tree = Tree::build(raw_page, &Classifier::default());
    let mut media = MemorySink::default();
    let conversion = generate_cards(&tree, &mut media, &AssemblyOptions::default());
    write(&output, preview_html(&conversion))?;
    info!(
        "wrote a preview of {} cards to {output}",
        conversion.notes.len()
    );
    Ok(())
}

fn preview_html(conversion: &Conversion) -> String {
    let mut html = String::new();
    for (number, note) in conversion.notes.iter().enumerate() {
        html.push_str(&format!(
            "<br>Card no. {}:<br>\n{}<hr>\n{}<hr><hr><br>\n",
            number + 1,
            note.front,
            note.back
        ));
    }
    html
}
