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

use oncards_core::Fallible;
use oncards_core::Tree;
use oncards_core::generate_cards;

use crate::config::Config;
use crate::media::DirectorySink;
use crate::onenote::parse_page;

/// Convert a page export into a JSON list of proto-notes, writing decoded
/// images into the media directory along the way.
pub fn convert_page(
    page: String,
    outline: Option<String>,
    media_dir: String,
    output: Option<String>,
    config: Option<String>,
    deck: Option<String>,
) -> Fallible<()> {
    let config = match config {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    let page_xml = read_to_string(&page)?;
    let outline_xml = match &outline {
        Some(path) => Some(read_to_string(path)?),
        None => None,
    };
    let raw_page = parse_page(&page_xml, outline_xml.as_deref())?;
    let tree = Tree::build(raw_page, &config.classifier());
    let mut media = DirectorySink::new(media_dir)?;
    let conversion = generate_cards(&tree, &mut media, &config.assembly(deck));
    info!(
        "generated {} notes, skipped {} entry points",
        conversion.notes.len(),
        conversion.warnings.len()
    );
    let json = serde_json::to_string_pretty(&conversion)?;
    match output {
        Some(path) => write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}
