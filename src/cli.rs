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

use clap::Parser;

use oncards_core::Fallible;

use crate::cmd::convert::convert_page;
use crate::cmd::preview::preview_page;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Convert a page export into flashcard notes.
    Convert {
        /// Path to the page XML export.
        page: String,
        /// Path to the notebook outline XML export, used to resolve the page hierarchy.
        #[arg(long)]
        outline: Option<String>,
        /// Directory to write decoded images into. Default is `media`.
        #[arg(long, default_value = "media")]
        media_dir: String,
        /// Optional path to the output JSON file. By default, the output is printed to stdout.
        #[arg(long)]
        output: Option<String>,
        /// Path to a TOML configuration file.
        #[arg(long)]
        config: Option<String>,
        /// Deck to assign generated notes to, overriding the page hierarchy.
        #[arg(long)]
        deck: Option<String>,
    },
    /// Render all cards of a page into a single HTML document for inspection.
    Preview {
        /// Path to the page XML export.
        page: String,
        /// Path to the notebook outline XML export, used to resolve the page hierarchy.
        #[arg(long)]
        outline: Option<String>,
        /// Path to the output HTML file. Default is `cards_preview.html`.
        #[arg(long, default_value = "cards_preview.html")]
        output: String,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Convert {
            page,
            outline,
            media_dir,
            output,
            config,
            deck,
        } => convert_page(page, outline, media_dir, output, config, deck),
        Command::Preview {
            page,
            outline,
            output,
        } => preview_page(page, outline, output),
    }
}
