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

use serde::Deserialize;

use oncards_core::AssemblyOptions;
use oncards_core::Classifier;
use oncards_core::ErrorReport;
use oncards_core::Fallible;

/// Converter configuration, read from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Deck for generated notes, overriding the page hierarchy.
    pub deck: Option<String>,
    /// Tags attached to every generated note.
    pub tags: Option<Vec<String>>,
    /// Whether a visually blank fragment needs the conditional-comment
    /// marker, besides the MathML namespace, to classify as an equation.
    pub require_equation_marker: Option<bool>,
}

impl Config {
    pub fn load(path: &str) -> Fallible<Config> {
        let text = read_to_string(path)?;
        toml::from_str(&text).map_err(|e| ErrorReport::new(format!("config error: {e}")))
    }

    pub fn classifier(&self) -> Classifier {
        let mut classifier = Classifier::default();
        if let Some(require) = self.require_equation_marker {
            classifier.require_equation_marker = require;
        }
        classifier
    }

    /// Assembly options, with a command-line deck taking precedence over
    /// the configured one.
    pub fn assembly(&self, deck_override: Option<String>) -> AssemblyOptions {
        let mut options = AssemblyOptions::default();
        options.deck = deck_override.or_else(|| self.deck.clone());
        if let Some(tags) = &self.tags {
            options.tags = tags.clone();
        }
        options
    }
}
