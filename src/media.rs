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

use std::fs;
use std::path::PathBuf;

use log::warn;

use oncards_core::Fallible;
use oncards_core::MediaSink;

/// Writes decoded images into a directory, typically the flashcard
/// application's media collection.
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    /// Create the sink, and the directory if it is missing.
    pub fn new(root: impl Into<PathBuf>) -> Fallible<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(DirectorySink { root })
    }
}

impl MediaSink for DirectorySink {
    fn write_image(&mut self, name: &str, bytes: &[u8]) -> Fallible<()> {
        let path = self.root.join(name);
        // Names repeat across entry points; last write wins, as in the
        // source application's own exports.
        if path.exists() {
            warn!("overwriting media file {}", path.display());
        }
        fs::write(path, bytes)?;
        Ok(())
    }
}
