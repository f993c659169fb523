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

use crate::error::Fallible;

/// Where the renderer puts decoded images. The CLI writes them into the
/// flashcard application's media directory; previews collect them in memory.
pub trait MediaSink {
    fn write_image(&mut self, name: &str, bytes: &[u8]) -> Fallible<()>;
}

/// A sink that keeps images in memory, for previews and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub images: Vec<(String, Vec<u8>)>,
}

impl MediaSink for MemorySink {
    fn write_image(&mut self, name: &str, bytes: &[u8]) -> Fallible<()> {
        self.images.push((name.to_string(), bytes.to_vec()));
        Ok(())
    }
}
