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

//! oncards-core: Convert hierarchical outline exports into flashcards.
//!
//! This library provides the conversion pipeline:
//! - Classifying raw content fragments into typed nodes
//! - Building the linked node tree of a page
//! - Rendering front/back HTML per card entry point
//! - Assembling rendered cards into deck-tagged proto-notes
//! - MathML to TeX conversion for embedded formulas

pub mod cards;
pub mod classify;
pub mod error;
pub mod mathml;
pub mod media;
pub mod render;
pub mod tree;
pub mod xml;

// Re-exports for convenience
pub use cards::{AssemblyOptions, Conversion, ProtoNote, RenderWarning, generate_cards};
pub use classify::{Classification, Classifier, NodeKind, RawContent};
pub use error::{ErrorReport, Fallible, fail};
pub use media::{MediaSink, MemorySink};
pub use render::{RenderedCard, Renderer};
pub use tree::{Bullet, Header, HeaderId, Point, PointId, RawHeader, RawPage, RawPoint, Tree};
