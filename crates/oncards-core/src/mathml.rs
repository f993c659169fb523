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

//! MathML to TeX conversion.
//!
//! The source application embeds formulas as MathML wrapped in a
//! `<!--[if mathML]>` conditional comment. Each such block is parsed and
//! walked into a TeX string, delimited for the flashcard application's math
//! renderer: `\(..\)` for inline math, `\[..\]` for standalone formulas.
//! A block that fails to parse is left untouched.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::xml;
use crate::xml::Element;

static MATH_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--\[if mathML\]>.*?<!\[endif\]-->").expect("invalid regex"));

const BLOCK_PREFIX: &str = "<!--[if mathML]>";
const BLOCK_SUFFIX: &str = "<![endif]-->";

/// How a converted formula is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathMode {
    /// Math flowing within text: `\(..\)`.
    Inline,
    /// A standalone formula: `\[..\]`.
    Display,
}

/// Replace every MathML block in `text` with its TeX rendering.
pub fn convert_math(text: &str, mode: MathMode) -> String {
    let mut out = text.to_string();
    for found in MATH_BLOCK.find_iter(text) {
        let block = found.as_str();
        let inner = block
            .strip_prefix(BLOCK_PREFIX)
            .and_then(|s| s.strip_suffix(BLOCK_SUFFIX))
            .unwrap_or(block);
        // The export namespaces every tag with an mml prefix; strip it so
        // the walker sees bare MathML names.
        let cleaned = inner
            .replace("mml:", "")
            .replace(":mml", "")
            .replace("&nbsp;", " ");
        match xml::parse(cleaned.trim()) {
            Ok(root) => {
                let tex = walk(&root);
                let wrapped = match mode {
                    MathMode::Inline => format!("\\({tex}\\)"),
                    MathMode::Display => format!("\\[{tex}\\]"),
                };
                out = out.replacen(block, &wrapped, 1);
            }
            Err(e) => {
                debug!("leaving unparseable MathML block as-is: {e}");
            }
        }
    }
    out
}

fn walk(element: &Element) -> String {
    match element.name.as_str() {
        "math" | "mrow" | "mstyle" | "semantics" | "mpadded" | "mphantom" => children(element),
        "mi" | "mn" => element.text.trim().to_string(),
        "mo" => operator(element.text.trim()),
        "mtext" => format!("\\text{{{}}}", element.text),
        "mspace" => "\\ ".to_string(),
        "mfrac" => format!("\\frac{{{}}}{{{}}}", nth(element, 0), nth(element, 1)),
        "msqrt" => format!("\\sqrt{{{}}}", children(element)),
        "mroot" => format!("\\sqrt[{}]{{{}}}", nth(element, 1), nth(element, 0)),
        "msup" => format!("{{{}}}^{{{}}}", nth(element, 0), nth(element, 1)),
        "msub" => format!("{{{}}}_{{{}}}", nth(element, 0), nth(element, 1)),
        "msubsup" => format!(
            "{{{}}}_{{{}}}^{{{}}}",
            nth(element, 0),
            nth(element, 1),
            nth(element, 2)
        ),
        "mover" => format!("\\overset{{{}}}{{{}}}", nth(element, 1), nth(element, 0)),
        "munder" => format!("\\underset{{{}}}{{{}}}", nth(element, 1), nth(element, 0)),
        "mfenced" => {
            let inner: Vec<String> = element.children.iter().map(walk).collect();
            format!("\\left({}\\right)", inner.join(", "))
        }
        "mtable" => {
            let rows: Vec<String> = element.children.iter().map(walk).collect();
            format!("\\begin{{matrix}}{}\\end{{matrix}}", rows.join(" \\\\ "))
        }
        "mtr" => {
            let cells: Vec<String> = element.children.iter().map(walk).collect();
            cells.join(" & ")
        }
        "mtd" => children(element),
        // Parallel markup annotations carry the original source form.
        "annotation" | "annotation-xml" => String::new(),
        _ => children(element),
    }
}

fn children(element: &Element) -> String {
    element.children.iter().map(walk).collect()
}

fn nth(element: &Element, index: usize) -> String {
    element.children.get(index).map(walk).unwrap_or_default()
}

fn operator(symbol: &str) -> String {
    match symbol {
        "\u{d7}" => " \\times ".to_string(),
        "\u{f7}" => " \\div ".to_string(),
        "\u{b1}" => " \\pm ".to_string(),
        "\u{22c5}" | "\u{b7}" => " \\cdot ".to_string(),
        "\u{2264}" => " \\le ".to_string(),
        "\u{2265}" => " \\ge ".to_string(),
        "\u{2260}" => " \\ne ".to_string(),
        "\u{2248}" => " \\approx ".to_string(),
        "\u{2192}" => " \\rightarrow ".to_string(),
        "\u{221e}" => "\\infty ".to_string(),
        "\u{2211}" => "\\sum ".to_string(),
        "\u{220f}" => "\\prod ".to_string(),
        "\u{222b}" => "\\int ".to_string(),
        "\u{2202}" => "\\partial ".to_string(),
        // Invisible function application, times, and separator.
        "\u{2061}" | "\u{2062}" | "\u{2063}" => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(mathml: &str) -> String {
        format!("<!--[if mathML]>{mathml}<![endif]-->")
    }

    #[test]
    fn test_fraction_with_namespace_prefixes() {
        let mathml = block(concat!(
            "<mml:math xmlns:mml=\"http://www.w3.org/1998/Math/MathML\">",
            "<mml:mfrac><mml:mi>x</mml:mi><mml:mn>2</mml:mn></mml:mfrac>",
            "</mml:math>"
        ));
        assert_eq!(convert_math(&mathml, MathMode::Inline), "\\(\\frac{x}{2}\\)");
    }

    #[test]
    fn test_display_mode() {
        let mathml = block("<math><msup><mi>e</mi><mi>x</mi></msup></math>");
        assert_eq!(convert_math(&mathml, MathMode::Display), "\\[{e}^{x}\\]");
    }

    #[test]
    fn test_operator_mapping() {
        let mathml = block("<math><mn>2</mn><mo>\u{d7}</mo><mn>3</mn></math>");
        assert_eq!(convert_math(&mathml, MathMode::Inline), "\\(2 \\times 3\\)");
    }

    #[test]
    fn test_plain_operators_pass_through() {
        let mathml = block("<math><mi>a</mi><mo>+</mo><mi>b</mi><mo>=</mo><mi>c</mi></math>");
        assert_eq!(convert_math(&mathml, MathMode::Inline), "\\(a+b=c\\)");
    }

    #[test]
    fn test_sqrt_and_sub() {
        let mathml = block("<math><msqrt><msub><mi>x</mi><mn>1</mn></msub></msqrt></math>");
        assert_eq!(
            convert_math(&mathml, MathMode::Inline),
            "\\(\\sqrt{{x}_{1}}\\)"
        );
    }

    /// Surrounding text survives; only the block is replaced.
    #[test]
    fn test_inline_replacement() {
        let text = format!("area is {} here", block("<math><mi>A</mi></math>"));
        assert_eq!(
            convert_math(&text, MathMode::Inline),
            "area is \\(A\\) here"
        );
    }

    #[test]
    fn test_text_without_math_unchanged() {
        assert_eq!(convert_math("no formulas", MathMode::Inline), "no formulas");
    }

    /// Unparseable blocks stay verbatim instead of failing the render.
    #[test]
    fn test_malformed_block_left_alone() {
        let broken = block("<math><mi>x</math>");
        assert_eq!(convert_math(&broken, MathMode::Inline), broken);
    }
}
