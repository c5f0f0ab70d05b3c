use std::collections::BTreeMap;

use ego_tree::NodeRef;
use scraper::node::Element;
use scraper::{Html, Node, Selector};
use sha2::{Digest, Sha256};
use sitewatch_logging::watch_warn;

/// Elements whose subtrees never contribute visible content or structure.
const STRIPPED_ELEMENTS: [&str; 2] = ["script", "style"];

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Comparable representation of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedPage {
    pub visible_text: String,
    pub structural_markup: String,
    pub metadata: BTreeMap<String, String>,
}

/// Reduces raw markup to the pieces change detection compares.
///
/// Script and style subtrees and comment nodes are dropped. Visible text is
/// the remaining text nodes, each trimmed, empties discarded, joined with
/// newlines. Metadata comes from `<meta>` tags carrying both a non-empty
/// `name` and a non-empty `content`. A selector scopes the whole extraction
/// to the first matching element; a selector that is invalid or matches
/// nothing falls back to the whole document. Deterministic: identical
/// markup in, identical fields out.
pub fn normalize(raw_markup: &str, selector: Option<&str>) -> NormalizedPage {
    let document = Html::parse_document(raw_markup);
    let mut walker = Walker::default();

    match scope_node(&document, selector) {
        Some(node) => walker.walk(node),
        None => walker.walk(document.tree.root()),
    }

    NormalizedPage {
        visible_text: walker.text_parts.join("\n"),
        structural_markup: walker.markup,
        metadata: walker.metadata,
    }
}

/// Hex SHA-256 of the raw markup; the cheap identity used to skip diffs.
pub fn content_hash(raw_markup: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_markup.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest.iter() {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

fn scope_node<'a>(document: &'a Html, selector: Option<&str>) -> Option<NodeRef<'a, Node>> {
    let raw = selector?;
    let parsed = match Selector::parse(raw) {
        Ok(parsed) => parsed,
        Err(err) => {
            watch_warn!("invalid selector {:?}, using whole document: {}", raw, err);
            return None;
        }
    };
    match document.select(&parsed).next() {
        Some(element) => Some(*element),
        None => {
            watch_warn!("selector {:?} matched nothing, using whole document", raw);
            None
        }
    }
}

#[derive(Default)]
struct Walker {
    markup: String,
    text_parts: Vec<String>,
    metadata: BTreeMap<String, String>,
}

impl Walker {
    fn walk(&mut self, node: NodeRef<'_, Node>) {
        match node.value() {
            Node::Document | Node::Fragment => {
                for child in node.children() {
                    self.walk(child);
                }
            }
            Node::Doctype(doctype) => {
                self.markup.push_str("<!DOCTYPE ");
                self.markup.push_str(doctype.name());
                self.markup.push('>');
            }
            Node::Comment(_) | Node::ProcessingInstruction(_) => {}
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    self.text_parts.push(trimmed.to_string());
                }
                push_escaped_text(&mut self.markup, text);
            }
            Node::Element(element) => {
                let name = element.name();
                if STRIPPED_ELEMENTS.contains(&name) {
                    return;
                }
                if name == "meta" {
                    self.collect_meta(element);
                }
                self.markup.push('<');
                self.markup.push_str(name);
                for (key, value) in element.attrs() {
                    self.markup.push(' ');
                    self.markup.push_str(key);
                    self.markup.push_str("=\"");
                    push_escaped_attr(&mut self.markup, value);
                    self.markup.push('"');
                }
                self.markup.push('>');
                if VOID_ELEMENTS.contains(&name) {
                    return;
                }
                for child in node.children() {
                    self.walk(child);
                }
                self.markup.push_str("</");
                self.markup.push_str(name);
                self.markup.push('>');
            }
        }
    }

    fn collect_meta(&mut self, element: &Element) {
        let (Some(name), Some(content)) = (element.attr("name"), element.attr("content")) else {
            return;
        };
        if name.is_empty() || content.is_empty() {
            return;
        }
        self.metadata.insert(name.to_string(), content.to_string());
    }
}

fn push_escaped_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn push_escaped_attr(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}
