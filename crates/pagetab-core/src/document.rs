//! Lightweight HTML handling for fetched documents.
//!
//! Cleaning keeps markup but strips active content. Rendering turns cleaned
//! markup into plain text with numbered link markers for the terminal.

use std::io;

use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use url::Url;

use crate::address;

/// Elements dropped together with their content.
const ACTIVE_ELEMENTS: [&str; 6] = ["script", "style", "iframe", "object", "embed", "noscript"];

/// Elements whose content never shows up as page text.
const HIDDEN_ELEMENTS: [&str; 3] = ["head", "template", "title"];

/// Elements rendered on lines of their own.
const BLOCK_ELEMENTS: [&str; 24] = [
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "tr", "ul", "ol", "dl", "dt",
    "dd", "table", "pre", "blockquote", "hr", "section", "article", "header", "footer", "nav",
];

/// A hyperlink found in a rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Absolute address, resolved against the document's address
    pub address: String,
    pub label: String,
}

/// Plain text ready for display. Link `n` (zero based) appears in the text as
/// its label followed by `[n+1]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedPage {
    pub text: String,
    pub links: Vec<Link>,
}

fn parse(html: &str) -> RcDom {
    parse_document(RcDom::default(), ParseOpts::default()).one(html)
}

fn element_name(node: &Handle) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}

fn attribute(node: &Handle, key: &str) -> Option<String> {
    let NodeData::Element { attrs, .. } = &node.data else {
        return None;
    };
    attrs
        .borrow()
        .iter()
        .find(|attr| &*attr.name.local == key)
        .map(|attr| attr.value.to_string())
}

fn find_element(node: &Handle, tag: &str) -> Option<Handle> {
    if element_name(node) == Some(tag) {
        return Some(node.clone());
    }
    node.children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, tag))
}

fn collect_text(node: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &node.data {
        out.push_str(&contents.borrow());
        return;
    }
    for child in node.children.borrow().iter() {
        collect_text(child, out);
    }
}

/// Text of the first `<title>` element, whitespace-collapsed.
pub fn extract_title(html: &str) -> Option<String> {
    let dom = parse(html);
    let node = find_element(&dom.document, "title")?;
    let mut raw = String::new();
    collect_text(&node, &mut raw);
    let title = collapse_whitespace(&raw);
    (!title.is_empty()).then_some(title)
}

/// Remove comments, scripting and embedded objects, and `on*` handler
/// attributes. Everything else is serialized back as parsed.
pub fn clean(html: &str) -> io::Result<String> {
    let dom = parse(html);
    strip_active(&dom.document);

    let mut bytes = Vec::new();
    let document: SerializableHandle = dom.document.clone().into();
    serialize(&mut bytes, &document, SerializeOpts::default())?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn strip_active(node: &Handle) {
    node.children.borrow_mut().retain(|child| match &child.data {
        NodeData::Comment { .. } => false,
        NodeData::Element { name, .. } => !ACTIVE_ELEMENTS.contains(&&*name.local),
        _ => true,
    });
    if let NodeData::Element { attrs, .. } = &node.data {
        attrs
            .borrow_mut()
            .retain(|attr| !attr.name.local.starts_with("on"));
    }
    for child in node.children.borrow().iter() {
        strip_active(child);
    }
}

/// Links in document order, resolved against `base`. Fragment-only and
/// `javascript:` targets are skipped.
pub fn extract_links(html: &str, base: &str) -> Vec<Link> {
    let dom = parse(html);
    let mut links = Vec::new();
    collect_links(&dom.document, base, &mut links);
    links
}

fn collect_links(node: &Handle, base: &str, links: &mut Vec<Link>) {
    if element_name(node) == Some("a") {
        if let Some(link) = anchor_link(node, base) {
            links.push(link);
            return;
        }
    }
    for child in node.children.borrow().iter() {
        collect_links(child, base, links);
    }
}

fn anchor_link(node: &Handle, base: &str) -> Option<Link> {
    let href = attribute(node, "href")?;
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.to_ascii_lowercase().starts_with("javascript:")
    {
        return None;
    }
    let mut raw = String::new();
    collect_text(node, &mut raw);
    let label = collapse_whitespace(&raw);
    let address = resolve(base, href);
    let label = if label.is_empty() { address.clone() } else { label };
    Some(Link { address, label })
}

/// Resolve `href` relative to the document at `base`. Absolute targets come
/// back unchanged.
pub fn resolve(base: &str, href: &str) -> String {
    let drive_path = address::is_local(href) && !href.starts_with('/');
    if drive_path || Url::parse(href).is_ok() {
        return href.to_string();
    }
    if address::is_remote(base) || base.starts_with("file:") {
        if let Ok(joined) = Url::parse(base).and_then(|url| url.join(href)) {
            return joined.into();
        }
    }
    resolve_path(base, href)
}

/// Plain filesystem paths have no URL form to join against.
fn resolve_path(base: &str, href: &str) -> String {
    if href.starts_with(['/', '\\']) {
        return href.to_string();
    }
    match base.rfind(['/', '\\']) {
        Some(i) => format!("{}{href}", &base[..=i]),
        None => href.to_string(),
    }
}

/// Plain text of a cleaned document with numbered link markers.
pub fn render(html: &str, base: &str) -> RenderedPage {
    let dom = parse(html);
    let mut renderer = TextRenderer {
        base,
        text: String::new(),
        links: Vec::new(),
    };
    renderer.walk(&dom.document);
    RenderedPage {
        text: tidy_lines(&renderer.text),
        links: renderer.links,
    }
}

struct TextRenderer<'a> {
    base: &'a str,
    text: String,
    links: Vec<Link>,
}

impl TextRenderer<'_> {
    fn walk(&mut self, node: &Handle) {
        match &node.data {
            NodeData::Text { contents } => {
                // Source line breaks are plain whitespace; blocks make lines.
                let contents = contents.borrow();
                self.text
                    .extend(contents.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
            }
            NodeData::Element { name, .. } => {
                let tag: &str = &name.local;
                if HIDDEN_ELEMENTS.contains(&tag) || ACTIVE_ELEMENTS.contains(&tag) {
                    return;
                }
                if tag == "br" {
                    self.text.push('\n');
                    return;
                }
                if tag == "a" {
                    if let Some(link) = anchor_link(node, self.base) {
                        self.text
                            .push_str(&format!("{}[{}]", link.label, self.links.len() + 1));
                        self.links.push(link);
                        return;
                    }
                }
                let block = BLOCK_ELEMENTS.contains(&tag);
                if block {
                    self.text.push('\n');
                }
                self.walk_children(node);
                if block {
                    self.text.push('\n');
                }
            }
            _ => self.walk_children(node),
        }
    }

    fn walk_children(&mut self, node: &Handle) {
        for child in node.children.borrow().iter() {
            self.walk(child);
        }
    }
}

/// Collapse spaces within lines, trim them, and keep at most one blank line
/// between paragraphs.
fn tidy_lines(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for line in text.lines().map(collapse_whitespace) {
        let blank = line.is_empty();
        let previous_blank = lines.last().map_or(true, |last| last.is_empty());
        if blank && previous_blank {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
