use scraper::{Html, Node as HtmlNode};
use serde::Deserialize;

use crate::dom::document::{Document, NodeData, NodeId};

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// One entry of the session script's flat, pre-order snapshot.
///
/// `parent` indexes an earlier entry; `None` hangs the node off the
/// document. Elements carry live properties (`value`, `checked`,
/// `selected`) that plain serialized markup would not reflect. An entry
/// with `text` and no `tag` is a text node.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotNode {
    #[serde(default)]
    pub parent: Option<usize>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub attrs: Vec<(String, String)>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub selected: bool,
}

impl Document {
    /// Parse HTML text into a document snapshot.
    pub fn parse_html(html: &str) -> Document {
        let parsed = Html::parse_document(html);
        let mut doc = Document::new();

        let root = doc.root();
        let mut stack: Vec<_> = parsed
            .tree
            .root()
            .children()
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .map(|child| (child, root))
            .collect();

        while let Some((node, parent)) = stack.pop() {
            let created = match node.value() {
                HtmlNode::Element(el) => {
                    let attrs = el
                        .attrs()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect();
                    Some(doc.append_element(parent, el.name(), attrs))
                }
                HtmlNode::Text(text) => {
                    let content: &str = text;
                    doc.append_text(parent, content);
                    None
                }
                _ => None,
            };

            if let Some(id) = created {
                let children: Vec<_> = node.children().collect();
                stack.extend(children.into_iter().rev().map(|child| (child, id)));
            }
        }

        doc.sync_form_state();
        doc
    }

    /// Build a document from the session script's flat snapshot.
    ///
    /// Entries whose parent is missing, later in the list, or a text node
    /// are dropped along with their subtree.
    pub fn from_snapshot(nodes: &[SnapshotNode]) -> Document {
        let mut doc = Document::new();
        let mut created: Vec<Option<NodeId>> = Vec::with_capacity(nodes.len());

        for (index, node) in nodes.iter().enumerate() {
            let parent = match node.parent {
                None => Some(doc.root()),
                Some(p) if p < index => created[p].filter(|id| doc.element(*id).is_some()),
                Some(_) => None,
            };
            let Some(parent) = parent else {
                created.push(None);
                continue;
            };

            let id = match (&node.tag, &node.text) {
                (Some(tag), _) => {
                    let id = doc.append_element(parent, tag, node.attrs.clone());
                    if let Some(el) = doc.element_mut(id) {
                        if let Some(v) = &node.value {
                            el.value = v.clone();
                        }
                        el.checked = node.checked;
                        el.selected = node.selected;
                    }
                    Some(id)
                }
                (None, Some(text)) => Some(doc.append_text(parent, text)),
                (None, None) => None,
            };
            created.push(id);
        }

        doc
    }

    /// Serialize back to HTML with live form state written into attributes.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for child in self.children(self.root()) {
            self.write_node(*child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.data {
            NodeData::Document => {}
            NodeData::Text(text) => {
                let raw = self
                    .parent(id)
                    .and_then(|p| self.tag(p))
                    .is_some_and(|t| t == "script" || t == "style");
                if raw {
                    out.push_str(text);
                } else {
                    out.push_str(&escape_text(text));
                }
            }
            NodeData::Element(el) => {
                let tag = el.tag.as_str();
                out.push('<');
                out.push_str(tag);

                let is_checkable = tag == "input"
                    && matches!(el.attr("type"), Some("radio") | Some("checkbox"));
                let reflects_value = tag == "input" && !is_checkable;

                for (k, v) in &el.attrs {
                    let live_managed = (is_checkable && k == "checked")
                        || (reflects_value && k == "value")
                        || (tag == "option" && k == "selected");
                    if live_managed {
                        continue;
                    }
                    push_attr(out, k, v);
                }
                if reflects_value && (!el.value.is_empty() || el.has_attr("value")) {
                    push_attr(out, "value", &el.value);
                }
                if is_checkable && el.checked {
                    out.push_str(" checked");
                }
                if tag == "option" && el.selected {
                    out.push_str(" selected");
                }
                out.push('>');

                if VOID_ELEMENTS.contains(&tag) {
                    return;
                }
                if tag == "textarea" {
                    out.push_str(&escape_text(&el.value));
                } else {
                    for child in &node.children {
                        self.write_node(*child, out);
                    }
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_attr(value));
    out.push('"');
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}
