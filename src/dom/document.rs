use serde::{Deserialize, Serialize};

/// Index of a node inside one `Document` snapshot.
///
/// Only valid for the snapshot it came from; a fresh snapshot must be
/// taken (and the node re-resolved) after any page mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Element-child indices from the document root down to one element.
///
/// This is how a resolved control is addressed across the Rust/browser
/// boundary: `document.children[p0].children[p1]...` on the JS side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementPath(pub Vec<usize>);

impl std::fmt::Display for ElementPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "/{}", parts.join("/"))
    }
}

#[derive(Debug, Clone)]
pub(crate) enum NodeData {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) data: NodeData,
}

/// An element plus the live form state a browser would hold for it.
#[derive(Debug, Clone)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub value: String,
    pub checked: bool,
    pub selected: bool,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(k, _)| k == name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }
}

/// Elements whose text never counts as rendered label text.
const NON_LABEL_TEXT_TAGS: [&str; 5] = ["script", "style", "select", "option", "textarea"];

/// Arena-backed document snapshot.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn push(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            data,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Append an element. Live state starts from the markup attributes.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: Vec<(String, String)>,
    ) -> NodeId {
        let value = attrs
            .iter()
            .find(|(k, _)| k == "value")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        let checked = attrs.iter().any(|(k, _)| k == "checked");
        let selected = attrs.iter().any(|(k, _)| k == "selected");
        self.push(
            parent,
            NodeData::Element(Element {
                tag: tag.to_ascii_lowercase(),
                attrs,
                value,
                checked,
                selected,
            }),
        )
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(parent, NodeData::Text(text.to_string()))
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.node(id)?.data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(id.0)?.data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.data {
            NodeData::Text(t) => Some(t.as_str()),
            _ => None,
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id) == Some(tag)
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attr(name)
    }

    /// Attribute value, trimmed, `None` when absent or blank.
    pub fn non_empty_attr(&self, id: NodeId, name: &str) -> Option<String> {
        self.attr(id, name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id)
            .is_some_and(|el| el.classes().any(|c| c == class))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.element(*c).is_some())
    }

    /// Ancestors from the parent upwards, excluding the document node.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |n| self.parent(*n))
            .filter(move |n| self.element(*n).is_some())
    }

    /// Element descendants of `root` in document order (pre-order), excluding `root`.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self.element(id).is_some() {
                out.push(id);
            }
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Every element in document order.
    pub fn elements(&self) -> Vec<NodeId> {
        self.descendants(self.root())
    }

    /// Element siblings before `id`, nearest first.
    pub fn previous_element_siblings(&self, id: NodeId) -> Vec<NodeId> {
        let Some(parent) = self.parent(id) else {
            return Vec::new();
        };
        self.children(parent)
            .iter()
            .copied()
            .take_while(|c| *c != id)
            .filter(|c| self.element(*c).is_some())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect()
    }

    pub fn by_id(&self, id_attr: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|n| self.attr(*n, "id") == Some(id_attr))
    }

    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    /// Rendered text of a subtree, skipping form-control and script content.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.data {
            NodeData::Text(t) => out.push_str(t),
            NodeData::Element(el) if NON_LABEL_TEXT_TAGS.contains(&el.tag.as_str()) => {}
            _ => {
                for child in &node.children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// Raw text of a subtree including option/textarea content.
    pub fn raw_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            if let Some(t) = self.text(n) {
                out.push_str(t);
            }
            stack.extend(self.children(n).iter().rev().copied());
        }
        out
    }

    // ------------------------------------------------------------------
    // Live form state
    // ------------------------------------------------------------------

    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.value.as_str())
    }

    pub fn is_checked(&self, id: NodeId) -> bool {
        self.element(id).is_some_and(|el| el.checked)
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.element(id).is_some_and(|el| el.selected)
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) -> bool {
        match self.element_mut(id) {
            Some(el) => {
                el.value = value.to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_checked(&mut self, id: NodeId, checked: bool) -> bool {
        match self.element_mut(id) {
            Some(el) => {
                el.checked = checked;
                true
            }
            None => false,
        }
    }

    /// `option` descendants of a select, in order.
    pub fn options_of(&self, select: NodeId) -> Vec<NodeId> {
        self.descendants(select)
            .into_iter()
            .filter(|n| self.is_tag(*n, "option"))
            .collect()
    }

    /// Option label as a browser reports it: whitespace runs collapse to
    /// one space, ends trimmed.
    pub fn option_text(&self, option: NodeId) -> String {
        self.raw_text(option)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Value an option submits: its `value` attribute, else its text.
    pub fn option_value(&self, option: NodeId) -> String {
        match self.attr(option, "value") {
            Some(v) => v.to_string(),
            None => self.option_text(option),
        }
    }

    /// Select the option whose rendered text equals `text`.
    /// Returns false when no option matches.
    pub fn select_option_by_text(&mut self, select: NodeId, text: &str) -> bool {
        let options = self.options_of(select);
        let Some(target) = options.iter().copied().find(|o| self.option_text(*o) == text) else {
            return false;
        };
        let value = self.option_value(target);
        for option in options {
            if let Some(el) = self.element_mut(option) {
                el.selected = option == target;
            }
        }
        self.set_value(select, &value)
    }

    /// Make select/textarea live values consistent with their markup.
    pub(crate) fn sync_form_state(&mut self) {
        for id in self.elements() {
            match self.tag(id) {
                Some("textarea") => {
                    let text = self.raw_text(id);
                    let text = text.strip_prefix('\n').unwrap_or(&text).to_string();
                    self.set_value(id, &text);
                }
                Some("select") => {
                    let options = self.options_of(id);
                    let chosen = options
                        .iter()
                        .copied()
                        .find(|o| self.is_selected(*o))
                        .or_else(|| options.first().copied());
                    if let Some(option) = chosen {
                        let value = self.option_value(option);
                        if let Some(el) = self.element_mut(option) {
                            el.selected = true;
                        }
                        self.set_value(id, &value);
                    }
                }
                _ => {}
            }
        }
    }

    // ------------------------------------------------------------------
    // Addressing
    // ------------------------------------------------------------------

    pub fn path_of(&self, id: NodeId) -> Option<ElementPath> {
        self.element(id)?;
        let mut path = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            let index = self.element_children(parent).position(|c| c == current)?;
            path.push(index);
            current = parent;
        }
        path.reverse();
        Some(ElementPath(path))
    }

    pub fn resolve(&self, path: &ElementPath) -> Option<NodeId> {
        let mut current = self.root();
        for index in &path.0 {
            current = self.element_children(current).nth(*index)?;
        }
        self.element(current).map(|_| current)
    }
}
