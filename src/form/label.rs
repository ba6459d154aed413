//! Label inference for single controls and control groups.
//!
//! Both entry points are pure functions of the document snapshot: the same
//! control in an unchanged document always yields the same text, which is
//! what lets the application pass find a control again from its label.

use crate::dom::controls::accepts_placeholder;
use crate::dom::document::{Document, NodeId};

/// Returned when no strategy produced a label. Not a real field name;
/// several unlabeled controls will all collide on it.
pub const UNKNOWN_FIELD: &str = "Unknown field";

/// Marker fragment for "question" classes in the sibling walk.
const QUESTION_MARKER: &str = "question";

const HEADING_TAGS: [&str; 7] = ["legend", "h1", "h2", "h3", "h4", "h5", "h6"];

/// Framework title classes treated as headings.
const HEADING_CLASSES: [&str; 4] = [
    "question-title",
    "freebirdFormviewerComponentsQuestionBaseTitle",
    "M7eMe",
    "form-label-heading",
];

/// Trimmed rendered text of a node, `None` when blank.
pub fn text_of(doc: &Document, id: NodeId) -> Option<String> {
    let text = doc.text_content(id);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Infer a label for one control.
///
/// Strategies, first success wins:
/// 1. `label[for=<id>]`, then `aria-labelledby`
/// 2. an ancestor `label`
/// 3. nearest preceding sibling that is a `label` or carries a question class
/// 4. `aria-label`
/// 5. `placeholder` (text inputs only)
/// 6. [`UNKNOWN_FIELD`]
pub fn infer_label(doc: &Document, control: NodeId) -> String {
    explicit_label(doc, control)
        .or_else(|| wrapping_label(doc, control))
        .or_else(|| preceding_sibling_label(doc, control))
        .or_else(|| doc.non_empty_attr(control, "aria-label"))
        .or_else(|| placeholder_label(doc, control))
        .unwrap_or_else(|| UNKNOWN_FIELD.to_string())
}

/// Infer a label for a whole group: a structural group or heading ancestor
/// first, then the single-control chain on `control`.
pub fn infer_group_label(doc: &Document, control: NodeId) -> String {
    structural_group_label(doc, control).unwrap_or_else(|| infer_label(doc, control))
}

/// Effective text of a radio or checkbox option.
///
/// Explicit or wrapping label, `aria-label`, the text right after the
/// control, then its `value` attribute.
pub fn choice_text(doc: &Document, control: NodeId) -> String {
    explicit_label(doc, control)
        .or_else(|| wrapping_label(doc, control))
        .or_else(|| doc.non_empty_attr(control, "aria-label"))
        .or_else(|| following_text(doc, control))
        .or_else(|| doc.non_empty_attr(control, "value"))
        .unwrap_or_else(|| UNKNOWN_FIELD.to_string())
}

/// First heading-like descendant's text within `root`.
pub fn heading_within(doc: &Document, root: NodeId) -> Option<String> {
    doc.descendants(root)
        .into_iter()
        .filter(|id| is_heading(doc, *id))
        .find_map(|id| text_of(doc, id))
}

/// `aria-label`, else the text `aria-labelledby` points at.
pub fn aria_name(doc: &Document, id: NodeId) -> Option<String> {
    doc.non_empty_attr(id, "aria-label")
        .or_else(|| labelledby_text(doc, id))
}

pub fn is_heading(doc: &Document, id: NodeId) -> bool {
    let Some(el) = doc.element(id) else {
        return false;
    };
    HEADING_TAGS.contains(&el.tag.as_str())
        || el.attr("role") == Some("heading")
        || el.classes().any(|c| HEADING_CLASSES.contains(&c))
}

// ----------------------------------------------------------------------------
// Strategies
// ----------------------------------------------------------------------------

fn explicit_label(doc: &Document, control: NodeId) -> Option<String> {
    if let Some(id) = doc.non_empty_attr(control, "id") {
        let by_for = doc
            .elements()
            .into_iter()
            .filter(|n| doc.is_tag(*n, "label") && doc.attr(*n, "for") == Some(id.as_str()))
            .find_map(|n| text_of(doc, n));
        if by_for.is_some() {
            return by_for;
        }
    }
    labelledby_text(doc, control)
}

fn labelledby_text(doc: &Document, id: NodeId) -> Option<String> {
    let refs = doc.attr(id, "aria-labelledby")?;
    let parts: Vec<String> = refs
        .split_whitespace()
        .filter_map(|r| doc.by_id(r))
        .filter_map(|n| text_of(doc, n))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

fn wrapping_label(doc: &Document, control: NodeId) -> Option<String> {
    doc.ancestors(control)
        .find(|a| doc.is_tag(*a, "label"))
        .and_then(|label| text_of(doc, label))
}

fn preceding_sibling_label(doc: &Document, control: NodeId) -> Option<String> {
    let marker = doc
        .previous_element_siblings(control)
        .into_iter()
        .find(|s| doc.is_tag(*s, "label") || has_question_marker(doc, *s))?;
    text_of(doc, marker)
}

fn has_question_marker(doc: &Document, id: NodeId) -> bool {
    doc.element(id).is_some_and(|el| {
        el.classes()
            .any(|c| c.to_ascii_lowercase().contains(QUESTION_MARKER))
    })
}

fn placeholder_label(doc: &Document, control: NodeId) -> Option<String> {
    if accepts_placeholder(doc, control) {
        doc.non_empty_attr(control, "placeholder")
    } else {
        None
    }
}

/// Text directly following a control inside its parent, up to the next
/// element that is not inline text wrapping (`span`, `label`, `b`, ...).
fn following_text(doc: &Document, control: NodeId) -> Option<String> {
    let parent = doc.parent(control)?;
    let siblings = doc.children(parent);
    let start = siblings.iter().position(|c| *c == control)? + 1;

    for sib in &siblings[start..] {
        if let Some(t) = doc.text(*sib) {
            let t = t.trim();
            if !t.is_empty() {
                return Some(t.to_string());
            }
            continue;
        }
        return match doc.tag(*sib) {
            Some("span" | "label" | "b" | "strong" | "em" | "i") => text_of(doc, *sib),
            _ => None,
        };
    }
    None
}

/// Label from the nearest structural group ancestor: a fieldset legend, or
/// a grouping role's accessible name or heading.
fn structural_group_label(doc: &Document, control: NodeId) -> Option<String> {
    for ancestor in doc.ancestors(control) {
        let tag = doc.tag(ancestor).unwrap_or("");
        if matches!(tag, "form" | "body") {
            break;
        }

        if tag == "fieldset" {
            let legend = doc
                .element_children(ancestor)
                .find(|c| doc.is_tag(*c, "legend"))
                .and_then(|l| text_of(doc, l));
            if legend.is_some() {
                return legend;
            }
        }

        if matches!(doc.attr(ancestor, "role"), Some("group" | "radiogroup")) {
            let named = aria_name(doc, ancestor).or_else(|| heading_within(doc, ancestor));
            if named.is_some() {
                return named;
            }
        }
    }
    None
}
