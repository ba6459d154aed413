use crate::dom::document::{Document, NodeId};

/// Native kind of a fillable control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    SingleLineText,
    MultiLineText,
    Radio,
    Checkbox,
    Select,
}

impl ControlKind {
    pub fn is_text(self) -> bool {
        matches!(self, ControlKind::SingleLineText | ControlKind::MultiLineText)
    }
}

/// Classify an element as a fillable control, or `None` if it is not one.
pub fn classify_control(doc: &Document, id: NodeId) -> Option<ControlKind> {
    let el = doc.element(id)?;
    if el.has_attr("disabled") {
        return None;
    }

    match el.tag.as_str() {
        "textarea" => Some(ControlKind::MultiLineText),
        "select" => Some(ControlKind::Select),
        "input" => match el.attr("type").map(str::to_ascii_lowercase).as_deref() {
            // Textual inputs
            None
            | Some("")
            | Some("text")
            | Some("email")
            | Some("password")
            | Some("search")
            | Some("number")
            | Some("tel")
            | Some("url")
            | Some("date")
            | Some("time")
            | Some("datetime-local")
            | Some("month")
            | Some("week") => Some(ControlKind::SingleLineText),

            // Choice inputs
            Some("radio") => Some(ControlKind::Radio),
            Some("checkbox") => Some(ControlKind::Checkbox),

            // hidden, submit, button, reset, image, file, range, color, ...
            _ => None,
        },
        _ => None,
    }
}

/// Input types for which a placeholder may stand in as a label.
pub fn accepts_placeholder(doc: &Document, id: NodeId) -> bool {
    classify_control(doc, id).is_some_and(ControlKind::is_text)
}

/// All controls of one kind, in document order.
pub fn controls_of(doc: &Document, kind: ControlKind) -> Vec<NodeId> {
    doc.elements()
        .into_iter()
        .filter(|id| classify_control(doc, *id) == Some(kind))
        .collect()
}

/// All text-capable controls (single- and multi-line), in document order.
pub fn text_controls(doc: &Document) -> Vec<NodeId> {
    doc.elements()
        .into_iter()
        .filter(|id| classify_control(doc, *id).is_some_and(ControlKind::is_text))
        .collect()
}

/// Every control under `root`, paired with its kind, in document order.
pub fn controls_within(doc: &Document, root: NodeId) -> Vec<(NodeId, ControlKind)> {
    doc.descendants(root)
        .into_iter()
        .filter_map(|id| classify_control(doc, id).map(|kind| (id, kind)))
        .collect()
}

/// Best-effort required flag. Absent or unreadable constraints mean `false`.
pub fn is_required(doc: &Document, id: NodeId) -> bool {
    let Some(el) = doc.element(id) else {
        return false;
    };
    el.has_attr("required")
        || el
            .attr("aria-required")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Nearest enclosing `form` element, if any.
pub fn form_of(doc: &Document, id: NodeId) -> Option<NodeId> {
    doc.ancestors(id).find(|a| doc.is_tag(*a, "form"))
}

/// Radios that share a native group with `radio`: same `name` within the
/// same form. An unnamed radio is a group of one.
pub fn radio_group(doc: &Document, radio: NodeId) -> Vec<NodeId> {
    let Some(name) = doc.non_empty_attr(radio, "name") else {
        return vec![radio];
    };
    let form = form_of(doc, radio);
    controls_of(doc, ControlKind::Radio)
        .into_iter()
        .filter(|r| doc.attr(*r, "name").map(str::trim) == Some(name.as_str()))
        .filter(|r| form_of(doc, *r) == form)
        .collect()
}
