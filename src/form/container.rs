//! Question containers and the container-aware label each control gets.
//!
//! Discovery and application both go through [`Layout::field_label`], so a
//! descriptor label produced during discovery is reproduced exactly when the
//! same control is looked up again on a later snapshot.

use std::collections::{HashMap, HashSet};

use crate::dom::controls::{ControlKind, classify_control, controls_within, radio_group};
use crate::dom::document::{Document, NodeId};
use crate::form::label::{
    UNKNOWN_FIELD, aria_name, choice_text, infer_group_label, infer_label, is_heading, text_of,
};

const CONTAINER_ROLES: [&str; 3] = ["group", "radiogroup", "listitem"];

const CONTAINER_CLASSES: [&str; 6] = [
    "question",
    "form-question",
    "question-container",
    "form-group",
    "freebirdFormviewerViewItemsItemItem",
    "Qr7Oae",
];

const CONTAINER_ATTRS: [&str; 2] = ["data-question-id", "data-question"];

/// Separator between a container label and a checkbox's own label.
pub const COMPOSITE_SEPARATOR: &str = " - ";

/// Whether an element has one of the question-container signatures.
pub fn is_container_signature(doc: &Document, id: NodeId) -> bool {
    let Some(el) = doc.element(id) else {
        return false;
    };
    el.tag == "fieldset"
        || el.attr("role").is_some_and(|r| CONTAINER_ROLES.contains(&r))
        || el.classes().any(|c| CONTAINER_CLASSES.contains(&c))
        || CONTAINER_ATTRS.iter().any(|a| el.has_attr(a))
}

/// Signature elements that own at least one control, in document order.
///
/// A control belongs to its nearest enclosing signature element, so an
/// outer container keeps whatever its inner containers do not hold.
pub fn question_containers(doc: &Document) -> Vec<NodeId> {
    assign_controls(doc).0
}

type Scope = Vec<(NodeId, ControlKind)>;

fn assign_controls(doc: &Document) -> (Vec<NodeId>, Vec<Scope>) {
    let signatures: HashSet<NodeId> = doc
        .elements()
        .into_iter()
        .filter(|id| is_container_signature(doc, *id))
        .collect();

    let mut owned: HashMap<NodeId, Scope> = HashMap::new();
    for (control, kind) in controls_within(doc, doc.root()) {
        if let Some(container) = doc.ancestors(control).find(|a| signatures.contains(a)) {
            owned.entry(container).or_default().push((control, kind));
        }
    }

    doc.elements()
        .into_iter()
        .filter_map(|id| owned.remove(&id).map(|scope| (id, scope)))
        .unzip()
}

/// Label for a whole container.
///
/// Tried in order: its own heading or ARIA name; the first owned control's own label
/// when that control is a text box or a select; the own heading of the
/// nearest enclosing signature element; the group label of the first
/// owned control.
pub fn container_label(doc: &Document, container: NodeId) -> String {
    if let Some(heading) = own_heading(doc, container).or_else(|| aria_name(doc, container)) {
        return heading;
    }

    let controls = controls_within(doc, container);
    let first = controls
        .iter()
        .find(|(control, _)| nearest_signature(doc, *control) == Some(container))
        .or(controls.first())
        .copied();

    if let Some((
        control,
        ControlKind::SingleLineText | ControlKind::MultiLineText | ControlKind::Select,
    )) = first
    {
        let own = infer_label(doc, control);
        if own != UNKNOWN_FIELD {
            return own;
        }
    }

    let enclosing = doc
        .ancestors(container)
        .filter(|a| is_container_signature(doc, *a))
        .find_map(|a| own_heading(doc, a));
    if let Some(heading) = enclosing {
        return heading;
    }

    match first {
        Some((control, _)) => infer_group_label(doc, control),
        None => UNKNOWN_FIELD.to_string(),
    }
}

fn nearest_signature(doc: &Document, id: NodeId) -> Option<NodeId> {
    doc.ancestors(id).find(|a| is_container_signature(doc, *a))
}

/// First heading under `container` that is not inside a nested signature
/// element.
fn own_heading(doc: &Document, container: NodeId) -> Option<String> {
    doc.descendants(container)
        .into_iter()
        .filter(|id| is_heading(doc, *id))
        .filter(|id| {
            doc.ancestors(*id)
                .take_while(|a| *a != container)
                .all(|a| !is_container_signature(doc, a))
        })
        .find_map(|id| text_of(doc, id))
}

/// Container structure of one snapshot.
#[derive(Debug, Clone)]
pub struct Layout {
    containers: Vec<NodeId>,
    scopes: Vec<Scope>,
    owner: HashMap<NodeId, usize>,
}

impl Layout {
    pub fn of(doc: &Document) -> Self {
        let (containers, scopes) = assign_controls(doc);
        let owner = scopes
            .iter()
            .enumerate()
            .flat_map(|(index, scope)| scope.iter().map(move |(control, _)| (*control, index)))
            .collect();
        Self {
            containers,
            scopes,
            owner,
        }
    }

    /// No container was found; the whole document is one implicit container.
    pub fn is_flat(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn containers(&self) -> &[NodeId] {
        &self.containers
    }

    /// Controls owned by the container at `index`, in document order.
    pub fn scope(&self, index: usize) -> &[(NodeId, ControlKind)] {
        self.scopes.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Index of the container that claimed `control`.
    pub fn container_index(&self, control: NodeId) -> Option<usize> {
        self.owner.get(&control).copied()
    }

    pub fn is_claimed(&self, control: NodeId) -> bool {
        self.owner.contains_key(&control)
    }

    /// The label discovery assigns to `control`.
    pub fn field_label(&self, doc: &Document, control: NodeId) -> String {
        let Some(kind) = classify_control(doc, control) else {
            return infer_label(doc, control);
        };

        match self.container_index(control) {
            Some(index) => {
                let label = container_label(doc, self.containers[index]);
                match kind {
                    ControlKind::Checkbox => composite_label(&label, &choice_text(doc, control)),
                    _ => label,
                }
            }
            None => ungrouped_label(doc, control, kind),
        }
    }
}

/// Label of a control outside any container (flat mode or the sweep).
fn ungrouped_label(doc: &Document, control: NodeId, kind: ControlKind) -> String {
    match kind {
        ControlKind::Radio => {
            let first = radio_group(doc, control)
                .first()
                .copied()
                .unwrap_or(control);
            infer_group_label(doc, first)
        }
        ControlKind::Checkbox => choice_text(doc, control),
        _ => infer_label(doc, control),
    }
}

pub fn composite_label(container: &str, own: &str) -> String {
    format!("{}{}{}", container, COMPOSITE_SEPARATOR, own)
}
