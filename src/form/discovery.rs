use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::dom::controls::{ControlKind, controls_within, is_required, radio_group, text_controls};
use crate::dom::document::{Document, NodeId};
use crate::form::container::Layout;
use crate::form::field_model::{FieldDescriptor, FieldKind};
use crate::form::label::{choice_text, infer_label};

/// Result of one discovery pass.
#[derive(Debug, Clone)]
pub struct Discovery {
    pub fields: Vec<FieldDescriptor>,
    /// Controls claimed by the container-scoped pass.
    pub claimed: HashSet<NodeId>,
    /// Controls picked up by the residual sweep.
    pub swept: HashSet<NodeId>,
    pub flat: bool,
}

/// Produce the ordered field descriptors for the current document.
pub fn discover_fields(doc: &Document) -> Vec<FieldDescriptor> {
    discover(doc).fields
}

/// Two passes: container-scoped extraction building a claimed set, then a
/// sweep over text controls outside that set.
pub fn discover(doc: &Document) -> Discovery {
    let layout = Layout::of(doc);
    let mut fields = Vec::new();
    let mut claimed = HashSet::new();

    if layout.is_flat() {
        debug!("no question containers found, using flat mode");
        let controls = controls_within(doc, doc.root());
        extract_scope(doc, &layout, 0, &controls, true, &mut fields);
        claimed.extend(controls.iter().map(|(id, _)| *id));
    } else {
        for index in 0..layout.containers().len() {
            let controls = layout.scope(index);
            extract_scope(doc, &layout, index, controls, false, &mut fields);
            claimed.extend(controls.iter().map(|(id, _)| *id));
        }
    }

    let swept = sweep_unclaimed(doc, &claimed, &mut fields);

    debug!(
        fields = fields.len(),
        claimed = claimed.len(),
        swept = swept.len(),
        "discovery pass complete"
    );

    Discovery {
        fields,
        claimed,
        swept,
        flat: layout.is_flat(),
    }
}

/// Per-kind running counters within one container.
#[derive(Default)]
struct IdCounter {
    counts: HashMap<FieldKind, usize>,
}

impl IdCounter {
    fn next(&mut self, prefix: &str, kind: FieldKind) -> String {
        let n = self.counts.entry(kind).or_insert(0);
        let id = format!("{}_{}{}", prefix, kind.id_tag(), n);
        *n += 1;
        id
    }
}

fn extract_scope(
    doc: &Document,
    layout: &Layout,
    index: usize,
    controls: &[(NodeId, ControlKind)],
    flat: bool,
    fields: &mut Vec<FieldDescriptor>,
) {
    let prefix = format!("q{}", index);
    let mut ids = IdCounter::default();
    let mut grouped_radios: HashSet<NodeId> = HashSet::new();

    for (control, kind) in controls {
        let control = *control;
        match kind {
            ControlKind::SingleLineText | ControlKind::MultiLineText => {
                let field_kind = if *kind == ControlKind::SingleLineText {
                    FieldKind::SingleLineText
                } else {
                    FieldKind::MultiLineText
                };
                fields.push(FieldDescriptor {
                    kind: field_kind,
                    label: layout.field_label(doc, control),
                    identifier: ids.next(&prefix, field_kind),
                    required: is_required(doc, control),
                    options: Vec::new(),
                });
            }

            ControlKind::Radio => {
                if grouped_radios.contains(&control) {
                    continue;
                }
                // A container collapses all its radios into one group; flat
                // mode groups by the native radio name.
                let members: Vec<NodeId> = if flat {
                    radio_group(doc, control)
                } else {
                    controls
                        .iter()
                        .filter(|(_, k)| *k == ControlKind::Radio)
                        .map(|(id, _)| *id)
                        .collect()
                };
                grouped_radios.extend(members.iter().copied());

                fields.push(FieldDescriptor {
                    kind: FieldKind::SingleChoice,
                    label: layout.field_label(doc, control),
                    identifier: ids.next(&prefix, FieldKind::SingleChoice),
                    required: members.iter().any(|r| is_required(doc, *r)),
                    options: members.iter().map(|r| choice_text(doc, *r)).collect(),
                });
            }

            ControlKind::Checkbox => {
                fields.push(FieldDescriptor {
                    kind: FieldKind::MultiChoice,
                    label: layout.field_label(doc, control),
                    identifier: ids.next(&prefix, FieldKind::MultiChoice),
                    required: is_required(doc, control),
                    options: Vec::new(),
                });
            }

            ControlKind::Select => {
                fields.push(FieldDescriptor {
                    kind: FieldKind::ChoiceList,
                    label: layout.field_label(doc, control),
                    identifier: ids.next(&prefix, FieldKind::ChoiceList),
                    required: is_required(doc, control),
                    options: doc
                        .options_of(control)
                        .into_iter()
                        .map(|o| doc.option_text(o))
                        .collect(),
                });
            }
        }
    }
}

fn sweep_unclaimed(
    doc: &Document,
    claimed: &HashSet<NodeId>,
    fields: &mut Vec<FieldDescriptor>,
) -> HashSet<NodeId> {
    let mut ids = IdCounter::default();
    let mut swept = HashSet::new();

    for control in text_controls(doc) {
        if claimed.contains(&control) {
            continue;
        }
        let kind = if doc.is_tag(control, "textarea") {
            FieldKind::MultiLineText
        } else {
            FieldKind::SingleLineText
        };
        fields.push(FieldDescriptor {
            kind,
            label: infer_label(doc, control),
            identifier: ids.next("extra", kind),
            required: is_required(doc, control),
            options: Vec::new(),
        });
        swept.insert(control);
    }

    swept
}
