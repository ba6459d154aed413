use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::browser::page::Page;
use crate::dom::controls::{ControlKind, classify_control, form_of};
use crate::dom::document::{Document, ElementPath, NodeId};
use crate::error::FillError;

/// A notification the page dispatched to its listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Input,
    Change,
    Click,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageEvent {
    pub target: ElementPath,
    pub kind: EventKind,
}

/// In-memory page over a parsed HTML document.
///
/// Applies interactions with browser semantics and records every
/// notification it dispatches. Backs offline runs against local files.
#[derive(Debug, Clone)]
pub struct StaticPage {
    document: Document,
    events: Vec<PageEvent>,
    url: Option<String>,
    settled_ms: u64,
}

impl StaticPage {
    pub fn from_html(html: &str) -> Self {
        Self {
            document: Document::parse_html(html),
            events: Vec::new(),
            url: None,
            settled_ms: 0,
        }
    }

    pub fn open(path: &Path) -> Result<Self, FillError> {
        let html = std::fs::read_to_string(path).map_err(|e| {
            FillError::Acquisition(format!("could not read {}: {}", path.display(), e))
        })?;
        let mut page = Self::from_html(&html);
        page.url = Some(format!("file://{}", path.display()));
        Ok(page)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn events(&self) -> &[PageEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<PageEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Total time spent in `settle`, in milliseconds.
    pub fn settled_ms(&self) -> u64 {
        self.settled_ms
    }

    pub fn to_html(&self) -> String {
        self.document.to_html()
    }

    fn target(&self, path: &ElementPath) -> Result<NodeId, FillError> {
        self.document.resolve(path).ok_or_else(|| {
            FillError::SessionProtocol {
                command: "resolve".into(),
                error: format!("no element at {}", path),
            }
        })
    }

    fn dispatch(&mut self, target: &ElementPath, kind: EventKind) {
        self.events.push(PageEvent {
            target: target.clone(),
            kind,
        });
    }
}

impl Page for StaticPage {
    fn navigate(&mut self, url: &str) -> Result<(), FillError> {
        // The document is fixed; navigation only records where we "are".
        debug!(url, "static page navigation");
        self.url = Some(url.to_string());
        Ok(())
    }

    fn snapshot(&mut self) -> Result<Document, FillError> {
        Ok(self.document.clone())
    }

    fn set_text(&mut self, target: &ElementPath, value: &str) -> Result<(), FillError> {
        let id = self.target(target)?;
        if !classify_control(&self.document, id).is_some_and(ControlKind::is_text) {
            return Err(FillError::SessionProtocol {
                command: "set_text".into(),
                error: format!("element at {} is not a text control", target),
            });
        }
        self.document.set_value(id, value);
        self.dispatch(target, EventKind::Input);
        self.dispatch(target, EventKind::Change);
        Ok(())
    }

    fn activate(&mut self, target: &ElementPath) -> Result<(), FillError> {
        let id = self.target(target)?;
        self.dispatch(target, EventKind::Click);

        match classify_control(&self.document, id) {
            Some(ControlKind::Checkbox) => {
                let checked = self.document.is_checked(id);
                self.document.set_checked(id, !checked);
                self.dispatch(target, EventKind::Input);
                self.dispatch(target, EventKind::Change);
            }
            Some(ControlKind::Radio) => {
                if !self.document.is_checked(id) {
                    for other in same_name_radios(&self.document, id) {
                        self.document.set_checked(other, false);
                    }
                    self.document.set_checked(id, true);
                    self.dispatch(target, EventKind::Input);
                    self.dispatch(target, EventKind::Change);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn select_option(&mut self, target: &ElementPath, option_text: &str) -> Result<(), FillError> {
        let id = self.target(target)?;
        if !self.document.is_tag(id, "select") {
            return Err(FillError::SessionProtocol {
                command: "select_option".into(),
                error: format!("element at {} is not a select", target),
            });
        }
        if !self.document.select_option_by_text(id, option_text) {
            return Err(FillError::SessionProtocol {
                command: "select_option".into(),
                error: format!("no option '{}'", option_text),
            });
        }
        self.dispatch(target, EventKind::Change);
        Ok(())
    }

    fn settle(&mut self, ms: u64) -> Result<(), FillError> {
        self.settled_ms += ms;
        Ok(())
    }
}

/// Radios a browser unchecks when `radio` becomes checked: same name, same
/// form owner. Includes disabled radios, unlike control discovery.
fn same_name_radios(doc: &Document, radio: NodeId) -> Vec<NodeId> {
    let Some(name) = doc.attr(radio, "name") else {
        return Vec::new();
    };
    let form = form_of(doc, radio);
    doc.elements()
        .into_iter()
        .filter(|n| *n != radio)
        .filter(|n| doc.is_tag(*n, "input") && doc.attr(*n, "type") == Some("radio"))
        .filter(|n| doc.attr(*n, "name") == Some(name))
        .filter(|n| form_of(doc, *n) == form)
        .collect()
}
