#![allow(dead_code)]

use std::cell::Cell;
use std::path::PathBuf;

use form_autofill::browser::page::Page;
use form_autofill::browser::static_page::StaticPage;
use form_autofill::dom::document::{Document, ElementPath};
use form_autofill::error::FillError;
use form_autofill::form::field_model::{FieldDescriptor, ValueAssignment};
use form_autofill::mapping::provider::ValueMappingProvider;

pub fn fixture_path(name: &str) -> PathBuf {
    let base = std::env::current_dir().unwrap();
    base.join("tests").join("fixtures").join(name)
}

pub fn fixture_html(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).unwrap()
}

pub fn fixture_page(name: &str) -> StaticPage {
    StaticPage::open(&fixture_path(name)).unwrap()
}

pub fn fixture_doc(name: &str) -> Document {
    Document::parse_html(&fixture_html(name))
}

pub fn field<'a>(fields: &'a [FieldDescriptor], label: &str) -> &'a FieldDescriptor {
    fields
        .iter()
        .find(|f| f.label == label)
        .unwrap_or_else(|| panic!("no field labelled {:?} in {:#?}", label, fields))
}

/// Value of the first element matching `tag` and `name` in the page's document.
pub fn value_of(page: &StaticPage, tag: &str, name: &str) -> String {
    let doc = page.document();
    let id = doc
        .elements()
        .into_iter()
        .find(|n| doc.is_tag(*n, tag) && doc.attr(*n, "name") == Some(name))
        .unwrap_or_else(|| panic!("no <{} name={:?}>", tag, name));
    doc.value(id).unwrap().to_string()
}

/// Whether the input with this name and value attribute is checked.
pub fn is_checked(page: &StaticPage, name: &str, value: &str) -> bool {
    let doc = page.document();
    let id = doc
        .elements()
        .into_iter()
        .find(|n| doc.attr(*n, "name") == Some(name) && doc.attr(*n, "value") == Some(value))
        .unwrap_or_else(|| panic!("no input name={:?} value={:?}", name, value));
    doc.is_checked(id)
}

// ============================================================================
// Test doubles
// ============================================================================

/// Provider returning a fixed assignment and counting calls.
pub struct CannedProvider {
    pub values: ValueAssignment,
    pub calls: Cell<usize>,
}

impl CannedProvider {
    pub fn new(values: ValueAssignment) -> Self {
        Self {
            values,
            calls: Cell::new(0),
        }
    }
}

impl ValueMappingProvider for CannedProvider {
    fn provide(
        &self,
        _fields: &[FieldDescriptor],
        _context: Option<&str>,
    ) -> Result<ValueAssignment, FillError> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.values.clone())
    }
}

/// Provider that always fails, as an unreachable model would.
pub struct UnavailableProvider;

impl ValueMappingProvider for UnavailableProvider {
    fn provide(
        &self,
        _fields: &[FieldDescriptor],
        _context: Option<&str>,
    ) -> Result<ValueAssignment, FillError> {
        Err(FillError::Acquisition("model offline".into()))
    }
}

/// Wraps a `StaticPage` whose dropdowns refuse every selection.
pub struct BrokenSelectPage {
    pub inner: StaticPage,
}

impl Page for BrokenSelectPage {
    fn navigate(&mut self, url: &str) -> Result<(), FillError> {
        self.inner.navigate(url)
    }

    fn snapshot(&mut self) -> Result<Document, FillError> {
        self.inner.snapshot()
    }

    fn set_text(&mut self, target: &ElementPath, value: &str) -> Result<(), FillError> {
        self.inner.set_text(target, value)
    }

    fn activate(&mut self, target: &ElementPath) -> Result<(), FillError> {
        self.inner.activate(target)
    }

    fn select_option(&mut self, _target: &ElementPath, _option_text: &str) -> Result<(), FillError> {
        Err(FillError::SessionProtocol {
            command: "select_option".into(),
            error: "detached from document".into(),
        })
    }

    fn settle(&mut self, ms: u64) -> Result<(), FillError> {
        self.inner.settle(ms)
    }
}
