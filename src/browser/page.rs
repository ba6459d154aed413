use crate::dom::document::{Document, ElementPath};
use crate::error::FillError;

/// A live, script-evaluable document session.
///
/// The engine only reads through `snapshot` and only writes through the
/// three interaction methods, always addressing a control by a path taken
/// from the most recent snapshot.
pub trait Page {
    fn navigate(&mut self, url: &str) -> Result<(), FillError>;

    /// Structured copy of the current document, including live form state.
    fn snapshot(&mut self) -> Result<Document, FillError>;

    /// Set a text control's value, then dispatch `input` and `change`.
    fn set_text(&mut self, target: &ElementPath, value: &str) -> Result<(), FillError>;

    /// Simulate a user click on the control.
    fn activate(&mut self, target: &ElementPath) -> Result<(), FillError>;

    /// Select the option with this rendered text, then dispatch `change`.
    fn select_option(&mut self, target: &ElementPath, option_text: &str) -> Result<(), FillError>;

    /// Pause to let the page settle.
    fn settle(&mut self, ms: u64) -> Result<(), FillError>;
}
