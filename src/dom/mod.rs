pub mod controls;
pub mod document;
pub mod html;

pub use document::{Document, Element, ElementPath, NodeId};
pub use html::SnapshotNode;
