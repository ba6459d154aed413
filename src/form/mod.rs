pub mod apply;
pub mod container;
pub mod discovery;
pub mod field_model;
pub mod label;
pub mod matcher;
