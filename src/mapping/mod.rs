pub mod inference;
pub mod prompt;
pub mod provider;
