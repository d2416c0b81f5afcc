//! Finding line formats

pub mod json;
pub mod text;
