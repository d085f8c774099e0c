//! Rendering generated APIs into source files.

mod rust;

pub use rust::RustRenderer;

use crate::assembler::GeneratedApi;
use std::path::PathBuf;

/// One generated source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Path relative to the output directory.
    pub path: PathBuf,
    pub contents: String,
}

/// Turns generated APIs into source units of one output language.
pub trait Renderer {
    /// All units of one API: its package index, client, request base type and models.
    fn render(&self, api: &GeneratedApi) -> Vec<SourceUnit>;

    /// Index units of the base package, listing every API in `apis`.
    fn render_index(&self, base_package: &[String], apis: &[GeneratedApi]) -> Vec<SourceUnit>;
}
