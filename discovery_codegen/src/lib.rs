//! Generate typed Rust client libraries from REST API discovery documents.
//!
//! A discovery document describes an API's schemas and its tree of resources
//! and methods. Generation runs in two steps: [`generate_api`] builds a
//! language-neutral client model ([`GeneratedApi`]), and a [`Renderer`] turns
//! that model into source files.

pub mod assembler;
pub mod component;
pub mod descriptor;
pub mod discovery;
pub mod enum_values;
pub mod error;
pub mod identifier;
pub mod output;
pub mod registry;
pub mod render;
pub mod resolver;
pub mod runtime_contract;
pub mod settings;

pub use assembler::{ApiBuilder, GeneratedApi};
pub use discovery::RestDescription;
pub use error::CodegenError;
pub use render::{Renderer, RustRenderer, SourceUnit};
pub use settings::{ApiSelector, GenerateSettings};

use rayon::prelude::*;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Parses a discovery document.
///
/// # Errors
///
/// Returns `CodegenError::Json` if `json` is not a valid discovery document.
pub fn parse_description(json: &str) -> Result<RestDescription, CodegenError> {
    Ok(serde_json::from_str(json)?)
}

/// Reads and parses a discovery document file.
///
/// # Errors
///
/// Returns `CodegenError::Io` if the file cannot be read, or
/// `CodegenError::Json` if it is not a valid discovery document.
pub fn load_description(path: impl AsRef<Path>) -> Result<RestDescription, CodegenError> {
    let json: String = std::fs::read_to_string(path)?;
    parse_description(&json)
}

/// Location of the discovery document for `selector`: `<dir>/<name>.<version>.json`.
#[must_use]
pub fn discovery_path(dir: &Path, selector: &ApiSelector) -> PathBuf {
    dir.join(format!("{}.{}.json", selector.name, selector.version))
}

/// Builds the client model of one API.
///
/// # Errors
///
/// Returns `CodegenError::Api` wrapping the first structural error found.
pub fn generate_api(
    description: &RestDescription,
    settings: &GenerateSettings,
) -> Result<GeneratedApi, CodegenError> {
    ApiBuilder::new(description, settings)?.build()
}

/// Generates one API and writes its Rust sources under `settings.output_dir`.
///
/// # Errors
///
/// Returns a generation error, or `CodegenError::Write` if a file cannot be written.
pub fn generate_to_dir(
    description: &RestDescription,
    settings: &GenerateSettings,
) -> Result<Vec<PathBuf>, CodegenError> {
    let api: GeneratedApi = generate_api(description, settings)?;
    let renderer: RustRenderer = RustRenderer::new(settings.runtime_crate.as_str());
    output::write_units(&settings.output_dir, &renderer.render(&api))
}

/// Generates Rust modules for a discovery document string and writes them to
/// `writer` as one block of nested modules.
///
/// # Errors
///
/// Returns `CodegenError` if the document is invalid, generation fails, or
/// writing to the writer fails.
pub fn generate_to_writer<W: Write>(
    description_json: &str,
    writer: &mut W,
    settings: &GenerateSettings,
) -> Result<(), CodegenError> {
    let description: RestDescription = parse_description(description_json)?;
    let api: GeneratedApi = generate_api(&description, settings)?;
    let renderer: RustRenderer = RustRenderer::new(settings.runtime_crate.as_str());
    writer.write_all(renderer.render_inline(&api).as_bytes())?;
    Ok(())
}

/// Generates every selected API from `discovery_dir` and writes all sources,
/// plus the base package index, under `settings.output_dir`.
///
/// APIs are generated in parallel, each by its own builder.
///
/// # Errors
///
/// The first failing API aborts the run; its error names the API. Two APIs
/// mapping to the same package (such as two versions of one API) are rejected
/// before anything is written.
pub fn generate_all(
    discovery_dir: &Path,
    selectors: &[ApiSelector],
    settings: &GenerateSettings,
) -> Result<Vec<PathBuf>, CodegenError> {
    let apis: Vec<GeneratedApi> = selectors
        .par_iter()
        .map(|selector| {
            load_description(discovery_path(discovery_dir, selector))
                .and_then(|description| generate_api(&description, settings))
                .map_err(|e| e.for_api(selector.to_string()))
        })
        .collect::<Result<Vec<GeneratedApi>, CodegenError>>()?;
    reject_package_collisions(&apis)?;

    let renderer: RustRenderer = RustRenderer::new(settings.runtime_crate.as_str());
    let per_api: Vec<Vec<PathBuf>> = apis
        .par_iter()
        .map(|api| output::write_units(&settings.output_dir, &renderer.render(api)))
        .collect::<Result<Vec<Vec<PathBuf>>, CodegenError>>()?;

    let mut written: Vec<PathBuf> = per_api.into_iter().flatten().collect();
    written.extend(output::write_base_index(
        &settings.output_dir,
        &renderer,
        &settings.base_package_segments(),
        &apis,
    )?);
    Ok(written)
}

fn reject_package_collisions(apis: &[GeneratedApi]) -> Result<(), CodegenError> {
    let mut owners: BTreeMap<&[String], &str> = BTreeMap::new();
    for api in apis {
        if let Some(first) = owners.insert(api.package.as_slice(), api.selector.as_str()) {
            return Err(CodegenError::PackageCollision {
                package: api.package.join("."),
                first: first.to_string(),
                second: api.selector.clone(),
            });
        }
    }
    Ok(())
}
