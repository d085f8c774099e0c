//! Procedural macro `discovery_client!` for discovery-codegen.
//!
//! ```ignore
//! discovery_client!("discovery/calendar.v3.json");
//! discovery_client!("discovery/drive.v3.json", "google");
//! ```
//!
//! The path is relative to the invoking crate's `CARGO_MANIFEST_DIR`. The
//! optional second argument is the base package the API module is nested in
//! (default `generated`). The macro must be invoked at the crate root, since
//! generated code refers to its types through `crate::` paths.

use discovery_codegen::{GenerateSettings, generate_to_writer};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use std::path::PathBuf;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{LitStr, Token, parse_macro_input};

/// `"path"` or `"path", "base_package"`.
struct MacroArgs {
    path: LitStr,
    base_package: Option<LitStr>,
}

impl Parse for MacroArgs {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        let args: Punctuated<LitStr, Token![,]> = Punctuated::parse_terminated(input)?;
        let mut args = args.into_iter();
        let Some(path) = args.next() else {
            return Err(input.error("expected a discovery document path"));
        };
        let base_package: Option<LitStr> = args.next();
        if let Some(extra) = args.next() {
            return Err(syn::Error::new(
                extra.span(),
                "expected at most two arguments: document path and base package",
            ));
        }
        Ok(Self { path, base_package })
    }
}

/// Expands to the client modules generated from a discovery document.
#[proc_macro]
pub fn discovery_client(input: TokenStream) -> TokenStream {
    let args: MacroArgs = parse_macro_input!(input as MacroArgs);
    expand(&args)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(args: &MacroArgs) -> syn::Result<TokenStream2> {
    let error = |message: String| syn::Error::new(args.path.span(), message);

    let manifest_dir: String = std::env::var("CARGO_MANIFEST_DIR")
        .map_err(|e| error(format!("CARGO_MANIFEST_DIR is not available: {e}")))?;
    let path: PathBuf = PathBuf::from(manifest_dir).join(args.path.value());
    let json: String = std::fs::read_to_string(&path)
        .map_err(|e| error(format!("failed to read `{}`: {e}", path.display())))?;

    let mut settings: GenerateSettings = GenerateSettings::default();
    if let Some(ref base_package) = args.base_package {
        settings.base_package = base_package.value();
    }

    let mut rendered: Vec<u8> = Vec::new();
    generate_to_writer(&json, &mut rendered, &settings).map_err(|e| error(e.to_string()))?;
    let source: String = String::from_utf8(rendered)
        .map_err(|e| error(format!("generated code is not UTF-8: {e}")))?;
    let tokens: TokenStream2 = source
        .parse()
        .map_err(|e: proc_macro2::LexError| error(format!("generated code failed to parse: {e}")))?;

    // Rebuild when the document changes.
    let include_path: String = path.display().to_string();
    Ok(quote! {
        const _: &[u8] = include_bytes!(#include_path);
        #tokens
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_path_only() {
        let args: MacroArgs = syn::parse_str(r#""docs/calendar.v3.json""#).expect("parses");
        assert_eq!("docs/calendar.v3.json", args.path.value());
        assert!(args.base_package.is_none());
    }

    #[test]
    fn parses_path_and_base_package() {
        let args: MacroArgs =
            syn::parse_str(r#""docs/calendar.v3.json", "google""#).expect("parses");
        assert_eq!(
            Some("google".to_string()),
            args.base_package.as_ref().map(LitStr::value)
        );
    }

    #[test]
    fn rejects_missing_and_extra_arguments() {
        assert!(syn::parse_str::<MacroArgs>("").is_err());
        assert!(syn::parse_str::<MacroArgs>(r#""a.json", "b", "c""#).is_err());
    }

    #[test]
    fn missing_document_is_a_compile_error_naming_the_path() {
        let args: MacroArgs = syn::parse_str(r#""does/not/exist.json""#).expect("parses");
        let err: syn::Error = expand(&args).expect_err("file is missing");
        assert!(err.to_string().contains("does/not/exist.json"), "{err}");
    }

    #[test]
    fn expands_fixture_into_nested_modules() {
        let args: MacroArgs = syn::parse_str(
            r#""../discovery_codegen/tests/fixtures/calendar.v3.json", "google""#,
        )
        .expect("parses");
        let actual: String = expand(&args).expect("expands").to_string();
        assert!(actual.contains("include_bytes !"), "{actual}");
        assert!(actual.contains("pub mod google"), "{actual}");
        assert!(actual.contains("pub struct Calendar"), "{actual}");
    }
}
