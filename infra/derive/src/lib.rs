#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the relay list crates.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! rlist-derive.workspace = true
//! thiserror.workspace = true
//! ```

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for crate-level error enums.
///
/// Turns a plain enum into an error type wired for the rest of the workspace.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` unless already present.
/// * **Context Support**: Generates a companion `...Ext` trait that adds `.context()` to
///   `Result<T, Error>` and to `Result<T, Source>` for every wrapped source error.
/// * **Standard Conversions**: Implements `From<Source>` for variants with a source field,
///   so `?` works on upstream errors.
/// * **Internal Fallback**: `From<&'static str>` and `From<String>` when an `Internal`
///   variant is present.
/// * **Variant Names**: `fn variant(&self) -> &'static str` for structured log fields.
///
/// # Requirements
///
/// 1. Only enums are accepted.
/// 2. Variants use named fields; tuple and unit variants are rejected.
/// 3. A context slot is spelled `context: Option<Cow<'static, str>>`.
/// 4. A variant that wraps a `source` must also carry a `context` slot.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[rlist_derive::rlist_error]
/// pub enum SnapshotError {
///     #[error("I/O failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &std::path::Path) -> Result<Vec<u8>, SnapshotError> {
///     std::fs::read(path).context("Reading snapshot")
/// }
/// ```
#[proc_macro_attribute]
pub fn rlist_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
