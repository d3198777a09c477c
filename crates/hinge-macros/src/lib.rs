//! Procedural macros for Hinge.
//!
//! - `#[plugin_contract]` - Declares a trait as a plugin contract, generating
//!   its `PluginContract` metadata
//! - `#[register_plugin]` - Contributes a plugin at link time
//!
//! # Declaring Contracts
//!
//! ```rust,ignore
//! use hinge::prelude::*;
//!
//! #[plugin_contract]
//! pub trait Formatter: Plugin<String> {
//!     fn format(&self, input: &str) -> String;
//! }
//!
//! // Wired as "csvFormatters" instead of "prettyFormatterRegistry".
//! #[plugin_contract(extends = Formatter, qualifier = "csvFormatters")]
//! pub trait PrettyFormatter: Formatter {}
//! ```
//!
//! # Contributing Plugins
//!
//! ```rust,ignore
//! #[register_plugin(Formatter, order = 10)]
//! fn csv_formatter() -> CsvFormatter {
//!     CsvFormatter::default()
//! }
//! ```

mod contract;
mod register;

use proc_macro::TokenStream;
use syn::{ItemFn, ItemTrait, parse_macro_input};

/// Declares a trait as a plugin contract.
///
/// Implements `hinge_core::PluginContract` for the trait object and leaves the
/// trait itself unchanged. The delimiter type is taken from the trait's
/// `Plugin<D>` supertrait.
///
/// # Attributes
///
/// - `qualifier = "..."` - Registry name override
/// - `name = "..."` - Simple name used to derive the registry name
/// - `extends = Parent` - Inherit the delimiter of another contract
/// - `delimiter = Type` - Bind the delimiter explicitly
///
/// A trait with none of a `Plugin<D>` supertrait, `extends` or `delimiter` is
/// rejected at compile time.
#[proc_macro_attribute]
pub fn plugin_contract(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as contract::ContractArgs);
    let item = parse_macro_input!(item as ItemTrait);

    match contract::plugin_contract(args, item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Contributes the plugin built by the annotated function.
///
/// The function takes no arguments and returns the plugin by value. The first
/// argument names the contract trait.
///
/// # Attributes
///
/// - `order = N` - Explicit order, overriding the plugin's declared one
/// - `name = "..."` - Contribution name (default: the function name)
#[proc_macro_attribute]
pub fn register_plugin(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as register::RegisterArgs);
    let func = parse_macro_input!(item as ItemFn);

    match register::register_plugin(args, func) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
