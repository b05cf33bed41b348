//! Hyperschema-driven code generation core.
//!
//! The pipeline has three pure entry points:
//! 1. [`extract_endpoints`]: dereferenced hyperschema -> per-resource endpoint metadata
//! 2. [`simplify`]: raw hyperschema -> hyperschema with flat entity shapes
//! 3. [`rewrite_declarations`]: compiled type declarations -> generic declarations
//!
//! Rendering, fetching and writing files are left to the caller.

#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

pub mod declarations;
pub mod endpoints;
pub mod error;
pub mod schema;
pub mod utils;

pub use declarations::{
    Rule, RuleSet, RuleTable, TsTypeDef, emit_declarations, parse_declarations,
    rewrite_declaration_source, rewrite_declarations,
};
pub use endpoints::{EndpointInfo, ExtractOptions, ResourceInfo, extract_endpoints};
pub use error::{DeclarationError, SchemaError};
pub use schema::simplify;
