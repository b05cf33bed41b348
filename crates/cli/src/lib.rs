//! Command-line front end of the hypergen generator.
//!
//! `generate` turns a hyperschema into endpoint metadata and a simplified
//! schema. `rewrite` post-processes the declarations a schema compiler
//! produced from that simplified schema.

pub mod config;
pub mod deref;
pub mod error;
pub mod fetch;
pub mod generate;
pub mod rewrite;
