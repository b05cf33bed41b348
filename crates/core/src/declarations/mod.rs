//! Rewriting of compiler-produced type declarations.
//!
//! - `types`: declaration IR
//! - `parse`: declaration source -> IR
//! - `emit`: IR -> declaration source
//! - `rules`: name-keyed rule table
//! - `rewrite`: drop, rename and parametrization passes

mod emit;
mod parse;
mod rewrite;
mod rules;
mod types;

pub use emit::{Emit, emit_declarations};
pub use parse::parse_declarations;
pub use rewrite::{rewrite_declaration_source, rewrite_declarations};
pub use rules::{Rule, RuleSet, RuleTable, TypeNames};
pub use types::{
    TsIndexSignature, TsLiteral, TsMember, TsPrimitive, TsProp, TsType, TsTypeDef, TsTypeParam,
    TypeDefKind,
};
