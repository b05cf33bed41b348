//! TypeScript declaration emission via the Emit trait.
//!
//! Object literals and interface bodies are printed one member per line with
//! two spaces per nesting level; everything else is printed inline.
//! Parentheses are inserted from operator precedence, so the IR carries no
//! explicit grouping node.

use super::types::{
    TsIndexSignature, TsLiteral, TsMember, TsPrimitive, TsProp, TsType, TsTypeDef, TsTypeParam,
    TypeDefKind,
};
use crate::utils::{escape_js_string, quote_if_needed};

/// Trait for emitting TypeScript code from IR nodes.
pub trait Emit {
    /// Convert the IR node to its TypeScript string representation.
    fn emit(&self) -> String;
}

impl Emit for TsPrimitive {
    fn emit(&self) -> String {
        match self {
            TsPrimitive::String => "string",
            TsPrimitive::Number => "number",
            TsPrimitive::Boolean => "boolean",
            TsPrimitive::Null => "null",
            TsPrimitive::Undefined => "undefined",
            TsPrimitive::Void => "void",
            TsPrimitive::Unknown => "unknown",
            TsPrimitive::Any => "any",
            TsPrimitive::Never => "never",
            TsPrimitive::Object => "object",
        }
        .to_string()
    }
}

impl Emit for TsLiteral {
    fn emit(&self) -> String {
        match self {
            TsLiteral::String(s) => format!("\"{}\"", escape_js_string(s)),
            TsLiteral::Number(n) => n.clone(),
            TsLiteral::Bool(b) => b.to_string(),
        }
    }
}

/// Binding strength, loosest first.
fn precedence(ty: &TsType) -> u8 {
    match ty {
        TsType::Conditional { .. } => 0,
        TsType::Union(_) => 1,
        TsType::Intersection(_) => 2,
        TsType::Keyof(_) | TsType::Rest(_) => 3,
        TsType::Array(_) | TsType::IndexedAccess { .. } => 4,
        _ => 5,
    }
}

fn emit_operand(ty: &TsType, min: u8, indent: usize) -> String {
    let s = ty.emit_indented(indent);
    if precedence(ty) < min {
        format!("({s})")
    } else {
        s
    }
}

fn emit_doc(doc: Option<&str>, indent: usize) -> String {
    let Some(doc) = doc else {
        return String::new();
    };
    let prefix = "  ".repeat(indent);
    let mut output = format!("{prefix}/**\n");
    for line in doc.lines() {
        if line.is_empty() {
            output.push_str(&format!("{prefix} *\n"));
        } else {
            output.push_str(&format!("{prefix} * {}\n", line.replace("*/", "*\\/")));
        }
    }
    output.push_str(&format!("{prefix} */\n"));
    output
}

fn emit_members(members: &[TsMember], indent: usize) -> String {
    if members.is_empty() {
        return "{}".to_string();
    }
    let mut output = "{\n".to_string();
    for member in members {
        output.push_str(&member.emit_indented(indent + 1));
    }
    output.push_str(&"  ".repeat(indent));
    output.push('}');
    output
}

impl TsType {
    /// Emit with the given indentation level for multi-line object literals.
    pub fn emit_indented(&self, indent: usize) -> String {
        match self {
            TsType::Primitive(p) => p.emit(),
            TsType::Literal(lit) => lit.emit(),
            TsType::Ref { name, args } => {
                if args.is_empty() {
                    name.clone()
                } else {
                    let args: Vec<_> = args.iter().map(|a| a.emit_indented(indent)).collect();
                    format!("{}<{}>", name, args.join(", "))
                }
            }
            TsType::Array(inner) => format!("{}[]", emit_operand(inner, 4, indent)),
            TsType::Tuple(items) => {
                let items: Vec<_> = items.iter().map(|t| t.emit_indented(indent)).collect();
                format!("[{}]", items.join(", "))
            }
            TsType::Rest(inner) => format!("...{}", emit_operand(inner, 4, indent)),
            TsType::Union(types) => types
                .iter()
                .map(|t| emit_operand(t, 2, indent))
                .collect::<Vec<_>>()
                .join(" | "),
            TsType::Intersection(types) => types
                .iter()
                .map(|t| emit_operand(t, 3, indent))
                .collect::<Vec<_>>()
                .join(" & "),
            TsType::Object(members) => emit_members(members, indent),
            TsType::Conditional {
                check,
                extends,
                true_type,
                false_type,
            } => format!(
                "{} extends {} ? {} : {}",
                emit_operand(check, 1, indent),
                emit_operand(extends, 1, indent),
                true_type.emit_indented(indent),
                false_type.emit_indented(indent)
            ),
            TsType::IndexedAccess { object, index } => format!(
                "{}[{}]",
                emit_operand(object, 4, indent),
                index.emit_indented(indent)
            ),
            TsType::Keyof(inner) => format!("keyof {}", emit_operand(inner, 3, indent)),
        }
    }
}

impl Emit for TsType {
    fn emit(&self) -> String {
        self.emit_indented(0)
    }
}

impl TsMember {
    /// Emit as one `;` terminated line (plus JSDoc) at the given level.
    pub fn emit_indented(&self, indent: usize) -> String {
        let prefix = "  ".repeat(indent);
        match self {
            TsMember::Prop(TsProp {
                name,
                ty,
                optional,
                readonly,
                doc,
            }) => format!(
                "{}{}{}{}{}: {};\n",
                emit_doc(doc.as_deref(), indent),
                prefix,
                if *readonly { "readonly " } else { "" },
                quote_if_needed(name),
                if *optional { "?" } else { "" },
                ty.emit_indented(indent)
            ),
            TsMember::Index(TsIndexSignature {
                key_name,
                key_ty,
                value,
                readonly,
                doc,
            }) => format!(
                "{}{}{}[{}: {}]: {};\n",
                emit_doc(doc.as_deref(), indent),
                prefix,
                if *readonly { "readonly " } else { "" },
                key_name,
                key_ty.emit_indented(indent),
                value.emit_indented(indent)
            ),
        }
    }
}

impl Emit for TsTypeParam {
    fn emit(&self) -> String {
        let mut output = self.name.clone();
        if let Some(constraint) = &self.constraint {
            output.push_str(&format!(" extends {}", constraint.emit()));
        }
        if let Some(default) = &self.default {
            output.push_str(&format!(" = {}", default.emit()));
        }
        output
    }
}

impl Emit for TsTypeDef {
    fn emit(&self) -> String {
        let mut output = emit_doc(self.doc.as_deref(), 0);
        if self.is_export {
            output.push_str("export ");
        }

        let type_params = if self.type_params.is_empty() {
            String::new()
        } else {
            let params: Vec<_> = self.type_params.iter().map(Emit::emit).collect();
            format!("<{}>", params.join(", "))
        };

        match &self.kind {
            TypeDefKind::Interface { extends, members } => {
                output.push_str(&format!("interface {}{}", self.name, type_params));
                if !extends.is_empty() {
                    let extends: Vec<_> = extends.iter().map(Emit::emit).collect();
                    output.push_str(&format!(" extends {}", extends.join(", ")));
                }
                output.push(' ');
                output.push_str(&emit_members(members, 0));
                output.push('\n');
            }
            TypeDefKind::TypeAlias { ty } => {
                output.push_str(&format!("type {}{} = {};\n", self.name, type_params, ty.emit()));
            }
        }
        output
    }
}

/// Emit a batch of declarations, separated by blank lines.
pub fn emit_declarations(defs: &[TsTypeDef]) -> String {
    defs.iter().map(Emit::emit).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn string() -> TsType {
        TsType::Primitive(TsPrimitive::String)
    }

    #[test]
    fn test_emit_primitive_and_literal() {
        assert_eq!(TsPrimitive::Unknown.emit(), "unknown");
        assert_eq!(TsPrimitive::Undefined.emit(), "undefined");
        assert_eq!(TsLiteral::String("say \"hi\"".into()).emit(), "\"say \\\"hi\\\"\"");
        assert_eq!(TsLiteral::Number("1.50".into()).emit(), "1.50");
        assert_eq!(TsLiteral::Bool(false).emit(), "false");
    }

    #[test]
    fn test_emit_union_array() {
        let ty = TsType::Array(Box::new(TsType::Union(vec![
            string(),
            TsType::Primitive(TsPrimitive::Null),
        ])));
        assert_eq!(ty.emit(), "(string | null)[]");
    }

    #[test]
    fn test_emit_precedence() {
        let union_in_intersection = TsType::Intersection(vec![
            TsType::named("A"),
            TsType::Union(vec![TsType::named("B"), TsType::named("C")]),
        ]);
        assert_eq!(union_in_intersection.emit(), "A & (B | C)");

        let keyof_array = TsType::Array(Box::new(TsType::Keyof(Box::new(TsType::named("T")))));
        assert_eq!(keyof_array.emit(), "(keyof T)[]");

        let indexed = TsType::IndexedAccess {
            object: Box::new(TsType::named("D")),
            index: Box::new(TsType::Literal(TsLiteral::String("itemTypeId".into()))),
        };
        assert_eq!(indexed.emit(), "D[\"itemTypeId\"]");
    }

    #[test]
    fn test_emit_generic_ref() {
        let ty = TsType::generic("Item", vec![TsType::named("D")]);
        assert_eq!(ty.emit(), "Item<D>");
    }

    #[test]
    fn test_emit_nested_object() {
        let ty = TsType::Object(vec![TsMember::prop(
            "data",
            TsType::Object(vec![TsMember::prop("id", string(), false)]),
            true,
        )]);
        assert_eq!(ty.emit(), "{\n  data?: {\n    id: string;\n  };\n}");
    }

    #[test]
    fn test_emit_interface_with_docs() {
        let def = TsTypeDef {
            name: "Upload".into(),
            doc: Some("A file.\n\nStored on S3.".into()),
            type_params: vec![],
            kind: TypeDefKind::Interface {
                extends: vec![],
                members: vec![
                    TsMember::Prop(TsProp {
                        name: "id".into(),
                        ty: string(),
                        optional: false,
                        readonly: false,
                        doc: Some("ID of upload".into()),
                    }),
                    TsMember::prop("content-type", string(), true),
                ],
            },
            is_export: true,
        };
        let expected = "/**\n * A file.\n *\n * Stored on S3.\n */\nexport interface Upload {\n  /**\n   * ID of upload\n   */\n  id: string;\n  \"content-type\"?: string;\n}\n";
        assert_eq!(def.emit(), expected);
    }

    #[test]
    fn test_emit_alias_with_params() {
        let def = TsTypeDef {
            name: "ItemSelfTargetSchema".into(),
            doc: None,
            type_params: vec![TsTypeParam {
                name: "D".into(),
                constraint: Some(TsType::named("ItemTypeDefinition")),
                default: Some(TsType::named("ItemTypeDefinition")),
            }],
            kind: TypeDefKind::TypeAlias {
                ty: TsType::generic("Item", vec![TsType::named("D")]),
            },
            is_export: true,
        };
        assert_eq!(
            def.emit(),
            "export type ItemSelfTargetSchema<D extends ItemTypeDefinition = ItemTypeDefinition> = Item<D>;\n"
        );
    }
}
