//! Declaration rewrites: drop, rename and generic parametrization.

use tracing::debug;

use super::emit::emit_declarations;
use super::parse::parse_declarations;
use super::rules::{Rule, RuleTable, TypeNames};
use super::types::{TsLiteral, TsMember, TsPrimitive, TsProp, TsType, TsTypeDef, TsTypeParam, TypeDefKind};
use crate::error::DeclarationError;

const DEFINITION_PARAM: &str = "D";
const NESTED_PARAM: &str = "NestedMode";
const INCLUDED_KEY: &str = "included";
const ATTRIBUTES_KEY: &str = "attributes";
const ITEM_TYPE_ID_KEY: &str = "__itemTypeId";

/// Apply the rule table to a batch of declarations.
///
/// Unmatched declarations pass through unchanged; order is preserved.
pub fn rewrite_declarations(batch: Vec<TsTypeDef>, rules: &RuleTable) -> Vec<TsTypeDef> {
    let types = rules.types();
    batch
        .into_iter()
        .filter_map(|def| {
            let Some(rule) = rules.rule(&def.name) else {
                return Some(def);
            };
            debug!(name = %def.name, rule = rule.bucket(), "Rewriting declaration.");
            match rule {
                Rule::Drop => None,
                Rule::Rename(to) => Some(TsTypeDef {
                    name: to.clone(),
                    ..def
                }),
                Rule::TargetSchema => Some(rewrite_target_schema(def, types)),
                Rule::ItemSchema => Some(rewrite_item_schema(def, types)),
                Rule::Relationships => Some(rewrite_relationships(def, types)),
            }
        })
        .collect()
}

/// Parse compiler output, rewrite it and emit the final declaration source.
pub fn rewrite_declaration_source(src: &str, rules: &RuleTable) -> Result<String, DeclarationError> {
    let batch = parse_declarations(src)?;
    let count = batch.len();
    let rewritten = rewrite_declarations(batch, rules);
    debug!(input = count, output = rewritten.len(), "Rewrote declaration batch.");
    Ok(emit_declarations(&rewritten))
}

fn d() -> TsType {
    TsType::named(DEFINITION_PARAM)
}

fn definition_param(types: &TypeNames) -> TsTypeParam {
    TsTypeParam {
        name: DEFINITION_PARAM.to_string(),
        constraint: Some(TsType::named(&types.definition)),
        default: Some(TsType::named(&types.definition)),
    }
}

fn nested_param() -> TsTypeParam {
    TsTypeParam {
        name: NESTED_PARAM.to_string(),
        constraint: Some(TsType::Primitive(TsPrimitive::Boolean)),
        default: Some(TsType::Literal(TsLiteral::Bool(false))),
    }
}

/// Rebuild `ty`, replacing bare references via `f`.
///
/// `suppress` is true below any property named `included` and is handed to
/// `f` with each reference.
fn map_refs<F>(ty: &TsType, suppress: bool, f: &F) -> TsType
where
    F: Fn(&str, bool) -> Option<TsType>,
{
    let boxed = |inner: &TsType| -> Box<TsType> { Box::new(map_refs(inner, suppress, f)) };
    let all = |types: &[TsType]| -> Vec<TsType> {
        types.iter().map(|t| map_refs(t, suppress, f)).collect()
    };

    match ty {
        TsType::Ref { name, args } if args.is_empty() => {
            f(name.as_str(), suppress).unwrap_or_else(|| ty.clone())
        }
        TsType::Ref { name, args } => TsType::generic(name.clone(), all(args)),
        TsType::Primitive(_) | TsType::Literal(_) => ty.clone(),
        TsType::Array(inner) => TsType::Array(boxed(inner)),
        TsType::Rest(inner) => TsType::Rest(boxed(inner)),
        TsType::Keyof(inner) => TsType::Keyof(boxed(inner)),
        TsType::Tuple(items) => TsType::Tuple(all(items)),
        TsType::Union(types) => TsType::Union(all(types)),
        TsType::Intersection(types) => TsType::Intersection(all(types)),
        TsType::Object(members) => TsType::Object(map_member_refs(members, suppress, f)),
        TsType::Conditional {
            check,
            extends,
            true_type,
            false_type,
        } => TsType::Conditional {
            check: boxed(check),
            extends: boxed(extends),
            true_type: boxed(true_type),
            false_type: boxed(false_type),
        },
        TsType::IndexedAccess { object, index } => TsType::IndexedAccess {
            object: boxed(object),
            index: boxed(index),
        },
    }
}

fn map_member_refs<F>(members: &[TsMember], suppress: bool, f: &F) -> Vec<TsMember>
where
    F: Fn(&str, bool) -> Option<TsType>,
{
    members
        .iter()
        .map(|member| match member {
            TsMember::Prop(prop) => TsMember::Prop(TsProp {
                ty: map_refs(&prop.ty, suppress || prop.name == INCLUDED_KEY, f),
                ..prop.clone()
            }),
            TsMember::Index(sig) => {
                let mut sig = sig.clone();
                sig.value = map_refs(&sig.value, suppress, f);
                TsMember::Index(sig)
            }
        })
        .collect()
}

/// `Record` -> `<to><D>`, except below `included`.
fn parametrize_record(ty: &TsType, types: &TypeNames, to: &str) -> TsType {
    map_refs(ty, false, &|name: &str, suppress: bool| {
        (name == types.record && !suppress).then(|| TsType::generic(to, vec![d()]))
    })
}

/// `TypeMetadata` -> `TypeMetadata<D>` everywhere.
fn metadata_ref(types: &TypeNames) -> impl Fn(&str, bool) -> Option<TsType> + '_ {
    move |name: &str, _: bool| {
        (name == types.type_metadata).then(|| TsType::generic(name, vec![d()]))
    }
}

fn parametrize_metadata(ty: &TsType, types: &TypeNames) -> TsType {
    map_refs(ty, false, &metadata_ref(types))
}

fn rewrite_target_schema(def: TsTypeDef, types: &TypeNames) -> TsTypeDef {
    let body = def.body();
    let conditional = TsType::Conditional {
        check: Box::new(TsType::named(NESTED_PARAM)),
        extends: Box::new(TsType::Literal(TsLiteral::Bool(false))),
        true_type: Box::new(parametrize_record(&body, types, &types.record)),
        false_type: Box::new(parametrize_record(&body, types, &types.nested_record)),
    };

    let mut type_params = def.type_params;
    type_params.push(definition_param(types));
    type_params.push(nested_param());

    TsTypeDef {
        type_params,
        kind: TypeDefKind::TypeAlias { ty: conditional },
        ..def
    }
}

fn rewrite_relationships(def: TsTypeDef, types: &TypeNames) -> TsTypeDef {
    let kind = match def.kind {
        TypeDefKind::Interface { extends, members } => TypeDefKind::Interface {
            extends: extends.iter().map(|t| parametrize_metadata(t, types)).collect(),
            members: map_member_refs(&members, false, &metadata_ref(types)),
        },
        TypeDefKind::TypeAlias { ty } => TypeDefKind::TypeAlias {
            ty: parametrize_metadata(&ty, types),
        },
    };

    let mut type_params = def.type_params;
    type_params.push(definition_param(types));
    TsTypeDef {
        type_params,
        kind,
        ..def
    }
}

/// Replace open `attributes` shapes, at any depth, with the per-record request attributes.
fn type_attributes(ty: &TsType, types: &TypeNames) -> TsType {
    match ty {
        TsType::Object(members) => TsType::Object(type_member_attributes(members, types)),
        TsType::Union(items) => TsType::Union(items.iter().map(|t| type_attributes(t, types)).collect()),
        TsType::Intersection(items) => {
            TsType::Intersection(items.iter().map(|t| type_attributes(t, types)).collect())
        }
        TsType::Array(inner) => TsType::Array(Box::new(type_attributes(inner, types))),
        _ => ty.clone(),
    }
}

fn type_member_attributes(members: &[TsMember], types: &TypeNames) -> Vec<TsMember> {
    members
        .iter()
        .map(|member| match member {
            TsMember::Prop(prop) if prop.name == ATTRIBUTES_KEY && prop.ty.is_open_object() => {
                TsMember::Prop(TsProp {
                    ty: TsType::generic(&types.attributes_in_request, vec![d()]),
                    ..prop.clone()
                })
            }
            TsMember::Prop(prop) => TsMember::Prop(TsProp {
                ty: type_attributes(&prop.ty, types),
                ..prop.clone()
            }),
            TsMember::Index(_) => member.clone(),
        })
        .collect()
}

fn item_type_id_member() -> TsMember {
    TsMember::prop(
        ITEM_TYPE_ID_KEY,
        TsType::IndexedAccess {
            object: Box::new(d()),
            index: Box::new(TsType::Literal(TsLiteral::String("itemTypeId".to_string()))),
        },
        true,
    )
}

fn rewrite_item_schema(def: TsTypeDef, types: &TypeNames) -> TsTypeDef {
    let TsTypeDef {
        name,
        doc,
        mut type_params,
        kind,
        is_export,
    } = def;
    type_params.push(definition_param(types));

    let (is_interface, extends, members) = match kind {
        TypeDefKind::Interface { extends, members } => (true, extends, members),
        TypeDefKind::TypeAlias {
            ty: TsType::Object(members),
        } => (false, Vec::new(), members),
        TypeDefKind::TypeAlias { ty } => {
            // Not an object shape: intersect with the type-id member.
            let ty = type_attributes(&parametrize_metadata(&ty, types), types);
            return TsTypeDef {
                name,
                doc,
                type_params,
                kind: TypeDefKind::TypeAlias {
                    ty: TsType::Intersection(vec![ty, TsType::Object(vec![item_type_id_member()])]),
                },
                is_export,
            };
        }
    };

    let members = map_member_refs(&members, false, &metadata_ref(types));
    let mut members = type_member_attributes(&members, types);
    let extends: Vec<TsType> = extends.iter().map(|t| parametrize_metadata(t, types)).collect();

    let open = members.iter().any(TsMember::is_open_index);
    members.retain(|m| !m.is_open_index());
    members.push(item_type_id_member());

    let kind = if open {
        let mut parts = extends;
        parts.push(TsType::Object(members));
        parts.push(TsType::generic(&types.attributes_in_request, vec![d()]));
        TypeDefKind::TypeAlias {
            ty: TsType::Intersection(parts),
        }
    } else if is_interface {
        TypeDefKind::Interface { extends, members }
    } else {
        TypeDefKind::TypeAlias {
            ty: TsType::Object(members),
        }
    };

    TsTypeDef {
        name,
        doc,
        type_params,
        kind,
        is_export,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::declarations::emit::Emit;
    use crate::declarations::rules::RuleSet;

    fn table() -> RuleTable {
        RuleTable::build(&RuleSet::default()).unwrap()
    }

    fn rewrite_one(src: &str) -> String {
        let defs = parse_declarations(src).unwrap();
        let out = rewrite_declarations(defs, &table());
        assert_eq!(out.len(), 1);
        out[0].emit()
    }

    #[test]
    fn test_target_schema_conditional() {
        let out = rewrite_one("export interface ItemSelfTargetSchema {\n  data: Item;\n}\n");
        let expected = "export type ItemSelfTargetSchema<D extends ItemTypeDefinition = ItemTypeDefinition, NestedMode extends boolean = false> = NestedMode extends false ? {\n  data: Item<D>;\n} : {\n  data: ItemInNestedResponse<D>;\n};\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_target_schema_included_stays_plain() {
        let out = rewrite_one(
            "export interface ItemInstancesTargetSchema {\n  data: Item[];\n  included?: {\n    data: Item;\n  };\n}\n",
        );
        assert!(out.contains("  data: Item<D>[];\n"), "plain arm: {out}");
        assert!(out.contains("  data: ItemInNestedResponse<D>[];\n"), "nested arm: {out}");
        assert_eq!(
            out.matches("    data: Item;\n").count(),
            2,
            "included.data must stay unparameterized in both arms: {out}"
        );
        assert!(!out.contains("Item<D>;\n  };"), "included parametrized: {out}");
    }

    #[test]
    fn test_item_schema_attributes() {
        let out = rewrite_one(
            "export interface ItemCreateSchema {\n  type: \"item\";\n  attributes: {\n    [k: string]: unknown;\n  };\n  relationships: {\n    item_type: {\n      data: ItemTypeData;\n    };\n  };\n}\n",
        );
        assert!(
            out.starts_with("export interface ItemCreateSchema<D extends ItemTypeDefinition = ItemTypeDefinition> {"),
            "header: {out}"
        );
        assert!(out.contains("  attributes: ToItemAttributesInRequest<D>;\n"), "attributes: {out}");
        assert!(out.contains("data: ItemTypeData<D>;"), "metadata: {out}");
        assert!(out.ends_with("  __itemTypeId?: D[\"itemTypeId\"];\n}\n"), "type id: {out}");
    }

    #[test]
    fn test_item_schema_top_level_index_becomes_intersection() {
        let out = rewrite_one(
            "export interface ItemUpdateSchema {\n  id?: string;\n  item_type?: ItemTypeData;\n  [k: string]: unknown;\n}\n",
        );
        let expected = "export type ItemUpdateSchema<D extends ItemTypeDefinition = ItemTypeDefinition> = {\n  id?: string;\n  item_type?: ItemTypeData<D>;\n  __itemTypeId?: D[\"itemTypeId\"];\n} & ToItemAttributesInRequest<D>;\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_item_schema_typed_index_kept() {
        let out = rewrite_one("export interface ItemCreateSchema {\n  id?: string;\n  [k: string]: string;\n}\n");
        let expected = "export interface ItemCreateSchema<D extends ItemTypeDefinition = ItemTypeDefinition> {\n  id?: string;\n  [k: string]: string;\n  __itemTypeId?: D[\"itemTypeId\"];\n}\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_typed_attributes_untouched() {
        let out = rewrite_one("export interface ItemCreateSchema {\n  attributes: {\n    title: string;\n  };\n}\n");
        assert!(out.contains("    title: string;\n"), "typed attributes kept: {out}");
        assert!(!out.contains("ToItemAttributesInRequest"), "no replacement: {out}");
    }

    #[test]
    fn test_relationships() {
        let out = rewrite_one(
            "export interface ItemRelationships {\n  item_type: {\n    data: ItemTypeData;\n  };\n  creator: {\n    data: AccountData;\n  };\n}\n",
        );
        assert!(out.starts_with("export interface ItemRelationships<D extends ItemTypeDefinition = ItemTypeDefinition> {"));
        assert!(out.contains("data: ItemTypeData<D>;"), "metadata: {out}");
        assert!(out.contains("data: AccountData;"), "other refs: {out}");
    }

    #[test]
    fn test_drop_rename_passthrough_keep_order() {
        let src = "export type ItemAttributes = {};\nexport interface Upload {\n  id: string;\n}\nexport interface Item {\n  id: string;\n}\nexport type Account = string;\n";
        let out = rewrite_declarations(parse_declarations(src).unwrap(), &table());
        let names: Vec<_> = out.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Upload", "ItemStableShell", "Account"]);
        assert!(out[1].type_params.is_empty());
    }

    #[test]
    fn test_rewrite_source() {
        let src = "/* eslint-disable */\n\nexport type ItemIdentity = string;\nexport interface ItemDestroyTargetSchema {\n  data: Item;\n}\n";
        let out = rewrite_declaration_source(src, &table()).unwrap();
        assert!(out.starts_with("export type ItemIdentity = string;\n\nexport type ItemDestroyTargetSchema<"), "{out}");
    }

    #[test]
    fn test_passthrough_string_escapes_survive() {
        let src = r#"export type A = "line1\nline2";
export type B = "caf\u00e9";
export interface C {
  "two\nlines": "tab\there";
}
"#;
        let out = rewrite_declaration_source(src, &table()).unwrap();
        let expected = r#"export type A = "line1\nline2";

export type B = "café";

export interface C {
  "two\nlines": "tab\there";
}
"#;
        assert_eq!(out, expected);
        assert_eq!(
            parse_declarations(&out).unwrap(),
            parse_declarations(src).unwrap(),
            "emitted source parses back to the same declarations"
        );
    }

    #[test]
    fn test_rewrite_source_parse_error() {
        assert!(matches!(
            rewrite_declaration_source("export interface {", &table()),
            Err(DeclarationError::Parse { line: 1, .. })
        ));
    }
}
