//! Parser for compiler-emitted TypeScript declaration files.
//!
//! Covers what schema-to-declaration compilers produce: `export`ed
//! `interface` and `type` declarations, JSDoc blocks, line and block
//! comments. A JSDoc block attaches to the declaration or member that
//! follows it unless a blank line separates them; other comments are
//! dropped.

use super::types::{
    TsIndexSignature, TsLiteral, TsMember, TsPrimitive, TsProp, TsType, TsTypeDef, TsTypeParam,
    TypeDefKind,
};
use crate::error::DeclarationError;

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Str(String),
    Num(String),
    Punct(char),
    Ellipsis,
    Doc(String),
}

#[derive(Debug, Clone)]
struct Token {
    tok: Tok,
    line: usize,
    column: usize,
    /// Line on which the token ends (differs from `line` for multi-line JSDoc)
    end_line: usize,
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Lexer {
            chars: src.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> DeclarationError {
        DeclarationError::Parse {
            line: self.line,
            column: self.column,
            message: message.into(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, DeclarationError> {
        let mut tokens = Vec::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() {
                self.bump();
                continue;
            }
            let (line, column) = (self.line, self.column);

            let tok = match c {
                '/' => {
                    self.bump();
                    match self.chars.peek() {
                        Some('/') => {
                            while self.chars.peek().is_some_and(|c| *c != '\n') {
                                self.bump();
                            }
                            continue;
                        }
                        Some('*') => {
                            self.bump();
                            match self.block_comment()? {
                                Some(doc) => Tok::Doc(doc),
                                None => continue,
                            }
                        }
                        _ => return Err(self.error("unexpected '/'")),
                    }
                }
                '"' | '\'' => {
                    self.bump();
                    Tok::Str(self.string(c)?)
                }
                '.' => {
                    self.bump();
                    if self.chars.peek() == Some(&'.') {
                        self.bump();
                        if self.bump() != Some('.') {
                            return Err(self.error("expected '...'"));
                        }
                        Tok::Ellipsis
                    } else {
                        Tok::Punct('.')
                    }
                }
                c if c.is_ascii_digit() => Tok::Num(self.take_while(|c| {
                    c.is_ascii_alphanumeric() || c == '.' || c == '_'
                })),
                c if c.is_alphabetic() || c == '_' || c == '$' => {
                    Tok::Ident(self.take_while(|c| c.is_alphanumeric() || c == '_' || c == '$'))
                }
                '{' | '}' | '(' | ')' | '[' | ']' | '<' | '>' | ';' | ',' | ':' | '?' | '|'
                | '&' | '=' | '-' => {
                    self.bump();
                    Tok::Punct(c)
                }
                other => return Err(self.error(format!("unexpected character '{other}'"))),
            };
            tokens.push(Token {
                tok,
                line,
                column,
                end_line: self.line,
            });
        }
        Ok(tokens)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(&c) = self.chars.peek() {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.bump();
        }
        out
    }

    /// Consume a block comment after `/*`. Returns the JSDoc text for `/** */`.
    fn block_comment(&mut self) -> Result<Option<String>, DeclarationError> {
        let is_doc = self.chars.peek() == Some(&'*');
        let mut body = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated comment")),
                Some('*') if self.chars.peek() == Some(&'/') => {
                    self.bump();
                    break;
                }
                Some(c) => body.push(c),
            }
        }
        if !is_doc {
            return Ok(None);
        }
        Ok(body.strip_prefix('*').map(doc_text))
    }

    fn string(&mut self, quote: char) -> Result<String, DeclarationError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(self.error("unterminated string literal")),
                Some('\\') => self.escape(&mut out)?,
                Some(c) if c == quote => return Ok(out),
                Some(c) => out.push(c),
            }
        }
    }

    /// Decode one escape sequence after `\` into `out`.
    fn escape(&mut self, out: &mut String) -> Result<(), DeclarationError> {
        let c = match self.bump() {
            None => return Err(self.error("unterminated string literal")),
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('b') => '\u{8}',
            Some('f') => '\u{c}',
            Some('v') => '\u{b}',
            Some('0') if !self.chars.peek().is_some_and(char::is_ascii_digit) => '\0',
            Some('0'..='7') => return Err(self.error("octal escape sequences are not supported")),
            Some('x') => {
                let code = self.hex_digits(2)?;
                self.scalar(code)?
            }
            Some('u') => self.unicode_escape()?,
            // Line continuation
            Some('\r') => {
                if self.chars.peek() == Some(&'\n') {
                    self.bump();
                }
                return Ok(());
            }
            Some('\n' | '\u{2028}' | '\u{2029}') => return Ok(()),
            Some(c) => c,
        };
        out.push(c);
        Ok(())
    }

    fn hex_digits(&mut self, count: usize) -> Result<u32, DeclarationError> {
        let mut code = 0;
        for _ in 0..count {
            let digit = self
                .chars
                .peek()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error("invalid hexadecimal escape"))?;
            self.bump();
            code = code * 16 + digit;
        }
        Ok(code)
    }

    fn scalar(&self, code: u32) -> Result<char, DeclarationError> {
        char::from_u32(code).ok_or_else(|| self.error(format!("invalid code point U+{code:04X}")))
    }

    /// `\uXXXX` or `\u{X...}`; a UTF-16 surrogate pair is written as two `\uXXXX`.
    fn unicode_escape(&mut self) -> Result<char, DeclarationError> {
        if self.chars.peek() == Some(&'{') {
            self.bump();
            let mut code: u32 = 0;
            let mut digits = 0;
            while let Some(digit) = self.chars.peek().and_then(|c| c.to_digit(16)) {
                self.bump();
                code = code
                    .checked_mul(16)
                    .and_then(|c| c.checked_add(digit))
                    .ok_or_else(|| self.error("unicode escape out of range"))?;
                digits += 1;
            }
            if digits == 0 || self.bump() != Some('}') {
                return Err(self.error("invalid unicode escape"));
            }
            return self.scalar(code);
        }

        let high = self.hex_digits(4)?;
        if !(0xD800..0xDC00).contains(&high) {
            return self.scalar(high);
        }
        if self.bump() != Some('\\') || self.bump() != Some('u') {
            return Err(self.error("unpaired surrogate in unicode escape"));
        }
        let low = self.hex_digits(4)?;
        if !(0xDC00..0xE000).contains(&low) {
            return Err(self.error("unpaired surrogate in unicode escape"));
        }
        self.scalar(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))
    }
}

/// Strip the leading `*` gutter of each JSDoc line and surrounding blank lines.
fn doc_text(body: &str) -> String {
    let lines: Vec<&str> = body
        .lines()
        .map(|line| {
            let line = line.trim();
            let line = line.strip_prefix('*').unwrap_or(line);
            line.strip_prefix(' ').unwrap_or(line).trim_end()
        })
        .collect();
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(start, |i| i + 1);
    lines[start..end].join("\n")
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|t| &t.tok)
    }

    fn peek_at(&self, offset: usize) -> Option<&Tok> {
        self.tokens.get(self.pos + offset).map(|t| &t.tok)
    }

    fn advance(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.pos).map(|t| t.tok.clone());
        self.pos += 1;
        tok
    }

    fn error(&self, message: impl Into<String>) -> DeclarationError {
        let (line, column) = self
            .tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or((1, 1), |t| (t.line, t.column));
        DeclarationError::Parse {
            line,
            column,
            message: message.into(),
        }
    }

    fn is_punct(&self, c: char) -> bool {
        self.peek() == Some(&Tok::Punct(c))
    }

    fn is_ident(&self, word: &str) -> bool {
        matches!(self.peek(), Some(Tok::Ident(w)) if w == word)
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.is_punct(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_ident(&mut self, word: &str) -> bool {
        if self.is_ident(word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, c: char) -> Result<(), DeclarationError> {
        if self.eat_punct(c) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{c}'")))
        }
    }

    fn ident(&mut self) -> Result<String, DeclarationError> {
        match self.peek() {
            Some(Tok::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.error("expected identifier")),
        }
    }

    /// Take a JSDoc block if the next significant token directly follows it.
    fn doc(&mut self) -> Option<String> {
        let mut doc = None;
        while let Some(Token {
            tok: Tok::Doc(text),
            end_line,
            ..
        }) = self.tokens.get(self.pos)
        {
            let attached = self
                .tokens
                .get(self.pos + 1)
                .is_some_and(|next| next.line <= end_line + 1);
            doc = attached.then(|| text.clone());
            self.pos += 1;
        }
        doc
    }

    fn declarations(&mut self) -> Result<Vec<TsTypeDef>, DeclarationError> {
        let mut defs = Vec::new();
        loop {
            let doc = self.doc();
            if self.peek().is_none() {
                return Ok(defs);
            }
            if self.eat_punct(';') {
                continue;
            }
            defs.push(self.declaration(doc)?);
        }
    }

    fn declaration(&mut self, doc: Option<String>) -> Result<TsTypeDef, DeclarationError> {
        let is_export = self.eat_ident("export");
        self.eat_ident("declare");

        if self.eat_ident("interface") {
            let name = self.ident()?;
            let type_params = self.type_params()?;
            let mut extends = Vec::new();
            if self.eat_ident("extends") {
                loop {
                    extends.push(self.postfix()?);
                    if !self.eat_punct(',') {
                        break;
                    }
                }
            }
            self.expect_punct('{')?;
            let members = self.members()?;
            Ok(TsTypeDef {
                name,
                doc,
                type_params,
                kind: TypeDefKind::Interface { extends, members },
                is_export,
            })
        } else if self.eat_ident("type") {
            let name = self.ident()?;
            let type_params = self.type_params()?;
            self.expect_punct('=')?;
            let ty = self.ty()?;
            self.eat_punct(';');
            Ok(TsTypeDef {
                name,
                doc,
                type_params,
                kind: TypeDefKind::TypeAlias { ty },
                is_export,
            })
        } else {
            Err(self.error("expected 'interface' or 'type' declaration"))
        }
    }

    fn type_params(&mut self) -> Result<Vec<TsTypeParam>, DeclarationError> {
        let mut params = Vec::new();
        if !self.eat_punct('<') {
            return Ok(params);
        }
        while !self.eat_punct('>') {
            let name = self.ident()?;
            let constraint = if self.eat_ident("extends") {
                Some(self.union()?)
            } else {
                None
            };
            let default = if self.eat_punct('=') {
                Some(self.ty()?)
            } else {
                None
            };
            params.push(TsTypeParam {
                name,
                constraint,
                default,
            });
            if !self.eat_punct(',') {
                self.expect_punct('>')?;
                break;
            }
        }
        Ok(params)
    }

    /// Members after the opening `{`, through the closing `}`.
    fn members(&mut self) -> Result<Vec<TsMember>, DeclarationError> {
        let mut members = Vec::new();
        loop {
            let doc = self.doc();
            if self.eat_punct('}') {
                return Ok(members);
            }
            members.push(self.member(doc)?);
            if !self.eat_punct(';') && !self.eat_punct(',') && !self.is_punct('}') {
                return Err(self.error("expected ';' or '}' after member"));
            }
        }
    }

    fn member(&mut self, doc: Option<String>) -> Result<TsMember, DeclarationError> {
        // `readonly` is a modifier unless it is the property name itself.
        let readonly = self.is_ident("readonly")
            && !matches!(self.peek_at(1), Some(Tok::Punct(':' | '?' | ';' | ',' | '}')));
        if readonly {
            self.pos += 1;
        }

        if self.eat_punct('[') {
            let key_name = self.ident()?;
            self.expect_punct(':')?;
            let key_ty = self.ty()?;
            self.expect_punct(']')?;
            self.expect_punct(':')?;
            let value = self.ty()?;
            return Ok(TsMember::Index(TsIndexSignature {
                key_name,
                key_ty,
                value,
                readonly,
                doc,
            }));
        }

        let name = match self.advance() {
            Some(Tok::Ident(name) | Tok::Str(name) | Tok::Num(name)) => name,
            _ => {
                self.pos -= 1;
                return Err(self.error("expected property name"));
            }
        };
        let optional = self.eat_punct('?');
        self.expect_punct(':')?;
        let ty = self.ty()?;
        Ok(TsMember::Prop(TsProp {
            name,
            ty,
            optional,
            readonly,
            doc,
        }))
    }

    fn ty(&mut self) -> Result<TsType, DeclarationError> {
        let check = self.union()?;
        if !self.eat_ident("extends") {
            return Ok(check);
        }
        let extends = self.union()?;
        self.expect_punct('?')?;
        let true_type = self.ty()?;
        self.expect_punct(':')?;
        let false_type = self.ty()?;
        Ok(TsType::Conditional {
            check: Box::new(check),
            extends: Box::new(extends),
            true_type: Box::new(true_type),
            false_type: Box::new(false_type),
        })
    }

    fn union(&mut self) -> Result<TsType, DeclarationError> {
        self.eat_punct('|');
        let mut types = vec![self.intersection()?];
        while self.eat_punct('|') {
            types.push(self.intersection()?);
        }
        Ok(if types.len() == 1 {
            types.remove(0)
        } else {
            TsType::Union(types)
        })
    }

    fn intersection(&mut self) -> Result<TsType, DeclarationError> {
        self.eat_punct('&');
        let mut types = vec![self.prefix()?];
        while self.eat_punct('&') {
            types.push(self.prefix()?);
        }
        Ok(if types.len() == 1 {
            types.remove(0)
        } else {
            TsType::Intersection(types)
        })
    }

    fn prefix(&mut self) -> Result<TsType, DeclarationError> {
        if self.eat_ident("keyof") {
            return Ok(TsType::Keyof(Box::new(self.prefix()?)));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<TsType, DeclarationError> {
        let mut ty = self.primary()?;
        while self.eat_punct('[') {
            if self.eat_punct(']') {
                ty = TsType::Array(Box::new(ty));
            } else {
                let index = self.ty()?;
                self.expect_punct(']')?;
                ty = TsType::IndexedAccess {
                    object: Box::new(ty),
                    index: Box::new(index),
                };
            }
        }
        Ok(ty)
    }

    fn primary(&mut self) -> Result<TsType, DeclarationError> {
        let Some(tok) = self.advance() else {
            return Err(self.error("unexpected end of input, expected a type"));
        };
        match tok {
            Tok::Punct('(') => {
                let inner = self.ty()?;
                self.expect_punct(')')?;
                Ok(inner)
            }
            Tok::Punct('{') => Ok(TsType::Object(self.members()?)),
            Tok::Punct('[') => {
                let mut items = Vec::new();
                while !self.eat_punct(']') {
                    let item = if matches!(self.peek(), Some(Tok::Ellipsis)) {
                        self.pos += 1;
                        TsType::Rest(Box::new(self.ty()?))
                    } else {
                        self.ty()?
                    };
                    items.push(item);
                    if !self.eat_punct(',') {
                        self.expect_punct(']')?;
                        break;
                    }
                }
                Ok(TsType::Tuple(items))
            }
            Tok::Punct('-') => match self.advance() {
                Some(Tok::Num(n)) => Ok(TsType::Literal(TsLiteral::Number(format!("-{n}")))),
                _ => {
                    self.pos -= 1;
                    Err(self.error("expected number after '-'"))
                }
            },
            Tok::Str(s) => Ok(TsType::Literal(TsLiteral::String(s))),
            Tok::Num(n) => Ok(TsType::Literal(TsLiteral::Number(n))),
            Tok::Ident(word) => self.named(word),
            _ => {
                self.pos -= 1;
                Err(self.error("expected a type"))
            }
        }
    }

    fn named(&mut self, word: String) -> Result<TsType, DeclarationError> {
        let primitive = match word.as_str() {
            "string" => Some(TsPrimitive::String),
            "number" => Some(TsPrimitive::Number),
            "boolean" => Some(TsPrimitive::Boolean),
            "null" => Some(TsPrimitive::Null),
            "undefined" => Some(TsPrimitive::Undefined),
            "void" => Some(TsPrimitive::Void),
            "unknown" => Some(TsPrimitive::Unknown),
            "any" => Some(TsPrimitive::Any),
            "never" => Some(TsPrimitive::Never),
            "object" => Some(TsPrimitive::Object),
            _ => None,
        };
        if let Some(p) = primitive {
            return Ok(TsType::Primitive(p));
        }
        match word.as_str() {
            "true" => return Ok(TsType::Literal(TsLiteral::Bool(true))),
            "false" => return Ok(TsType::Literal(TsLiteral::Bool(false))),
            _ => {}
        }

        let mut name = word;
        while self.is_punct('.') {
            self.pos += 1;
            name.push('.');
            name.push_str(&self.ident()?);
        }

        let mut args = Vec::new();
        if self.eat_punct('<') {
            loop {
                args.push(self.ty()?);
                if !self.eat_punct(',') {
                    break;
                }
            }
            self.expect_punct('>')?;
        }
        Ok(TsType::Ref { name, args })
    }
}

/// Parse a declaration file into top-level declarations, in source order.
pub fn parse_declarations(src: &str) -> Result<Vec<TsTypeDef>, DeclarationError> {
    let tokens = Lexer::new(src).tokenize()?;
    Parser { tokens, pos: 0 }.declarations()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::declarations::emit::Emit;

    fn members(def: &TsTypeDef) -> &[TsMember] {
        match &def.kind {
            TypeDefKind::Interface { members, .. } => members,
            TypeDefKind::TypeAlias { .. } => &[],
        }
    }

    fn prop(member: &TsMember) -> Option<&TsProp> {
        match member {
            TsMember::Prop(p) => Some(p),
            TsMember::Index(_) => None,
        }
    }

    #[test]
    fn test_parse_compiler_output() {
        let src = r#"/* eslint-disable */
/**
 * This file was automatically generated by json-schema-to-typescript.
 * DO NOT MODIFY IT BY HAND.
 */

/**
 * A record.
 */
export interface Item {
  /**
   * ID of the record
   */
  id: string;
  type: "item";
  meta?: {
    created_at: string;
    status: "draft" | "updated" | "published" | null;
  };
}
export type ItemIdentity = string;
"#;
        let defs = parse_declarations(src).unwrap();
        assert_eq!(defs.len(), 2);

        let item = &defs[0];
        assert_eq!(item.name, "Item");
        assert_eq!(item.doc.as_deref(), Some("A record."));
        assert!(item.is_export);
        let item_members = members(item);
        assert_eq!(item_members.len(), 3);
        let id = prop(&item_members[0]).unwrap();
        assert_eq!(id.doc.as_deref(), Some("ID of the record"));
        assert!(prop(&item_members[2]).unwrap().optional);

        assert_eq!(defs[1].name, "ItemIdentity");
        assert_eq!(defs[1].doc, None);
    }

    #[test]
    fn test_banner_not_attached() {
        let src = "/**\n * Banner\n */\n\nexport type A = string;\n";
        let defs = parse_declarations(src).unwrap();
        assert_eq!(defs[0].doc, None);
    }

    #[test]
    fn test_parse_index_signature_and_arrays() {
        let src = r#"export interface ItemCreateSchema {
  [k: string]: unknown;
  tags?: (string | number)[];
  pair: [string, ...number[]];
  "content-type": string;
  readonly: boolean;
}"#;
        let defs = parse_declarations(src).unwrap();
        assert!(members(&defs[0])[0].is_index());
        let out = defs[0].emit();
        assert!(out.contains("  [k: string]: unknown;\n"), "index signature: {out}");
        assert!(out.contains("  tags?: (string | number)[];\n"), "array of union: {out}");
        assert!(out.contains("  pair: [string, ...number[]];\n"), "rest tuple: {out}");
        assert!(out.contains("  \"content-type\": string;\n"), "quoted key: {out}");
        assert!(out.contains("  readonly: boolean;\n"), "readonly as name: {out}");
    }

    #[test]
    fn test_parse_generics_and_conditionals() {
        let src = "export type T<D extends ItemTypeDefinition = ItemTypeDefinition, N extends boolean = false> = N extends false ? Item<D> : Partial<Record<string, Item<D>>>;";
        let defs = parse_declarations(src).unwrap();
        assert_eq!(defs[0].type_params.len(), 2);
        assert_eq!(defs[0].emit().trim_end(), src);
    }

    #[test]
    fn test_parse_indexed_access_and_keyof() {
        let src = "export type K = keyof D[\"attributes\"];";
        let defs = parse_declarations(src).unwrap();
        assert!(matches!(
            &defs[0].kind,
            TypeDefKind::TypeAlias { ty: TsType::Keyof(inner) }
                if matches!(**inner, TsType::IndexedAccess { .. })
        ));
    }

    #[test]
    fn test_parse_error_position() {
        let err = parse_declarations("export type A = string;\nexport type B = ;").unwrap_err();
        assert_eq!(
            err,
            DeclarationError::Parse {
                line: 2,
                column: 17,
                message: "expected a type".into()
            }
        );
    }

    #[test]
    fn test_string_escapes_decoded() {
        let src = r#"export type A = "line1\nline2" | 'caf\u00e9' | "\u{1F600}" | "\uD83D\uDE00" | "it\'s" | "\x41\0";"#;
        let defs = parse_declarations(src).unwrap();
        let items = match &defs[0].kind {
            TypeDefKind::TypeAlias { ty: TsType::Union(items) } => items.as_slice(),
            _ => &[],
        };
        let values: Vec<_> = items
            .iter()
            .filter_map(|t| match t {
                TsType::Literal(TsLiteral::String(s)) => Some(s.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(values, vec!["line1\nline2", "café", "😀", "😀", "it's", "A\0"]);
    }

    #[test]
    fn test_invalid_string_escapes() {
        assert!(parse_declarations(r#"export type A = "\uD83D";"#).is_err(), "unpaired surrogate");
        assert!(parse_declarations(r#"export type A = "\xZZ";"#).is_err(), "bad hex");
        assert!(parse_declarations(r#"export type A = "\12";"#).is_err(), "octal");
    }

    #[test]
    fn test_unterminated_comment() {
        assert!(parse_declarations("/* open").is_err());
    }
}
