//! Schema extraction: command descriptors from the declarative command table.
//!
//! The schema source is a TypeScript module exporting an array of object
//! literals. Only literal data is trusted: a command whose `name` or
//! `inputSchema.properties.action.enum` chain is not made of literals is
//! skipped with a positional [`Diagnostic`], never guessed.
//!
//! This is not a TypeScript parser. The tokenizer understands enough of the
//! lexical grammar (comments, quoted and template strings) to keep brackets
//! balanced, and the expression reader only builds structure for string,
//! object and array literals. Everything else collapses into
//! [`Expr::Other`]. Statements may end at a line break instead of `;`.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use crate::error::{DIAGNOSTIC_SAMPLE_LIMIT, SyncError};

/// Nested object keys leading from a command to its action schema.
const ACTION_SCHEMA_CHAIN: [&str; 3] = ["inputSchema", "properties", "action"];

/// Extracted `{name, declaredActions}` contract for one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandDescriptor {
    pub name: String,
    pub declared_actions: BTreeSet<String>,
}

/// A soft, per-command problem found while walking the schema source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{} {}", self.file, self.line, self.column, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub descriptors: BTreeMap<String, CommandDescriptor>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Extract every statically resolvable command from the exported `table`
/// binding of `source`.
///
/// Fails with [`SyncError::NoDescriptors`] when the walk produces nothing,
/// which usually means the schema format changed underneath us.
pub fn extract_command_table(
    source: &str,
    file_name: &str,
    table: &str,
) -> Result<Extraction, SyncError> {
    let tokens = tokenize(source);
    let mut walker = TableWalker {
        file_name,
        extraction: Extraction::default(),
    };

    let mut reader = Reader::new(&tokens);
    while !reader.at_end() {
        if reader.eat_word("export") {
            reader.eat_word("declare");
            if reader.eat_word("const") || reader.eat_word("let") || reader.eat_word("var") {
                for (binding, value) in reader.declarators() {
                    if binding == table {
                        walker.visit_table(&value);
                    }
                }
                continue;
            }
        }
        reader.bump();
    }

    if walker.extraction.descriptors.is_empty() {
        let mut diagnostics = walker.extraction.diagnostics;
        diagnostics.truncate(DIAGNOSTIC_SAMPLE_LIMIT);
        return Err(SyncError::NoDescriptors {
            path: PathBuf::from(file_name),
            diagnostics,
        });
    }
    tracing::debug!(
        file = file_name,
        commands = walker.extraction.descriptors.len(),
        skipped = walker.extraction.diagnostics.len(),
        "extracted command table"
    );
    Ok(walker.extraction)
}

struct TableWalker<'a> {
    file_name: &'a str,
    extraction: Extraction,
}

impl TableWalker<'_> {
    fn report(&mut self, pos: Pos, message: String) {
        let diagnostic = Diagnostic {
            file: self.file_name.to_string(),
            line: pos.line,
            column: pos.column,
            message,
        };
        tracing::warn!("{diagnostic}");
        self.extraction.diagnostics.push(diagnostic);
    }

    fn visit_table(&mut self, value: &Node) {
        let Expr::Array(elements) = &value.expr else {
            self.report(
                value.pos,
                "command table is not an array literal; skipping".to_string(),
            );
            return;
        };
        for element in elements {
            match &element.expr {
                Expr::Object(members) => self.visit_command(element.pos, members),
                _ => self.report(
                    element.pos,
                    "command entry is not an object literal; skipping".to_string(),
                ),
            }
        }
    }

    fn visit_command(&mut self, pos: Pos, members: &[Member]) {
        let Some(name_member) = member(members, "name") else {
            self.report(
                pos,
                "command definition has no `name` property; skipping".to_string(),
            );
            return;
        };
        let name = match &name_member.value.expr {
            Expr::Str(name) if !name.is_empty() => name.clone(),
            Expr::Str(_) => {
                self.report(
                    name_member.pos,
                    "command definition has empty name; skipping".to_string(),
                );
                return;
            }
            _ => {
                self.report(
                    name_member.pos,
                    "command definition has non-literal name; skipping".to_string(),
                );
                return;
            }
        };

        let mut scope = members;
        for (idx, key) in ACTION_SCHEMA_CHAIN.iter().enumerate() {
            match member(scope, key).map(|found| &found.value.expr) {
                Some(Expr::Object(inner)) => scope = inner.as_slice(),
                _ => {
                    let chain = ACTION_SCHEMA_CHAIN[..=idx].join(".");
                    self.report(
                        pos,
                        format!("command '{name}' missing {chain} literal; skipping"),
                    );
                    return;
                }
            }
        }

        let Some(enum_member) = member(scope, "enum") else {
            self.report(pos, format!("command '{name}' has no action enum; skipping"));
            return;
        };
        let Expr::Array(values) = &enum_member.value.expr else {
            self.report(
                enum_member.pos,
                format!("command '{name}' action enum not a string literal array; skipping"),
            );
            return;
        };
        let mut declared_actions = BTreeSet::new();
        for value in values {
            let Expr::Str(action) = &value.expr else {
                self.report(
                    value.pos,
                    format!("command '{name}' action enum has a non-literal element; skipping"),
                );
                return;
            };
            declared_actions.insert(action.clone());
        }
        if declared_actions.is_empty() {
            self.report(
                enum_member.pos,
                format!("command '{name}' action enum is empty; skipping"),
            );
            return;
        }

        // Later definitions win, as they would when the module is evaluated.
        self.extraction.descriptors.insert(
            name.clone(),
            CommandDescriptor {
                name,
                declared_actions,
            },
        );
    }
}

/// Object member lookup with object-literal semantics: the last key wins.
fn member<'a>(members: &'a [Member], key: &str) -> Option<&'a Member> {
    members
        .iter()
        .rev()
        .find(|member| member.key.as_deref() == Some(key))
}

// ---------------------------------------------------------------------------
// Literal expression tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pos {
    line: usize,
    column: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Str(String),
    Object(Vec<Member>),
    Array(Vec<Node>),
    Other,
}

#[derive(Debug, Clone, PartialEq)]
struct Node {
    expr: Expr,
    pos: Pos,
}

/// `key` is `None` for spreads and computed keys, which can never satisfy
/// a required property.
#[derive(Debug, Clone, PartialEq)]
struct Member {
    key: Option<String>,
    value: Node,
    pos: Pos,
}

struct Reader<'a> {
    tokens: &'a [Token],
    idx: usize,
    /// Object/array literal depth; line breaks only end statements at zero.
    nesting: usize,
}

impl<'a> Reader<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            idx: 0,
            nesting: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.idx >= self.tokens.len()
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.idx)
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.idx);
        if token.is_some() {
            self.idx += 1;
        }
        token
    }

    fn pos(&self) -> Pos {
        self.peek()
            .or_else(|| self.tokens.last())
            .map(|token| token.pos)
            .unwrap_or(Pos { line: 1, column: 1 })
    }

    fn at_punct(&self, ch: char) -> bool {
        matches!(self.peek(), Some(Token { kind: TokenKind::Punct(found), .. }) if *found == ch)
    }

    fn eat_punct(&mut self, ch: char) -> bool {
        if self.at_punct(ch) {
            self.idx += 1;
            return true;
        }
        false
    }

    fn at_word(&self, word: &str) -> bool {
        matches!(self.peek(), Some(Token { kind: TokenKind::Word, text, .. }) if text == word)
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.at_word(word) {
            self.idx += 1;
            return true;
        }
        false
    }

    /// A line break followed by a token that cannot continue the current
    /// top-level expression (`export`, a literal, an identifier).
    fn at_statement_break(&self) -> bool {
        self.nesting == 0
            && self
                .peek()
                .is_some_and(|token| token.newline_before && starts_statement(token))
    }

    fn at_terminator(&self) -> bool {
        match self.peek() {
            None => true,
            Some(token) => {
                matches!(token.kind, TokenKind::Punct(',' | ')' | ']' | '}' | ';'))
                    || self.at_statement_break()
            }
        }
    }

    /// Skip tokens up to the next terminator at bracket depth zero.
    fn skip_to_terminator(&mut self) {
        let start = self.idx;
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            if depth == 0 && self.idx > start && self.at_statement_break() {
                return;
            }
            match token.kind {
                TokenKind::Punct('(' | '[' | '{') => depth += 1,
                TokenKind::Punct(')' | ']' | '}') if depth > 0 => depth -= 1,
                TokenKind::Punct(',' | ')' | ']' | '}' | ';') if depth == 0 => return,
                _ => {}
            }
            self.idx += 1;
        }
    }

    /// `name [: Type] [= expr] (, ...)*` after `const`/`let`/`var`.
    fn declarators(&mut self) -> Vec<(String, Node)> {
        let mut bindings = Vec::new();
        loop {
            let binding = match self.peek() {
                Some(Token { kind: TokenKind::Word, text, .. }) => text.clone(),
                _ => {
                    // Destructuring patterns never name the command table.
                    self.skip_to_terminator();
                    break;
                }
            };
            self.idx += 1;
            if self.eat_punct(':') {
                self.skip_type_annotation();
            }
            if self.eat_punct('=') {
                let value = self.expression();
                bindings.push((binding, value));
            }
            if !self.eat_punct(',') {
                break;
            }
        }
        bindings
    }

    /// Stops before the `=` or `,` ending a declarator's type, skipping over
    /// generic arguments such as `Record<string, T>`.
    fn skip_type_annotation(&mut self) {
        let start = self.idx;
        let mut depth = 0usize;
        let mut angles = 0usize;
        while let Some(token) = self.peek() {
            if depth == 0 && angles == 0 && self.idx > start && self.at_statement_break() {
                return;
            }
            match token.kind {
                TokenKind::Operator if token.text != "=>" => {
                    let opens = token.text.matches('<').count();
                    let closes = token.text.matches('>').count();
                    angles = (angles + opens).saturating_sub(closes);
                }
                TokenKind::Punct('(' | '[' | '{') => depth += 1,
                TokenKind::Punct(')' | ']' | '}') if depth > 0 => depth -= 1,
                TokenKind::Punct('=' | ',' | ';') if depth == 0 && angles == 0 => return,
                TokenKind::Punct(')' | ']' | '}') => return,
                _ => {}
            }
            self.idx += 1;
        }
    }

    fn expression(&mut self) -> Node {
        let pos = self.pos();
        let expr = match self.peek().map(|token| &token.kind) {
            Some(TokenKind::Punct('{')) => {
                self.idx += 1;
                self.nested(Self::object_members)
            }
            Some(TokenKind::Punct('[')) => {
                self.idx += 1;
                self.nested(Self::array_elements)
            }
            Some(TokenKind::Str) | Some(TokenKind::Template { substituted: false }) => {
                let text = self.bump().map(|token| token.text.clone()).unwrap_or_default();
                Expr::Str(text)
            }
            _ => {
                self.skip_to_terminator();
                return Node {
                    expr: Expr::Other,
                    pos,
                };
            }
        };

        // `[...] as const` and `satisfies T` keep the literal; any other
        // continuation (`+`, `.concat(...)`, `?:`) makes the value computed.
        if self.at_word("as") || self.at_word("satisfies") {
            self.skip_to_terminator();
            return Node { expr, pos };
        }
        if !self.at_terminator() {
            self.skip_to_terminator();
            return Node {
                expr: Expr::Other,
                pos,
            };
        }
        Node { expr, pos }
    }

    fn nested(&mut self, read: fn(&mut Self) -> Expr) -> Expr {
        self.nesting += 1;
        let expr = read(self);
        self.nesting -= 1;
        expr
    }

    fn object_members(&mut self) -> Expr {
        let mut members = Vec::new();
        loop {
            if self.at_end() || self.eat_punct('}') {
                break;
            }
            let pos = self.pos();
            let member = self.object_member(pos);
            members.push(member);
            if !self.eat_punct(',') {
                if !self.eat_punct('}') {
                    // Unbalanced input: stop at whatever closed us.
                    self.skip_to_terminator();
                    if !self.eat_punct(',') {
                        self.eat_punct('}');
                        break;
                    }
                    continue;
                }
                break;
            }
        }
        Expr::Object(members)
    }

    fn opaque_member(&mut self, key: Option<String>, pos: Pos) -> Member {
        self.skip_to_terminator();
        Member {
            key,
            value: Node {
                expr: Expr::Other,
                pos,
            },
            pos,
        }
    }

    fn object_member(&mut self, pos: Pos) -> Member {
        let key = match self.peek().map(|token| (&token.kind, token.text.clone())) {
            Some((TokenKind::Spread, _)) | Some((TokenKind::Punct('['), _)) => {
                return self.opaque_member(None, pos);
            }
            Some((TokenKind::Word | TokenKind::Str | TokenKind::Number, text)) => text,
            _ => return self.opaque_member(None, pos),
        };

        self.idx += 1;
        if self.eat_punct(':') {
            let value = self.expression();
            return Member {
                key: Some(key),
                value,
                pos,
            };
        }
        // Shorthand `{ name }`, methods and accessors: present but not literal.
        self.opaque_member(Some(key), pos)
    }

    fn array_elements(&mut self) -> Expr {
        let mut elements = Vec::new();
        loop {
            if self.at_end() || self.eat_punct(']') {
                break;
            }
            let pos = self.pos();
            if self.at_punct(',') {
                // Elision hole.
                elements.push(Node {
                    expr: Expr::Other,
                    pos,
                });
            } else if matches!(self.peek().map(|token| &token.kind), Some(TokenKind::Spread)) {
                self.skip_to_terminator();
                elements.push(Node {
                    expr: Expr::Other,
                    pos,
                });
            } else {
                elements.push(self.expression());
            }
            if !self.eat_punct(',') {
                if !self.eat_punct(']') {
                    self.skip_to_terminator();
                    if !self.eat_punct(',') {
                        self.eat_punct(']');
                        break;
                    }
                    continue;
                }
                break;
            }
        }
        Expr::Array(elements)
    }
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Word,
    /// Quoted string; `text` holds the decoded value.
    Str,
    /// Backtick string; substitution-free ones are plain literals.
    Template { substituted: bool },
    Number,
    Spread,
    Punct(char),
    Operator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    kind: TokenKind,
    text: String,
    pos: Pos,
    newline_before: bool,
}

/// Tokens that, after a line break, begin a new statement rather than
/// continue the previous one. Operators and brackets continue.
fn starts_statement(token: &Token) -> bool {
    match token.kind {
        TokenKind::Word => !matches!(token.text.as_str(), "as" | "satisfies" | "in" | "instanceof"),
        TokenKind::Str | TokenKind::Template { .. } | TokenKind::Number => true,
        TokenKind::Spread | TokenKind::Punct(_) | TokenKind::Operator => false,
    }
}

struct Cursor {
    chars: Vec<char>,
    idx: usize,
    line: usize,
    column: usize,
}

impl Cursor {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.idx + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.idx += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn pos(&self) -> Pos {
        Pos {
            line: self.line,
            column: self.column,
        }
    }
}

fn tokenize(source: &str) -> Vec<Token> {
    let mut cursor = Cursor {
        chars: source.chars().collect(),
        idx: 0,
        line: 1,
        column: 1,
    };
    let mut tokens: Vec<Token> = Vec::new();
    let mut last_line = 1;

    while let Some(c) = cursor.peek() {
        if c.is_whitespace() {
            cursor.bump();
            continue;
        }
        if c == '/' && cursor.peek_at(1) == Some('/') {
            while cursor.peek().is_some_and(|ch| ch != '\n') {
                cursor.bump();
            }
            continue;
        }
        if c == '/' && cursor.peek_at(1) == Some('*') {
            cursor.bump();
            cursor.bump();
            while let Some(ch) = cursor.bump() {
                if ch == '*' && cursor.peek() == Some('/') {
                    cursor.bump();
                    break;
                }
            }
            continue;
        }

        let pos = cursor.pos();
        let (kind, text) = if c == '"' || c == '\'' {
            (TokenKind::Str, read_quoted(&mut cursor, c))
        } else if c == '`' {
            let (text, substituted) = read_template(&mut cursor);
            (TokenKind::Template { substituted }, text)
        } else if is_word_start(c) {
            (TokenKind::Word, read_while(&mut cursor, is_word_continue))
        } else if c.is_ascii_digit() {
            (TokenKind::Number, read_while(&mut cursor, is_number_continue))
        } else if c == '.' && cursor.peek_at(1) == Some('.') && cursor.peek_at(2) == Some('.') {
            for _ in 0..3 {
                cursor.bump();
            }
            (TokenKind::Spread, "...".to_string())
        } else if matches!(c, '{' | '}' | '[' | ']' | '(' | ')' | ',' | ';' | ':')
            || (c == '=' && !matches!(cursor.peek_at(1), Some('=' | '>')))
        {
            cursor.bump();
            (TokenKind::Punct(c), c.to_string())
        } else {
            let first = cursor.bump().map(String::from).unwrap_or_default();
            let rest = read_while(&mut cursor, is_operator_char);
            (TokenKind::Operator, first + &rest)
        };
        tokens.push(Token {
            kind,
            text,
            pos,
            newline_before: pos.line > last_line,
        });
        last_line = cursor.line;
    }
    tokens
}

fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_word_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn is_number_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '_'
}

fn is_operator_char(c: char) -> bool {
    matches!(
        c,
        '=' | '!' | '<' | '>' | '+' | '-' | '*' | '/' | '%' | '&' | '|' | '^' | '~' | '?' | '.'
    )
}

fn read_while(cursor: &mut Cursor, keep: impl Fn(char) -> bool) -> String {
    let mut out = String::new();
    while let Some(ch) = cursor.peek() {
        if !keep(ch) {
            break;
        }
        out.push(ch);
        cursor.bump();
    }
    out
}

fn read_quoted(cursor: &mut Cursor, quote: char) -> String {
    cursor.bump();
    let mut out = String::new();
    while let Some(ch) = cursor.bump() {
        match ch {
            '\\' => read_escape(cursor, &mut out),
            '\n' => break,
            _ if ch == quote => break,
            _ => out.push(ch),
        }
    }
    out
}

fn read_template(cursor: &mut Cursor) -> (String, bool) {
    cursor.bump();
    let mut out = String::new();
    let mut substituted = false;
    while let Some(ch) = cursor.bump() {
        match ch {
            '\\' => read_escape(cursor, &mut out),
            '`' => break,
            '$' if cursor.peek() == Some('{') => {
                substituted = true;
                cursor.bump();
                let mut depth = 1usize;
                while let Some(inner) = cursor.bump() {
                    match inner {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => out.push(ch),
        }
    }
    (out, substituted)
}

/// Common single-character escapes plus `\xHH` and `\uHHHH`.
fn read_escape(cursor: &mut Cursor, out: &mut String) {
    let Some(ch) = cursor.bump() else {
        return;
    };
    let width = match ch {
        'n' => return out.push('\n'),
        't' => return out.push('\t'),
        'r' => return out.push('\r'),
        '0' => return out.push('\0'),
        // Line continuation.
        '\n' => return,
        'x' => 2,
        'u' => 4,
        other => return out.push(other),
    };
    let digits: String = (0..width).filter_map(|_| cursor.bump()).collect();
    let decoded = u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32);
    out.push(decoded.unwrap_or(char::REPLACEMENT_CHARACTER));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> Result<Extraction, SyncError> {
        extract_command_table(source, "defs.ts", "consolidatedToolDefinitions")
    }

    fn actions(extraction: &Extraction, name: &str) -> Vec<String> {
        extraction.descriptors[name]
            .declared_actions
            .iter()
            .cloned()
            .collect()
    }

    const TWO_TOOLS: &str = r#"
// Consolidated tool definitions
import { commonSchemas } from './schemas';

export const consolidatedToolDefinitions: ToolDefinition[] = [
  {
    name: 'manage_widget',
    description: 'Widgets: create, delete',
    inputSchema: {
      type: 'object',
      properties: {
        action: {
          type: 'string',
          enum: ['create', "delete", `rename`],
          description: 'Action to perform'
        },
        ...commonSchemas.location,
        pattern: { type: 'string', pattern: '^[a-z]+/[}]$' },
      },
      required: ['action']
    },
    outputSchema: { type: 'object', properties: { ok: { type: 'boolean' } } },
    handler: async (args) => { return { ok: args.x > 1 }; },
  },
  {
    "name": "control_gadget",
    inputSchema: {
      properties: {
        action: { enum: ['spin'] as const },
      },
    },
  },
];
"#;

    #[test]
    fn extracts_literal_commands_and_actions() {
        let extraction = extract(TWO_TOOLS).expect("table should extract");
        assert_eq!(
            extraction.descriptors.keys().cloned().collect::<Vec<_>>(),
            vec!["control_gadget".to_string(), "manage_widget".to_string()]
        );
        assert_eq!(
            actions(&extraction, "manage_widget"),
            vec!["create", "delete", "rename"]
        );
        assert_eq!(actions(&extraction, "control_gadget"), vec!["spin"]);
        assert!(extraction.diagnostics.is_empty(), "{:?}", extraction.diagnostics);
    }

    #[test]
    fn non_literal_name_is_skipped_with_position() {
        let source = r#"export const consolidatedToolDefinitions = [
  { name: TOOL_NAME, inputSchema: { properties: { action: { enum: ['a'] } } } },
  { name: 'ok', inputSchema: { properties: { action: { enum: ['a'] } } } },
];"#;
        let extraction = extract(source).expect("one command should survive");
        assert_eq!(extraction.descriptors.len(), 1);
        assert_eq!(extraction.diagnostics.len(), 1);
        let diagnostic = &extraction.diagnostics[0];
        assert_eq!((diagnostic.line, diagnostic.column), (2, 5));
        assert!(diagnostic.message.contains("non-literal name"));
        assert_eq!(
            diagnostic.to_string(),
            "defs.ts:2:5 command definition has non-literal name; skipping"
        );
    }

    #[test]
    fn broken_action_chain_skips_only_that_command() {
        let source = r#"export const consolidatedToolDefinitions = [
  { name: 'no_schema' },
  { name: 'no_action', inputSchema: { properties: {} } },
  { name: 'computed_enum', inputSchema: { properties: { action: { enum: ACTIONS } } } },
  { name: 'mixed_enum', inputSchema: { properties: { action: { enum: ['a', OTHER] } } } },
  { name: 'concat', inputSchema: { properties: { action: { enum: ['a'].concat(['b']) } } } },
  { name: 'template', inputSchema: { properties: { action: { enum: [`x_${y}`] } } } },
  { name: 'empty', inputSchema: { properties: { action: { enum: [] } } } },
  { name: 'fine', inputSchema: { properties: { action: { enum: ['go'] } } } },
];"#;
        let extraction = extract(source).expect("`fine` should survive");
        assert_eq!(
            extraction.descriptors.keys().cloned().collect::<Vec<_>>(),
            vec!["fine".to_string()]
        );
        let messages = extraction
            .diagnostics
            .iter()
            .map(|diagnostic| diagnostic.message.as_str())
            .collect::<Vec<_>>();
        assert_eq!(messages.len(), 7, "{messages:?}");
        assert!(messages[0].contains("missing inputSchema literal"));
        assert!(messages[1].contains("missing inputSchema.properties.action literal"));
        assert!(messages[2].contains("not a string literal array"));
        assert!(messages[3].contains("non-literal element"));
        assert!(messages[4].contains("not a string literal array"));
        assert!(messages[5].contains("non-literal element"));
        assert!(messages[6].contains("is empty"));
    }

    #[test]
    fn zero_descriptors_is_fatal_with_diagnostics() {
        let source = r#"export const consolidatedToolDefinitions = [
  { name: A, inputSchema: { properties: { action: { enum: ['a'] } } } },
  { name: B, inputSchema: { properties: { action: { enum: ['b'] } } } },
];"#;
        match extract(source) {
            Err(SyncError::NoDescriptors { diagnostics, .. }) => {
                assert_eq!(diagnostics.len(), 2);
            }
            other => panic!("expected NoDescriptors, got {other:?}"),
        }
    }

    #[test]
    fn ignores_unexported_and_differently_named_bindings() {
        let source = r#"
const consolidatedToolDefinitions = [
  { name: 'hidden', inputSchema: { properties: { action: { enum: ['a'] } } } },
];
export const otherTable = [
  { name: 'other', inputSchema: { properties: { action: { enum: ['a'] } } } },
];
export const helper = 1, consolidatedToolDefinitions = [
  { name: 'visible', inputSchema: { properties: { action: { enum: ['a'] } } } },
];
"#;
        let extraction = extract(source).expect("second declarator should be found");
        assert_eq!(
            extraction.descriptors.keys().cloned().collect::<Vec<_>>(),
            vec!["visible".to_string()]
        );
    }

    #[test]
    fn duplicate_command_names_last_wins() {
        let source = r#"export const consolidatedToolDefinitions = [
  { name: 'dup', inputSchema: { properties: { action: { enum: ['old'] } } } },
  { name: 'dup', inputSchema: { properties: { action: { enum: ['new'] } } } },
];"#;
        let extraction = extract(source).expect("dup should extract");
        assert_eq!(actions(&extraction, "dup"), vec!["new"]);
    }

    #[test]
    fn comments_and_strings_do_not_unbalance_brackets() {
        let source = r#"export const consolidatedToolDefinitions = [
  /* { name: 'commented' } ] */
  {
    name: 'braces',
    description: "a } b ] c // not a comment",
    inputSchema: { properties: { action: { enum: ['it\'s', "tab\tchar"] } } },
  },
];"#;
        let extraction = extract(source).expect("braces should extract");
        assert_eq!(actions(&extraction, "braces"), vec!["it's", "tab\tchar"]);
    }

    #[test]
    fn regex_literal_values_are_skipped_as_opaque() {
        let source = r#"export const consolidatedToolDefinitions = [
  {
    name: 'pattern',
    validate: /^[a-z_]+\d{2}$/i,
    inputSchema: { properties: { action: { enum: ['match'] } } },
  },
];"#;
        let extraction = extract(source).expect("pattern should extract");
        assert_eq!(actions(&extraction, "pattern"), vec!["match"]);
        assert!(extraction.diagnostics.is_empty(), "{:?}", extraction.diagnostics);
    }

    #[test]
    fn non_object_entries_are_reported() {
        let source = r#"export const consolidatedToolDefinitions = [
  ...legacyTools,
  makeTool('x'),
  { name: 'kept', inputSchema: { properties: { action: { enum: ['a'] } } } },
];"#;
        let extraction = extract(source).expect("kept should extract");
        assert_eq!(extraction.diagnostics.len(), 2);
        assert!(
            extraction
                .diagnostics
                .iter()
                .all(|diagnostic| diagnostic.message.contains("not an object literal"))
        );
    }

    #[test]
    fn generic_type_annotation_does_not_split_declarator() {
        let source = r#"export const consolidatedToolDefinitions: Array<Record<string, unknown>> = [
  { name: 'typed', inputSchema: { properties: { action: { enum: ['a'] } } } },
];"#;
        let extraction = extract(source).expect("typed should extract");
        assert_eq!(actions(&extraction, "typed"), vec!["a"]);
    }

    #[test]
    fn table_without_semicolon_ends_at_line_break() {
        let source = "export const consolidatedToolDefinitions = [
  { name: 'w', inputSchema: { properties: { action: { enum: ['a'] } } } },
]
export const other = 1
";
        let extraction = extract(source).expect("table should extract");
        assert_eq!(actions(&extraction, "w"), vec!["a"]);
        assert!(extraction.diagnostics.is_empty(), "{:?}", extraction.diagnostics);
    }

    #[test]
    fn earlier_statement_without_semicolon_does_not_swallow_table() {
        let source = "export const VERSION = '1'
export const helpers = makeHelpers()
export const consolidatedToolDefinitions = [
  { name: 'w', inputSchema: { properties: { action: { enum: ['a'] } } } },
];";
        let extraction = extract(source).expect("table should extract");
        assert_eq!(actions(&extraction, "w"), vec!["a"]);
    }

    #[test]
    fn line_break_inside_literals_and_before_operators_continues() {
        let source = "export const consolidatedToolDefinitions = [
  {
    name:
      'w',
    inputSchema: { properties: { action: { enum: [
      'a',
      'b'
    ] } } },
  },
]
  as const
";
        let extraction = extract(source).expect("table should extract");
        assert_eq!(actions(&extraction, "w"), vec!["a", "b"]);

        let computed = "export const consolidatedToolDefinitions = [
  { name: 'w', inputSchema: { properties: { action: { enum: ['a'] } } } },
]
  .concat(extraTools)
";
        match extract(computed) {
            Err(SyncError::NoDescriptors { diagnostics, .. }) => {
                assert!(diagnostics[0].message.contains("not an array literal"));
            }
            other => panic!("expected NoDescriptors, got {other:?}"),
        }
    }

    #[test]
    fn tokenizer_marks_tokens_after_line_breaks() {
        let tokens = tokenize("a /* x */ b\n// c\nd /* y\n */ e");
        let flags = tokens
            .iter()
            .map(|token| (token.text.as_str(), token.newline_before))
            .collect::<Vec<_>>();
        assert_eq!(
            flags,
            vec![("a", false), ("b", false), ("d", true), ("e", true)]
        );
    }

    #[test]
    fn tokenizer_tracks_lines_and_decodes_escapes() {
        let tokens = tokenize("a\n  'b\\u0041\\x42'");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].pos, Pos { line: 2, column: 3 });
        assert_eq!(tokens[1].text, "bAB");
    }
}
