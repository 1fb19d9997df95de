//! Token scanner for the selector language.
//!
//! The scanner is a cursor over the selector string that recognizes exactly
//! one grammatical unit per call; parsing and evaluation interleave, no
//! syntax tree is built. Every recognizer either consumes input or restores
//! the cursor, so the driving loop can enforce its advance-or-fail invariant
//! and report the unconsumed remainder on malformed input.

use compact_str::CompactString;

use crate::runtime::Error;

/// A leading simple selector: `#id`, `.class`, `tag` or `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Simple {
    Id(CompactString),
    Class(CompactString),
    Tag(CompactString),
    Universal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combinator {
    /// Whitespace: any descendant element.
    Descendant,
    /// `>`: direct element children.
    Child,
    /// `+`: the immediately-following element sibling.
    Adjacent,
    /// `~`: all following element siblings.
    Sibling,
    /// `<`: all strict element ancestors, nearest first.
    Ancestor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttrOp {
    /// `[attr]`
    Exists,
    /// `[attr=v]`
    Equals,
    /// `[attr~=v]`: whitespace-token membership.
    Includes,
    /// `[attr!=v]`
    NotEqual,
    /// `[attr|=v]`: exact or hyphen-prefixed.
    DashMatch,
    /// `[attr^=v]`
    Prefix,
    /// `[attr$=v]`
    Suffix,
    /// `[attr*=v]`
    Substring,
}

/// A narrowing filter applied to the current result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Filter {
    Id(CompactString),
    Class(CompactString),
    Pseudo { name: CompactString, arg: Option<String> },
    Attr { name: CompactString, op: AttrOp, value: String },
}

pub(crate) struct Scanner<'s> {
    input: &'s str,
    pos: usize,
}

fn is_ident_char(c: char, allow_star: bool) -> bool {
    c == '-' || c == '_' || c == '\\' || c.is_ascii_alphanumeric() || (allow_star && c == '*') || (c as u32) > 0xa0
}

impl<'s> Scanner<'s> {
    pub(crate) fn new(input: &'s str) -> Self {
        Self { input, pos: 0 }
    }

    pub(crate) fn rest(&self) -> &'s str {
        &self.input[self.pos..]
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) -> usize {
        let before = self.pos;
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
        self.pos - before
    }

    /// `#id`, `.class`, `tag` or `*` at the cursor, no leading whitespace.
    pub(crate) fn scan_simple(&mut self) -> Option<Simple> {
        match self.peek()? {
            mark @ ('#' | '.') => {
                let save = self.pos;
                self.pos += 1;
                match self.scan_ident(true) {
                    Some(ident) if mark == '#' => Some(Simple::Id(ident)),
                    Some(ident) => Some(Simple::Class(ident)),
                    None => {
                        self.pos = save;
                        None
                    }
                }
            }
            c if is_ident_char(c, true) => {
                let ident = self.scan_ident(true)?;
                if ident == "*" { Some(Simple::Universal) } else { Some(Simple::Tag(ident)) }
            }
            _ => None,
        }
    }

    /// A combinator, with its optional tag qualifier. Bare whitespace is the
    /// descendant combinator only when something follows it; the caller rules
    /// out group separators first.
    pub(crate) fn scan_combinator(&mut self) -> Option<(Combinator, Option<CompactString>)> {
        let save = self.pos;
        let ws = self.skip_ws();
        let combinator = match self.peek() {
            Some('>') => Combinator::Child,
            Some('+') => Combinator::Adjacent,
            Some('~') => Combinator::Sibling,
            Some('<') => Combinator::Ancestor,
            Some(_) if ws > 0 => {
                self.skip_ws();
                let qualifier = self.scan_ident(true);
                return Some((Combinator::Descendant, qualifier));
            }
            _ => {
                self.pos = save;
                return None;
            }
        };
        self.pos += 1;
        self.skip_ws();
        let qualifier = self.scan_ident(true);
        Some((combinator, qualifier))
    }

    /// Consume a top-level `,` together with surrounding whitespace.
    pub(crate) fn eat_group_separator(&mut self) -> bool {
        let save = self.pos;
        self.skip_ws();
        if self.peek() == Some(',') {
            self.pos += 1;
            self.skip_ws();
            true
        } else {
            self.pos = save;
            false
        }
    }

    pub(crate) fn peek_is_filter(&self) -> bool {
        matches!(self.peek(), Some('#' | '.' | ':' | '['))
    }

    /// One filter token, or `None` when the cursor is not at a filter. A `[`
    /// commits to an attribute test: anything malformed from there on is a
    /// syntax error naming the remainder from the bracket onward.
    pub(crate) fn scan_filter(&mut self) -> Result<Option<Filter>, Error> {
        let save = self.pos;
        match self.peek() {
            Some(mark @ ('#' | '.')) => {
                self.pos += 1;
                match self.scan_ident(false) {
                    Some(ident) if mark == '#' => Ok(Some(Filter::Id(ident))),
                    Some(ident) => Ok(Some(Filter::Class(ident))),
                    None => {
                        self.pos = save;
                        Ok(None)
                    }
                }
            }
            Some(':') => {
                self.pos += 1;
                let Some(name) = self.scan_ident(false) else {
                    self.pos = save;
                    return Ok(None);
                };
                let arg = self.scan_pseudo_arg()?;
                Ok(Some(Filter::Pseudo { name, arg }))
            }
            Some('[') => self.scan_attr_filter().map(Some),
            _ => Ok(None),
        }
    }

    /// Optional parenthesized pseudo-class argument. Quoted arguments are
    /// taken verbatim; bare arguments may nest parentheses (for selector
    /// arguments like `not(:nth-child(2))`).
    fn scan_pseudo_arg(&mut self) -> Result<Option<String>, Error> {
        if self.peek() != Some('(') {
            return Ok(None);
        }
        let start = self.pos;
        self.pos += 1;
        self.skip_ws();
        let arg = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let Some(end) = self.rest().find(quote) else {
                    return Err(Error::syntax(&self.input[start..]));
                };
                let value = self.rest()[..end].to_string();
                self.pos += end + 1;
                value
            }
            _ => {
                let rest = self.rest();
                let mut depth = 0usize;
                let mut len = None;
                for (i, c) in rest.char_indices() {
                    match c {
                        '(' => depth += 1,
                        ')' if depth == 0 => {
                            len = Some(i);
                            break;
                        }
                        ')' => depth -= 1,
                        _ => {}
                    }
                }
                let Some(len) = len else {
                    return Err(Error::syntax(&self.input[start..]));
                };
                let value = rest[..len].trim_end().to_string();
                self.pos += len;
                value
            }
        };
        self.skip_ws();
        if self.peek() == Some(')') {
            self.pos += 1;
            Ok(Some(arg))
        } else {
            Err(Error::syntax(&self.input[start..]))
        }
    }

    /// `[name]`, `[name op value]`, value quoted or bare. Called with the
    /// cursor on `[`.
    fn scan_attr_filter(&mut self) -> Result<Filter, Error> {
        let start = self.pos;
        self.pos += 1;
        self.skip_ws();
        let Some(name) = self.scan_ident(false) else {
            return Err(Error::syntax(&self.input[start..]));
        };
        let name = CompactString::from(name.to_ascii_lowercase());
        self.skip_ws();

        if self.peek() == Some(']') {
            self.pos += 1;
            return Ok(Filter::Attr { name, op: AttrOp::Exists, value: String::new() });
        }

        let op = self.scan_attr_op(start)?;
        self.skip_ws();
        let value = self.scan_attr_value(start)?;
        self.skip_ws();
        if self.peek() == Some(']') {
            self.pos += 1;
            Ok(Filter::Attr { name, op, value })
        } else {
            Err(Error::syntax(&self.input[start..]))
        }
    }

    /// Operator token: `=` or a single punctuation character followed by `=`.
    /// The token shape is scanned permissively (as the compatibility grammar
    /// does) and validated against the supported set immediately.
    fn scan_attr_op(&mut self, bracket_start: usize) -> Result<AttrOp, Error> {
        let rest = self.rest();
        let mut chars = rest.chars();
        let (token, len): (&str, usize) = match (chars.next(), chars.next()) {
            (Some(c), Some('=')) if !c.is_whitespace() => (&rest[..c.len_utf8() + 1], c.len_utf8() + 1),
            (Some('='), _) => ("=", 1),
            _ => return Err(Error::syntax(&self.input[bracket_start..])),
        };
        let op = match token {
            "=" => AttrOp::Equals,
            "~=" => AttrOp::Includes,
            "!=" => AttrOp::NotEqual,
            "|=" => AttrOp::DashMatch,
            "^=" => AttrOp::Prefix,
            "$=" => AttrOp::Suffix,
            "*=" => AttrOp::Substring,
            other => return Err(Error::InvalidOperator(other.to_string())),
        };
        self.pos += len;
        Ok(op)
    }

    /// Attribute value: quoted (verbatim, no escape processing) or bare
    /// (escapes decoded, a leading `#` allowed for fragment-style values).
    fn scan_attr_value(&mut self, bracket_start: usize) -> Result<String, Error> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let Some(end) = self.rest().find(quote) else {
                    return Err(Error::syntax(&self.input[bracket_start..]));
                };
                let value = self.rest()[..end].to_string();
                self.pos += end + 1;
                Ok(value)
            }
            Some(']') => Ok(String::new()),
            _ => {
                let mut value = CompactString::default();
                if self.peek() == Some('#') {
                    self.pos += 1;
                    value.push('#');
                }
                if let Some(ident) = self.scan_ident(false) {
                    value.push_str(&ident);
                }
                Ok(value.into_string())
            }
        }
    }

    /// Identifier with escape decoding: `-`, `_`, ASCII alphanumerics, chars
    /// above U+00A0, `*` where allowed, `\` + 2..=6 hex digits (one trailing
    /// whitespace swallowed) or `\` + any single char taken literally.
    fn scan_ident(&mut self, allow_star: bool) -> Option<CompactString> {
        let start = self.pos;
        let mut out = CompactString::default();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 1;
                self.scan_escape(&mut out);
            } else if is_ident_char(c, allow_star) {
                self.pos += c.len_utf8();
                out.push(c);
            } else {
                break;
            }
        }
        if self.pos == start { None } else { Some(out) }
    }

    fn scan_escape(&mut self, out: &mut CompactString) {
        let rest = self.rest();
        let hex_len = rest.chars().take(6).take_while(char::is_ascii_hexdigit).count();
        if hex_len >= 2 {
            let code = u32::from_str_radix(&rest[..hex_len], 16).unwrap_or(0xfffd);
            out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
            self.pos += hex_len;
            if let Some(ws) = self.peek() {
                if ws.is_whitespace() {
                    self.pos += ws.len_utf8();
                }
            }
        } else if let Some(c) = rest.chars().next() {
            self.pos += c.len_utf8();
            out.push(c);
        }
        // a lone trailing backslash decodes to nothing
    }
}
