//! Shared parser state: the token cursor, the option set, the recursion
//! guard, and the stack of back-reference scopes.

use crate::ast::{Name, TemplateArg, Type};
use crate::error::{Error, ErrorKind, Result};
use crate::tokens::{CharClass, Token, Tokens};
use crate::Flags;

/// Hard ceiling on production nesting; adversarial inputs get rejected
/// before they can exhaust the stack.
const MAX_DEPTH: usize = 256;

/// Back-reference tables hold at most ten entries; later candidates are
/// silently not memorised.
const TABLE_CAP: usize = 10;

/// One back-reference scope: names, parameter types, and template
/// arguments memorised so far. Template productions push a fresh scope so
/// inner templates cannot pollute outer tables.
#[derive(Debug, Default)]
pub(crate) struct Backrefs {
    names: Vec<Name>,
    params: Vec<Type>,
    template_args: Vec<TemplateArg>,
}

impl Backrefs {
    pub fn memorize_name(&mut self, name: &Name) {
        if self.names.len() < TABLE_CAP {
            self.names.push(name.clone());
        }
    }

    pub fn name(&self, idx: usize) -> Option<Name> {
        self.names.get(idx).cloned()
    }

    pub fn memorize_param(&mut self, ty: &Type) {
        if self.params.len() < TABLE_CAP {
            self.params.push(ty.clone());
        }
    }

    pub fn param(&self, idx: usize) -> Option<Type> {
        self.params.get(idx).cloned()
    }

    pub fn memorize_template_arg(&mut self, arg: &TemplateArg) {
        if self.template_args.len() < TABLE_CAP {
            self.template_args.push(arg.clone());
        }
    }

    pub fn template_arg(&self, idx: usize) -> Option<TemplateArg> {
        self.template_args.get(idx).cloned()
    }
}

pub(crate) struct Context<'a> {
    pub tokens: Tokens<'a>,
    pub flags: Flags,
    scopes: Vec<Backrefs>,
    depth: usize,
}

impl<'a> Context<'a> {
    pub fn new(src: &'a str, flags: Flags) -> Result<Self> {
        Ok(Context {
            tokens: Tokens::new(src)?,
            flags,
            scopes: vec![Backrefs::default()],
            depth: 0,
        })
    }

    pub fn at_end(&self) -> bool {
        self.tokens.at_end()
    }

    /// 0-based cursor offset; productions measure how many characters an
    /// encoding occupied to decide whether to memorise it.
    pub fn offset(&self) -> usize {
        self.tokens.offset()
    }

    /// Consumes everything up to the end of the symbol, verbatim.
    pub fn take_rest(&mut self) -> &'a str {
        let start = self.tokens.offset();

        while !self.tokens.at_end() {
            self.tokens.advance().expect("not at end");
        }

        &self.tokens.source()[start..]
    }

    pub fn cur(&self) -> Result<Token> {
        self.tokens.current()
    }

    pub fn advance(&mut self) -> Result<()> {
        self.tokens.advance()
    }

    /// Reads the current token and steps past it.
    pub fn bump(&mut self) -> Result<Token> {
        let tok = self.tokens.current()?;
        self.tokens.advance()?;
        Ok(tok)
    }

    /// Steps past the current byte when it matches; never fails.
    pub fn eat(&mut self, byte: u8) -> bool {
        if self.tokens.peek_byte() == Some(byte) {
            self.tokens.advance().expect("peeked byte exists");
            return true;
        }

        false
    }

    pub fn peek_byte(&self) -> Option<u8> {
        self.tokens.peek_byte()
    }

    /// One byte past the current one.
    pub fn lookahead_byte(&self) -> Option<u8> {
        self.tokens.lookahead().map(|tok| tok.byte())
    }

    pub fn expect(&mut self, byte: u8, kind: ErrorKind) -> Result<()> {
        if !self.eat(byte) {
            return Err(self.error(kind));
        }

        Ok(())
    }

    pub fn error(&self, kind: ErrorKind) -> Error {
        self.tokens.error(kind)
    }

    pub fn error_at(&self, kind: ErrorKind, tok: Token) -> Error {
        self.tokens.error_at(kind, tok)
    }

    pub fn descend(&mut self) -> Result<()> {
        self.depth += 1;

        if self.depth > MAX_DEPTH {
            return Err(self.error(ErrorKind::TooMuchRecursion));
        }

        Ok(())
    }

    pub fn ascend(&mut self) {
        self.depth -= 1;
    }

    pub fn scope(&mut self) -> &mut Backrefs {
        self.scopes.last_mut().expect("scope stack never empty")
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(Backrefs::default());
    }

    pub fn exit_scope(&mut self) {
        self.scopes.pop();
        debug_assert!(!self.scopes.is_empty());
    }

    /// Resolves a name back reference; out-of-table digits are errors.
    pub fn name_backref(&mut self, tok: Token) -> Result<Name> {
        let idx = tok.base10().expect("caller matched a digit") as usize;

        self.scopes
            .last()
            .and_then(|scope| scope.name(idx))
            .ok_or_else(|| self.error_at(ErrorKind::InvalidBackReference, tok))
    }

    pub fn param_backref(&mut self, tok: Token) -> Result<Type> {
        let idx = tok.base10().expect("caller matched a digit") as usize;

        self.scopes
            .last()
            .and_then(|scope| scope.param(idx))
            .ok_or_else(|| self.error_at(ErrorKind::InvalidBackReference, tok))
    }

    pub fn template_arg_backref(&mut self, tok: Token) -> Result<TemplateArg> {
        let idx = tok.base10().expect("caller matched a digit") as usize;

        self.scopes
            .last()
            .and_then(|scope| scope.template_arg(idx))
            .ok_or_else(|| self.error_at(ErrorKind::InvalidBackReference, tok))
    }

    /// An identifier fragment: identifier characters up to a consumed `@`.
    pub fn ident(&mut self, allow_empty: bool) -> Result<&'a str> {
        let start = self.tokens.offset();

        loop {
            let tok = match self.tokens.current() {
                Ok(tok) => tok,
                Err(err) if err.kind() == ErrorKind::PrematureEnd => {
                    return Err(self.error(ErrorKind::UnterminatedName));
                }
                Err(err) => return Err(err),
            };

            if tok.class() == CharClass::Terminator {
                break;
            }

            if !tok.is_ident_char() {
                return Err(self.error_at(ErrorKind::InvalidIdentifierCharacter, tok));
            }

            self.tokens.advance()?;
        }

        let end = self.tokens.offset();
        self.tokens.advance()?; // the '@'

        let fragment = &self.tokens.source()[start..end];
        if fragment.is_empty() && !allow_empty {
            return Err(self.error(ErrorKind::EmptyName));
        }

        Ok(fragment)
    }

    /// Unsigned integer: a single digit encodes its value plus one, an
    /// `A`..`P` nibble run terminated by `@` encodes the value directly.
    pub fn unsigned(&mut self) -> Result<u64> {
        let tok = self.cur()?;

        if let Some(digit) = tok.base10() {
            self.advance()?;
            return Ok(u64::from(digit) + 1);
        }

        let mut value: u64 = 0;

        loop {
            let tok = self.cur()?;

            match tok.class() {
                CharClass::Terminator => {
                    self.advance()?;
                    return Ok(value);
                }
                CharClass::Upper => {
                    let nibble = tok.base36().expect("uppercase has a base36 value") - 10;
                    if nibble > 15 {
                        return Err(self.error_at(ErrorKind::InvalidDataEncoding, tok));
                    }

                    value = value
                        .checked_mul(16)
                        .and_then(|v| v.checked_add(u64::from(nibble)))
                        .ok_or_else(|| self.error_at(ErrorKind::InvalidDataEncoding, tok))?;

                    self.advance()?;
                }
                _ => return Err(self.error_at(ErrorKind::InvalidDataEncoding, tok)),
            }
        }
    }

    /// Signed integer: an optional `?` negates the magnitude.
    pub fn signed(&mut self) -> Result<i64> {
        let negative = self.eat(b'?');
        let magnitude = self.unsigned()?;

        if negative {
            // -(i64::MIN) has no magnitude representation, so the bound is
            // symmetric on purpose
            if magnitude > i64::MAX as u64 {
                return Err(self.error(ErrorKind::InvalidDataEncoding));
            }
            Ok(-(magnitude as i64))
        } else {
            i64::try_from(magnitude).map_err(|_| self.error(ErrorKind::InvalidDataEncoding))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(src: &str) -> Context<'_> {
        Context::new(src, Flags::default()).unwrap()
    }

    #[test]
    fn single_digit_encodes_value_plus_one() {
        assert_eq!(ctx("0").unsigned().unwrap(), 1);
        assert_eq!(ctx("9").unsigned().unwrap(), 10);
    }

    #[test]
    fn nibble_runs_are_canonical_modulo_leading_a() {
        assert_eq!(ctx("A@").unsigned().unwrap(), 0);
        assert_eq!(ctx("AA@").unsigned().unwrap(), 0);
        assert_eq!(ctx("AAA@").unsigned().unwrap(), 0);
        assert_eq!(ctx("B@").unsigned().unwrap(), 1);
        assert_eq!(ctx("BA@").unsigned().unwrap(), 16);
        assert_eq!(ctx("P@").unsigned().unwrap(), 15);
        assert_eq!(ctx("BAA@").unsigned().unwrap(), 256);
    }

    #[test]
    fn magnitude_requires_terminator() {
        let err = ctx("B").unsigned().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PrematureEnd);
    }

    #[test]
    fn letters_past_p_are_rejected() {
        let err = ctx("Q@").unsigned().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDataEncoding);
    }

    #[test]
    fn negation_marker() {
        assert_eq!(ctx("?0").signed().unwrap(), -1);
        assert_eq!(ctx("?BA@").signed().unwrap(), -16);
        assert_eq!(ctx("3").signed().unwrap(), 4);
    }

    #[test]
    fn overflowing_magnitudes_are_rejected() {
        let err = ctx("BAAAAAAAAAAAAAAAAA@").unsigned().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDataEncoding);
    }

    #[test]
    fn name_table_caps_at_ten() {
        let mut c = ctx("?");
        for idx in 0..12 {
            let name = Name::Ident(crate::ast::Ident::new(&format!("id{idx}")));
            c.scope().memorize_name(&name);
        }

        assert!(c.scope().name(9).is_some());
        assert!(c.scope().name(10).is_none());
    }
}
