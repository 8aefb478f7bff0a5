//! Failure channel for the decoder.
//!
//! Every rejection surfaces as a single [`Error`] carrying a code from the
//! closed [`ErrorKind`] enumeration, the offending character, its 1-based
//! position, and the full mangled string. No partial AST ever escapes a
//! failed parse.

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a mangled symbol can be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The symbol does not begin with `?`.
    BadSymbolStart,
    /// The input string is empty.
    TruncatedSymbol,
    /// An identifier ran off the end of the symbol before its `@`.
    UnterminatedName,
    /// A qualifier list ran off the end of the symbol before its `@`.
    UnterminatedQualifiedName,
    /// A parameter list ran off the end of the symbol.
    UnterminatedParameterList,
    /// A template argument list ran off the end of the symbol.
    UnterminatedTemplateParameterList,
    /// A function encoding is missing its closing `Z`.
    UnterminatedFunction,
    /// A character outside the mangling alphabet.
    InvalidCharacter,
    /// A character that may not appear inside an identifier.
    InvalidIdentifierCharacter,
    /// An unknown `?_` special-name sub-code.
    InvalidSpecialName,
    /// An unknown symbol-kind code after the qualified name.
    InvalidSymbolKind,
    /// A malformed or overflowing numeric encoding.
    InvalidDataEncoding,
    /// An unknown calling-convention letter.
    InvalidCallingConvention,
    /// An enum base-type digit outside `0`..`7`.
    InvalidEnumBaseType,
    /// An unknown or obsolete storage-class code.
    InvalidStorageClass,
    /// A based pointer with a reserved base-name encoding.
    InvalidBasedPointerType,
    /// An unknown `_R` RTTI sub-code.
    InvalidRttiCode,
    /// An unknown template-argument encoding.
    InvalidTemplateArgument,
    /// An unknown `$`-introduced template constant sub-code.
    InvalidTemplateConstant,
    /// A function-as-type whose storage class lacks the function bit.
    InvalidFunctionStorage,
    /// A back-reference digit outside the current table.
    InvalidBackReference,
    /// An empty identifier outside a template production.
    EmptyName,
    /// A parameter list terminated before its first parameter.
    EmptyParameterList,
    /// A function encoding with no return type where one is required.
    ExpectedReturnType,
    /// A `?$` with no template name following.
    ExpectedTemplateName,
    /// A reference whose target is itself a reference.
    DoubleReference,
    /// A type code that is reserved and never emitted.
    UnusedTypeCode,
    /// A character that no production can begin with.
    UnexpectedCharacter,
    /// The symbol ended in the middle of a production.
    PrematureEnd,
    /// Well-formed symbol followed by trailing characters.
    NonsenseAtEnd,
    /// Nesting deeper than the decoder supports.
    TooMuchRecursion,
}

impl ErrorKind {
    fn message(self) -> &'static str {
        match self {
            ErrorKind::BadSymbolStart => "symbol does not start with '?'",
            ErrorKind::TruncatedSymbol => "symbol is empty",
            ErrorKind::UnterminatedName => "unterminated name",
            ErrorKind::UnterminatedQualifiedName => "unterminated qualified name",
            ErrorKind::UnterminatedParameterList => "unterminated parameter list",
            ErrorKind::UnterminatedTemplateParameterList => {
                "unterminated template parameter list"
            }
            ErrorKind::UnterminatedFunction => "unterminated function",
            ErrorKind::InvalidCharacter => "invalid character",
            ErrorKind::InvalidIdentifierCharacter => "invalid identifier character",
            ErrorKind::InvalidSpecialName => "invalid special name code",
            ErrorKind::InvalidSymbolKind => "invalid symbol type code",
            ErrorKind::InvalidDataEncoding => "invalid data encoding",
            ErrorKind::InvalidCallingConvention => "invalid calling convention",
            ErrorKind::InvalidEnumBaseType => "invalid enum base type",
            ErrorKind::InvalidStorageClass => "invalid storage class",
            ErrorKind::InvalidBasedPointerType => "invalid based pointer type",
            ErrorKind::InvalidRttiCode => "invalid RTTI code",
            ErrorKind::InvalidTemplateArgument => "invalid template argument",
            ErrorKind::InvalidTemplateConstant => "invalid template constant",
            ErrorKind::InvalidFunctionStorage => "invalid function storage",
            ErrorKind::InvalidBackReference => "invalid back reference",
            ErrorKind::EmptyName => "empty name",
            ErrorKind::EmptyParameterList => "empty parameter list",
            ErrorKind::ExpectedReturnType => "expected a return type",
            ErrorKind::ExpectedTemplateName => "expected a template name",
            ErrorKind::DoubleReference => "reference to a reference",
            ErrorKind::UnusedTypeCode => "unused type code",
            ErrorKind::UnexpectedCharacter => "unexpected character",
            ErrorKind::PrematureEnd => "premature end of symbol",
            ErrorKind::NonsenseAtEnd => "nonsense at the end of the symbol",
            ErrorKind::TooMuchRecursion => "symbol is nested too deeply",
        }
    }
}

/// A rejected parse: what went wrong, where, and in which symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    character: char,
    position: usize,
    symbol: Box<str>,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, character: char, position: usize, symbol: &str) -> Self {
        Error {
            kind,
            character,
            position,
            symbol: symbol.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The character the parser was looking at, `'\x1a'` when the symbol
    /// ended early.
    pub fn character(&self) -> char {
        self.character
    }

    /// 1-based offset of [`Self::character`] within [`Self::symbol`].
    pub fn position(&self) -> usize {
        self.position
    }

    /// The complete mangled string that was being decoded.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at position {} ('{}') in '{}'",
            self.kind.message(),
            self.position,
            self.character.escape_default(),
            self.symbol,
        )
    }
}

impl std::error::Error for Error {}
