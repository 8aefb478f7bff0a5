//! This crate decodes "decorated" (mangled) linker symbols produced by the
//! Microsoft Visual C++ toolchain into a structured value describing what
//! the name refers to: a function with its full signature, a variable, a
//! vtable, an RTTI descriptor, and so on.
//!
//! Windows compilers encode a fully-qualified C++ entity together with
//! complete type information into each linker symbol so that overloads stay
//! distinguishable at link time. A crash analyser or binary indexer that
//! only needs a printable name can call [`Symbol::display`], but the AST is
//! the primary product: every component of the decoded entity is labelled
//! and reachable through typed accessors.
//!
//! ```
//! use undecorate::{parse, Flags};
//!
//! let sym = parse("?wibble@@YAHH@Z", Flags::default()).unwrap();
//! assert_eq!(sym.display(Flags::default()), "int __cdecl wibble(int)");
//! assert_eq!(sym.name(), "wibble");
//!
//! let func = sym.as_function().unwrap();
//! assert_eq!(func.params().len(), 1);
//! ```
//!
//! Decoding is strictly synchronous and allocation is confined to the tree
//! under construction; two decodes never share state. On failure the only
//! observable output is an [`Error`] carrying the rejected character, its
//! 1-based position, and the full symbol.

mod ast;
mod error;
mod parse;
mod tokens;


pub use ast::{
    Access, BaseName, CallingConvention, Compound, CompoundKind, Curly, DoubleEncoded, Enum,
    Function, FunctionScope, FunctionType, Ident, Indirection, Literal, MemberKind, Modifier,
    Name, Operator, Primitive, QualifiedName, Rtti, SpecialData, SpecialName, StorageBits,
    StorageClass, Symbol, SymbolKind, Table, TemplateArg, TemplateName, TemplateParam, Type,
    Variable, VariableKind,
};
pub use error::{Error, ErrorKind, Result};

use bitflags::bitflags;

bitflags! {
    /// Parse and display options.
    ///
    /// All but [`Flags::ALLOW_FRAGMENTS`] affect only the textual
    /// projection; the decoded tree always carries everything.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags: u32 {
        /// Accept a bare qualified name with no trailing kind code.
        const ALLOW_FRAGMENTS        = 1;
        /// `__cdecl` prints as `cdecl`, and so on.
        const NO_LEADING_UNDERSCORES = 1 << 1;
        /// Drop toolchain keywords (`__cdecl`, `__ptr64`, `__unaligned`,
        /// `__restrict`, `__based`) entirely.
        const NO_MS_KEYWORDS         = 1 << 2;
        /// Drop function return types.
        const NO_RETURN_TYPE         = 1 << 3;
        /// Drop calling conventions.
        const NO_CALLING_CONVENTION  = 1 << 4;
        /// Drop the trailing cv-qualification of member functions.
        const NO_THIS_QUALIFIERS     = 1 << 5;
        /// Drop `public:` / `protected:` / `private:` prefixes.
        const NO_ACCESS              = 1 << 6;
        /// Drop `static` / `virtual` prefixes.
        const NO_MEMBER_KIND         = 1 << 7;
        /// Drop the `class` / `struct` / `union` / `enum` keyword in front
        /// of compound type names.
        const NO_CLASS_KIND          = 1 << 8;
        /// Drop `__ptr64` while keeping the other pointer modifiers.
        const NO_PTR64               = 1 << 9;
        /// Print the qualified name alone.
        const NAME_ONLY              = 1 << 10;
        /// Print the type projection alone, the name omitted.
        const TYPE_ONLY              = 1 << 11;
        /// Do not reproduce the rendering bugs of the reference tool.
        const NO_QUIRKS              = 1 << 12;
    }
}

impl Default for Flags {
    /// Semantically-faithful output: quirk emulation off, everything else
    /// printed.
    fn default() -> Self {
        Flags::NO_QUIRKS
    }
}

/// Decodes one mangled symbol into its [`Symbol`] tree.
///
/// The whole input must be consumed; trailing characters after a complete
/// symbol are rejected as [`ErrorKind::NonsenseAtEnd`].
pub fn parse(mangled: &str, flags: Flags) -> Result<Symbol> {
    log::trace!("decoding {mangled:?}");
    parse::parse(mangled, flags)
}
