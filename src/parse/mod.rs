//! Recursive descent over the mangled grammar.
//!
//! ```text
//! <symbol> = ? ? @ <code-view-blob>
//!          | ? ? ? <symbol> <suffix>
//!          | ? <qualified-name> <kind-code>
//!
//! <qualified-name> = <terminal-name> {<qualifier>}* @
//!
//! <kind-code> = 0..9            // data and special data
//!             | A..Z            // functions, with gaps
//! ```
//!
//! Every production consumes exactly what it recognises and reports
//! failures through the single structured error channel; nothing recovers
//! locally and no partial tree escapes.

mod context;

pub(crate) use context::Context;

use crate::ast::*;
use crate::error::{ErrorKind, Result};
use crate::tokens::CharClass;
use crate::Flags;

/// Decodes one complete symbol, rejecting trailing characters.
pub(crate) fn parse(src: &str, flags: Flags) -> Result<Symbol> {
    let mut ctx = Context::new(src, flags)?;
    let mut sym = Symbol::parse(&mut ctx).map_err(|err| {
        log::trace!("rejected '{src}': {err}");
        err
    })?;

    if !ctx.at_end() {
        return Err(ctx.error(ErrorKind::NonsenseAtEnd));
    }

    sym.mangled = Some(src.into());
    Ok(sym)
}

/// Parses a node, potentially memorising it for later back references.
trait Parse: Sized {
    fn parse(ctx: &mut Context) -> Result<Self>;
}

impl Parse for Symbol {
    fn parse(ctx: &mut Context) -> Result<Self> {
        ctx.descend()?;
        let result = symbol_body(ctx);
        ctx.ascend();
        result
    }
}

fn symbol_body(ctx: &mut Context) -> Result<Symbol> {
    let tok = ctx.cur()?;
    if tok.byte() != b'?' {
        return Err(ctx.error_at(ErrorKind::BadSymbolStart, tok));
    }
    ctx.advance()?;

    // code-view reserved: preserved as an opaque blob
    if ctx.peek_byte() == Some(b'?') && ctx.lookahead_byte() == Some(b'@') {
        ctx.advance()?;
        ctx.advance()?;
        let blob = ctx.take_rest();

        return Ok(Symbol {
            mangled: None,
            name: QualifiedName::unscoped(Name::Ident(Ident::new(blob))),
            kind: SymbolKind::CodeView(blob.into()),
        });
    }

    // double-encoded: decode the nested symbol, keep the suffix verbatim
    // rather than guessing its termination rule
    if ctx.peek_byte() == Some(b'?') && ctx.lookahead_byte() == Some(b'?') {
        let inner = Symbol::parse(ctx)?;
        let suffix = ctx.take_rest();

        return Ok(Symbol {
            mangled: None,
            name: inner.name.clone(),
            kind: SymbolKind::DoubleEncoded(DoubleEncoded {
                inner: Box::new(inner),
                suffix: suffix.into(),
            }),
        });
    }

    let name = QualifiedName::parse(ctx)?;

    if ctx.at_end() {
        if ctx.flags.contains(Flags::ALLOW_FRAGMENTS) {
            return Ok(Symbol {
                mangled: None,
                name,
                kind: SymbolKind::Fragment,
            });
        }

        return Err(ctx.error(ErrorKind::PrematureEnd));
    }

    let tok = ctx.cur()?;
    let kind = match tok.class() {
        CharClass::Digit => data_symbol(ctx)?,
        CharClass::Upper => SymbolKind::Function(function_symbol(ctx, &name)?),
        _ => return Err(ctx.error_at(ErrorKind::InvalidSymbolKind, tok)),
    };

    Ok(Symbol {
        mangled: None,
        name,
        kind,
    })
}

/// ```text
/// <kind-code> = 0 | 1 | 2       // static member, protection from the digit
///             | 3               // global variable
///             | 4               // function-local static
///             | 5               // local static guard
///             | 6 | 7           // vtable / vbtable, optional {for} target
///             | 8 | 9           // typeless special data
/// ```
fn data_symbol(ctx: &mut Context) -> Result<SymbolKind> {
    let tok = ctx.bump()?;

    let kind = match tok.base10().expect("caller matched a digit") {
        0 => variable(ctx, VariableKind::StaticMember(Access::Private))?,
        1 => variable(ctx, VariableKind::StaticMember(Access::Protected))?,
        2 => variable(ctx, VariableKind::StaticMember(Access::Public))?,
        3 => variable(ctx, VariableKind::Global)?,
        4 => variable(ctx, VariableKind::LocalStatic)?,
        5 => SymbolKind::Special(SpecialData::Guard),
        6 => SymbolKind::Special(SpecialData::Vtable(table(ctx)?)),
        7 => SymbolKind::Special(SpecialData::Vbtable(table(ctx)?)),
        8 => SymbolKind::Special(SpecialData::Metadata),
        9 => SymbolKind::Special(SpecialData::Untyped),
        _ => unreachable!("base10 is 0..=9"),
    };

    Ok(kind)
}

/// The declared storage class is stored exactly as received; see the note
/// on [`Variable`] about pointer variables.
fn variable(ctx: &mut Context, kind: VariableKind) -> Result<SymbolKind> {
    let ty = Type::parse(ctx)?;
    let modifiers = storage_modifiers(ctx);
    let storage = StorageClass::parse(ctx)?;

    Ok(SymbolKind::Variable(Variable {
        kind,
        ty: Box::new(ty),
        modifiers,
        storage,
    }))
}

fn table(ctx: &mut Context) -> Result<Table> {
    let storage = StorageClass::parse(ctx)?;

    let target = if ctx.at_end() || ctx.eat(b'@') {
        None
    } else {
        let target = QualifiedName::parse(ctx)?;
        ctx.eat(b'@');
        Some(target)
    };

    Ok(Table { storage, target })
}

/// ```text
/// <function-kind> = A | B       // private near/far
///                 | C | D       // private static
///                 | E | F       // private virtual
///                 | I | J       // protected
///                 | K | L       // protected static
///                 | M | N       // protected virtual
///                 | Q | R       // public
///                 | S | T       // public static
///                 | U | V       // public virtual
///                 | Y | Z       // global near/far
/// ```
///
/// The remaining letters in the range are holes and reject.
fn function_symbol(ctx: &mut Context, name: &QualifiedName) -> Result<Function> {
    let tok = ctx.bump()?;

    let member = |access, kind| FunctionScope::Member { access, kind };
    let scope = match tok.byte() {
        b'A' | b'B' => member(Access::Private, MemberKind::Normal),
        b'C' | b'D' => member(Access::Private, MemberKind::Static),
        b'E' | b'F' => member(Access::Private, MemberKind::Virtual),
        b'I' | b'J' => member(Access::Protected, MemberKind::Normal),
        b'K' | b'L' => member(Access::Protected, MemberKind::Static),
        b'M' | b'N' => member(Access::Protected, MemberKind::Virtual),
        b'Q' | b'R' => member(Access::Public, MemberKind::Normal),
        b'S' | b'T' => member(Access::Public, MemberKind::Static),
        b'U' | b'V' => member(Access::Public, MemberKind::Virtual),
        b'Y' | b'Z' => FunctionScope::Global,
        _ => return Err(ctx.error_at(ErrorKind::InvalidSymbolKind, tok)),
    };

    // only instance members carry a `this` description
    let has_this = matches!(
        scope,
        FunctionScope::Member {
            kind: MemberKind::Normal | MemberKind::Virtual,
            ..
        }
    );

    let (this_modifiers, this_storage) = if has_this {
        let modifiers = storage_modifiers(ctx);
        let storage = StorageClass::parse(ctx)?;
        (modifiers, Some(storage))
    } else {
        (Vec::new(), None)
    };

    let ty = function_type(ctx, allows_missing_return(&name.name))?;

    Ok(Function {
        scope,
        this_modifiers,
        this_storage,
        ty,
    })
}

fn allows_missing_return(name: &Name) -> bool {
    match name {
        Name::Constructor | Name::Destructor => true,
        Name::Template(tpl) => matches!(tpl.name, Name::Constructor | Name::Destructor),
        _ => false,
    }
}

/// ```text
/// <function-type> = <calling-convention> <return-type> <parameters> Z
///
/// <return-type> = @                   // constructors and destructors
///               | [? <storage-class>] <type>
/// ```
fn function_type(ctx: &mut Context, allow_no_return: bool) -> Result<FunctionType> {
    let tok = ctx.bump()?;

    let (convention, save_registers) = match tok.byte() {
        conv @ b'A'..=b'P' => {
            let convention = match conv {
                b'A' | b'B' => CallingConvention::Cdecl,
                b'C' | b'D' => CallingConvention::Pascal,
                b'E' | b'F' => CallingConvention::Thiscall,
                b'G' | b'H' => CallingConvention::Stdcall,
                b'I' | b'J' => CallingConvention::Fastcall,
                b'K' | b'L' => CallingConvention::Interrupt,
                b'M' | b'N' => CallingConvention::Clrcall,
                b'O' | b'P' => CallingConvention::Eabi,
                _ => unreachable!(),
            };

            (convention, (conv - b'A') % 2 == 1)
        }
        _ => return Err(ctx.error_at(ErrorKind::InvalidCallingConvention, tok)),
    };

    let (return_storage, return_type) = if ctx.eat(b'@') {
        if !allow_no_return {
            return Err(ctx.error(ErrorKind::ExpectedReturnType));
        }

        (None, None)
    } else {
        let storage = if ctx.eat(b'?') {
            Some(return_storage_class(ctx)?)
        } else {
            None
        };

        (storage, Some(Box::new(Type::parse(ctx)?)))
    };

    let (params, varargs) = param_types(ctx)?;

    if !ctx.eat(b'Z') {
        return Err(ctx.error(ErrorKind::UnterminatedFunction));
    }

    Ok(FunctionType {
        convention,
        save_registers,
        return_storage,
        return_type,
        params,
        varargs,
        storage: None,
    })
}

/// ```text
/// <parameters> = X              // (void), first and only
///              | <type>+ @
///              | <type>* Z      // trailing varargs
/// ```
fn param_types(ctx: &mut Context) -> Result<(Vec<Type>, bool)> {
    let mut params = Vec::new();
    let mut varargs = false;

    loop {
        if ctx.at_end() {
            return Err(ctx.error(ErrorKind::UnterminatedParameterList));
        }

        if params.is_empty() && ctx.eat(b'X') {
            break;
        }

        if ctx.eat(b'Z') {
            varargs = true;
            break;
        }

        if ctx.peek_byte() == Some(b'@') {
            if params.is_empty() {
                return Err(ctx.error(ErrorKind::EmptyParameterList));
            }

            ctx.advance()?;
            break;
        }

        let tok = ctx.cur()?;
        if tok.class() == CharClass::Digit {
            ctx.advance()?;
            params.push(ctx.param_backref(tok)?);
            continue;
        }

        // single-letter encodings are never memorised; a back reference
        // would not be shorter than respelling them
        let start = ctx.offset();
        let ty = Type::parse(ctx)?;
        if ctx.offset() - start > 1 {
            ctx.scope().memorize_param(&ty);
        }

        params.push(ty);
    }

    Ok((params, varargs))
}

impl Parse for QualifiedName {
    fn parse(ctx: &mut Context) -> Result<Self> {
        ctx.descend()?;
        let result = qualified_name_body(ctx);
        ctx.ascend();
        result
    }
}

fn qualified_name_body(ctx: &mut Context) -> Result<QualifiedName> {
    let name = terminal_name(ctx)?;
    let mut qualifiers = Vec::new();

    loop {
        if ctx.at_end() {
            return Err(ctx.error(ErrorKind::UnterminatedQualifiedName));
        }

        if ctx.eat(b'@') {
            break;
        }

        qualifiers.push(qualifier(ctx)?);
    }

    Ok(QualifiedName { name, qualifiers })
}

/// The terminal position admits operators and special names; a digit is a
/// back reference into the name table.
fn terminal_name(ctx: &mut Context) -> Result<Name> {
    let tok = ctx.cur()?;

    match tok.class() {
        CharClass::Digit => {
            ctx.advance()?;
            ctx.name_backref(tok)
        }
        CharClass::Special => {
            ctx.advance()?;
            special_terminal(ctx)
        }
        _ => {
            let ident = ctx.ident(false)?;
            let name = Name::Ident(Ident::new(ident));
            ctx.scope().memorize_name(&name);
            Ok(name)
        }
    }
}

fn special_terminal(ctx: &mut Context) -> Result<Name> {
    let tok = ctx.cur()?;

    match tok.byte() {
        b'$' => {
            ctx.advance()?;
            template(ctx)
        }
        b'0'..=b'9' | b'A'..=b'Z' | b'_' => operator_name(ctx),
        _ => Err(ctx.error_at(ErrorKind::InvalidSpecialName, tok)),
    }
}

/// ```text
/// <qualifier> = <identifier> @
///             | 0..9                    // name back reference
///             | ? % <generated-name> @  // anonymous namespace
///             | ? A <generated-name> @  // anonymous namespace
///             | ? <number>              // lexical frame
///             | ? $ <template>
///             | ? ? <symbol>            // nested symbol scope
/// ```
fn qualifier(ctx: &mut Context) -> Result<Name> {
    let tok = ctx.cur()?;

    match tok.class() {
        CharClass::Digit => {
            ctx.advance()?;
            ctx.name_backref(tok)
        }
        CharClass::Special => {
            ctx.advance()?;
            let tok = ctx.cur()?;

            match tok.byte() {
                b'$' => {
                    ctx.advance()?;
                    template(ctx)
                }
                b'%' | b'A' => {
                    ctx.advance()?;
                    let ident = ctx.ident(true)?;
                    let name = Name::Anonymous(Ident::new(ident));
                    ctx.scope().memorize_name(&name);
                    Ok(name)
                }
                b'?' => {
                    let sym = Symbol::parse(ctx)?;
                    Ok(Name::Nested(Box::new(sym)))
                }
                b'0'..=b'9' => {
                    let frame = ctx.signed()?;
                    Ok(Name::Frame(frame))
                }
                // interface qualifiers are documented but never emitted
                b'I' | b'Q' => Err(ctx.error_at(ErrorKind::InvalidSpecialName, tok)),
                _ => Err(ctx.error_at(ErrorKind::UnexpectedCharacter, tok)),
            }
        }
        _ => {
            let ident = ctx.ident(false)?;
            let name = Name::Ident(Ident::new(ident));
            ctx.scope().memorize_name(&name);
            Ok(name)
        }
    }
}

/// Operator and special-name codes, after the introducing `?`.
fn operator_name(ctx: &mut Context) -> Result<Name> {
    let tok = ctx.bump()?;

    let op = match tok.byte() {
        b'0' => return Ok(Name::Constructor),
        b'1' => return Ok(Name::Destructor),
        b'2' => Operator::New,
        b'3' => Operator::Delete,
        b'4' => Operator::Assign,
        b'5' => Operator::ShiftRight,
        b'6' => Operator::ShiftLeft,
        b'7' => Operator::LogicalNot,
        b'8' => Operator::Equals,
        b'9' => Operator::NotEquals,
        b'A' => Operator::Subscript,
        b'B' => Operator::Cast,
        b'C' => Operator::Arrow,
        b'D' => Operator::Dereference,
        b'E' => Operator::Increment,
        b'F' => Operator::Decrement,
        b'G' => Operator::Minus,
        b'H' => Operator::Plus,
        b'I' => Operator::BitAnd,
        b'J' => Operator::ArrowStar,
        b'K' => Operator::Divide,
        b'L' => Operator::Modulus,
        b'M' => Operator::Less,
        b'N' => Operator::LessEqual,
        b'O' => Operator::Greater,
        b'P' => Operator::GreaterEqual,
        b'Q' => Operator::Comma,
        b'R' => Operator::Call,
        b'S' => Operator::BitNot,
        b'T' => Operator::BitXor,
        b'U' => Operator::BitOr,
        b'V' => Operator::LogicalAnd,
        b'W' => Operator::LogicalOr,
        b'X' => Operator::TimesEquals,
        b'Y' => Operator::PlusEquals,
        b'Z' => Operator::MinusEquals,
        b'_' => return extended_name(ctx),
        _ => return Err(ctx.error_at(ErrorKind::InvalidSpecialName, tok)),
    };

    Ok(Name::Operator(op))
}

fn extended_name(ctx: &mut Context) -> Result<Name> {
    let tok = ctx.bump()?;

    let name = match tok.byte() {
        b'0' => Name::Operator(Operator::DivideEquals),
        b'1' => Name::Operator(Operator::ModulusEquals),
        b'2' => Name::Operator(Operator::ShiftRightEquals),
        b'3' => Name::Operator(Operator::ShiftLeftEquals),
        b'4' => Name::Operator(Operator::AndEquals),
        b'5' => Name::Operator(Operator::OrEquals),
        b'6' => Name::Operator(Operator::XorEquals),
        b'7' => Name::Special(SpecialName::Vftable),
        b'8' => Name::Special(SpecialName::Vbtable),
        b'9' => Name::Special(SpecialName::Vcall),
        b'A' => Name::Special(SpecialName::Typeof),
        b'B' => Name::Special(SpecialName::LocalStaticGuard),
        b'C' => Name::Special(SpecialName::StringLiteral),
        b'D' => Name::Special(SpecialName::VbaseDestructor),
        b'E' => Name::Special(SpecialName::VectorDeletingDestructor),
        b'F' => Name::Special(SpecialName::DefaultCtorClosure),
        b'G' => Name::Special(SpecialName::ScalarDeletingDestructor),
        b'H' => Name::Special(SpecialName::VectorCtorIterator),
        b'I' => Name::Special(SpecialName::VectorDtorIterator),
        b'J' => Name::Special(SpecialName::VectorVbaseCtorIterator),
        b'K' => Name::Special(SpecialName::VirtualDisplacementMap),
        b'L' => Name::Special(SpecialName::EhVectorCtorIterator),
        b'M' => Name::Special(SpecialName::EhVectorDtorIterator),
        b'N' => Name::Special(SpecialName::EhVectorVbaseCtorIterator),
        b'O' => Name::Special(SpecialName::CopyCtorClosure),
        b'P' => Name::Special(SpecialName::UdtReturning),
        b'R' => Name::Rtti(rtti(ctx)?),
        b'S' => Name::Special(SpecialName::LocalVftable),
        b'T' => Name::Special(SpecialName::LocalVftableCtorClosure),
        // the new[] / delete[] codes are reserved; no known encoder emits them
        b'U' | b'V' => return Err(ctx.error_at(ErrorKind::InvalidSpecialName, tok)),
        b'X' => Name::Special(SpecialName::PlacementDeleteClosure),
        b'Y' => Name::Special(SpecialName::PlacementDeleteArrayClosure),
        b'_' => return doubly_extended_name(ctx),
        _ => return Err(ctx.error_at(ErrorKind::InvalidSpecialName, tok)),
    };

    Ok(name)
}

fn doubly_extended_name(ctx: &mut Context) -> Result<Name> {
    let tok = ctx.bump()?;

    let name = match tok.byte() {
        b'A' => Name::Special(SpecialName::ManagedVectorCtorIterator),
        b'B' => Name::Special(SpecialName::ManagedVectorDtorIterator),
        b'C' => Name::Special(SpecialName::EhVectorCopyCtorIterator),
        b'D' => Name::Special(SpecialName::EhVectorVbaseCopyCtorIterator),
        b'E' => Name::Special(SpecialName::DynamicInitializer(initialized_symbol(ctx)?)),
        b'F' => Name::Special(SpecialName::DynamicAtExitDestructor(initialized_symbol(
            ctx,
        )?)),
        b'J' => Name::Special(SpecialName::LocalStaticThreadGuard),
        b'K' => {
            let ident = ctx.ident(false)?;
            Name::Special(SpecialName::LiteralOperator(Ident::new(ident)))
        }
        b'L' => Name::Operator(Operator::CoAwait),
        b'M' => Name::Operator(Operator::Spaceship),
        _ => return Err(ctx.error_at(ErrorKind::InvalidSpecialName, tok)),
    };

    Ok(name)
}

/// The target of a dynamic initialiser: a full nested symbol, or a bare
/// identifier for plain globals.
fn initialized_symbol(ctx: &mut Context) -> Result<Box<Symbol>> {
    if ctx.peek_byte() == Some(b'?') {
        let sym = Symbol::parse(ctx)?;
        ctx.eat(b'@');
        return Ok(Box::new(sym));
    }

    let ident = ctx.ident(false)?;

    Ok(Box::new(Symbol {
        mangled: None,
        name: QualifiedName::unscoped(Name::Ident(Ident::new(ident))),
        kind: SymbolKind::Fragment,
    }))
}

/// ```text
/// <rtti> = 0 <type>             // type descriptor
///        | 1 <number>{4}        // base class descriptor
///        | 2 | 3 | 4            // array / hierarchy / locator
/// ```
fn rtti(ctx: &mut Context) -> Result<Rtti> {
    let tok = ctx.bump()?;

    match tok.byte() {
        b'0' => {
            // return-type position: an optional cv storage class precedes
            if ctx.eat(b'?') {
                return_storage_class(ctx)?;
            }

            let ty = Type::parse(ctx)?;
            Ok(Rtti::TypeDescriptor(Box::new(ty)))
        }
        b'1' => {
            let member_offset = ctx.signed()?;
            let parent_offset = ctx.signed()?;
            let vbtable_offset = ctx.signed()?;
            let flags = ctx.unsigned()?;

            Ok(Rtti::BaseClassDescriptor {
                member_offset,
                parent_offset,
                vbtable_offset,
                flags,
            })
        }
        b'2' => Ok(Rtti::BaseClassArray),
        b'3' => Ok(Rtti::ClassHierarchy),
        b'4' => Ok(Rtti::CompleteObjectLocator),
        _ => Err(ctx.error_at(ErrorKind::InvalidRttiCode, tok)),
    }
}

/// ```text
/// <template> = <template-name> {<template-arg>}* @
/// ```
///
/// Opens a fresh back-reference scope; the finished templated name is then
/// memorised in the enclosing scope as a single entry.
fn template(ctx: &mut Context) -> Result<Name> {
    if ctx.at_end() {
        return Err(ctx.error(ErrorKind::ExpectedTemplateName));
    }

    ctx.enter_scope();
    let result = template_body(ctx);
    ctx.exit_scope();

    let name = Name::Template(Box::new(result?));
    ctx.scope().memorize_name(&name);
    Ok(name)
}

fn template_body(ctx: &mut Context) -> Result<TemplateName> {
    let name = match ctx.peek_byte() {
        Some(b'?') => {
            ctx.advance()?;
            special_terminal(ctx)?
        }
        _ => {
            // the one place an empty identifier fragment is legal
            let ident = ctx.ident(true)?;
            let name = Name::Ident(Ident::new(ident));
            ctx.scope().memorize_name(&name);
            name
        }
    };

    let mut args = Vec::new();

    loop {
        if ctx.at_end() {
            return Err(ctx.error(ErrorKind::UnterminatedTemplateParameterList));
        }

        if ctx.eat(b'@') {
            break;
        }

        let start = ctx.offset();
        let arg = template_arg(ctx)?;
        if ctx.offset() - start > 1 {
            ctx.scope().memorize_template_arg(&arg);
        }

        args.push(arg);
    }

    Ok(TemplateName { name, args })
}

/// ```text
/// <template-arg> = <type>
///                | 0..9             // template-arg back reference
///                | $ <constant>
///                | ? <number>       // template-parameter placeholder
/// ```
fn template_arg(ctx: &mut Context) -> Result<TemplateArg> {
    let tok = ctx.cur()?;

    match tok.byte() {
        b'0'..=b'9' => {
            ctx.advance()?;
            ctx.template_arg_backref(tok)
        }
        // `$$` opens an extended type, not a constant
        b'$' if ctx.lookahead_byte() == Some(b'$') => Type::parse(ctx).map(TemplateArg::Type),
        b'$' => {
            ctx.advance()?;
            template_const(ctx)
        }
        b'?' => {
            ctx.advance()?;
            let index = ctx.signed()?;
            Ok(TemplateArg::Param(TemplateParam::Type { index }))
        }
        b'A'..=b'Z' | b'_' => Type::parse(ctx).map(TemplateArg::Type),
        _ => Err(ctx.error_at(ErrorKind::InvalidTemplateArgument, tok)),
    }
}

/// ```text
/// <constant> = 0 [?] <number>       // signed integer
///            | 1 (@ | <symbol>)     // address-of, @ for null
///            | 2 <number> <number>  // mantissa, exponent
///            | D <number>           // template-parameter placeholder
///            | Q <number>           // non-type placeholder
///            | R <name> <number>    // named placeholder
///            | E <symbol>
///            | F..J                 // composite curly values
/// ```
fn template_const(ctx: &mut Context) -> Result<TemplateArg> {
    let tok = ctx.bump()?;

    match tok.byte() {
        b'0' => {
            let negative = ctx.eat(b'?');

            // a `Q` here is an observed toolchain artefact standing for a
            // non-type parameter; the quirk flag drives its rendering
            if ctx.peek_byte() == Some(b'Q') {
                ctx.advance()?;
                let index = ctx.signed()?;
                return Ok(TemplateArg::Param(TemplateParam::NonType {
                    index,
                    missing_quote: true,
                }));
            }

            let magnitude = ctx.unsigned()?;
            let value = if negative {
                if magnitude > i64::MAX as u64 {
                    return Err(ctx.error(ErrorKind::InvalidDataEncoding));
                }
                -(magnitude as i64)
            } else {
                i64::try_from(magnitude)
                    .map_err(|_| ctx.error(ErrorKind::InvalidDataEncoding))?
            };

            Ok(TemplateArg::Literal(Literal::Int(value)))
        }
        b'1' => {
            if ctx.eat(b'@') {
                return Ok(TemplateArg::Literal(Literal::Address(None)));
            }

            let sym = Symbol::parse(ctx)?;
            Ok(TemplateArg::Literal(Literal::Address(Some(Box::new(sym)))))
        }
        b'2' => {
            let mantissa = ctx.signed()?;
            let exponent = ctx.signed()?;
            Ok(TemplateArg::Literal(Literal::Float { mantissa, exponent }))
        }
        b'D' => {
            let index = ctx.signed()?;
            Ok(TemplateArg::Param(TemplateParam::Type { index }))
        }
        b'Q' => {
            let index = ctx.signed()?;
            Ok(TemplateArg::Param(TemplateParam::NonType {
                index,
                missing_quote: false,
            }))
        }
        b'R' => {
            // deliberately not memorised
            let ident = ctx.ident(false)?;
            let index = ctx.signed()?;
            Ok(TemplateArg::Param(TemplateParam::Named {
                name: Ident::new(ident),
                index,
            }))
        }
        b'E' => {
            let sym = Symbol::parse(ctx)?;
            Ok(TemplateArg::Symbol(Box::new(sym)))
        }
        b'F' => {
            let values = [ctx.signed()?, ctx.signed()?, ctx.signed()?];
            Ok(TemplateArg::Curly(Curly::Gptmd(values)))
        }
        b'G' => {
            let sym = Box::new(Symbol::parse(ctx)?);
            let values = [ctx.signed()?, ctx.signed()?];
            Ok(TemplateArg::Curly(Curly::Mptmf(sym, values)))
        }
        b'H' => {
            let sym = Box::new(Symbol::parse(ctx)?);
            let values = [ctx.signed()?, ctx.signed()?, ctx.signed()?];
            Ok(TemplateArg::Curly(Curly::Vptmf(sym, values)))
        }
        b'I' => {
            let sym = Box::new(Symbol::parse(ctx)?);
            let values = [ctx.signed()?, ctx.signed()?, ctx.signed()?, ctx.signed()?];
            Ok(TemplateArg::Curly(Curly::Gptmf(sym, values)))
        }
        b'J' => {
            let values = [
                ctx.signed()?,
                ctx.signed()?,
                ctx.signed()?,
                ctx.signed()?,
                ctx.signed()?,
            ];
            Ok(TemplateArg::Curly(Curly::Vptmd(values)))
        }
        _ => Err(ctx.error_at(ErrorKind::InvalidTemplateConstant, tok)),
    }
}

impl Parse for Type {
    fn parse(ctx: &mut Context) -> Result<Self> {
        ctx.descend()?;
        let result = type_body(ctx);
        ctx.ascend();
        result
    }
}

/// ```text
/// <type> = A | B                    // reference, volatile reference
///        | P | Q | R | S           // pointer, cv from the letter
///        | T | U | V <name>        // union / struct / class
///        | W <digit> <name>        // enum with base type
///        | _ <letter>              // extended primitives
///        | $ $ <extended>          // nullptr, rvalue refs, fn-as-type
///        | <letter>                // primitive table
///        | 0..9                    // parameter back reference
/// ```
fn type_body(ctx: &mut Context) -> Result<Type> {
    let tok = ctx.cur()?;

    match tok.byte() {
        b'0'..=b'9' => {
            ctx.advance()?;
            ctx.param_backref(tok)
        }
        b'A' | b'B' => {
            ctx.advance()?;
            let qualifiers = if tok.byte() == b'B' {
                StorageBits::VOLATILE
            } else {
                StorageBits::empty()
            };

            reference(ctx, qualifiers, false)
        }
        b @ b'P'..=b'S' => {
            ctx.advance()?;
            let mut qualifiers = StorageBits::empty();
            if (b - b'P') & 1 != 0 {
                qualifiers |= StorageBits::CONST;
            }
            if (b - b'P') & 2 != 0 {
                qualifiers |= StorageBits::VOLATILE;
            }

            let (modifiers, storage, target) = pointee(ctx)?;

            Ok(Type::Ptr(Indirection {
                qualifiers,
                modifiers,
                storage,
                target: Box::new(target),
            }))
        }
        b @ (b'T' | b'U' | b'V') => {
            ctx.advance()?;
            let kind = match b {
                b'T' => CompoundKind::Union,
                b'U' => CompoundKind::Struct,
                _ => CompoundKind::Class,
            };

            let name = QualifiedName::parse(ctx)?;
            Ok(Type::Compound(Compound { kind, name }))
        }
        b'W' => {
            ctx.advance()?;
            let base_tok = ctx.bump()?;
            let base = match base_tok.base10() {
                Some(0) => Primitive::Char,
                Some(1) => Primitive::UnsignedChar,
                Some(2) => Primitive::Short,
                Some(3) => Primitive::UnsignedShort,
                Some(4) => Primitive::Int,
                Some(5) => Primitive::UnsignedInt,
                Some(6) => Primitive::Long,
                Some(7) => Primitive::UnsignedLong,
                _ => return Err(ctx.error_at(ErrorKind::InvalidEnumBaseType, base_tok)),
            };

            let name = QualifiedName::parse(ctx)?;
            Ok(Type::Enum(Enum { base, name }))
        }
        b'$' => {
            ctx.advance()?;
            ctx.expect(b'$', ErrorKind::UnexpectedCharacter)?;
            extended_type(ctx)
        }
        b'_' => {
            ctx.advance()?;
            let ext = ctx.bump()?;
            let prim = match ext.byte() {
                b'D' => Primitive::Int8,
                b'E' => Primitive::UInt8,
                b'F' => Primitive::Int16,
                b'G' => Primitive::UInt16,
                b'H' => Primitive::Int32,
                b'I' => Primitive::UInt32,
                b'J' => Primitive::Int64,
                b'K' => Primitive::UInt64,
                b'L' => Primitive::Int128,
                b'M' => Primitive::UInt128,
                b'N' => Primitive::Bool,
                b'Q' => Primitive::Char8,
                b'S' => Primitive::Char16,
                b'U' => Primitive::Char32,
                b'W' => Primitive::WChar,
                _ => return Err(ctx.error_at(ErrorKind::UnusedTypeCode, ext)),
            };

            Ok(Type::Primitive(prim))
        }
        b'C'..=b'O' | b'X' => {
            ctx.advance()?;
            let prim = match tok.byte() {
                b'C' => Primitive::SignedChar,
                b'D' => Primitive::Char,
                b'E' => Primitive::UnsignedChar,
                b'F' => Primitive::Short,
                b'G' => Primitive::UnsignedShort,
                b'H' => Primitive::Int,
                b'I' => Primitive::UnsignedInt,
                b'J' => Primitive::Long,
                b'K' => Primitive::UnsignedLong,
                b'M' => Primitive::Float,
                b'N' => Primitive::Double,
                b'O' => Primitive::LongDouble,
                b'X' => Primitive::Void,
                b'L' => return Err(ctx.error_at(ErrorKind::UnusedTypeCode, tok)),
                _ => unreachable!(),
            };

            Ok(Type::Primitive(prim))
        }
        b'Y' | b'Z' => Err(ctx.error_at(ErrorKind::UnusedTypeCode, tok)),
        _ => Err(ctx.error_at(ErrorKind::UnexpectedCharacter, tok)),
    }
}

/// `$$`-introduced types.
fn extended_type(ctx: &mut Context) -> Result<Type> {
    let tok = ctx.bump()?;

    match tok.byte() {
        b'T' => Ok(Type::NullPtr),
        b'Q' => reference_rvalue(ctx, StorageBits::empty()),
        b'R' => reference_rvalue(ctx, StorageBits::VOLATILE),
        b'A' => {
            let storage = StorageClass::parse(ctx)?;
            if !storage.is_function() {
                return Err(ctx.error(ErrorKind::InvalidFunctionStorage));
            }

            let mut func = function_type(ctx, false)?;
            func.storage = Some(Box::new(storage));
            Ok(Type::Function(Box::new(func)))
        }
        _ => Err(ctx.error_at(ErrorKind::UnusedTypeCode, tok)),
    }
}

fn reference(ctx: &mut Context, qualifiers: StorageBits, rvalue: bool) -> Result<Type> {
    let (modifiers, storage, target) = pointee(ctx)?;

    if matches!(target, Type::Ref(_) | Type::RvalueRef(_)) {
        return Err(ctx.error(ErrorKind::DoubleReference));
    }

    let ind = Indirection {
        qualifiers,
        modifiers,
        storage,
        target: Box::new(target),
    };

    Ok(if rvalue {
        Type::RvalueRef(ind)
    } else {
        Type::Ref(ind)
    })
}

fn reference_rvalue(ctx: &mut Context, qualifiers: StorageBits) -> Result<Type> {
    reference(ctx, qualifiers, true)
}

/// Modifiers, the referent's storage class, and the referent itself. A
/// storage class carrying the function bit switches the referent to a
/// function type.
fn pointee(ctx: &mut Context) -> Result<(Vec<Modifier>, StorageClass, Type)> {
    let modifiers = storage_modifiers(ctx);
    let storage = StorageClass::parse(ctx)?;

    let target = if storage.is_function() {
        Type::Function(Box::new(function_type(ctx, false)?))
    } else {
        Type::parse(ctx)?
    };

    Ok((modifiers, storage, target))
}

/// Greedy maximal run of `E`/`F`/`I`, order preserved.
fn storage_modifiers(ctx: &mut Context) -> Vec<Modifier> {
    let mut modifiers = Vec::new();

    loop {
        let modifier = match ctx.peek_byte() {
            Some(b'E') => Modifier::Ptr64,
            Some(b'F') => Modifier::Unaligned,
            Some(b'I') => Modifier::Restrict,
            _ => break,
        };

        ctx.advance().expect("peeked byte exists");
        modifiers.push(modifier);
    }

    modifiers
}

impl Parse for StorageClass {
    /// ```text
    /// <storage-class> = A..D            // cv bits
    ///                 | E..L            // near/huge relics, rejected
    ///                 | M..P <base>     // based
    ///                 | Q..T <name>     // member
    ///                 | 2..5 <name> <base>  // based member
    ///                 | 6 | 7           // function
    ///                 | 8 | 9 <name> <storage-class>  // member function
    ///                 | _ A..D          // extended based function
    /// ```
    fn parse(ctx: &mut Context) -> Result<Self> {
        let tok = ctx.bump()?;

        match tok.byte() {
            b @ b'A'..=b'D' => Ok(StorageClass::from_bits(cv_bits(b - b'A'))),
            b'E'..=b'L' => Err(ctx.error_at(ErrorKind::InvalidStorageClass, tok)),
            b @ b'M'..=b'P' => {
                let mut sc = StorageClass::from_bits(cv_bits(b - b'M') | StorageBits::BASED);
                sc.base = Some(base_name(ctx)?);
                Ok(sc)
            }
            b @ b'Q'..=b'T' => {
                let mut sc = StorageClass::from_bits(cv_bits(b - b'Q') | StorageBits::MEMBER);
                sc.member = Some(Box::new(QualifiedName::parse(ctx)?));
                Ok(sc)
            }
            b @ b'2'..=b'5' => {
                let mut sc = StorageClass::from_bits(
                    cv_bits(b - b'2') | StorageBits::BASED | StorageBits::MEMBER,
                );
                sc.member = Some(Box::new(QualifiedName::parse(ctx)?));
                sc.base = Some(base_name(ctx)?);
                Ok(sc)
            }
            // far function storage collapses onto the near form
            b'6' | b'7' => Ok(StorageClass::from_bits(StorageBits::FUNCTION)),
            b'8' | b'9' => {
                let mut sc =
                    StorageClass::from_bits(StorageBits::MEMBER | StorageBits::FUNCTION);
                sc.member = Some(Box::new(QualifiedName::parse(ctx)?));
                sc.nested = Some(Box::new(StorageClass::parse(ctx)?));
                Ok(sc)
            }
            b'_' => {
                let ext = ctx.bump()?;
                match ext.byte() {
                    b'A' | b'B' => {
                        let mut sc = StorageClass::from_bits(
                            StorageBits::BASED | StorageBits::FUNCTION,
                        );
                        sc.base = Some(base_name(ctx)?);
                        Ok(sc)
                    }
                    b'C' | b'D' => {
                        let mut sc = StorageClass::from_bits(
                            StorageBits::BASED | StorageBits::MEMBER | StorageBits::FUNCTION,
                        );
                        sc.base = Some(base_name(ctx)?);
                        sc.member = Some(Box::new(QualifiedName::parse(ctx)?));
                        sc.nested = Some(Box::new(StorageClass::parse(ctx)?));
                        Ok(sc)
                    }
                    _ => Err(ctx.error_at(ErrorKind::InvalidStorageClass, ext)),
                }
            }
            _ => Err(ctx.error_at(ErrorKind::InvalidStorageClass, tok)),
        }
    }
}

fn cv_bits(low: u8) -> StorageBits {
    let mut bits = StorageBits::empty();
    if low & 1 != 0 {
        bits |= StorageBits::CONST;
    }
    if low & 2 != 0 {
        bits |= StorageBits::VOLATILE;
    }
    bits
}

/// The cv-only storage class that may precede a return type after `?`.
fn return_storage_class(ctx: &mut Context) -> Result<StorageClass> {
    let tok = ctx.bump()?;

    match tok.byte() {
        b @ b'A'..=b'D' => Ok(StorageClass::from_bits(cv_bits(b - b'A'))),
        _ => Err(ctx.error_at(ErrorKind::InvalidStorageClass, tok)),
    }
}

/// ```text
/// <base> = 0            // __based(void)
///        | 2 <name>     // ordinary base pointer
/// ```
fn base_name(ctx: &mut Context) -> Result<BaseName> {
    let tok = ctx.bump()?;

    match tok.byte() {
        b'0' => Ok(BaseName::Void),
        b'2' => Ok(BaseName::Name(QualifiedName::parse(ctx)?)),
        _ => Err(ctx.error_at(ErrorKind::InvalidBasedPointerType, tok)),
    }
}
