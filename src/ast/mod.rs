//! AST for decoded symbols.
//!
//! The parser builds this tree bottom-up in a single pass and never mutates
//! a node after its production returns. Ownership flows strictly downwards
//! (`Box`/`Vec`), so every node has exactly one parent and dropping the root
//! drops the whole tree. Back references are resolved by cloning the
//! memorised sub-tree, which keeps the result a pure tree with no shared
//! interior nodes.
//!
//! Printing is a separate traversal in [`print`], driven by caller-supplied
//! [`Flags`](crate::Flags); the nodes that need an enclosing context
//! (constructors, destructors, the cast operator) receive it as an explicit
//! argument there instead of through parent pointers.

pub(crate) mod print;

use bitflags::bitflags;

use crate::Flags;

/// A decoded symbol: the root of the tree, or a nested sub-symbol inside a
/// template argument or scope qualifier.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub(crate) mangled: Option<Box<str>>,
    pub(crate) name: QualifiedName,
    pub(crate) kind: SymbolKind,
}

/// What the qualified name refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    /// A bare qualified name with no kind code; produced only under
    /// [`Flags::ALLOW_FRAGMENTS`](crate::Flags::ALLOW_FRAGMENTS).
    Fragment,
    /// A CodeView-reserved `??@` symbol, preserved undecoded.
    CodeView(Box<str>),
    /// A `???` double-encoded symbol: the decoded inner symbol plus the
    /// trailing suffix whose extraction rule is not documented.
    DoubleEncoded(DoubleEncoded),
    Function(Function),
    Variable(Variable),
    Special(SpecialData),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoubleEncoded {
    pub inner: Box<Symbol>,
    pub suffix: Box<str>,
}

/// Member protection level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Private,
    Protected,
    Public,
}

/// Member function classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Normal,
    Static,
    Virtual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionScope {
    Global,
    Member { access: Access, kind: MemberKind },
}

/// A function symbol. The signature proper lives in [`FunctionType`]; this
/// adds what the kind letter encodes about the symbol itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub scope: FunctionScope,
    /// `this`-pointer modifiers, empty for static members and globals.
    pub this_modifiers: Vec<Modifier>,
    /// cv-qualification of `this`, `None` for static members and globals.
    pub this_storage: Option<StorageClass>,
    pub ty: FunctionType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub convention: CallingConvention,
    pub save_registers: bool,
    /// `?`-introduced storage class on the return type.
    pub return_storage: Option<StorageClass>,
    /// `None` for constructors and destructors.
    pub return_type: Option<Box<Type>>,
    pub params: Vec<Type>,
    pub varargs: bool,
    /// Member-function cv-qualification when the function appears as a type
    /// behind a member pointer or `$$A`.
    pub storage: Option<Box<StorageClass>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Global,
    StaticMember(Access),
    LocalStatic,
}

/// A data symbol. The storage class is kept exactly as received: for
/// pointer variables the toolchain writes the referent's storage class at
/// this position, and the tree preserves that observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub kind: VariableKind,
    pub ty: Box<Type>,
    pub modifiers: Vec<Modifier>,
    pub storage: StorageClass,
}

/// Compiler-generated data kinds introduced by the symbol-kind digit.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecialData {
    /// Kind `6`: a virtual function table, with an optional `{for 'T'}`
    /// target.
    Vtable(Table),
    /// Kind `7`: a vbtable-like reserved datum with the same shape.
    Vbtable(Table),
    /// Kind `5`: a local static guard.
    Guard,
    /// Kind `8`: typeless special data; hosts the RTTI names.
    Metadata,
    /// Kind `9`: reserved typeless datum (C-linkage data).
    Untyped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub storage: StorageClass,
    pub target: Option<QualifiedName>,
}

/// One terminal name plus its enclosing qualifiers, innermost first.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedName {
    pub name: Name,
    pub qualifiers: Vec<Name>,
}

/// A single name component.
#[derive(Debug, Clone, PartialEq)]
pub enum Name {
    Ident(Ident),
    /// A generated anonymous-namespace identifier; the flag changes how it
    /// prints, not what it stores.
    Anonymous(Ident),
    Template(Box<TemplateName>),
    Operator(Operator),
    /// Takes its visible text from the immediately enclosing qualifier.
    Constructor,
    Destructor,
    Special(SpecialName),
    Rtti(Rtti),
    /// An integer-indexed lexical frame qualifier.
    Frame(i64),
    /// A whole nested symbol used as a scope qualifier.
    Nested(Box<Symbol>),
    /// A placeholder for an uninstantiated template parameter.
    TemplateParam(TemplateParam),
}

/// A literal name fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident(Box<str>);

impl Ident {
    pub(crate) fn new(s: &str) -> Self {
        Ident(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateName {
    pub name: Name,
    pub args: Vec<TemplateArg>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateArg {
    Type(Type),
    Literal(Literal),
    Param(TemplateParam),
    /// A whole nested symbol as an argument (`$E`).
    Symbol(Box<Symbol>),
    /// A structured `{a,b,c}` composite argument.
    Curly(Curly),
}

/// Constant values appearing in template arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    /// `(mantissa * 10^-1) * 10^exponent`.
    Float { mantissa: i64, exponent: i64 },
    /// Address of a symbol; `None` encodes the null pointer constant.
    Address(Option<Box<Symbol>>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateParam {
    Type {
        index: i64,
    },
    NonType {
        index: i64,
        /// Set when the placeholder came from the `$0...Q` encoding; the
        /// reference tool drops the closing quote for these, and the quirk
        /// printing reproduces that.
        missing_quote: bool,
    },
    Named {
        name: Ident,
        index: i64,
    },
}

/// The rarely-seen composite template constants `$F`..`$J`.
#[derive(Debug, Clone, PartialEq)]
pub enum Curly {
    Gptmd([i64; 3]),
    Mptmf(Box<Symbol>, [i64; 2]),
    Vptmf(Box<Symbol>, [i64; 3]),
    Gptmf(Box<Symbol>, [i64; 4]),
    Vptmd([i64; 5]),
}

/// Overloadable operators. `Cast` borrows its visible text from the
/// containing function's return type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    New,
    Delete,
    Assign,
    ShiftRight,
    ShiftLeft,
    LogicalNot,
    Equals,
    NotEquals,
    Subscript,
    Cast,
    Arrow,
    Dereference,
    Increment,
    Decrement,
    Minus,
    Plus,
    BitAnd,
    ArrowStar,
    Divide,
    Modulus,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Comma,
    Call,
    BitNot,
    BitXor,
    BitOr,
    LogicalAnd,
    LogicalOr,
    TimesEquals,
    PlusEquals,
    MinusEquals,
    DivideEquals,
    ModulusEquals,
    ShiftRightEquals,
    ShiftLeftEquals,
    AndEquals,
    OrEquals,
    XorEquals,
    CoAwait,
    Spaceship,
}

/// The fixed catalogue of compiler-generated names.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecialName {
    Vftable,
    Vbtable,
    Vcall,
    Typeof,
    LocalStaticGuard,
    StringLiteral,
    VbaseDestructor,
    VectorDeletingDestructor,
    DefaultCtorClosure,
    ScalarDeletingDestructor,
    VectorCtorIterator,
    VectorDtorIterator,
    VectorVbaseCtorIterator,
    VirtualDisplacementMap,
    EhVectorCtorIterator,
    EhVectorDtorIterator,
    EhVectorVbaseCtorIterator,
    CopyCtorClosure,
    UdtReturning,
    LocalVftable,
    LocalVftableCtorClosure,
    PlacementDeleteClosure,
    PlacementDeleteArrayClosure,
    ManagedVectorCtorIterator,
    ManagedVectorDtorIterator,
    EhVectorCopyCtorIterator,
    EhVectorVbaseCopyCtorIterator,
    DynamicInitializer(Box<Symbol>),
    DynamicAtExitDestructor(Box<Symbol>),
    LocalStaticThreadGuard,
    LiteralOperator(Ident),
}

/// RTTI descriptor names (`?_R0`..`?_R4`).
#[derive(Debug, Clone, PartialEq)]
pub enum Rtti {
    TypeDescriptor(Box<Type>),
    BaseClassDescriptor {
        member_offset: i64,
        parent_offset: i64,
        vbtable_offset: i64,
        flags: u64,
    },
    BaseClassArray,
    ClassHierarchy,
    CompleteObjectLocator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Void,
    Char,
    SignedChar,
    UnsignedChar,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Long,
    UnsignedLong,
    Float,
    Double,
    LongDouble,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Int128,
    UInt128,
    Bool,
    WChar,
    Char8,
    Char16,
    Char32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundKind {
    Union,
    Struct,
    Class,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Compound {
    pub kind: CompoundKind,
    pub name: QualifiedName,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enum {
    pub base: Primitive,
    pub name: QualifiedName,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Primitive(Primitive),
    Compound(Compound),
    Enum(Enum),
    Ptr(Indirection),
    Ref(Indirection),
    RvalueRef(Indirection),
    Function(Box<FunctionType>),
    NullPtr,
}

/// A pointer or reference layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Indirection {
    /// const/volatile of the pointer itself, from the `P`..`S` letter.
    pub qualifiers: StorageBits,
    pub modifiers: Vec<Modifier>,
    /// Storage class of the referent.
    pub storage: StorageClass,
    pub target: Box<Type>,
}

bitflags! {
    /// Storage-class bit set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StorageBits: u8 {
        const CONST    = 1;
        const VOLATILE = 1 << 1;
        const BASED    = 1 << 2;
        const MEMBER   = 1 << 3;
        const FUNCTION = 1 << 4;
    }
}

impl Default for StorageBits {
    fn default() -> Self {
        StorageBits::empty()
    }
}

/// A decoded storage class with the payloads the bits imply.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StorageClass {
    pub bits: StorageBits,
    /// Base name when [`StorageBits::BASED`] is set.
    pub base: Option<BaseName>,
    /// Declaring compound when [`StorageBits::MEMBER`] is set.
    pub member: Option<Box<QualifiedName>>,
    /// Nested member-function storage when [`StorageBits::FUNCTION`] and
    /// [`StorageBits::MEMBER`] are both set.
    pub nested: Option<Box<StorageClass>>,
}

impl StorageClass {
    pub(crate) fn from_bits(bits: StorageBits) -> Self {
        StorageClass {
            bits,
            ..StorageClass::default()
        }
    }

    pub fn is_const(&self) -> bool {
        self.bits.contains(StorageBits::CONST)
    }

    pub fn is_volatile(&self) -> bool {
        self.bits.contains(StorageBits::VOLATILE)
    }

    pub fn is_function(&self) -> bool {
        self.bits.contains(StorageBits::FUNCTION)
    }

    pub fn is_member(&self) -> bool {
        self.bits.contains(StorageBits::MEMBER)
    }
}

/// Base of a `__based(...)` pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum BaseName {
    /// `__based(void)`.
    Void,
    Name(QualifiedName),
}

/// Toolchain-specific pointer qualifiers, kept in their encoded order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Ptr64,
    Unaligned,
    Restrict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallingConvention {
    Cdecl,
    Pascal,
    Thiscall,
    Stdcall,
    Fastcall,
    Interrupt,
    Clrcall,
    Eabi,
}

impl Symbol {
    /// The mangled string this symbol was decoded from. Nested sub-symbols
    /// do not carry the raw text; only the outermost root does.
    pub fn mangled(&self) -> &str {
        self.mangled.as_deref().unwrap_or("")
    }

    pub fn qualified_name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn kind(&self) -> &SymbolKind {
        &self.kind
    }

    /// The terminal name alone, template arguments included.
    pub fn name(&self) -> String {
        print::short_name(self)
    }

    /// The enclosing qualifiers, outermost first, joined with `::`. Empty
    /// for unscoped symbols.
    pub fn scope(&self) -> String {
        print::scope_of(self)
    }

    /// Renders the symbol under the given display options.
    pub fn display(&self, flags: Flags) -> String {
        print::display(self, flags)
    }

    /// Structural clone producing an independent tree.
    pub fn deep_copy(&self) -> Symbol {
        self.clone()
    }

    pub fn as_function(&self) -> Option<&Function> {
        match &self.kind {
            SymbolKind::Function(func) => Some(func),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match &self.kind {
            SymbolKind::Variable(var) => Some(var),
            _ => None,
        }
    }

    pub fn special_data(&self) -> Option<&SpecialData> {
        match &self.kind {
            SymbolKind::Special(data) => Some(data),
            _ => None,
        }
    }
}

// Name identity keys on the printed short name, not on the raw encoding:
// two spellings of one entity (back-referenced vs spelt out) compare equal.
impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.display(Flags::NAME_ONLY) == other.display(Flags::NAME_ONLY)
    }
}

impl Eq for Symbol {}

impl std::hash::Hash for Symbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::hash::Hash::hash(&self.display(Flags::NAME_ONLY), state);
    }
}

impl Function {
    pub fn return_type(&self) -> Option<&Type> {
        self.ty.return_type.as_deref()
    }

    pub fn params(&self) -> &[Type] {
        &self.ty.params
    }

    pub fn calling_convention(&self) -> CallingConvention {
        self.ty.convention
    }

    pub fn varargs(&self) -> bool {
        self.ty.varargs
    }

    pub fn access(&self) -> Option<Access> {
        match self.scope {
            FunctionScope::Member { access, .. } => Some(access),
            FunctionScope::Global => None,
        }
    }

    pub fn member_kind(&self) -> Option<MemberKind> {
        match self.scope {
            FunctionScope::Member { kind, .. } => Some(kind),
            FunctionScope::Global => None,
        }
    }

    pub fn is_member(&self) -> bool {
        matches!(self.scope, FunctionScope::Member { .. })
    }
}

impl Variable {
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn storage(&self) -> &StorageClass {
        &self.storage
    }

    pub fn access(&self) -> Option<Access> {
        match self.kind {
            VariableKind::StaticMember(access) => Some(access),
            _ => None,
        }
    }
}

impl QualifiedName {
    pub(crate) fn unscoped(name: Name) -> Self {
        QualifiedName {
            name,
            qualifiers: Vec::new(),
        }
    }
}
