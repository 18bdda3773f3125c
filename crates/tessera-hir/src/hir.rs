use std::fmt;

// --- Descriptor identity ---

/// Identity of a descriptor inside a [`TypeTable`](crate::TypeTable).
///
/// Ids are handed out in creation order and are only meaningful for the
/// table that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    /// Raw index into the owning table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// --- Basic kinds ---

/// The built-in scalar kinds of the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicKind {
    Void,
    NoReturn,
    Bool,
    Int8,
    Uns8,
    Int16,
    Uns16,
    Int32,
    Uns32,
    Int64,
    Uns64,
    Int128,
    Uns128,
    Char,
    WChar,
    DChar,
    Float32,
    Float64,
    Float80,
    Imaginary32,
    Imaginary64,
    Imaginary80,
    Complex32,
    Complex64,
    Complex80,
}

impl BasicKind {
    pub const ALL: [BasicKind; 25] = [
        BasicKind::Void,
        BasicKind::NoReturn,
        BasicKind::Bool,
        BasicKind::Int8,
        BasicKind::Uns8,
        BasicKind::Int16,
        BasicKind::Uns16,
        BasicKind::Int32,
        BasicKind::Uns32,
        BasicKind::Int64,
        BasicKind::Uns64,
        BasicKind::Int128,
        BasicKind::Uns128,
        BasicKind::Char,
        BasicKind::WChar,
        BasicKind::DChar,
        BasicKind::Float32,
        BasicKind::Float64,
        BasicKind::Float80,
        BasicKind::Imaginary32,
        BasicKind::Imaginary64,
        BasicKind::Imaginary80,
        BasicKind::Complex32,
        BasicKind::Complex64,
        BasicKind::Complex80,
    ];

    /// Source-level spelling of the kind.
    pub fn name(self) -> &'static str {
        match self {
            BasicKind::Void => "void",
            BasicKind::NoReturn => "noreturn",
            BasicKind::Bool => "bool",
            BasicKind::Int8 => "byte",
            BasicKind::Uns8 => "ubyte",
            BasicKind::Int16 => "short",
            BasicKind::Uns16 => "ushort",
            BasicKind::Int32 => "int",
            BasicKind::Uns32 => "uint",
            BasicKind::Int64 => "long",
            BasicKind::Uns64 => "ulong",
            BasicKind::Int128 => "cent",
            BasicKind::Uns128 => "ucent",
            BasicKind::Char => "char",
            BasicKind::WChar => "wchar",
            BasicKind::DChar => "dchar",
            BasicKind::Float32 => "float",
            BasicKind::Float64 => "double",
            BasicKind::Float80 => "real",
            BasicKind::Imaginary32 => "ifloat",
            BasicKind::Imaginary64 => "idouble",
            BasicKind::Imaginary80 => "ireal",
            BasicKind::Complex32 => "cfloat",
            BasicKind::Complex64 => "cdouble",
            BasicKind::Complex80 => "creal",
        }
    }

    pub fn from_name(name: &str) -> Option<BasicKind> {
        BasicKind::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for BasicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// --- Qualifiers ---

/// Type qualifiers. None of them affect the machine representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Qualifier {
    Const,
    Immutable,
    Shared,
    Inout,
}

impl Qualifier {
    pub fn name(self) -> &'static str {
        match self {
            Qualifier::Const => "const",
            Qualifier::Immutable => "immutable",
            Qualifier::Shared => "shared",
            Qualifier::Inout => "inout",
        }
    }

    pub fn from_name(name: &str) -> Option<Qualifier> {
        match name {
            "const" => Some(Qualifier::Const),
            "immutable" => Some(Qualifier::Immutable),
            "shared" => Some(Qualifier::Shared),
            "inout" => Some(Qualifier::Inout),
            _ => None,
        }
    }
}

// --- Descriptors ---

/// A user-defined record. Members are filled in after the record is
/// declared so that members may refer back to the record itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AggregateDef {
    pub name: String,
    /// `None` while the record is only forward-declared.
    pub fields: Option<Vec<TypeId>>,
}

/// Structural description of a source type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Basic(BasicKind),
    /// `T*`
    Pointer(TypeId),
    /// Type of the `null` literal.
    Null,
    /// `T[dim]`
    StaticArray { element: TypeId, dim: u64 },
    /// `T[]`
    DynamicArray(TypeId),
    /// `__vector(T[N])`; the base is expected to be a static array.
    Vector(TypeId),
    Qualified { qualifier: Qualifier, base: TypeId },
    Aggregate(AggregateDef),
}

impl TypeKind {
    pub fn tag(&self) -> TypeTag {
        match self {
            TypeKind::Basic(kind) => TypeTag::Basic(*kind),
            TypeKind::Pointer(_) => TypeTag::Pointer,
            TypeKind::Null => TypeTag::Null,
            TypeKind::StaticArray { .. } => TypeTag::StaticArray,
            TypeKind::DynamicArray(_) => TypeTag::DynamicArray,
            TypeKind::Vector(_) => TypeTag::Vector,
            TypeKind::Qualified { .. } => TypeTag::Qualified,
            TypeKind::Aggregate(_) => TypeTag::Aggregate,
        }
    }
}

/// Payload-free kind tag, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Basic(BasicKind),
    Pointer,
    Null,
    StaticArray,
    DynamicArray,
    Vector,
    Qualified,
    Aggregate,
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Basic(kind) => write!(f, "basic `{}`", kind),
            TypeTag::Pointer => f.write_str("pointer"),
            TypeTag::Null => f.write_str("null literal"),
            TypeTag::StaticArray => f.write_str("static array"),
            TypeTag::DynamicArray => f.write_str("dynamic array"),
            TypeTag::Vector => f.write_str("vector"),
            TypeTag::Qualified => f.write_str("qualified type"),
            TypeTag::Aggregate => f.write_str("aggregate"),
        }
    }
}
