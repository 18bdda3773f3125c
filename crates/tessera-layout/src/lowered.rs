use crate::LayoutError;
use std::fmt;
use tessera_hir::TypeId;

/// Index of a lowered type in a [`LoweredTypes`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoweredTypeId(u32);

impl LoweredTypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LoweredTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Machine floating-point formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatFormat {
    Single,
    Double,
    /// x87 80-bit extended precision.
    X87Extended,
    /// IEEE binary128.
    Quad,
}

impl FloatFormat {
    pub fn bits(self) -> u16 {
        match self {
            FloatFormat::Single => 32,
            FloatFormat::Double => 64,
            FloatFormat::X87Extended => 80,
            FloatFormat::Quad => 128,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FloatFormat::Single => "float",
            FloatFormat::Double => "double",
            FloatFormat::X87Extended => "x86_fp80",
            FloatFormat::Quad => "fp128",
        }
    }
}

/// What a lowered pointer points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pointee {
    Type(LoweredTypeId),
    /// Untyped referent of the `null` literal, an 8-bit integer.
    Byte,
}

/// One field of the dynamic-array record, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SliceField {
    Length { bits: u16 },
    Data { element: LoweredTypeId },
}

/// Backend representation of a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LoweredType {
    Void,
    Int { bits: u16 },
    Float(FloatFormat),
    /// `{ re, im }`, both of the same format.
    Complex(FloatFormat),
    Pointer(Pointee),
    StaticArray { element: LoweredTypeId, len: u64 },
    /// `{ length, data }` with `data` pointing at `element`.
    DynamicArray { length_bits: u16, element: LoweredTypeId },
    Vector { lanes: u32, element: LoweredTypeId },
    /// Named record; members live in the lowering context's body table.
    Record { name: String },
}

impl LoweredType {
    pub fn as_pointer(&self) -> Option<Pointee> {
        match self {
            LoweredType::Pointer(pointee) => Some(*pointee),
            _ => None,
        }
    }

    pub fn as_static_array(&self) -> Option<(LoweredTypeId, u64)> {
        match self {
            LoweredType::StaticArray { element, len } => Some((*element, *len)),
            _ => None,
        }
    }

    /// The two record fields of a dynamic array, length first.
    pub fn as_dynamic_array(&self) -> Option<[SliceField; 2]> {
        match self {
            LoweredType::DynamicArray { length_bits, element } => Some([
                SliceField::Length { bits: *length_bits },
                SliceField::Data { element: *element },
            ]),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<(u32, LoweredTypeId)> {
        match self {
            LoweredType::Vector { lanes, element } => Some((*lanes, *element)),
            _ => None,
        }
    }

    /// Real and imaginary component formats of a complex number.
    pub fn components(&self) -> Option<[FloatFormat; 2]> {
        match self {
            LoweredType::Complex(format) => Some([*format, *format]),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct LoweredEntry {
    ty: LoweredType,
    origin: TypeId,
}

/// Append-only arena of lowered types.
///
/// Entries are never removed or replaced; a [`LoweredTypeId`] stays valid
/// for the lifetime of the arena.
#[derive(Debug, Default)]
pub struct LoweredTypes {
    entries: Vec<LoweredEntry>,
}

impl LoweredTypes {
    /// Appends an entry. Ids are 32-bit, so an arena holds at most
    /// `u32::MAX` entries.
    pub(crate) fn push(
        &mut self,
        ty: LoweredType,
        origin: TypeId,
    ) -> Result<LoweredTypeId, LayoutError> {
        let id = next_id(self.entries.len())?;
        self.entries.push(LoweredEntry { ty, origin });
        Ok(id)
    }

    /// Drops every entry from `mark` on. Only used to undo a failed
    /// resolution, whose entries nothing older can refer to.
    pub(crate) fn truncate(&mut self, mark: usize) {
        self.entries.truncate(mark);
    }

    pub fn get(&self, id: LoweredTypeId) -> Option<&LoweredType> {
        self.entries.get(id.index()).map(|entry| &entry.ty)
    }

    /// The canonical descriptor this entry was created for.
    pub fn origin(&self, id: LoweredTypeId) -> Option<TypeId> {
        self.entries.get(id.index()).map(|entry| entry.origin)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LoweredTypeId, &LoweredType)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (LoweredTypeId(index as u32), &entry.ty))
    }

    /// LLVM-flavoured text for a lowered type. Records print by name, so
    /// self-referential types render finitely.
    ///
    /// Walks the element chain in a loop, so arbitrarily deep nesting does
    /// not grow the stack.
    pub fn render(&self, id: LoweredTypeId) -> String {
        let mut prefix = String::new();
        let mut suffixes: Vec<&'static str> = Vec::new();
        let mut current = id;
        let leaf = loop {
            let Some(ty) = self.get(current) else {
                break format!("<invalid {}>", current);
            };
            match ty {
                LoweredType::Pointer(Pointee::Type(next)) => {
                    suffixes.push("*");
                    current = *next;
                }
                LoweredType::StaticArray { element, len } => {
                    prefix.push_str(&format!("[{} x ", len));
                    suffixes.push("]");
                    current = *element;
                }
                LoweredType::DynamicArray { length_bits, element } => {
                    prefix.push_str(&format!("{{ i{}, ", length_bits));
                    suffixes.push("* }");
                    current = *element;
                }
                LoweredType::Vector { lanes, element } => {
                    prefix.push_str(&format!("<{} x ", lanes));
                    suffixes.push(">");
                    current = *element;
                }
                LoweredType::Void => break "void".to_string(),
                LoweredType::Int { bits } => break format!("i{}", bits),
                LoweredType::Float(format) => break format.name().to_string(),
                LoweredType::Complex(format) => break format!("{{ {0}, {0} }}", format.name()),
                LoweredType::Pointer(Pointee::Byte) => break "i8*".to_string(),
                LoweredType::Record { name } => break format!("%{}", name),
            }
        };
        prefix.push_str(&leaf);
        for suffix in suffixes.iter().rev() {
            prefix.push_str(suffix);
        }
        prefix
    }
}

fn next_id(len: usize) -> Result<LoweredTypeId, LayoutError> {
    u32::try_from(len)
        .map(LoweredTypeId)
        .map_err(|_| LayoutError::ArenaFull)
}
