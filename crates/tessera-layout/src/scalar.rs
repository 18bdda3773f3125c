use crate::lowered::{FloatFormat, LoweredType};
use crate::platform::RealWidth;
use crate::{LayoutError, LoweringContext};
use tessera_hir::{BasicKind, TypeId, TypeKind};

/// Maps a basic kind to its machine form. `real` is only consulted by the
/// 80-bit kinds.
pub fn lower_basic_kind(kind: BasicKind, real: RealWidth) -> LoweredType {
    match kind {
        BasicKind::Void | BasicKind::NoReturn => LoweredType::Void,
        BasicKind::Bool => LoweredType::Int { bits: 1 },
        BasicKind::Int8 | BasicKind::Uns8 | BasicKind::Char => LoweredType::Int { bits: 8 },
        BasicKind::Int16 | BasicKind::Uns16 | BasicKind::WChar => LoweredType::Int { bits: 16 },
        BasicKind::Int32 | BasicKind::Uns32 | BasicKind::DChar => LoweredType::Int { bits: 32 },
        BasicKind::Int64 | BasicKind::Uns64 => LoweredType::Int { bits: 64 },
        BasicKind::Int128 | BasicKind::Uns128 => LoweredType::Int { bits: 128 },
        BasicKind::Float32 | BasicKind::Imaginary32 => LoweredType::Float(FloatFormat::Single),
        BasicKind::Float64 | BasicKind::Imaginary64 => LoweredType::Float(FloatFormat::Double),
        BasicKind::Float80 | BasicKind::Imaginary80 => LoweredType::Float(real.format()),
        BasicKind::Complex32 => LoweredType::Complex(FloatFormat::Single),
        BasicKind::Complex64 => LoweredType::Complex(FloatFormat::Double),
        BasicKind::Complex80 => LoweredType::Complex(real.format()),
    }
}

impl<'a> LoweringContext<'a> {
    pub(crate) fn lower_basic(&mut self, id: TypeId) -> Result<LoweredType, LayoutError> {
        match self.descriptor(id)? {
            TypeKind::Basic(kind) => Ok(lower_basic_kind(*kind, self.real)),
            other => Err(LayoutError::kind_mismatch(id, "basic", other)),
        }
    }
}
