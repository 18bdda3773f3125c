use crate::lowered::{FloatFormat, LoweredType, LoweredTypeId};
use crate::LoweringContext;
use cranelift_codegen::ir::{types, Type};

impl<'a> LoweringContext<'a> {
    /// Cranelift value type for a lowered scalar, pointer or vector.
    ///
    /// Returns `None` for void, x87 reals, complex pairs, arrays, records,
    /// and vectors Cranelift has no lane shape for.
    pub fn clif_type(&self, id: LoweredTypeId) -> Option<Type> {
        match self.lowered.get(id)? {
            LoweredType::Vector { lanes, element } => self.clif_lane(*element)?.by(*lanes),
            _ => self.clif_lane(id),
        }
    }

    fn clif_lane(&self, id: LoweredTypeId) -> Option<Type> {
        match self.lowered.get(id)? {
            // Cranelift has no 1-bit integers; booleans travel as bytes.
            LoweredType::Int { bits: 1 } => Some(types::I8),
            LoweredType::Int { bits } => Type::int(*bits),
            LoweredType::Float(format) => clif_float(*format),
            LoweredType::Pointer(_) => Type::int(self.platform.native_uint_bits()),
            _ => None,
        }
    }
}

fn clif_float(format: FloatFormat) -> Option<Type> {
    match format {
        FloatFormat::Single => Some(types::F32),
        FloatFormat::Double => Some(types::F64),
        FloatFormat::Quad => Some(types::F128),
        FloatFormat::X87Extended => None,
    }
}
