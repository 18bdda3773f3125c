use crate::lowered::LoweredType;
use crate::{LayoutError, LoweringContext};
use tessera_hir::{TypeId, TypeKind};

impl<'a> LoweringContext<'a> {
    /// Lowers `__vector(T[N])` to a fixed vector of `N` lanes of `T`.
    pub(crate) fn lower_vector(&mut self, id: TypeId) -> Result<LoweredType, LayoutError> {
        let base = match self.descriptor(id)? {
            TypeKind::Vector(base) => *base,
            other => return Err(LayoutError::kind_mismatch(id, "vector", other)),
        };
        let base = self.canonical(base)?;
        let (element, dim) = match self.descriptor(base)? {
            TypeKind::StaticArray { element, dim } => (*element, *dim),
            other => {
                return Err(LayoutError::MalformedVector { id, found: other.tag() });
            }
        };
        let lanes = match u32::try_from(dim) {
            Ok(lanes) if lanes > 0 => lanes,
            _ => return Err(LayoutError::MalformedDimension { id, dim }),
        };
        let element = self.resolve(element)?;
        Ok(LoweredType::Vector { lanes, element })
    }
}
