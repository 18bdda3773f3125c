use crate::lowered::LoweredType;
use crate::{LayoutError, LoweringContext};
use tessera_hir::{TypeId, TypeKind};

impl<'a> LoweringContext<'a> {
    /// Lowers `T[dim]` to a fixed-length sequence of `dim` elements.
    pub(crate) fn lower_static_array(&mut self, id: TypeId) -> Result<LoweredType, LayoutError> {
        let TypeKind::StaticArray { element, dim } = self.descriptor(id)? else {
            return Err(LayoutError::kind_mismatch(id, "static array", self.descriptor(id)?));
        };
        // May already have built `id` through a record forward reference.
        let element = self.resolve(*element)?;
        Ok(LoweredType::StaticArray { element, len: *dim })
    }

    /// Lowers `T[]` to `{ size_t length, T* data }`. Downstream code relies
    /// on this exact field order.
    pub(crate) fn lower_dynamic_array(&mut self, id: TypeId) -> Result<LoweredType, LayoutError> {
        let TypeKind::DynamicArray(element) = self.descriptor(id)? else {
            return Err(LayoutError::kind_mismatch(id, "dynamic array", self.descriptor(id)?));
        };
        let element = self.resolve(*element)?;
        Ok(LoweredType::DynamicArray {
            length_bits: self.platform.native_uint_bits(),
            element,
        })
    }
}
