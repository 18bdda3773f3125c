use crate::lowered::{LoweredType, Pointee};
use crate::{LayoutError, LoweringContext};
use tessera_hir::{TypeId, TypeKind};

impl<'a> LoweringContext<'a> {
    /// Lowers `T*` and the type of `null`.
    ///
    /// The referent is resolved first. For `Node*` inside
    /// `struct Node { Node* next; }` that resolution builds `Node*` itself,
    /// in which case `resolve` keeps the inner result.
    pub(crate) fn lower_pointer(&mut self, id: TypeId) -> Result<LoweredType, LayoutError> {
        let pointee = match self.descriptor(id)? {
            TypeKind::Null => Pointee::Byte,
            TypeKind::Pointer(next) => Pointee::Type(self.resolve(*next)?),
            other => return Err(LayoutError::kind_mismatch(id, "pointer", other)),
        };
        Ok(LoweredType::Pointer(pointee))
    }
}
