use crate::lowered::{LoweredType, LoweredTypeId};
use crate::{LayoutError, LoweringContext};
use log::debug;
use tessera_hir::{TypeId, TypeKind};

/// Lowers user-defined records.
///
/// Implementations must publish their result with
/// [`LoweringContext::declare`] *before* resolving any member, since a member
/// may lead back to the record (`struct Node { Node* next; }`). The id
/// returned must be the declared one.
pub trait AggregateLowering {
    fn lower_aggregate(
        &self,
        cx: &mut LoweringContext<'_>,
        id: TypeId,
    ) -> Result<LoweredTypeId, LayoutError>;
}

/// Declares an opaque named record, lowers each member through the cache
/// and stores the member list as the record body. Field offsets are left to
/// the code generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordLowering;

impl AggregateLowering for RecordLowering {
    fn lower_aggregate(
        &self,
        cx: &mut LoweringContext<'_>,
        id: TypeId,
    ) -> Result<LoweredTypeId, LayoutError> {
        let def = match cx.table().get(id) {
            Some(TypeKind::Aggregate(def)) => def,
            Some(other) => return Err(LayoutError::kind_mismatch(id, "aggregate", other)),
            None => return Err(LayoutError::UnknownDescriptor(id)),
        };

        let record = cx.declare(id, LoweredType::Record { name: def.name.clone() })?;

        let Some(members) = &def.fields else {
            debug!("record `{}` is opaque", def.name);
            return Ok(record);
        };
        let fields = members
            .iter()
            .map(|member| cx.resolve(*member))
            .collect::<Result<Vec<_>, _>>()?;
        cx.define_record_body(record, fields)?;
        Ok(record)
    }
}
