use crate::hir::{AggregateDef, BasicKind, Qualifier, TypeId, TypeKind};
use crate::HirError;
use rustc_hash::FxHashMap;

/// Owns every descriptor of one compilation.
///
/// Structural descriptors are interned, so asking twice for `int*` yields
/// the same [`TypeId`]. Aggregates are nominal and always get a fresh id.
/// A descriptor can only refer to descriptors created before it, except
/// through aggregate members, which are attached after declaration.
///
/// Ids are 32-bit. Creating more than `u32::MAX` descriptors panics.
#[derive(Debug, Default, Clone)]
pub struct TypeTable {
    kinds: Vec<TypeKind>,
    interned: FxHashMap<TypeKind, TypeId>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeKind> {
        self.kinds.get(id.index())
    }

    pub fn contains(&self, id: TypeId) -> bool {
        id.index() < self.kinds.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &TypeKind)> + '_ {
        self.kinds
            .iter()
            .enumerate()
            .map(|(index, kind)| (TypeId(index as u32), kind))
    }

    pub fn basic(&mut self, kind: BasicKind) -> TypeId {
        self.intern(TypeKind::Basic(kind))
    }

    pub fn null(&mut self) -> TypeId {
        self.intern(TypeKind::Null)
    }

    pub fn pointer(&mut self, to: TypeId) -> Result<TypeId, HirError> {
        self.check(to)?;
        Ok(self.intern(TypeKind::Pointer(to)))
    }

    pub fn static_array(&mut self, element: TypeId, dim: u64) -> Result<TypeId, HirError> {
        self.check(element)?;
        Ok(self.intern(TypeKind::StaticArray { element, dim }))
    }

    pub fn dynamic_array(&mut self, element: TypeId) -> Result<TypeId, HirError> {
        self.check(element)?;
        Ok(self.intern(TypeKind::DynamicArray(element)))
    }

    /// `__vector(base)`. The shape of `base` is validated at lowering time.
    pub fn vector(&mut self, base: TypeId) -> Result<TypeId, HirError> {
        self.check(base)?;
        Ok(self.intern(TypeKind::Vector(base)))
    }

    pub fn qualified(&mut self, qualifier: Qualifier, base: TypeId) -> Result<TypeId, HirError> {
        self.check(base)?;
        Ok(self.intern(TypeKind::Qualified { qualifier, base }))
    }

    /// Declares a record without members.
    pub fn declare_aggregate(&mut self, name: impl Into<String>) -> TypeId {
        self.push(TypeKind::Aggregate(AggregateDef {
            name: name.into(),
            fields: None,
        }))
    }

    /// Attaches members to a declared record. Each record is defined once.
    pub fn define_aggregate(&mut self, id: TypeId, fields: Vec<TypeId>) -> Result<(), HirError> {
        for field in &fields {
            self.check(*field)?;
        }
        match self.kinds.get_mut(id.index()) {
            Some(TypeKind::Aggregate(def)) if def.fields.is_some() => {
                Err(HirError::AggregateRedefined { name: def.name.clone() })
            }
            Some(TypeKind::Aggregate(def)) => {
                def.fields = Some(fields);
                Ok(())
            }
            Some(_) => Err(HirError::NotAnAggregate(id)),
            None => Err(HirError::UnknownType(id)),
        }
    }

    /// Removes every qualifier wrapper, yielding the canonical descriptor.
    /// Returns `None` for ids this table never handed out.
    pub fn strip_qualifiers(&self, mut id: TypeId) -> Option<TypeId> {
        loop {
            match self.get(id)? {
                TypeKind::Qualified { base, .. } => id = *base,
                _ => return Some(id),
            }
        }
    }

    fn check(&self, id: TypeId) -> Result<(), HirError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(HirError::UnknownType(id))
        }
    }

    fn intern(&mut self, kind: TypeKind) -> TypeId {
        if let Some(id) = self.interned.get(&kind) {
            return *id;
        }
        let id = self.push(kind.clone());
        self.interned.insert(kind, id);
        id
    }

    fn push(&mut self, kind: TypeKind) -> TypeId {
        let index = u32::try_from(self.kinds.len());
        let Ok(index) = index else {
            panic!("type table holds more than u32::MAX descriptors");
        };
        let id = TypeId(index);
        self.kinds.push(kind);
        id
    }
}
