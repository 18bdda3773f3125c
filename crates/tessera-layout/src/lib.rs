use log::{debug, trace};
use miette::Diagnostic;
use rustc_hash::FxHashMap;
use tessera_hir::{HirError, TypeId, TypeKind, TypeTable, TypeTag};
use thiserror::Error;

mod aggregate;
mod array;
mod cache;
mod clif;
pub mod config;
mod lowered;
pub mod platform;
mod pointer;
mod scalar;
mod vector;

pub use aggregate::{AggregateLowering, RecordLowering};
pub use cache::{CacheStats, LoweringCache};
pub use config::{ConfigError, LoweringConfig, TargetConfig};
pub use lowered::{FloatFormat, LoweredType, LoweredTypeId, LoweredTypes, Pointee, SliceField};
pub use platform::{real_width, PlatformDescriptor, PlatformError, RealWidth};
pub use scalar::lower_basic_kind;

/// Internal-consistency violations. Every variant indicates a defect in the
/// front-end or in an aggregate collaborator, never a user error.
#[derive(Error, Debug, Diagnostic)]
pub enum LayoutError {
    #[error("descriptor {0} does not exist in the type table")]
    #[diagnostic(code(tessera::layout::unknown_descriptor))]
    UnknownDescriptor(TypeId),

    #[error("expected a {expected} descriptor for {id}, found {found}")]
    #[diagnostic(code(tessera::layout::kind_mismatch))]
    KindMismatch {
        id: TypeId,
        expected: &'static str,
        found: TypeTag,
    },

    #[error("vector {id} must wrap a static array, found {found}")]
    #[diagnostic(code(tessera::layout::malformed_vector))]
    MalformedVector { id: TypeId, found: TypeTag },

    #[error("vector {id} has {dim} lanes; lane counts must be non-zero and fit in 32 bits")]
    #[diagnostic(code(tessera::layout::malformed_dimension))]
    MalformedDimension { id: TypeId, dim: u64 },

    #[error("descriptor {0} was already lowered")]
    #[diagnostic(
        code(tessera::layout::already_lowered),
        help("aggregate lowerers must declare a record at most once")
    )]
    AlreadyLowered(TypeId),

    #[error("record {0} already has a body")]
    #[diagnostic(code(tessera::layout::record_redefined))]
    RecordRedefined(LoweredTypeId),

    #[error("aggregate {0} finished lowering without declaring its record")]
    #[diagnostic(code(tessera::layout::undeclared_aggregate))]
    UndeclaredAggregate(TypeId),

    #[error("lowering {0} recursed into itself with no aggregate declaration in between")]
    #[diagnostic(
        code(tessera::layout::unresolvable_cycle),
        help("aggregate lowerers must declare their record before lowering members")
    )]
    UnresolvableCycle(TypeId),

    #[error("more than u32::MAX lowered types in one context")]
    #[diagnostic(code(tessera::layout::arena_full))]
    ArenaFull,

    #[error(transparent)]
    #[diagnostic(code(tessera::layout::hir))]
    Hir(#[from] HirError),
}

impl LayoutError {
    pub(crate) fn kind_mismatch(id: TypeId, expected: &'static str, found: &TypeKind) -> Self {
        LayoutError::KindMismatch { id, expected, found: found.tag() }
    }
}

/// Result of a builder: either a candidate still to be committed, or an
/// entry the aggregate collaborator already declared.
enum Built {
    Fresh(LoweredType),
    Declared(LoweredTypeId),
}

static DEFAULT_AGGREGATES: RecordLowering = RecordLowering;

/// Lowering state for one compilation.
///
/// Owns the cache and every lowered type it produces. Nothing is shared
/// between contexts, so independent compilations can each run their own.
pub struct LoweringContext<'a> {
    table: &'a TypeTable,
    platform: PlatformDescriptor,
    real: RealWidth,
    aggregates: &'a dyn AggregateLowering,
    cache: LoweringCache,
    lowered: LoweredTypes,
    record_bodies: FxHashMap<LoweredTypeId, Vec<LoweredTypeId>>,
}

impl<'a> LoweringContext<'a> {
    /// Creates a context that lowers records with [`RecordLowering`].
    pub fn new(table: &'a TypeTable, platform: PlatformDescriptor) -> Self {
        Self::with_aggregates(table, platform, &DEFAULT_AGGREGATES)
    }

    pub fn with_aggregates(
        table: &'a TypeTable,
        platform: PlatformDescriptor,
        aggregates: &'a dyn AggregateLowering,
    ) -> Self {
        let real = real_width(&platform);
        debug!("lowering for {:?}, real is {}", platform, real);
        LoweringContext {
            table,
            platform,
            real,
            aggregates,
            cache: LoweringCache::default(),
            lowered: LoweredTypes::default(),
            record_bodies: FxHashMap::default(),
        }
    }

    pub fn table(&self) -> &'a TypeTable {
        self.table
    }

    pub fn platform(&self) -> &PlatformDescriptor {
        &self.platform
    }

    /// Width of `real`, fixed for the lifetime of the context.
    pub fn real_width(&self) -> RealWidth {
        self.real
    }

    pub fn cache(&self) -> &LoweringCache {
        &self.cache
    }

    pub fn lowered(&self) -> &LoweredTypes {
        &self.lowered
    }

    pub fn get(&self, id: LoweredTypeId) -> Option<&LoweredType> {
        self.lowered.get(id)
    }

    pub fn render(&self, id: LoweredTypeId) -> String {
        self.lowered.render(id)
    }

    /// The canonical cache key for `id`.
    pub fn canonical(&self, id: TypeId) -> Result<TypeId, LayoutError> {
        self.table
            .strip_qualifiers(id)
            .ok_or(LayoutError::UnknownDescriptor(id))
    }

    /// The finished entry for `id`, without lowering anything.
    pub fn lookup(&self, id: TypeId) -> Result<Option<LoweredTypeId>, LayoutError> {
        let key = self.canonical(id)?;
        Ok(self.cache.get(key))
    }

    /// Lowers `id`, or returns the entry created by an earlier request.
    ///
    /// Qualified descriptors share the entry of their canonical form. If
    /// lowering an element already produced the entry for `id` (a forward
    /// reference through an aggregate), that entry wins and the local
    /// candidate is discarded. A failed resolution leaves the context as it
    /// found it.
    pub fn resolve(&mut self, id: TypeId) -> Result<LoweredTypeId, LayoutError> {
        let key = self.canonical(id)?;
        let reserved_here = !self.cache.is_reserved(key);
        let Some(existing) = self.cache.enter(key)? else {
            let mark = self.lowered.len();
            let result = self.construct(key).and_then(|built| self.commit(key, built));
            if result.is_err() {
                self.rollback(key, reserved_here, mark);
            }
            return result;
        };
        trace!("cache hit for {} -> {}", key, existing);
        Ok(existing)
    }

    /// Undoes a failed resolution: its reservation, and every entry and
    /// record body created since it started.
    fn rollback(&mut self, key: TypeId, reserved_here: bool, mark: usize) {
        if reserved_here {
            self.cache.abandon(key);
        }
        let dropped = self.lowered.len() - mark;
        if dropped > 0 {
            debug!("rolling back {} entries after failing to lower {}", dropped, key);
        }
        self.cache.rollback(mark);
        self.lowered.truncate(mark);
        self.record_bodies.retain(|record, _| record.index() < mark);
    }

    fn commit(&mut self, key: TypeId, built: Built) -> Result<LoweredTypeId, LayoutError> {
        match (self.cache.get(key), built) {
            (Some(existing), Built::Fresh(candidate)) => {
                debug!("{} was lowered by a forward reference, dropping {:?}", key, candidate);
                self.cache.note_discard();
                Ok(existing)
            }
            (Some(existing), Built::Declared(declared)) if existing == declared => Ok(existing),
            (Some(_), Built::Declared(_)) => Err(LayoutError::AlreadyLowered(key)),
            (None, Built::Fresh(candidate)) => {
                let lowered = self.lowered.push(candidate, key)?;
                self.cache.fill(key, lowered)?;
                debug!("lowered {} -> {} = {}", key, lowered, self.lowered.render(lowered));
                Ok(lowered)
            }
            (None, Built::Declared(_)) => Err(LayoutError::UndeclaredAggregate(key)),
        }
    }

    /// Routes a canonical descriptor to its builder.
    fn construct(&mut self, key: TypeId) -> Result<Built, LayoutError> {
        match self.descriptor(key)? {
            TypeKind::Basic(_) => self.lower_basic(key).map(Built::Fresh),
            TypeKind::Pointer(_) | TypeKind::Null => self.lower_pointer(key).map(Built::Fresh),
            TypeKind::StaticArray { .. } => self.lower_static_array(key).map(Built::Fresh),
            TypeKind::DynamicArray(_) => self.lower_dynamic_array(key).map(Built::Fresh),
            TypeKind::Vector(_) => self.lower_vector(key).map(Built::Fresh),
            TypeKind::Aggregate(_) => {
                let aggregates = self.aggregates;
                aggregates.lower_aggregate(self, key).map(Built::Declared)
            }
            // Canonical keys never carry qualifiers.
            other @ TypeKind::Qualified { .. } => {
                Err(LayoutError::kind_mismatch(key, "canonical", other))
            }
        }
    }

    /// Inserts an entry for `id` directly. This is how aggregate lowerers
    /// publish their record before lowering members that refer back to it.
    pub fn declare(&mut self, id: TypeId, ty: LoweredType) -> Result<LoweredTypeId, LayoutError> {
        let key = self.canonical(id)?;
        if self.cache.contains(key) {
            return Err(LayoutError::AlreadyLowered(key));
        }
        let lowered = self.lowered.push(ty, key)?;
        self.cache.fill(key, lowered)?;
        debug!("declared {} -> {}", key, lowered);
        Ok(lowered)
    }

    /// Attaches the member list of a declared record. Write-once.
    pub fn define_record_body(
        &mut self,
        record: LoweredTypeId,
        fields: Vec<LoweredTypeId>,
    ) -> Result<(), LayoutError> {
        if self.record_bodies.contains_key(&record) {
            return Err(LayoutError::RecordRedefined(record));
        }
        self.record_bodies.insert(record, fields);
        Ok(())
    }

    pub fn record_body(&self, record: LoweredTypeId) -> Option<&[LoweredTypeId]> {
        self.record_bodies.get(&record).map(Vec::as_slice)
    }

    pub(crate) fn descriptor(&self, id: TypeId) -> Result<&'a TypeKind, LayoutError> {
        self.table.get(id).ok_or(LayoutError::UnknownDescriptor(id))
    }
}
