//! TOML type graphs: the driver's stand-in for a front-end.
//!
//! ```toml
//! [target]
//! triple = "x86_64-unknown-linux-gnu"
//!
//! [[type]]
//! name = "Node"
//! kind = "struct"
//! fields = ["NodePtr", "int"]
//!
//! [[type]]
//! name = "NodePtr"
//! kind = "pointer"
//! of = "Node"
//! ```
//!
//! Basic types are referenced by their source spelling (`int`, `real`,
//! `creal`, ...) and need no entry of their own.

use std::path::PathBuf;

use log::debug;
use miette::{NamedSource, SourceSpan};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use tessera_hir::{BasicKind, HirError, Qualifier, TypeId, TypeKind, TypeTable};
use tessera_layout::{LoweringConfig, TargetConfig};
use toml::Spanned;

use crate::error::{convert_toml_error, CliError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryKind {
    Pointer,
    Null,
    StaticArray,
    DynamicArray,
    Vector,
    Struct,
    Const,
    Immutable,
    Shared,
    Inout,
}

impl EntryKind {
    pub fn name(self) -> &'static str {
        match self {
            EntryKind::Pointer => "pointer",
            EntryKind::Null => "null",
            EntryKind::StaticArray => "static-array",
            EntryKind::DynamicArray => "dynamic-array",
            EntryKind::Vector => "vector",
            EntryKind::Struct => "struct",
            EntryKind::Const => "const",
            EntryKind::Immutable => "immutable",
            EntryKind::Shared => "shared",
            EntryKind::Inout => "inout",
        }
    }

    fn qualifier(self) -> Option<Qualifier> {
        Qualifier::from_name(self.name())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeEntry {
    pub name: String,
    pub kind: EntryKind,
    /// Referent, element or base type.
    #[serde(default)]
    pub of: Option<Spanned<String>>,
    /// Static array length.
    #[serde(default)]
    pub dim: Option<Spanned<u64>>,
    /// Struct members. A struct without `fields` is opaque.
    #[serde(default)]
    pub fields: Option<Spanned<Vec<String>>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphFile {
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default, rename = "type")]
    pub types: Vec<TypeEntry>,
    #[serde(skip)]
    path: PathBuf,
    #[serde(skip)]
    src: String,
}

impl GraphFile {
    pub fn parse(src: &str, path: PathBuf) -> Result<Self, CliError> {
        let mut file: GraphFile =
            toml::from_str(src).map_err(|e| convert_toml_error(e, path.clone(), src))?;
        file.path = path;
        file.src = src.to_string();
        Ok(file)
    }

    fn source(&self) -> NamedSource<String> {
        NamedSource::new(self.path.display().to_string(), self.src.clone())
    }

    pub fn config(&self) -> LoweringConfig {
        LoweringConfig { target: self.target.clone() }
    }
}

/// A populated type table plus the id of every named entry, in file order.
pub struct TypeGraph {
    pub table: TypeTable,
    pub named: Vec<(String, TypeId)>,
}

/// Builds descriptors for every entry.
///
/// Structs are declared up front so that anything may point at them; every
/// other entry is built on first use. A cycle that reaches an entry still
/// under construction never passed through a struct and cannot be expressed.
pub fn build(file: &GraphFile) -> Result<TypeGraph, CliError> {
    let mut builder = Builder {
        file,
        entries: FxHashMap::default(),
        table: TypeTable::new(),
        built: FxHashMap::default(),
        in_progress: FxHashSet::default(),
    };

    for entry in &file.types {
        if BasicKind::from_name(&entry.name).is_some()
            || builder.entries.insert(entry.name.as_str(), entry).is_some()
        {
            return Err(CliError::DuplicateType(entry.name.clone()));
        }
        builder.check_shape(entry)?;
        if entry.kind == EntryKind::Struct {
            let id = builder.table.declare_aggregate(entry.name.as_str());
            builder.built.insert(entry.name.as_str(), id);
        }
    }

    let mut named = Vec::with_capacity(file.types.len());
    for entry in &file.types {
        let id = builder.build(&entry.name, &entry.name)?;
        named.push((entry.name.clone(), id));
    }

    for entry in &file.types {
        let Some(fields) = &entry.fields else { continue };
        if entry.kind != EntryKind::Struct {
            continue;
        }
        let members = fields
            .get_ref()
            .iter()
            .map(|field| builder.build(&entry.name, field))
            .collect::<Result<Vec<_>, _>>()?;
        let id = builder.built[entry.name.as_str()];
        builder.table.define_aggregate(id, members)?;
    }

    debug!("built {} descriptors for {} entries", builder.table.len(), named.len());
    Ok(TypeGraph { table: builder.table, named })
}

struct Builder<'f> {
    file: &'f GraphFile,
    entries: FxHashMap<&'f str, &'f TypeEntry>,
    table: TypeTable,
    built: FxHashMap<&'f str, TypeId>,
    in_progress: FxHashSet<&'f str>,
}

impl<'f> Builder<'f> {
    /// Descriptor for `target`, as referenced from the entry `user`.
    fn build(&mut self, user: &str, target: &'f str) -> Result<TypeId, CliError> {
        if let Some(kind) = BasicKind::from_name(target) {
            return Ok(self.table.basic(kind));
        }
        if let Some(id) = self.built.get(target) {
            return Ok(*id);
        }
        let Some(entry) = self.entries.get(target).copied() else {
            return Err(CliError::UnknownType {
                name: user.to_string(),
                target: target.to_string(),
            });
        };
        if !self.in_progress.insert(target) {
            return Err(CliError::CyclicType(target.to_string()));
        }

        let id = self.build_entry(entry)?;
        self.in_progress.remove(target);
        self.built.insert(target, id);
        Ok(id)
    }

    /// Rejects keys the entry's kind does not use.
    fn check_shape(&self, entry: &TypeEntry) -> Result<(), CliError> {
        if let Some(fields) = &entry.fields {
            if entry.kind != EntryKind::Struct {
                return Err(self.unexpected(entry, "fields", fields.span()));
            }
        }
        if let Some(dim) = &entry.dim {
            if entry.kind != EntryKind::StaticArray {
                return Err(self.unexpected(entry, "dim", dim.span()));
            }
        }
        if let Some(of) = &entry.of {
            if matches!(entry.kind, EntryKind::Struct | EntryKind::Null) {
                return Err(self.unexpected(entry, "of", of.span()));
            }
        }
        Ok(())
    }

    fn build_entry(&mut self, entry: &'f TypeEntry) -> Result<TypeId, CliError> {
        if entry.kind == EntryKind::Null {
            return Ok(self.table.null());
        }
        let of = entry.of.as_ref().ok_or_else(|| missing(entry, "of"))?;
        let base = self.build(&entry.name, of.get_ref())?;
        let id = match entry.kind {
            EntryKind::Pointer => self.table.pointer(base)?,
            EntryKind::StaticArray => {
                let dim = entry.dim.as_ref().ok_or_else(|| missing(entry, "dim"))?;
                self.table.static_array(base, *dim.get_ref())?
            }
            EntryKind::DynamicArray => self.table.dynamic_array(base)?,
            EntryKind::Vector => {
                self.check_vector_base(entry, base, of.span())?;
                self.table.vector(base)?
            }
            kind => match kind.qualifier() {
                Some(qualifier) => self.table.qualified(qualifier, base)?,
                // Null and structs are handled before reaching here.
                None => return Err(missing(entry, "kind")),
            },
        };
        Ok(id)
    }

    /// `__vector(T[N])` needs a static array of 1 to `u32::MAX` elements,
    /// possibly qualified.
    fn check_vector_base(
        &self,
        entry: &TypeEntry,
        base: TypeId,
        of: std::ops::Range<usize>,
    ) -> Result<(), CliError> {
        let kind = self
            .table
            .strip_qualifiers(base)
            .and_then(|canonical| self.table.get(canonical))
            .ok_or(HirError::UnknownType(base))?;
        match kind {
            TypeKind::StaticArray { dim, .. } if (1..=u64::from(u32::MAX)).contains(dim) => Ok(()),
            TypeKind::StaticArray { dim, .. } => Err(CliError::LaneCount {
                name: entry.name.clone(),
                dim: *dim,
                src: self.file.source(),
                span: SourceSpan::from(of),
            }),
            other => Err(CliError::VectorBase {
                name: entry.name.clone(),
                found: other.tag(),
                src: self.file.source(),
                span: SourceSpan::from(of),
            }),
        }
    }

    fn unexpected(
        &self,
        entry: &TypeEntry,
        field: &'static str,
        span: std::ops::Range<usize>,
    ) -> CliError {
        CliError::UnexpectedField {
            name: entry.name.clone(),
            kind: entry.kind.name(),
            field,
            src: self.file.source(),
            span: SourceSpan::from(span),
        }
    }
}

fn missing(entry: &TypeEntry, field: &'static str) -> CliError {
    CliError::MissingField {
        name: entry.name.clone(),
        kind: entry.kind.name(),
        field,
    }
}
