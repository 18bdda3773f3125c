use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use tessera_hir::{HirError, TypeTag};
use tessera_layout::{ConfigError, LayoutError};
use thiserror::Error;

/// Driver errors, reported through miette.
#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("Failed to read file {path}")]
    #[diagnostic(code(tessera::cli::io_error))]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse type graph {path}")]
    #[diagnostic(
        code(tessera::cli::parse_error),
        help("a type graph is a list of [[type]] tables with `name` and `kind`")
    )]
    ParseError {
        path: PathBuf,
        #[source_code]
        src: String,
        #[label("{message}")]
        span: Option<SourceSpan>,
        message: String,
    },

    #[error("`{name}` refers to unknown type `{target}`")]
    #[diagnostic(
        code(tessera::cli::unknown_type),
        help("declare it as a [[type]] entry or use a basic type name such as `int`")
    )]
    UnknownType { name: String, target: String },

    #[error("type `{0}` is defined more than once")]
    #[diagnostic(code(tessera::cli::duplicate_type))]
    DuplicateType(String),

    #[error("type `{0}` is defined in terms of itself")]
    #[diagnostic(
        code(tessera::cli::cyclic_type),
        help("cycles must pass through a struct, e.g. `struct Node {{ Node* next; }}`")
    )]
    CyclicType(String),

    #[error("type `{name}` of kind `{kind}` needs a `{field}` entry")]
    #[diagnostic(code(tessera::cli::missing_field))]
    MissingField {
        name: String,
        kind: &'static str,
        field: &'static str,
    },

    #[error("type `{name}` of kind `{kind}` does not take a `{field}` entry")]
    #[diagnostic(code(tessera::cli::unexpected_field))]
    UnexpectedField {
        name: String,
        kind: &'static str,
        field: &'static str,
        #[source_code]
        src: NamedSource<String>,
        #[label("not used by `{kind}` entries")]
        span: SourceSpan,
    },

    #[error("vector `{name}` must wrap a static array, not {found}")]
    #[diagnostic(
        code(tessera::cli::vector_base),
        help("`__vector(T[N])` is written as a vector whose `of` names a static-array entry")
    )]
    VectorBase {
        name: String,
        found: TypeTag,
        #[source_code]
        src: NamedSource<String>,
        #[label("this is not a static array")]
        span: SourceSpan,
    },

    #[error("vector `{name}` cannot have {dim} lanes")]
    #[diagnostic(
        code(tessera::cli::lane_count),
        help("a vector has between 1 and 4294967295 lanes")
    )]
    LaneCount {
        name: String,
        dim: u64,
        #[source_code]
        src: NamedSource<String>,
        #[label("array of {dim} elements")]
        span: SourceSpan,
    },

    #[error("internal compiler error while building descriptors")]
    #[diagnostic(code(tessera::cli::hir))]
    Hir(#[from] HirError),

    #[error("internal compiler error while lowering types")]
    #[diagnostic(
        code(tessera::cli::ice),
        help("this is a bug in tessera; please report it with the input file")
    )]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

/// Convert IO errors with context
pub fn convert_io_error(error: std::io::Error, path: PathBuf) -> CliError {
    CliError::IoError { path, source: error }
}

/// Attach the source text and the offending span to a TOML error.
pub fn convert_toml_error(error: toml::de::Error, path: PathBuf, src: &str) -> CliError {
    CliError::ParseError {
        path,
        src: src.to_string(),
        span: error.span().map(SourceSpan::from),
        message: error.message().to_string(),
    }
}
