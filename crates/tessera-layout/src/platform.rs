//! Target description and the extended-precision real width table.

use crate::lowered::FloatFormat;
use miette::Diagnostic;
use std::fmt;
use std::str::FromStr;
use target_lexicon::{
    Aarch64Architecture, Architecture, Environment, OperatingSystem, Triple, Vendor,
};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86,
    X86_64,
    Aarch64,
    Aarch64Be,
    Other,
}

/// Operating system families the width table distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    /// macOS, iOS and the other Apple systems.
    Darwin,
    Windows,
    Linux,
    Other,
}

/// ABI environments the width table distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Env {
    /// Native Windows ABI.
    Msvc,
    Android,
    Other,
}

/// The target being compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformDescriptor {
    pub arch: Arch,
    pub os: Os,
    pub env: Env,
    pub pointer_width: u8,
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("invalid target triple `{triple}`: {reason}")]
    #[diagnostic(
        code(tessera::platform::invalid_triple),
        help("use a triple such as `x86_64-unknown-linux-gnu`")
    )]
    InvalidTriple { triple: String, reason: String },

    #[error("target `{0}` has no known pointer width")]
    #[diagnostic(
        code(tessera::platform::pointer_width),
        help("set `pointer-width` in the [target] section of the configuration")
    )]
    UnknownPointerWidth(String),
}

impl PlatformDescriptor {
    pub fn new(arch: Arch, os: Os, env: Env, pointer_width: u8) -> Self {
        Self { arch, os, env, pointer_width }
    }

    pub fn from_triple(triple: &Triple) -> Result<Self, PlatformError> {
        let arch = match triple.architecture {
            Architecture::X86_32(_) => Arch::X86,
            Architecture::X86_64 => Arch::X86_64,
            Architecture::Aarch64(Aarch64Architecture::Aarch64) => Arch::Aarch64,
            Architecture::Aarch64(Aarch64Architecture::Aarch64be) => Arch::Aarch64Be,
            _ => Arch::Other,
        };

        let os = match triple.operating_system {
            OperatingSystem::Darwin | OperatingSystem::Ios | OperatingSystem::MacOSX { .. } => {
                Os::Darwin
            }
            _ if triple.vendor == Vendor::Apple => Os::Darwin,
            OperatingSystem::Windows => Os::Windows,
            OperatingSystem::Linux => Os::Linux,
            _ => Os::Other,
        };

        // Windows without an explicit environment defaults to the MSVC ABI.
        let env = match triple.environment {
            Environment::Msvc => Env::Msvc,
            Environment::Unknown if os == Os::Windows => Env::Msvc,
            Environment::Android | Environment::Androideabi => Env::Android,
            _ => Env::Other,
        };

        let pointer_width = triple
            .pointer_width()
            .map_err(|_| PlatformError::UnknownPointerWidth(triple.to_string()))?
            .bits();

        Ok(Self { arch, os, env, pointer_width })
    }

    pub fn host() -> Result<Self, PlatformError> {
        Self::from_triple(&Triple::host())
    }

    /// Width of the target's native unsigned integer (`size_t`).
    pub fn native_uint_bits(&self) -> u16 {
        u16::from(self.pointer_width)
    }
}

impl FromStr for PlatformDescriptor {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let triple = Triple::from_str(s).map_err(|err| PlatformError::InvalidTriple {
            triple: s.to_string(),
            reason: err.to_string(),
        })?;
        Self::from_triple(&triple)
    }
}

/// Machine width chosen for `real` and the types built on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RealWidth {
    Extended80,
    Quad128,
    Double64,
}

impl RealWidth {
    pub fn bits(self) -> u16 {
        self.format().bits()
    }

    pub fn format(self) -> FloatFormat {
        match self {
            RealWidth::Extended80 => FloatFormat::X87Extended,
            RealWidth::Quad128 => FloatFormat::Quad,
            RealWidth::Double64 => FloatFormat::Double,
        }
    }
}

impl fmt::Display for RealWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bits)", self.format().name(), self.bits())
    }
}

/// Picks the extended-precision width for `platform`. First match wins.
pub fn real_width(platform: &PlatformDescriptor) -> RealWidth {
    let any_x86 = matches!(platform.arch, Arch::X86 | Arch::X86_64);
    let any_aarch64 = matches!(platform.arch, Arch::Aarch64 | Arch::Aarch64Be);

    // Only x86 has x87 extended precision; MSVC and Android opt out.
    if any_x86 && !matches!(platform.env, Env::Msvc | Env::Android) {
        return RealWidth::Extended80;
    }
    if any_aarch64 && platform.os != Os::Darwin {
        return RealWidth::Quad128;
    }
    if platform.env == Env::Android && platform.arch == Arch::X86_64 {
        return RealWidth::Quad128;
    }
    // TODO: PowerPC and SystemZ have their own long double formats.
    RealWidth::Double64
}
