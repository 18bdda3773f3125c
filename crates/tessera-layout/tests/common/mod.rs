//! Shared fixtures for lowering tests.
#![allow(dead_code)]

use tessera_layout::platform::{Arch, Env, Os};
use tessera_layout::PlatformDescriptor;

pub fn linux_x86_64() -> PlatformDescriptor {
    PlatformDescriptor::new(Arch::X86_64, Os::Linux, Env::Other, 64)
}

pub fn linux_i686() -> PlatformDescriptor {
    PlatformDescriptor::new(Arch::X86, Os::Linux, Env::Other, 32)
}

pub fn windows_msvc_x86_64() -> PlatformDescriptor {
    PlatformDescriptor::new(Arch::X86_64, Os::Windows, Env::Msvc, 64)
}

pub fn linux_aarch64() -> PlatformDescriptor {
    PlatformDescriptor::new(Arch::Aarch64, Os::Linux, Env::Other, 64)
}
