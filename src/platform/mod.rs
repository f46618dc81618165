//! Host platform detection.
//!
//! Every process-wide read the action performs (host OS, CPU architecture,
//! environment variables) goes through [`HostEnvironment`], so platform
//! detection and input parsing can be tested without touching the real
//! process environment.
//!
//! Host identifiers follow the runner convention (`darwin`, `linux`, `win32`
//! for the OS, `x64`, `arm64` for the CPU) and are normalized to relicta's
//! release naming (`Darwin`, `Linux`, `Windows`, `x86_64`, `aarch64`).

use crate::core::ActionError;
use std::fmt;

/// Source of host identity and environment variables.
pub trait HostEnvironment: Send + Sync {
    /// Host operating system identifier (`darwin`, `linux`, `win32`, ...).
    fn host_os(&self) -> String;

    /// Host CPU identifier (`x64`, `arm64`, ...).
    fn host_arch(&self) -> String;

    /// Value of an environment variable, `None` when unset or not unicode.
    fn var(&self, key: &str) -> Option<String>;
}

/// [`HostEnvironment`] backed by the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnvironment;

impl HostEnvironment for SystemEnvironment {
    fn host_os(&self) -> String {
        match std::env::consts::OS {
            "macos" => "darwin",
            "windows" => "win32",
            other => other,
        }
        .to_string()
    }

    fn host_arch(&self) -> String {
        match std::env::consts::ARCH {
            "x86_64" => "x64",
            "aarch64" => "arm64",
            other => other,
        }
        .to_string()
    }

    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Operating systems relicta publishes builds for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Darwin,
    Linux,
    Windows,
}

impl Os {
    /// Map a host identifier to a supported OS.
    pub fn from_host(host: &str) -> Result<Self, ActionError> {
        match host {
            "darwin" => Ok(Self::Darwin),
            "linux" => Ok(Self::Linux),
            "win32" => Ok(Self::Windows),
            other => Err(ActionError::UnsupportedPlatform {
                os: other.to_string(),
            }),
        }
    }

    /// Name used in main release archives (`Darwin`, `Linux`, `Windows`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Darwin => "Darwin",
            Self::Linux => "Linux",
            Self::Windows => "Windows",
        }
    }

    /// Name used in plugin archives (`darwin`, `linux`, `windows`).
    #[must_use]
    pub const fn as_lowercase_str(self) -> &'static str {
        match self {
            Self::Darwin => "darwin",
            Self::Linux => "linux",
            Self::Windows => "windows",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architectures relicta publishes builds for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86_64,
    Aarch64,
}

impl Arch {
    /// Map a host identifier to a supported architecture.
    pub fn from_host(host: &str) -> Result<Self, ActionError> {
        match host {
            "x64" => Ok(Self::X86_64),
            "arm64" => Ok(Self::Aarch64),
            other => Err(ActionError::UnsupportedArchitecture {
                arch: other.to_string(),
            }),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Aarch64 => "aarch64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized host platform, derived once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Platform {
    #[must_use]
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self {
            os,
            arch,
        }
    }

    /// Detect the platform from the host identifiers of `env`.
    ///
    /// The OS is checked first, so a host that is unsupported on both counts
    /// reports [`ActionError::UnsupportedPlatform`].
    pub fn detect(env: &dyn HostEnvironment) -> Result<Self, ActionError> {
        let os = Os::from_host(&env.host_os())?;
        let arch = Arch::from_host(&env.host_arch())?;
        Ok(Self::new(os, arch))
    }

    #[must_use]
    pub const fn is_windows(&self) -> bool {
        matches!(self.os, Os::Windows)
    }

    /// `.exe` on Windows, empty elsewhere.
    #[must_use]
    pub const fn exe_suffix(&self) -> &'static str {
        if self.is_windows() { ".exe" } else { "" }
    }

    /// Release archive extension without the leading dot.
    #[must_use]
    pub const fn archive_extension(&self) -> &'static str {
        if self.is_windows() { "zip" } else { "tar.gz" }
    }

    /// Executable file name for `tool` on this platform.
    #[must_use]
    pub fn binary_name(&self, tool: &str) -> String {
        format!("{tool}{}", self.exe_suffix())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}
