use std::fmt;

use anyhow::anyhow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingSystem {
    Windows,
    Linux,
    Mac,
}

impl OperatingSystem {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::Mac => "mac",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "windows" => Some(Self::Windows),
            "linux" => Some(Self::Linux),
            "mac" | "macos" | "darwin" => Some(Self::Mac),
            _ => None,
        }
    }

    /// Name of the runtime launcher binary inside the runtime's `bin` directory.
    /// Windows uses the console-less variant.
    pub fn runtime_executable(self) -> &'static str {
        match self {
            Self::Windows => "javaw.exe",
            Self::Linux | Self::Mac => "java",
        }
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    X86_64,
    Arm64,
}

impl Architecture {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X86_64 => "x86",
            Self::Arm64 => "arm64",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "x86" | "x86_64" | "amd64" => Some(Self::X86_64),
            "arm64" | "aarch64" => Some(Self::Arm64),
            _ => None,
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: OperatingSystem,
    pub arch: Architecture,
}

impl Platform {
    pub fn new(os: OperatingSystem, arch: Architecture) -> Self {
        Self { os, arch }
    }

    pub fn current() -> anyhow::Result<Self> {
        Self::from_host(std::env::consts::OS, std::env::consts::ARCH)
    }

    pub fn from_host(os: &str, arch: &str) -> anyhow::Result<Self> {
        let os = OperatingSystem::parse(os)
            .ok_or_else(|| anyhow!("unsupported operating system: {os}"))?;
        let arch = Architecture::parse(arch)
            .ok_or_else(|| anyhow!("unsupported system architecture: {arch}"))?;
        Ok(Self { os, arch })
    }
}
