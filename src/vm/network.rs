//! Network and script version selection
//!
//! The rule set of the [`ScriptMachine`](super::engine::ScriptMachine) depends
//! on the chain (Bitcoin or Liquid) and on the script version (segwit v0 or
//! tapscript). Liquid re-enables the splice and bitwise opcodes, and its
//! tapscript adds transaction introspection and 64-bit arithmetic.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    #[default]
    Bitcoin,
    Liquid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptVersion {
    #[default]
    Segwit,
    Tapscript,
}

/// Network + script version pair the machine is configured for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VmConfig {
    pub network: Network,
    pub version: ScriptVersion,
}

impl VmConfig {
    pub fn new(network: Network, version: ScriptVersion) -> Self {
        VmConfig { network, version }
    }

    /// `OP_CAT`, `OP_SUBSTR`, `OP_LEFT`, `OP_RIGHT` and the bitwise opcodes
    pub fn splice_enabled(&self) -> bool {
        self.network == Network::Liquid
    }

    /// Transaction introspection and 64-bit arithmetic opcodes
    pub fn introspection_enabled(&self) -> bool {
        self.network == Network::Liquid && self.version == ScriptVersion::Tapscript
    }

    pub fn is_tapscript(&self) -> bool {
        self.version == ScriptVersion::Tapscript
    }
}

impl fmt::Display for VmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.network, self.version)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Bitcoin => write!(f, "Bitcoin"),
            Network::Liquid => write!(f, "Liquid"),
        }
    }
}

impl fmt::Display for ScriptVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptVersion::Segwit => write!(f, "Segwit"),
            ScriptVersion::Tapscript => write!(f, "Tapscript"),
        }
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bitcoin" | "btc" => Ok(Network::Bitcoin),
            "liquid" | "elements" => Ok(Network::Liquid),
            other => Err(format!("unknown network '{}'", other)),
        }
    }
}

impl FromStr for ScriptVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "segwit" | "v0" => Ok(ScriptVersion::Segwit),
            "tapscript" | "taproot" => Ok(ScriptVersion::Tapscript),
            other => Err(format!("unknown script version '{}'", other)),
        }
    }
}
