//! Runtime view of what the loaded libproj can do.
//!
//! The registry is computed once per library load and never mutated. It is
//! strict about missing introspection: a library that cannot report its
//! version is treated as the oldest supported release, never as "everything
//! available".

use crate::capability::{Capability, Version};
use crate::error::{ProjError, Result};
use crate::native::{Symbols, c_str_to_string};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Where the resolved version came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionSource {
    /// `proj_info()` (5.0+).
    ProjInfo,
    /// Parsed from the `pj_get_release()` banner (4.x).
    ReleaseString,
    /// Neither entry point answered; the 4.9.0 baseline was assumed.
    Baseline,
    /// Built from a version alone, without a loaded library.
    Simulated,
}

#[derive(Clone, Debug)]
pub struct CapabilityRegistry {
    version: Version,
    source: VersionSource,
    available: BTreeMap<Capability, bool>,
}

/// Serializable registry dump used by `proj-info`.
#[derive(Clone, Debug, Serialize)]
pub struct CapabilitySnapshot {
    pub version: Version,
    pub source: VersionSource,
    pub capabilities: BTreeMap<Capability, bool>,
}

impl CapabilityRegistry {
    /// Probe the version through the newest introspection entry point the
    /// library exports, then mark each capability available when the version
    /// meets its minimum and the symbol resolved.
    pub fn probe(symbols: &Symbols) -> Self {
        let (version, source) = probe_version(symbols);
        let available = Capability::ALL
            .iter()
            .map(|cap| {
                let ok = version >= cap.introduced_in() && symbols.has(cap.as_str());
                (*cap, ok)
            })
            .collect::<BTreeMap<_, _>>();
        debug!(
            %version,
            ?source,
            available = available.values().filter(|ok| **ok).count(),
            known = available.len(),
            "probed libproj capabilities"
        );
        Self {
            version,
            source,
            available,
        }
    }

    /// Registry for `version` without consulting any symbols.
    pub fn for_version(version: Version) -> Self {
        let available = Capability::ALL
            .iter()
            .map(|cap| (*cap, version >= cap.introduced_in()))
            .collect();
        Self {
            version,
            source: VersionSource::Simulated,
            available,
        }
    }

    /// The resolved library version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// How [`version`](Self::version) was obtained.
    pub fn source(&self) -> VersionSource {
        self.source
    }

    pub fn is_available(&self, capability: Capability) -> bool {
        self.available.get(&capability).copied().unwrap_or(false)
    }

    /// Fail with [`ProjError::CapabilityUnsupported`] unless `capability` is
    /// available.
    pub fn require(&self, capability: Capability) -> Result<()> {
        if self.is_available(capability) {
            Ok(())
        } else {
            Err(ProjError::capability_unsupported(capability, self.version))
        }
    }

    /// Capabilities available in this registry, in declaration order.
    pub fn available(&self) -> impl Iterator<Item = Capability> + '_ {
        self.available
            .iter()
            .filter(|(_, ok)| **ok)
            .map(|(cap, _)| *cap)
    }

    /// Serializable view of the version and every capability.
    pub fn snapshot(&self) -> CapabilitySnapshot {
        CapabilitySnapshot {
            version: self.version,
            source: self.source,
            capabilities: self.available.clone(),
        }
    }
}

fn probe_version(symbols: &Symbols) -> (Version, VersionSource) {
    if let Some(info) = symbols.proj_info {
        // SAFETY: proj_info takes no arguments and returns a struct by value.
        let info = unsafe { info() };
        let component = |value: i32| u32::try_from(value).unwrap_or(0);
        return (
            Version::new(
                component(info.major),
                component(info.minor),
                component(info.patch),
            ),
            VersionSource::ProjInfo,
        );
    }
    if let Some(release) = symbols.pj_get_release {
        // SAFETY: pj_get_release returns a pointer to a static banner.
        let banner = unsafe { c_str_to_string(release()) };
        if let Some(version) = banner.as_deref().and_then(Version::parse_release) {
            return (version, VersionSource::ReleaseString);
        }
    }
    (Version::BASELINE, VersionSource::Baseline)
}
