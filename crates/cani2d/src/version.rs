//! Model format versions understood by the runtime

use serde::{Deserialize, Serialize};
use std::fmt;

/// Exporter version stamped into every model document, as `[major, minor, patch]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatVersion(pub [u32; 3]);

/// Format version produced by the current exporter
pub const CURRENT_FORMAT_VERSION: FormatVersion = FormatVersion([0, 0, 1]);

impl FormatVersion {
    /// Create a version from its three components
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self([major, minor, patch])
    }

    /// Check this version against a set of supported versions
    pub fn is_supported_by(&self, supported: &[FormatVersion]) -> bool {
        supported.contains(self)
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [major, minor, patch] = self.0;
        write!(f, "{major}.{minor}.{patch}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_display() {
        assert_eq!(CURRENT_FORMAT_VERSION.to_string(), "0.0.1");
        assert_eq!(FormatVersion::new(1, 2, 3).to_string(), "1.2.3");
    }

    #[test]
    fn test_version_supported() {
        let supported = [CURRENT_FORMAT_VERSION, FormatVersion::new(0, 0, 0)];
        assert!(CURRENT_FORMAT_VERSION.is_supported_by(&supported));
        assert!(FormatVersion::new(0, 0, 0).is_supported_by(&supported));
        assert!(!FormatVersion::new(0, 1, 0).is_supported_by(&supported));
        assert!(!CURRENT_FORMAT_VERSION.is_supported_by(&[]));
    }

    #[test]
    fn test_version_deserializes_from_array() {
        let version: FormatVersion = serde_json::from_str("[0,0,1]").unwrap();
        assert_eq!(version, CURRENT_FORMAT_VERSION);
    }
}
