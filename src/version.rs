//! Protocol versions and version-string detection.

use std::fmt;

use crate::formatter::{Formatter, FormatterV092, FormatterV09x, FormatterV0x};

/// A protocol version family, either requested explicitly or detected from
/// the `X-Influxdb-Version` header at connect time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Version {
    /// Ping the server and detect the version before binding a dialect.
    #[default]
    Auto,
    V1_1,
    V0_13,
    V0_12,
    V0_11,
    V0_10,
    V0_9,
    V0_9_6,
    V0_9_5,
    V0_9_2,
    V0_8,
    /// Any version with no dedicated entry in the detection table.
    V0,
}

/// Point releases with a dedicated slot. These match the advertised string
/// exactly, so `0.9.51` stays in the `0.9.` family below.
const EXACT_RELEASES: &[(&str, Version)] = &[
    ("0.9.2", Version::V0_9_2),
    ("0.9.5", Version::V0_9_5),
    ("0.9.6", Version::V0_9_6),
];

/// The family table: version string prefixes and the family they map to.
const FAMILY_PREFIXES: &[(&str, Version)] = &[
    ("1.1.", Version::V1_1),
    ("0.13.", Version::V0_13),
    ("0.12.", Version::V0_12),
    ("0.11.", Version::V0_11),
    ("0.10.", Version::V0_10),
    ("0.9.", Version::V0_9),
    ("0.8.", Version::V0_8),
];

impl Version {
    /// Maps an advertised version string to its family: exact point
    /// releases first, then the prefix table. Strings with no entry fall
    /// back to [`Version::V0`], which still speaks the modern protocol with
    /// the oldest formatter dialect.
    pub fn from_version_string(version: &str) -> Version {
        EXACT_RELEASES
            .iter()
            .find(|(release, _)| version == *release)
            .or_else(|| {
                FAMILY_PREFIXES
                    .iter()
                    .find(|(prefix, _)| version.starts_with(prefix))
            })
            .map(|(_, v)| *v)
            .unwrap_or(Version::V0)
    }

    /// The line protocol formatter this version speaks.
    ///
    /// The 0.9.2 through 0.9.6 servers dropped the integer suffix; anything
    /// older than 0.9 additionally quotes text tag values and booleans.
    pub fn formatter(self) -> Box<dyn Formatter> {
        match self {
            Version::V0_9_2 | Version::V0_9_5 | Version::V0_9_6 => Box::new(FormatterV092),
            Version::V0_8 | Version::V0 => Box::new(FormatterV0x),
            _ => Box::new(FormatterV09x),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Version::Auto => "auto",
            Version::V1_1 => "1.1.x",
            Version::V0_13 => "0.13.x",
            Version::V0_12 => "0.12.x",
            Version::V0_11 => "0.11.x",
            Version::V0_10 => "0.10.x",
            Version::V0_9 => "0.9.x",
            Version::V0_9_6 => "0.9.6",
            Version::V0_9_5 => "0.9.5",
            Version::V0_9_2 => "0.9.2",
            Version::V0_8 => "0.8.x",
            Version::V0 => "0.x",
        };
        write!(f, "{}", name)
    }
}
