//! EPSG coordinate reference system identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An EPSG coordinate reference system code.
///
/// ITS_LIVE granules carry their projection as an integer `spatial_epsg`
/// attribute; the same integer identifies the target projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpsgCode(u32);

impl EpsgCode {
    /// WGS84 Geographic (lat/lon in degrees)
    pub const WGS84: EpsgCode = EpsgCode(4326);
    /// NSIDC Sea Ice Polar Stereographic North (Greenland granules)
    pub const POLAR_NORTH: EpsgCode = EpsgCode(3413);
    /// Antarctic Polar Stereographic
    pub const POLAR_SOUTH: EpsgCode = EpsgCode(3031);

    pub const fn new(code: u32) -> Self {
        Self(code)
    }

    /// WGS84 / UTM north zone, e.g. `utm_north(33)` is EPSG:32633.
    pub fn utm_north(zone: u8) -> Option<Self> {
        (1..=60).contains(&zone).then(|| Self(32600 + zone as u32))
    }

    /// WGS84 / UTM south zone, e.g. `utm_south(19)` is EPSG:32719.
    pub fn utm_south(zone: u8) -> Option<Self> {
        (1..=60).contains(&zone).then(|| Self(32700 + zone as u32))
    }

    pub fn code(&self) -> u32 {
        self.0
    }
}

impl FromStr for EpsgCode {
    type Err = CrsParseError;

    /// Accepts "EPSG:3413", "epsg:3413" or a bare "3413".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = match trimmed.split_once(':') {
            Some((authority, code)) if authority.eq_ignore_ascii_case("EPSG") => code,
            Some(_) => return Err(CrsParseError::UnsupportedAuthority(s.to_string())),
            None => trimmed,
        };

        match digits.trim().parse::<u32>() {
            Ok(code) if code > 0 => Ok(Self(code)),
            _ => Err(CrsParseError::InvalidCode(s.to_string())),
        }
    }
}

impl From<u32> for EpsgCode {
    fn from(code: u32) -> Self {
        Self(code)
    }
}

impl fmt::Display for EpsgCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CrsParseError {
    #[error("Invalid EPSG code: {0}")]
    InvalidCode(String),

    #[error("Unsupported CRS authority: {0}")]
    UnsupportedAuthority(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_epsg() {
        assert_eq!("EPSG:3413".parse::<EpsgCode>().unwrap(), EpsgCode::POLAR_NORTH);
        assert_eq!("epsg:4326".parse::<EpsgCode>().unwrap(), EpsgCode::WGS84);
        assert_eq!(" 32633 ".parse::<EpsgCode>().unwrap(), EpsgCode::new(32633));
        assert!("EPSG:abc".parse::<EpsgCode>().is_err());
        assert!("0".parse::<EpsgCode>().is_err());
        assert!(matches!(
            "ESRI:102001".parse::<EpsgCode>(),
            Err(CrsParseError::UnsupportedAuthority(_))
        ));
    }

    #[test]
    fn test_utm_zones() {
        assert_eq!(EpsgCode::utm_north(33), Some(EpsgCode::new(32633)));
        assert_eq!(EpsgCode::utm_south(19), Some(EpsgCode::new(32719)));
        assert_eq!(EpsgCode::utm_north(0), None);
        assert_eq!(EpsgCode::utm_north(61), None);
    }

    #[test]
    fn test_display_and_serde() {
        assert_eq!(EpsgCode::POLAR_SOUTH.to_string(), "EPSG:3031");
        assert_eq!(serde_json::to_string(&EpsgCode::POLAR_NORTH).unwrap(), "3413");
        let parsed: EpsgCode = serde_json::from_str("32610").unwrap();
        assert_eq!(parsed.code(), 32610);
    }
}
