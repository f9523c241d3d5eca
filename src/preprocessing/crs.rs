use super::PreprocessingError;
use std::fmt;

/// A coordinate reference system identified by its EPSG number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EpsgCode(u32);

impl EpsgCode {
    pub const WGS84: Self = Self(4326);
    pub const WEB_MERCATOR: Self = Self(3857);

    pub fn new(code: u32) -> Self {
        Self(code)
    }

    pub fn code(self) -> u32 {
        self.0
    }

    /// Accepts `EPSG:4326`, a bare `4326`, OGC URNs such as
    /// `urn:ogc:def:crs:EPSG::4326` and `http://www.opengis.net/def/crs/EPSG/0/4326`.
    pub fn parse(raw: &str) -> Result<Self, PreprocessingError> {
        let invalid = || PreprocessingError::InvalidCrs {
            value: raw.to_string(),
        };
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();

        let digits = if let Some(rest) = lower.strip_prefix("epsg:") {
            rest
        } else if lower.starts_with("urn:ogc:def:crs:epsg:") {
            // urn:ogc:def:crs:EPSG:<version>:<code>, version may be empty
            lower.rsplit(':').next().unwrap_or_default()
        } else if lower.starts_with("http://www.opengis.net/def/crs/epsg/")
            || lower.starts_with("https://www.opengis.net/def/crs/epsg/")
        {
            lower.rsplit('/').next().unwrap_or_default()
        } else {
            lower.as_str()
        };

        let code = digits.trim().parse::<u32>().map_err(|_| invalid())?;
        if code == 0 {
            return Err(invalid());
        }
        Ok(Self(code))
    }

    /// Form used in the GeoJSON `crs` member.
    pub fn to_urn(self) -> String {
        format!("urn:ogc:def:crs:EPSG::{}", self.0)
    }
}

impl fmt::Display for EpsgCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_notations() {
        for raw in [
            "EPSG:4326",
            "epsg:4326",
            " 4326 ",
            "urn:ogc:def:crs:EPSG::4326",
            "urn:ogc:def:crs:EPSG:6.6:4326",
            "http://www.opengis.net/def/crs/EPSG/0/4326",
        ] {
            assert_eq!(EpsgCode::parse(raw).expect(raw), EpsgCode::WGS84, "{raw}");
        }
    }

    #[test]
    fn rejects_garbage() {
        for raw in ["", "EPSG:", "EPSG:abc", "WGS84", "0", "EPSG:-1"] {
            assert!(EpsgCode::parse(raw).is_err(), "{raw}");
        }
    }

    #[test]
    fn renders_prefixed_and_urn_forms() {
        let code = EpsgCode::new(32632);
        assert_eq!(code.to_string(), "EPSG:32632");
        assert_eq!(code.to_urn(), "urn:ogc:def:crs:EPSG::32632");
    }
}
