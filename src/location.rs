//! Structured location records decoded from region payloads.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Sentinel for a local network address.
pub const LAN: &str = "LAN";

/// Sentinel for an unknown field.
pub const UNKNOWN: &str = "UNKNOWN";

/// Raw marker the index uses for local network fields.
pub const LAN_MARKER: &str = "内网IP";

/// Number of `|` separated fields in a region payload.
pub const REGION_FIELD_COUNT: usize = 5;

/// Geographic and ISP record for an IP address.
///
/// Fields hold the raw decoded values. Call [`Location::normalized`] to get
/// the display form with sentinel substitution applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    pub country: String,
    pub province: String,
    pub city: String,
    pub area: String,
    pub isp: String,
}

impl Location {
    /// Decode a raw region payload.
    ///
    /// Payloads are stored as `country|area|province|city|isp`. Extra trailing
    /// fields are ignored; fewer than five is a [`Error::MalformedPayload`].
    pub fn from_region(region: &str) -> Result<Self> {
        let mut fields = region.split('|');
        let mut next = || fields.next();

        match (next(), next(), next(), next(), next()) {
            (Some(country), Some(area), Some(province), Some(city), Some(isp)) => Ok(Self {
                country: country.to_string(),
                province: province.to_string(),
                city: city.to_string(),
                area: area.to_string(),
                isp: isp.to_string(),
            }),
            _ => Err(Error::MalformedPayload(format!(
                "expected {} `|` separated fields in `{}`",
                REGION_FIELD_COUNT, region
            ))),
        }
    }

    /// Return a copy with every field passed through [`normalize_field`].
    pub fn normalized(&self) -> Self {
        Self {
            country: normalize_field(&self.country).to_string(),
            province: normalize_field(&self.province).to_string(),
            city: normalize_field(&self.city).to_string(),
            area: normalize_field(&self.area).to_string(),
            isp: normalize_field(&self.isp).to_string(),
        }
    }

    /// Whether the ISP field marks a local network address.
    pub fn is_lan(&self) -> bool {
        normalize_field(&self.isp) == LAN
    }
}

impl fmt::Display for Location {
    /// Formats in storage order, `country|area|province|city|isp`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}|{}",
            self.country, self.area, self.province, self.city, self.isp
        )
    }
}

/// Substitute sentinels for placeholder field values.
///
/// Empty and `"0"` become [`UNKNOWN`], [`LAN_MARKER`] becomes [`LAN`]; any
/// other value passes through unchanged.
pub fn normalize_field(value: &str) -> &str {
    match value {
        "" | "0" => UNKNOWN,
        LAN_MARKER => LAN,
        other => other,
    }
}
