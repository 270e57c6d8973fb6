//! Romanian licence plate format validation.
//!
//! Accepts regular county plates (`TM17NTT`, Bucharest `B767NTT`), temporary
//! plates (`CJ0567`), special organisation plates (`MAI153`) and diplomatic
//! plates (`CD123156`). Spaces are ignored.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

pub const COUNTY_PREFIXES: &[&str] = &[
    "AB", "AR", "AG", "BC", "BH", "BN", "BT", "BV", "BR", "B", "BZ", "CS", "CL", "CJ", "CT", "CV",
    "DB", "DJ", "GL", "GR", "GJ", "HR", "HD", "IL", "IS", "IF", "MM", "MH", "MS", "NT", "OT", "PH",
    "SM", "SJ", "SB", "SV", "TR", "TM", "TL", "VS", "VL", "VN",
];

pub const SPECIAL_PREFIXES: &[&str] = &["A", "FA", "ALA", "MAI"];

pub const DIPLOMATIC_PREFIXES: &[&str] = &["CD", "TC", "CO"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlateError {
    #[error("the plate contains lowercase letters")]
    Lowercase,
    #[error("the plate contains special characters")]
    SpecialCharacters,
    #[error("invalid county format")]
    InvalidCounty,
    #[error("number part is too short or too long")]
    NumberLength,
    #[error("the last part must be exactly 3 letters")]
    SuffixLength,
    #[error("invalid 3 letter string: {0}")]
    InvalidSuffix(&'static str),
    #[error("unexpected characters after temporary plate number")]
    TrailingCharacters,
    #[error("numbers in special organisation plate incorrect")]
    SpecialNumber,
    #[error("numbers in diplomatic plate incorrect")]
    DiplomaticNumber,
    #[error("invalid county, organisation or diplomatic prefix '{0}'")]
    InvalidPrefix(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlateKind {
    Regular,
    Temporary,
    Special,
    Diplomatic,
}

impl fmt::Display for PlateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlateKind::Regular => "regular",
            PlateKind::Temporary => "temporary",
            PlateKind::Special => "special",
            PlateKind::Diplomatic => "diplomatic",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlateEntry {
    pub kind: PlateKind,
    pub region: String,
    pub number: String,
    /// Three-letter group; only regular plates carry one.
    pub suffix: Option<String>,
}

impl PlateEntry {
    /// The plate with spaces removed, as it should be stored. Equal to
    /// [`normalize`] of the text the entry was parsed from.
    pub fn normalized(&self) -> String {
        let mut out = String::with_capacity(self.region.len() + self.number.len() + 3);
        out.push_str(&self.region);
        out.push_str(&self.number);
        if let Some(suffix) = &self.suffix {
            out.push_str(suffix);
        }
        out
    }
}

impl fmt::Display for PlateEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.region, self.number)?;
        if let Some(suffix) = &self.suffix {
            write!(f, " {}", suffix)?;
        }
        write!(f, " ({})", self.kind)
    }
}

pub fn is_county(prefix: &str) -> bool {
    COUNTY_PREFIXES.contains(&prefix)
}

pub fn is_special(prefix: &str) -> bool {
    SPECIAL_PREFIXES.contains(&prefix)
}

pub fn is_diplomatic(prefix: &str) -> bool {
    DIPLOMATIC_PREFIXES.contains(&prefix)
}

/// `text` with spaces removed: the form plates are stored and looked up in.
pub fn normalize(text: &str) -> String {
    text.chars().filter(|c| *c != ' ').collect()
}

/// Validate `text` as a Romanian plate and split it into its parts.
pub fn verify_plate(text: &str) -> Result<PlateEntry, PlateError> {
    let plate = normalize(text);

    if plate.chars().any(char::is_lowercase) || !plate.chars().any(char::is_uppercase) {
        return Err(PlateError::Lowercase);
    }
    if !plate.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(PlateError::SpecialCharacters);
    }

    // ASCII from here on, so byte indexing is char indexing.
    let bytes = plate.as_bytes();
    let all_alpha = |s: &[u8]| s.iter().all(u8::is_ascii_alphabetic);

    let region_len = if bytes.len() < 2 {
        return Err(PlateError::InvalidCounty);
    } else if bytes[1].is_ascii_digit() {
        1
    } else if bytes.len() >= 3 && all_alpha(&bytes[..3]) {
        3
    } else if all_alpha(&bytes[..2]) {
        2
    } else {
        return Err(PlateError::InvalidCounty);
    };

    let region = &plate[..region_len];
    let rest = &plate[region_len..];

    if is_county(region) {
        county_plate(region, rest)
    } else if is_special(region) {
        if (3..=7).contains(&rest.len()) && rest.bytes().all(|b| b.is_ascii_digit()) {
            Ok(PlateEntry {
                kind: PlateKind::Special,
                region: region.to_string(),
                number: rest.to_string(),
                suffix: None,
            })
        } else {
            Err(PlateError::SpecialNumber)
        }
    } else if is_diplomatic(region) {
        diplomatic_plate(region, rest)
    } else {
        Err(PlateError::InvalidPrefix(region.to_string()))
    }
}

fn county_plate(region: &str, rest: &str) -> Result<PlateEntry, PlateError> {
    let digits = rest
        .bytes()
        .take_while(u8::is_ascii_digit)
        .take(6)
        .count();
    let number = &rest[..digits];
    let remaining = &rest[digits..];

    let regular = digits == 2 || (digits == 3 && region == "B");
    if !regular {
        let temporary = (3..=6).contains(&digits)
            && number.starts_with('0')
            && !number.ends_with('0');
        if !temporary {
            return Err(PlateError::NumberLength);
        }
        if !remaining.is_empty() {
            return Err(PlateError::TrailingCharacters);
        }
        return Ok(PlateEntry {
            kind: PlateKind::Temporary,
            region: region.to_string(),
            number: number.to_string(),
            suffix: None,
        });
    }

    if remaining.len() != 3 || !remaining.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(PlateError::SuffixLength);
    }
    if remaining.starts_with(['I', 'O']) {
        return Err(PlateError::InvalidSuffix("cannot begin with 'I' or 'O'"));
    }
    if remaining.contains('Q') {
        return Err(PlateError::InvalidSuffix("cannot contain 'Q'"));
    }

    Ok(PlateEntry {
        kind: PlateKind::Regular,
        region: region.to_string(),
        number: number.to_string(),
        suffix: Some(remaining.to_string()),
    })
}

fn diplomatic_plate(region: &str, rest: &str) -> Result<PlateEntry, PlateError> {
    if rest.len() != 6 || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PlateError::DiplomaticNumber);
    }
    let (mission, serial) = rest.split_at(3);
    let parse = |s: &str| s.parse::<u16>().map_err(|_| PlateError::DiplomaticNumber);
    if parse(mission)? < 101 || parse(serial)? < 101 {
        return Err(PlateError::DiplomaticNumber);
    }
    Ok(PlateEntry {
        kind: PlateKind::Diplomatic,
        region: region.to_string(),
        number: rest.to_string(),
        suffix: None,
    })
}
