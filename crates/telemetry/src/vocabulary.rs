use std::{
    fmt::{self, Display},
    str::FromStr,
};

use crate::{name::FieldName, value::FieldKind};

/// One row of a vocabulary table: the exact wire key and what it decodes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub key: &'static str,
    pub name: FieldName,
    pub kind: FieldKind,
}

const fn entry(key: &'static str, name: FieldName, kind: FieldKind) -> Entry {
    Entry { key, name, kind }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Vocabulary {
    entries: &'static [Entry],
}

impl Vocabulary {
    /// Flight controller firmware with split modes and GPS status.
    pub const CURRENT: Vocabulary = Vocabulary {
        entries: &[
            entry("Battery Voltage", FieldName::BatteryVoltage, FieldKind::Float),
            entry("Roll", FieldName::Roll, FieldKind::Float),
            entry("Pitch", FieldName::Pitch, FieldKind::Float),
            entry("Heading", FieldName::Heading, FieldKind::Float),
            entry("Number of Satellites", FieldName::NumSatellites, FieldKind::Integer),
            entry("Main Mode", FieldName::MainMode, FieldKind::Text),
            entry("Sub Mode", FieldName::SubMode, FieldKind::Text),
            entry("Error", FieldName::Error, FieldKind::Text),
            entry("GPS Status", FieldName::GpsStatus, FieldKind::Text),
            entry("Latitude", FieldName::Latitude, FieldKind::Float),
            entry("Longitude", FieldName::Longitude, FieldKind::Float),
            entry("Altitude", FieldName::Altitude, FieldKind::Float),
            entry("Distance Right", FieldName::DistanceRight, FieldKind::Integer),
            entry("Distance Left", FieldName::DistanceLeft, FieldKind::Integer),
            entry("Distance Upper", FieldName::DistanceUpper, FieldKind::Integer),
            entry("Armed or Not", FieldName::Armed, FieldKind::Text),
        ],
    };

    /// Older firmware reporting a numeric mode, numeric error code and temperature.
    pub const LEGACY: Vocabulary = Vocabulary {
        entries: &[
            entry("Battery Voltage", FieldName::BatteryVoltage, FieldKind::Float),
            entry("Roll", FieldName::Roll, FieldKind::Float),
            entry("Pitch", FieldName::Pitch, FieldKind::Float),
            entry("Heading", FieldName::Heading, FieldKind::Float),
            entry("Number of Satellites", FieldName::NumSatellites, FieldKind::Integer),
            entry("Mode", FieldName::Mode, FieldKind::Integer),
            entry("Error", FieldName::Error, FieldKind::Integer),
            entry("Latitude", FieldName::Latitude, FieldKind::Float),
            entry("Longitude", FieldName::Longitude, FieldKind::Float),
            entry("Altitude", FieldName::Altitude, FieldKind::Float),
            entry("Distance Right", FieldName::DistanceRight, FieldKind::Integer),
            entry("Distance Left", FieldName::DistanceLeft, FieldKind::Integer),
            entry("Distance Upper", FieldName::DistanceUpper, FieldKind::Integer),
            entry("Temperature", FieldName::Temperature, FieldKind::Float),
            entry("Armed or Not", FieldName::Armed, FieldKind::Text),
        ],
    };

    /// Exact, case-sensitive lookup of a trimmed wire key.
    pub fn lookup(&self, key: &str) -> Option<&'static Entry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    pub fn entries(&self) -> &'static [Entry] {
        self.entries
    }

    pub fn contains(&self, name: FieldName) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }
}

/// Selects which vocabulary table a link is decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    #[default]
    Current,
    Legacy,
}

impl Protocol {
    pub fn vocabulary(self) -> &'static Vocabulary {
        match self {
            Protocol::Current => &Vocabulary::CURRENT,
            Protocol::Legacy => &Vocabulary::LEGACY,
        }
    }
}

impl Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Protocol::Current => "current",
            Protocol::Legacy => "legacy",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProtocol(pub String);

impl Display for UnknownProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown protocol {:?}, expected \"current\" or \"legacy\"",
            self.0
        )
    }
}

impl std::error::Error for UnknownProtocol {}

impl FromStr for Protocol {
    type Err = UnknownProtocol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "current" => Ok(Protocol::Current),
            "legacy" => Ok(Protocol::Legacy),
            _ => Err(UnknownProtocol(s.to_owned())),
        }
    }
}
