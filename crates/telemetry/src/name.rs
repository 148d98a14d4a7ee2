use std::fmt::{self, Display};

/// Every field the vehicle is known to report, across all protocol variants.
///
/// Which of these a link actually accepts is decided by the selected
/// [`Vocabulary`](crate::vocabulary::Vocabulary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldName {
    BatteryVoltage,
    Roll,
    Pitch,
    Heading,
    NumSatellites,
    MainMode,
    SubMode,
    Mode,
    Error,
    GpsStatus,
    Latitude,
    Longitude,
    Altitude,
    DistanceRight,
    DistanceLeft,
    DistanceUpper,
    Temperature,
    Armed,
}

impl FieldName {
    pub const COUNT: usize = Self::ALL.len();

    pub const ALL: [FieldName; 18] = [
        FieldName::BatteryVoltage,
        FieldName::Roll,
        FieldName::Pitch,
        FieldName::Heading,
        FieldName::NumSatellites,
        FieldName::MainMode,
        FieldName::SubMode,
        FieldName::Mode,
        FieldName::Error,
        FieldName::GpsStatus,
        FieldName::Latitude,
        FieldName::Longitude,
        FieldName::Altitude,
        FieldName::DistanceRight,
        FieldName::DistanceLeft,
        FieldName::DistanceUpper,
        FieldName::Temperature,
        FieldName::Armed,
    ];

    /// Slot of this field in a snapshot.
    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    pub const fn label(self) -> &'static str {
        match self {
            FieldName::BatteryVoltage => "Battery Voltage",
            FieldName::Roll => "Roll",
            FieldName::Pitch => "Pitch",
            FieldName::Heading => "Heading",
            FieldName::NumSatellites => "Satellites",
            FieldName::MainMode => "Main Mode",
            FieldName::SubMode => "Sub Mode",
            FieldName::Mode => "Mode",
            FieldName::Error => "Error",
            FieldName::GpsStatus => "GPS Status",
            FieldName::Latitude => "Latitude",
            FieldName::Longitude => "Longitude",
            FieldName::Altitude => "Altitude",
            FieldName::DistanceRight => "Distance Right",
            FieldName::DistanceLeft => "Distance Left",
            FieldName::DistanceUpper => "Distance Upper",
            FieldName::Temperature => "Temperature",
            FieldName::Armed => "Armed",
        }
    }
}

impl Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
