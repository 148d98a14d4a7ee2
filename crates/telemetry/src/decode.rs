use std::fmt::{self, Display};

use tracing::trace;

use crate::{
    value::{FieldValue, FieldValueError},
    vocabulary::{Protocol, Vocabulary},
    TelemetryField,
};

/// Why a line produced no field. Routine on a noisy link, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discard {
    /// Not exactly one `:` in the line.
    Malformed,
    UnknownKey(String),
    BadValue(FieldValueError),
}

impl Display for Discard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discard::Malformed => f.write_str("line is not a single key: value pair"),
            Discard::UnknownKey(key) => write!(f, "unknown key {key:?}"),
            Discard::BadValue(error) => Display::fmt(error, f),
        }
    }
}

/// Turns `Key: Value` lines into typed fields using one vocabulary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineDecoder {
    vocabulary: &'static Vocabulary,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new(Protocol::default())
    }
}

impl LineDecoder {
    pub fn new(protocol: Protocol) -> Self {
        Self {
            vocabulary: protocol.vocabulary(),
        }
    }

    pub fn vocabulary(&self) -> &'static Vocabulary {
        self.vocabulary
    }

    pub fn decode(&self, line: &str) -> Option<TelemetryField> {
        match self.try_decode(line) {
            Ok(field) => Some(field),
            Err(discard) => {
                trace!(%line, %discard, "discarding line");

                None
            }
        }
    }

    pub fn try_decode(&self, line: &str) -> Result<TelemetryField, Discard> {
        let mut split = line.split(':');

        let (key, value) = match (split.next(), split.next(), split.next()) {
            (Some(key), Some(value), None) => (key.trim(), value.trim()),
            _ => return Err(Discard::Malformed),
        };

        let entry = self
            .vocabulary
            .lookup(key)
            .ok_or_else(|| Discard::UnknownKey(key.to_owned()))?;

        let value = FieldValue::parse(entry.kind, value).map_err(Discard::BadValue)?;

        Ok(TelemetryField {
            name: entry.name,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{name::FieldName, value::FieldKind};

    fn decode(line: &str) -> Option<TelemetryField> {
        LineDecoder::default().decode(line)
    }

    #[test]
    fn battery_voltage_is_a_float() {
        assert_eq!(
            decode("Battery Voltage: 11.8"),
            Some(TelemetryField::new(FieldName::BatteryVoltage, 11.8))
        );
    }

    #[test]
    fn distance_is_an_integer() {
        assert_eq!(
            decode("Distance Right: 42"),
            Some(TelemetryField::new(FieldName::DistanceRight, 42))
        );
    }

    #[test]
    fn unknown_key_is_discarded() {
        assert_eq!(
            LineDecoder::default().try_decode("Foo: bar"),
            Err(Discard::UnknownKey("Foo".into()))
        );
    }

    #[test]
    fn unparsable_value_is_discarded() {
        assert!(matches!(
            LineDecoder::default().try_decode("Altitude: notanumber"),
            Err(Discard::BadValue(_))
        ));
    }

    #[test]
    fn extra_colons_are_malformed() {
        assert_eq!(
            LineDecoder::default().try_decode("Main Mode: AUTO: 3"),
            Err(Discard::Malformed)
        );
        assert_eq!(
            LineDecoder::default().try_decode("no separator"),
            Err(Discard::Malformed)
        );
    }

    #[test]
    fn whitespace_is_trimmed_around_key_and_value() {
        assert_eq!(
            decode("  Roll\t:   -4.5  "),
            Some(TelemetryField::new(FieldName::Roll, -4.5))
        );
        assert_eq!(
            decode("Armed or Not:Yes"),
            Some(TelemetryField::new(FieldName::Armed, "Yes"))
        );
    }

    #[test]
    fn empty_text_value_is_a_field() {
        assert_eq!(
            decode("Error:   "),
            Some(TelemetryField::new(FieldName::Error, ""))
        );
        assert_eq!(decode("Altitude:"), None);
    }

    #[test]
    fn text_case_is_preserved() {
        assert_eq!(
            decode("Main Mode: Stabilize"),
            Some(TelemetryField::new(FieldName::MainMode, "Stabilize"))
        );
    }

    #[test]
    fn legacy_protocol_uses_its_own_table() {
        let legacy = LineDecoder::new(Protocol::Legacy);

        assert_eq!(
            legacy.decode("Mode: 3"),
            Some(TelemetryField::new(FieldName::Mode, 3))
        );
        assert_eq!(
            legacy.decode("Error: 7"),
            Some(TelemetryField::new(FieldName::Error, 7))
        );
        assert_eq!(legacy.decode("Main Mode: AUTO"), None);
        assert_eq!(decode("Temperature: 21.5"), None);
    }

    fn numeric_entries() -> impl Strategy<Value = (&'static str, FieldName, FieldKind)> {
        let entries: Vec<_> = Vocabulary::CURRENT
            .entries()
            .iter()
            .filter(|entry| entry.kind != FieldKind::Text)
            .map(|entry| (entry.key, entry.name, entry.kind))
            .collect();

        proptest::sample::select(entries)
    }

    proptest! {
        #[test]
        fn valid_numeric_lines_decode((key, name, kind) in numeric_entries(), number in -100_000i64..100_000) {
            let line = match kind {
                FieldKind::Float => format!("{key}: {}", number as f64 / 100.0),
                _ => format!("{key}: {number}"),
            };

            let expected = match kind {
                FieldKind::Float => FieldValue::Float(number as f64 / 100.0),
                _ => FieldValue::Integer(number),
            };

            prop_assert_eq!(decode(&line), Some(TelemetryField { name, value: expected }));
        }

        #[test]
        fn text_values_are_verbatim(value in "[A-Za-z0-9 _-]{0,24}") {
            let line = format!("Sub Mode: {value}");

            prop_assert_eq!(
                decode(&line),
                Some(TelemetryField::new(FieldName::SubMode, value.trim()))
            );
        }

        #[test]
        fn unknown_keys_never_decode(key in "[a-z]{1,12}", value in "[0-9]{1,6}") {
            let line = format!("{key}: {value}");

            prop_assert_eq!(decode(&line), None);
        }

        #[test]
        fn lines_without_exactly_one_colon_never_decode(
            line in "[A-Za-z0-9 .]{0,32}",
            colons in prop_oneof![Just(0usize), 2usize..5],
        ) {
            let line = format!("Battery Voltage{}{line}", ":".repeat(colons));

            prop_assert_eq!(decode(&line), None);
        }

        #[test]
        fn decoding_is_idempotent(line in "[A-Za-z :.0-9-]{0,40}") {
            prop_assert_eq!(decode(&line), decode(&line));
        }
    }
}
