use std::fmt::{self, Display};

use self::{name::FieldName, value::FieldValue};

pub mod arm_timer;
pub mod decode;
pub mod name;
pub mod state;
pub mod value;
pub mod vocabulary;

pub use arm_timer::ArmTimer;
pub use decode::{Discard, LineDecoder};
pub use state::{Reading, TelemetrySnapshot, TelemetryState};
pub use vocabulary::Protocol;

/// One decoded measurement, keyed by its place in the field vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryField {
    pub name: FieldName,
    pub value: FieldValue,
}

impl TelemetryField {
    pub fn new(name: FieldName, value: impl Into<FieldValue>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

impl Display for TelemetryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}
