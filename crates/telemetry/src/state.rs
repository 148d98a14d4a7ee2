use std::time::Instant;

use parking_lot::RwLock;

use crate::{
    arm_timer::ArmTimer,
    name::FieldName,
    value::FieldValue,
    TelemetryField,
};

/// Last decoded value of a field and when it arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub value: FieldValue,
    pub received: Instant,
}

/// Every field at one instant; `None` for fields never received.
#[derive(Debug, Clone)]
pub struct TelemetrySnapshot {
    slots: [Option<Reading>; FieldName::COUNT],
    applied: u64,
    discarded: u64,
}

impl TelemetrySnapshot {
    fn empty() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            applied: 0,
            discarded: 0,
        }
    }

    pub fn get(&self, name: FieldName) -> Option<&Reading> {
        self.slots[name.index()].as_ref()
    }

    pub fn value(&self, name: FieldName) -> Option<&FieldValue> {
        self.get(name).map(|reading| &reading.value)
    }

    pub fn is_set(&self, name: FieldName) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &Reading)> + '_ {
        FieldName::ALL
            .iter()
            .zip(&self.slots)
            .filter_map(|(name, slot)| slot.as_ref().map(|reading| (*name, reading)))
    }

    /// Fields applied since the pipeline started.
    pub fn applied(&self) -> u64 {
        self.applied
    }

    /// Lines that decoded to nothing.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}

/// The only telemetry structure shared between the link thread and the display.
#[derive(Debug)]
pub struct TelemetryState {
    snapshot: RwLock<TelemetrySnapshot>,
    arm_timer: ArmTimer,
}

impl Default for TelemetryState {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryState {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(TelemetrySnapshot::empty()),
            arm_timer: ArmTimer::new(),
        }
    }

    pub fn apply(&self, field: TelemetryField) {
        self.apply_at(field, Instant::now())
    }

    pub fn apply_at(&self, field: TelemetryField, received: Instant) {
        if field.name == FieldName::Armed {
            self.arm_timer.observe_at(&field, received);
        }

        let mut snapshot = self.snapshot.write();

        snapshot.slots[field.name.index()] = Some(Reading {
            value: field.value,
            received,
        });
        snapshot.applied += 1;
    }

    pub fn record_discard(&self) {
        self.snapshot.write().discarded += 1;
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.snapshot.read().clone()
    }

    /// Forgets every field value. The arm timer keeps running.
    pub fn clear(&self) {
        *self.snapshot.write() = TelemetrySnapshot::empty();
    }

    pub fn arm_timer(&self) -> &ArmTimer {
        &self.arm_timer
    }
}
