pub mod camera_feed;
pub mod flight_timer;
pub mod telemetry_table;

mod sizes {
    pub const MONOSPACE_CHAR_WIDTH: f32 = 7.0;

    pub const FIELD_NAME_WIDTH: f32 = MONOSPACE_CHAR_WIDTH * 18.0;
    pub const FIELD_TYPE_WIDTH: f32 = MONOSPACE_CHAR_WIDTH * 5.0;
    pub const AGE_WIDTH: f32 = MONOSPACE_CHAR_WIDTH * 8.0;
}
