use eframe::{
    egui::{RichText, Ui},
    epaint::Color32,
};
use osprey_telemetry::{arm_timer::format_elapsed, ArmTimer};

pub fn flight_timer(ui: &mut Ui, timer: &ArmTimer) {
    match timer.elapsed() {
        Some(elapsed) => {
            ui.label(
                RichText::new(format_elapsed(elapsed))
                    .monospace()
                    .size(18.0)
                    .color(Color32::LIGHT_GREEN),
            )
            .on_hover_text_at_pointer("Time since the vehicle first reported armed");
        }
        None => {
            ui.label(
                RichText::new(format_elapsed(Default::default()))
                    .monospace()
                    .size(18.0)
                    .color(Color32::GRAY),
            )
            .on_hover_text_at_pointer("Not armed yet");
        }
    }

    ui.label("Flight time");
}
