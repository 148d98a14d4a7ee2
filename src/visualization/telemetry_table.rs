use std::time::Instant;

use eframe::{
    egui::{Layout, RichText, Ui},
    emath::Align,
    epaint::Color32,
};
use egui_extras::{Column, TableBuilder};
use osprey_telemetry::{vocabulary::Vocabulary, TelemetrySnapshot};

use super::sizes::{AGE_WIDTH, FIELD_NAME_WIDTH, FIELD_TYPE_WIDTH};

const PLACEHOLDER: &str = "--";

/// One row per vocabulary entry, in wire order; unset fields show a placeholder.
pub fn telemetry_table(ui: &mut Ui, vocabulary: &Vocabulary, snapshot: &TelemetrySnapshot) {
    let now = Instant::now();

    TableBuilder::new(ui)
        .column(Column::exact(FIELD_NAME_WIDTH))
        .column(Column::exact(FIELD_TYPE_WIDTH))
        .column(Column::exact(AGE_WIDTH))
        .column(Column::remainder())
        .striped(true)
        .cell_layout(Layout::left_to_right(Align::Center).with_main_wrap(false))
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.heading("Field");
            });
            header.col(|ui| {
                ui.heading("Type");
            });
            header.col(|ui| {
                ui.heading("Age")
                    .on_hover_text_at_pointer("Time since the value was received");
            });
            header.col(|ui| {
                ui.heading("Value");
            });
        })
        .body(|mut body| {
            for entry in vocabulary.entries() {
                let reading = snapshot.get(entry.name);

                body.row(20.0, |mut row| {
                    row.col(|ui| {
                        ui.label(entry.name.label())
                            .on_hover_text_at_pointer(format!("wire key \"{}\"", entry.key));
                    });
                    row.col(|ui| {
                        ui.label(RichText::new(entry.kind.ty()).monospace().weak());
                    });
                    row.col(|ui| match reading {
                        Some(reading) => {
                            let age = now.saturating_duration_since(reading.received);

                            ui.monospace(format!("{:.1}s", age.as_secs_f32()));
                        }
                        None => {
                            ui.monospace(PLACEHOLDER);
                        }
                    });
                    row.col(|ui| match reading {
                        Some(reading) => {
                            ui.monospace(RichText::new(reading.value.to_string()).strong());
                        }
                        None => {
                            ui.label(RichText::new(PLACEHOLDER).monospace().color(Color32::GRAY));
                        }
                    });
                });
            }
        });
}
