use std::{path::PathBuf, sync::Arc, time::Duration};

use eframe::{
    egui::{CentralPanel, ComboBox, Context, RichText, SidePanel, TopBottomPanel, Ui},
    epaint::Color32,
    App,
};
use osprey_camera::{CameraState, FramePump};
use osprey_link::{LinkConfig, LinkReader, LinkState};
use osprey_telemetry::TelemetryState;
use tracing::{error, info, warn};

use crate::{
    capture,
    visualization::{camera_feed::CameraFeed, flight_timer, telemetry_table},
};

#[derive(Debug)]
pub struct Settings {
    pub port: Option<String>,
    pub link: LinkConfig,
    pub camera: Option<u32>,
    pub capture_dir: PathBuf,
}

enum Status {
    Info(String),
    Error(String),
}

impl Status {
    fn show(&self, ui: &mut Ui) {
        match self {
            Status::Info(text) => ui.label(RichText::new(text).color(Color32::LIGHT_BLUE)),
            Status::Error(text) => ui.label(RichText::new(text).color(Color32::RED)),
        };
    }
}

enum LinkAction {
    Connect(String),
    Disconnect,
    RefreshPorts,
}

pub struct Application {
    settings: Settings,

    telemetry: Arc<TelemetryState>,

    ports: Vec<String>,
    selected_port: Option<String>,
    link: Option<LinkReader>,
    link_status: Option<Status>,

    camera: Option<FramePump>,
    camera_feed: CameraFeed,
    camera_status: Option<Status>,
}

impl Application {
    pub fn new(ctx: &Context, settings: Settings) -> Self {
        let mut app = Self {
            telemetry: Arc::new(TelemetryState::new()),

            ports: osprey_link::available_ports(),
            selected_port: None,
            link: None,
            link_status: None,

            camera: None,
            camera_feed: CameraFeed::default(),
            camera_status: None,

            settings,
        };

        if let Some(port) = app.settings.port.clone() {
            app.connect(ctx, port);
        }

        if let Some(index) = app.settings.camera {
            app.open_camera(ctx, index);
        }

        app
    }

    fn connect(&mut self, ctx: &Context, port: String) {
        // The previous reader must release its device before anything is reopened.
        self.disconnect();
        self.telemetry.clear();

        let repaint = {
            let ctx = ctx.clone();
            move || ctx.request_repaint()
        };

        match LinkReader::open(&port, self.settings.link, Arc::clone(&self.telemetry), repaint) {
            Ok(link) => {
                self.link_status = Some(Status::Info(format!("Connected to {port}")));
                self.selected_port = Some(port);
                self.link = Some(link);
            }
            Err(err) => {
                error!(%port, %err, "failed to open serial port");

                self.link_status = Some(Status::Error(format!("{port}: {err}")));
            }
        }
    }

    fn disconnect(&mut self) {
        if let Some(mut link) = self.link.take() {
            link.stop();

            info!(port = link.port_name(), "serial port closed");
            self.link_status = Some(Status::Info(format!("Closed {}", link.port_name())));
        }

        self.selected_port = None;
    }

    fn open_camera(&mut self, ctx: &Context, index: u32) {
        let repaint = {
            let ctx = ctx.clone();
            move || ctx.request_repaint()
        };

        match FramePump::open_native(index, repaint) {
            Ok(camera) => self.camera = Some(camera),
            Err(err) => {
                warn!(index, %err, "failed to open camera");

                self.camera_status = Some(Status::Error(format!("Camera {index}: {err}")));
            }
        }
    }

    fn poll_link(&mut self) {
        let Some(link) = &self.link else {
            return;
        };

        if let Some(err) = link.take_error() {
            self.link_status = Some(Status::Error(format!("{}: {err}", link.port_name())));
            self.link = None;
            self.selected_port = None;
        }
    }

    fn poll_camera(&mut self, ctx: &Context) {
        let Some(camera) = &self.camera else {
            return;
        };

        if let Some(frame) = camera.latest_frame() {
            self.camera_feed.update(ctx, frame);
        }

        if let Some(err) = camera.take_error() {
            self.camera_status = Some(Status::Error(format!(
                "Camera {}: {err}",
                camera.device_index()
            )));
            self.camera = None;
        }
    }

    fn capture_image(&mut self) {
        let Some(frame) = self.camera_feed.frame() else {
            self.camera_status = Some(Status::Error("No frame to capture yet".into()));

            return;
        };

        self.camera_status = Some(match capture::save_frame(frame, &self.settings.capture_dir) {
            Ok(path) => {
                info!(path = %path.display(), "saved captured image");

                Status::Info(format!("Saved {}", path.display()))
            }
            Err(err) => {
                error!(?err, "failed to save captured image");

                Status::Error(format!("{err}"))
            }
        });
    }

    fn link_panel(&mut self, ui: &mut Ui) -> Option<LinkAction> {
        let mut action = None;

        ui.horizontal(|ui| {
            ui.label("Serial port");

            let mut selected = self.selected_port.clone();

            ComboBox::from_id_source("port_select")
                .selected_text(selected.as_deref().unwrap_or("Not connected"))
                .show_ui(ui, |ui| {
                    for port in &self.ports {
                        ui.selectable_value(&mut selected, Some(port.clone()), port.as_str());
                    }
                });

            if selected != self.selected_port {
                action = selected.map(LinkAction::Connect);
            }

            if ui.button("Refresh").clicked() {
                action = Some(LinkAction::RefreshPorts);
            }

            if ui
                .add_enabled(self.link.is_some(), eframe::egui::Button::new("Disconnect"))
                .clicked()
            {
                action = Some(LinkAction::Disconnect);
            }

            ui.separator();

            match self.link.as_ref().map(LinkReader::state) {
                Some(LinkState::Connected) => {
                    ui.label(RichText::new("Receiving").color(Color32::GREEN));
                }
                Some(LinkState::Disconnected | LinkState::Stopped) | None => {
                    ui.label(RichText::new("Idle").color(Color32::YELLOW));
                }
            }

            if let Some(status) = &self.link_status {
                ui.separator();
                status.show(ui);
            }

            ui.with_layout(
                eframe::egui::Layout::right_to_left(eframe::egui::Align::Center),
                |ui| flight_timer::flight_timer(ui, self.telemetry.arm_timer()),
            );
        });

        action
    }

    fn status_bar(&self, ui: &mut Ui) {
        let snapshot = self.telemetry.snapshot();

        ui.horizontal(|ui| {
            ui.monospace(format!(
                "{} fields applied, {} lines discarded",
                snapshot.applied(),
                snapshot.discarded()
            ));

            if let Some(camera) = &self.camera {
                ui.separator();
                ui.monospace(format!(
                    "camera {} {:?}, {} frames dropped",
                    camera.device_index(),
                    camera.state(),
                    camera.dropped_frames()
                ));
            }

            if let Some(status) = &self.camera_status {
                ui.separator();
                status.show(ui);
            }
        });
    }
}

impl App for Application {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.poll_link();
        self.poll_camera(ctx);

        let action = TopBottomPanel::top("link")
            .show(ctx, |ui| self.link_panel(ui))
            .inner;

        match action {
            Some(LinkAction::Connect(port)) => self.connect(ctx, port),
            Some(LinkAction::Disconnect) => self.disconnect(),
            Some(LinkAction::RefreshPorts) => self.ports = osprey_link::available_ports(),
            None => {}
        }

        TopBottomPanel::bottom("status").show(ctx, |ui| self.status_bar(ui));

        SidePanel::left("telemetry")
            .resizable(true)
            .default_width(360.0)
            .show(ctx, |ui| {
                ui.heading("Telemetry");
                ui.separator();

                telemetry_table::telemetry_table(
                    ui,
                    self.settings.link.protocol.vocabulary(),
                    &self.telemetry.snapshot(),
                );
            });

        let mut capture = false;

        CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Camera");

                let capturing = self
                    .camera
                    .as_ref()
                    .is_some_and(|camera| camera.state() == CameraState::Capturing);

                capture = ui
                    .add_enabled(capturing, eframe::egui::Button::new("Capture"))
                    .clicked();
            });
            ui.separator();

            self.camera_feed.show(ui);
        });

        if capture {
            self.capture_image();
        }

        // Keeps the flight timer and value ages ticking without new data.
        ctx.request_repaint_after(Duration::from_secs(1));
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        if let Some(mut link) = self.link.take() {
            link.stop();
        }

        if let Some(mut camera) = self.camera.take() {
            camera.stop();
        }

        info!("pipelines stopped");
    }
}
