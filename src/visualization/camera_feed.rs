use eframe::{
    egui::{ColorImage, Context, Image, RichText, TextureHandle, TextureOptions, Ui},
    epaint::Color32,
};
use osprey_camera::Frame;

/// Latest camera frame together with the texture it is drawn from.
#[derive(Default)]
pub struct CameraFeed {
    frame: Option<Frame>,
    texture: Option<TextureHandle>,
}

impl CameraFeed {
    pub fn update(&mut self, ctx: &Context, frame: Frame) {
        let image = ColorImage::from_rgb(
            [frame.width as usize, frame.height as usize],
            &frame.rgb,
        );

        match &mut self.texture {
            Some(texture) => texture.set(image, TextureOptions::LINEAR),
            None => {
                self.texture = Some(ctx.load_texture("camera_feed", image, TextureOptions::LINEAR))
            }
        }

        self.frame = Some(frame);
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn show(&self, ui: &mut Ui) {
        let (Some(texture), Some(frame)) = (&self.texture, &self.frame) else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No camera feed").color(Color32::GRAY));
            });

            return;
        };

        ui.monospace(format!(
            "{}x{} frame #{} ({:.0} ms old)",
            frame.width,
            frame.height,
            frame.sequence,
            frame.captured_at.elapsed().as_secs_f32() * 1000.0
        ));

        ui.add(Image::new((texture.id(), texture.size_vec2())).shrink_to_fit());
    }
}
