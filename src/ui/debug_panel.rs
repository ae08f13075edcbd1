use crate::math::Colour;
use crate::traits::{ColourControl, DebugPanel};

/// Debug panel drawn as an egui window
pub struct EguiDebugPanel {
    title: String,
    open: bool,
    controls: Vec<ColourControl>,
}

impl EguiDebugPanel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            open: false,
            controls: Vec::new(),
        }
    }

    pub fn controls(&self) -> &[ColourControl] {
        &self.controls
    }

    pub fn control_mut(&mut self, key: &str) -> Option<&mut ColourControl> {
        self.controls.iter_mut().find(|c| c.key() == key)
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Draw the panel; edits are dispatched to observers before returning.
    pub fn show(&mut self, ctx: &egui::Context) {
        if !self.open {
            egui::Area::new(egui::Id::new("debug_panel_toggle"))
                .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-10.0, 10.0))
                .show(ctx, |ui| {
                    if ui.button("Open Controls").clicked() {
                        self.open = true;
                    }
                });
            return;
        }

        let mut open = self.open;
        egui::Window::new(self.title.as_str())
            .open(&mut open)
            .resizable(false)
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-10.0, 10.0))
            .show(ctx, |ui| {
                egui::Grid::new("debug_panel_controls")
                    .num_columns(2)
                    .spacing([12.0, 6.0])
                    .show(ui, |ui| {
                        for control in &mut self.controls {
                            ui.label(control.key());
                            let mut rgb = control.value().to_rgb();
                            if ui.color_edit_button_srgb(&mut rgb).changed() {
                                control.set_value(Colour::from_srgb_array(rgb));
                            }
                            ui.monospace(control.value().to_string());
                            ui.end_row();
                        }
                    });
            });
        self.open = open;
    }
}

impl Default for EguiDebugPanel {
    fn default() -> Self {
        Self::new("Controls")
    }
}

impl DebugPanel for EguiDebugPanel {
    fn add_color(&mut self, key: &str, initial: Colour) -> &mut ColourControl {
        self.controls.push(ColourControl::new(key, initial));
        let last = self.controls.len() - 1;
        &mut self.controls[last]
    }

    fn open(&mut self) {
        self.open = true;
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
