pub mod catches;
pub mod settings;
pub mod toolbar;

use crate::scene::Scene;

/// Tracks which UI panels are open and any one-shot requests from them.
pub struct UiState {
    pub show_catches: bool,
    pub show_settings: bool,
    pub step_requested: bool,
    pub rebuild_requested: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            show_catches: true,
            show_settings: false,
            step_requested: false,
            rebuild_requested: false,
        }
    }
}

/// Draw all egui UI panels. Returns true if egui wants the keyboard this frame.
pub fn draw_ui(scene: &mut Scene, ui_state: &mut UiState) -> bool {
    let mut wants_keyboard = false;
    egui_macroquad::ui(|ctx| {
        toolbar::draw_toolbar(ctx, scene, ui_state);

        if ui_state.show_catches {
            catches::draw_catches(ctx, scene);
        }

        if ui_state.show_settings {
            settings::draw_settings(ctx, scene, ui_state);
        }

        wants_keyboard = ctx.wants_keyboard_input();
    });

    egui_macroquad::draw();
    wants_keyboard
}
