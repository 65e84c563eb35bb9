pub mod dashboard;
pub mod game_field;
pub mod keyboard_diagram;
pub mod lesson_panel;
pub mod menu;
pub mod progress_bar;
