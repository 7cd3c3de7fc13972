pub mod app;
pub mod camera_controls;
pub mod controls_panel;
pub mod nav_view;
pub mod status_bar;
