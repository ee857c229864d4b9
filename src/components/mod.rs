pub mod action_panel;
pub mod app;
pub mod camera_controls;
pub mod connection_banner;
pub mod countdown;
pub mod game_over_overlay;
pub mod game_view;
pub mod minimap;
pub mod resource_bar;
pub mod stats_panel;
pub mod tile_info_panel;
pub mod toasts;
