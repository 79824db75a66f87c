pub mod app;
pub mod audio;
pub mod config;
pub mod field;
pub mod frame_loop;
pub mod hue;
pub mod logging;
pub mod reactive;
pub mod render;
pub mod scene;
pub mod surface;
pub mod terminal;
pub mod tuning;
