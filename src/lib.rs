pub mod anim;
pub mod app;
pub mod gesture;
pub mod logging;
pub mod realm;
pub mod settings;
pub mod store;
pub mod theme;
pub mod types;
pub mod ui;
