// Library target shared by the binary and the integration tests in tests/.
pub mod app;
pub mod config;
pub mod engine;
pub mod event;
pub mod keyboard;
pub mod session;
pub mod store;
pub mod ui;
