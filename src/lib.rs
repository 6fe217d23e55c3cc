#![forbid(unsafe_code)]

pub mod app;
pub mod core;
pub mod store;
pub mod transport;

pub use app::run;
