pub mod cli;
pub mod config;
mod logging;
mod runtime;

pub use cli::Args;
pub use config::Settings;
pub use runtime::run;
