pub mod catalog;
pub mod inquiry;
pub mod model;
pub mod session;
pub mod state;
pub mod view;

pub use state::Storefront;
