mod api;
mod card;
mod controller;
mod deck;
mod form;
mod types;

pub use api::*;
pub use card::*;
pub use controller::*;
pub use deck::*;
pub use form::*;
pub use types::*;
