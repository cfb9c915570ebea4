pub mod fields;
pub mod game;
pub mod market;

pub use game::*;
pub use market::*;
