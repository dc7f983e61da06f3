pub mod player;
pub mod responses;

pub use player::*;
pub use responses::*;
