pub mod health;
pub mod players;
pub mod stream;

pub use health::*;
pub use players::*;
pub use stream::*;
