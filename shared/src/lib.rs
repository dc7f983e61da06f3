pub mod limits;
pub mod models;
pub mod progression;
