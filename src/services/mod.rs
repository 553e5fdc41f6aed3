pub mod auth;
pub mod room;
pub mod shape;
