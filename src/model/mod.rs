pub mod user;
pub mod waste;
