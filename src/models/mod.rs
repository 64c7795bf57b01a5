pub mod pin;
pub mod user;

pub use pin::*;
pub use user::*;
