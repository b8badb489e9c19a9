//! Command implementations.

mod info;
mod push;
mod sign;
mod validate;

pub use info::run_info;
pub use push::run_push;
pub use sign::run_sign;
pub use validate::run_validate;
