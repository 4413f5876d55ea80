pub mod evaluation;
pub mod session;
pub mod user;

pub use evaluation::*;
pub use session::*;
pub use user::*;
