mod category;
mod family_member;
mod patch;
mod task;
pub mod validate;

pub use category::*;
pub use family_member::*;
pub use patch::*;
pub use task::*;
