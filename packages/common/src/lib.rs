pub mod event;
pub mod observable;

pub use event::*;
pub use observable::*;
