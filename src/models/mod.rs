mod event;
mod event_type;
mod parameter;
mod parameters;
mod payload;

pub use event::*;
pub use event_type::*;
pub use parameter::*;
pub use parameters::*;
pub use payload::*;
