pub mod location;
pub mod pitch;
pub mod shot;
pub mod status;

pub use location::Location;
pub use pitch::{is_float_close, LengthDirection, Pitch, WidthDirection, FLOAT_TOLERANCE};
pub use shot::{RelatedPlayer, ShotDetail};
pub use status::{BodyPart, EventType, Period, ShotPattern, ShotResult};
