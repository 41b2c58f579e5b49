//! Built-in flows.
//!
//! - [`live::LiveFlow`] simulates residents coming and going.
//! - [`manual::ManualFlow`] blanks the building and leaves it to the operator.
//! - [`replay::ReplayFlow`] loops over a recorded light sequence.
//! - [`validate::ValidateFlow`] lights every pin alone to check the wiring.

pub mod live;
pub mod manual;
pub mod replay;
pub mod validate;

pub use live::{LiveFlow, LiveOptions};
pub use manual::ManualFlow;
pub use replay::{ReplayFlow, ReplayOptions};
pub use validate::{ValidateFlow, ValidateOptions};
