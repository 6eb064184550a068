//! Convenience re-exports for consumers of the control stages.

pub use crate::encoder::{decode, phase_code, EncoderConfig, QUAD_DELTA};
pub use crate::servo::{servo_command, ServoCommand, ServoError, ServoGains};
pub use crate::tacho::{TachoConfig, TachoError, VelocityFilter};
