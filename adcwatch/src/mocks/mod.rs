//! Fake collaborators for tests: a scriptable channel and a recording
//! callback, substituting the hardware boundary and the external program.

pub mod callback;
pub mod channel;
