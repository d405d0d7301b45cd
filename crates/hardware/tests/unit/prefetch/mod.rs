/// Stride detector state machine.
pub mod stride;
