
/// Trace replay and prefetch issue.
pub mod simulator;
