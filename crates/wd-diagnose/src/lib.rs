pub mod detector;
pub mod fixer;
pub mod optimize;
pub mod probes;

pub use detector::IssueDetector;
pub use fixer::{Fixer, has_automatic_fix};
