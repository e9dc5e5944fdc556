pub mod issue;
pub mod model;
pub mod report;
pub mod signal;

pub use issue::*;
pub use model::*;
pub use report::*;
pub use signal::*;
