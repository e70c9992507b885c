pub mod canvas;
pub mod generation;
pub mod snapshot;

pub use canvas::*;
pub use generation::*;
pub use snapshot::*;
