pub mod crop;
pub mod irrigation;
pub mod location;
pub mod weather;

pub use crop::*;
pub use irrigation::*;
pub use location::*;
pub use weather::*;
