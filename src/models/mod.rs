pub mod desired;
pub mod observed;
pub mod synthetic;

pub use desired::*;
pub use observed::*;
pub use synthetic::*;
