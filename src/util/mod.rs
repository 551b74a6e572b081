pub mod glob;
pub mod sequence;
pub mod status;

pub use sequence::ByteSequence;
pub use status::{Code, Result, Status};
