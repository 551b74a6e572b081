pub mod delta;
pub mod hash;
pub mod string;
pub mod value;

pub use delta::StringDelta;
pub use hash::RedisHash;
pub use string::RedisString;
pub use value::RedisValue;
