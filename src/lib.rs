pub mod command;
pub mod data;
pub mod import_export;
pub mod keyspace;
pub mod scan;
pub mod util;

pub use command::{Command, CommandDispatcher, Reply, Session};
pub use data::{RedisHash, RedisString, RedisValue, StringDelta};
pub use keyspace::{DeltaObserver, Keyspace};
pub use scan::{ScanOptions, ScanResult};
pub use util::{ByteSequence, Code, Result, Status};
