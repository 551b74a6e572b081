pub mod cursor;
pub mod engine;

pub use cursor::parse_cursor;
pub use engine::{DEFAULT_COUNT, ScanOptions, ScanResult, scan_keys};
