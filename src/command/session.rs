/// Per-connection state. Owned exclusively by one connection, never shared.
///
/// The stored cursor is what makes multi-call scans resumable: a SCAN whose
/// cursor does not match the last value issued here restarts from zero.
#[derive(Debug, Clone, Default)]
pub struct Session {
    scan_cursor: u64,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    pub fn scan_cursor(&self) -> u64 {
        self.scan_cursor
    }

    pub fn set_scan_cursor(&mut self, cursor: u64) {
        self.scan_cursor = cursor;
    }
}
