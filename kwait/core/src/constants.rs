use std::time::Duration;

/// Default upper bound for a whole run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Default pause between two checks of the same condition.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Page size used when only the presence of any instance matters.
pub const PRESENCE_LIST_LIMIT: u32 = 1;
