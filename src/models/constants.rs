/// Consecutive connection-level failures that force a process restart.
/// Browser/session corruption is assumed cheaper to fix by a full restart
/// than by in-process recovery, so the threshold is deliberately low.
pub const CONNECTION_FAILURE_THRESHOLD: u32 = 2;

/// Consecutive generic failures that force a process restart, regardless
/// of how many retry attempts remain in the current cycle.
pub const GENERIC_FAILURE_THRESHOLD: u32 = 3;

/// Default minutes between polling cycles.
pub const DEFAULT_CHECK_INTERVAL_MINUTES: u64 = 3;

/// Default maximum fetch attempts per cycle.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay in seconds for retry backoff.
pub const DEFAULT_RETRY_DELAY_SECONDS: u64 = 5;

/// Default hours of uptime before the preventive restart fires.
pub const DEFAULT_MAX_UPTIME_HOURS: u64 = 6;

/// Granularity at which interruptible sleeps poll the stop flag.
/// An external stop request is honored within roughly this long.
pub const STOP_POLL_INTERVAL_SECS: u64 = 1;
