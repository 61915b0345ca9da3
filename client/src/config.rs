// Per-attempt timeout for `broadcast_tx_commit` when none is specified
pub const DEFAULT_COMMIT_TIMEOUT_MILLIS: u64 = 5000;

// How many times a commit is retried after a nonce conflict before giving up
pub const DEFAULT_NONCE_RETRY_LIMIT: u32 = 5;

// Fixed (non-exponential) delay between nonce-conflict retries
pub const NONCE_RETRY_DELAY_MILLIS: u64 = 200;

// Signature of a retryable nonce conflict reported by the pre-check stage.
// Both the code and the log text must match; the code alone is shared with
// other admission failures.
pub const NONCE_MISMATCH_CODE: u32 = 1;
pub const NONCE_MISMATCH_LOG: &str = "sequence number does not match";
