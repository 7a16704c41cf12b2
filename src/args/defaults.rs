/// Destination used for both sending and listening when none is configured.
pub(crate) const DEFAULT_DESTINATION: &str = "queue://mqstress.load";

/// Config filenames checked in the working directory when `--config` is absent.
pub(crate) const DEFAULT_CONFIG_FILES: [&str; 2] = ["mqstress.toml", "mqstress.json"];

/// Pause after the last listener attaches, before the first sender starts.
pub(super) const DEFAULT_LISTENER_SETTLE_MS: &str = "2000";

/// Interval between progress lines of the control loop.
pub(super) const DEFAULT_PROGRESS_INTERVAL_MS: &str = "1000";

/// Bounded depth of an in-memory queue destination.
pub(super) const DEFAULT_MEMORY_QUEUE_CAPACITY: &str = "10000";
