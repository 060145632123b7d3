//! Device operations.
//!
//! Unicast management requests and paged flashing over the UDP transport,
//! the per-device HTTP configuration session, and the watchdog kicker.

pub mod flash;
pub mod ops;
pub mod session;
pub mod watchdog;

pub use flash::{flash, flash_file, FlashProgress, NoopProgress};
pub use ops::{kick_watchdog, ping, reset, set_netconf};
pub use session::{ConfigSession, SessionConfig};
pub use watchdog::{KickerSettings, WatchdogKicker, WatchdogListener, WatchdogState};
