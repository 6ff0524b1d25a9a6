pub mod session_stats;

pub use session_stats::{PostureCounts, SessionStats};
