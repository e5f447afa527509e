//! Log targets. Enable per area, e.g. `RUST_LOG=arbor::patch=trace`.

/// Render passes, boundary catches, commit phase.
pub const RUNTIME: &str = "arbor";
/// Host mutations and prop writes.
pub const PATCH: &str = "arbor::patch";
/// State and reducer updates, effect runs, slot drift.
pub const HOOKS: &str = "arbor::hooks";
/// Memoized component skips.
pub const MEMO: &str = "arbor::memo";
/// Navigation, guard outcomes, route matching.
pub const ROUTER: &str = "arbor::router";
