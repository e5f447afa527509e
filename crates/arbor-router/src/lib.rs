#![doc = r"Client-side router for Arbor: route patterns, nested outlets, history and guarded navigation."]

mod error;
pub mod history;
pub mod pattern;
mod route;
mod router;

pub use error::{RouteError, RouterError};
pub use history::{History, MemoryHistory};
pub use pattern::{join_paths, normalize_path, Params, RoutePattern};
pub use route::{link, ActiveRoute, RouteConfig, RouteProps};
pub use router::{Proceed, Router, RouterOptions};

#[cfg(test)]
#[path = "tests/pattern_tests.rs"]
mod pattern_tests;

#[cfg(test)]
#[path = "tests/router_tests.rs"]
mod router_tests;
