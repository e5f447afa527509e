//! Testing utilities and harness for Arbor

pub mod assertions;
pub mod testing;

pub use assertions::*;
pub use testing::*;

pub mod prelude {
    pub use crate::assertions::*;
    pub use crate::testing::*;
    pub use arbor_core::{component, h, Event, Modifiers, MutationStats, Node, Props, Rendered};
    pub use arbor_router::{link, RouteConfig, RouteProps, RouterOptions};
}
