//! Automation surface abstraction layer
//!
//! The exporter only talks to the list through [`AutomationSurface`]. Concrete
//! implementations live in [`crate::adapters::webdriver`] and
//! [`crate::adapters::memory`].

pub mod factory;
pub mod traits;

pub use factory::create_surface;
pub use traits::{AutomationSurface, ElementHandle, ScrollBehavior};
