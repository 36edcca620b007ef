//! Holiday calendars.

pub mod target;

pub use target::Target;
