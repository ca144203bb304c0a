//! Rendering from async code.
//!
//! A [`Map`](crate::Map) must stay on the thread that created it, so requests are
//! forwarded to a dedicated worker thread that owns one.

mod single_threaded;
pub use single_threaded::*;
