//! Request middleware shared by every service process.

pub mod trace;

pub use trace::Trace;
