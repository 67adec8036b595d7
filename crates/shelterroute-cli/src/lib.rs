//! Shelterroute CLI library.
//!
//! Argument parsing helpers and output formatting shared by the `shelterroute`
//! binary. Kept in a library target so the formatters can be unit tested.

pub mod coords;
pub mod output;
