pub use atelier_types::prelude::*;

// vim: ts=4
