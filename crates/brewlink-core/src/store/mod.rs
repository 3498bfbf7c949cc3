// ── Reactive state store ──
//
// Slice storage with push-based change notification.

mod apply;
mod cell;
mod data;
pub mod rules;

pub use cell::{Provenance, SliceCell, Tagged};
pub use data::Store;
