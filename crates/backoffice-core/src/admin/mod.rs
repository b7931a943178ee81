// ── Admin list/editor ──
//
// `state` holds the pure reducer, `controller` drives it against a
// `ResourceService`, `notice` is the transient feedback it produces.

mod controller;
mod notice;
mod state;

pub use controller::AdminController;
pub use notice::Notice;
pub use state::{AdminListState, Transition, reduce};
