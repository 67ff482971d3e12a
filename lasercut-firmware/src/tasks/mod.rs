//! Embassy async tasks
//!
//! Each task runs independently and communicates through the statics in
//! [`crate::channels`] or the shared job client.

pub mod buttons;
pub mod connecting;
pub mod display;
pub mod link;

pub use buttons::{run_button_task, test_button_task};
pub use connecting::connecting_task;
pub use display::display_task;
pub use link::link_task;
