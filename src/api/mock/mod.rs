//! In-memory stand-ins for the parts of `gpio_cdev` the kiosk uses, so it
//! runs on machines without a GPIO chip.

mod chip;
mod line;
mod line_request_flags;
mod line_handle;

pub use chip::Chip;
pub use line::Line;
pub use line_request_flags::LineRequestFlags;
pub use line_handle::LineHandle;
