pub mod background;
pub mod fs_ops;
pub mod image_io;
pub mod resize;
pub mod rounded;

pub use background::{BackgroundOptions, remove_background_file};
pub use resize::{ResizeOptions, ResizeReport, resize_icons};
pub use rounded::{RoundOptions, make_rounded};
