pub mod png;
pub mod raw;

pub use png::{load_image, save_png};
pub use raw::{load_raw, save_raw};
