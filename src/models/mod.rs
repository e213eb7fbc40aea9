pub mod common;
pub mod image;
pub mod request;
pub mod style;

pub use common::*;
pub use image::*;
pub use request::*;
pub use style::*;
