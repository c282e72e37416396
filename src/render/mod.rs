//! Frame rendering: bitmap font, pixel frames and SVG output

pub mod font;
pub mod frame;
pub mod svg;

pub use frame::{frame_size, render_frame, Frame};
pub use svg::{render_svg, render_thumbnail};
