pub mod countdown;
pub mod source;
pub mod text;

pub use countdown::*;
pub use source::*;
pub use text::*;
