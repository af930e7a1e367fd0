pub mod block;

pub use block::{Block, Cell, Formatting, HeadingLevel, RichText, Rgb, Run, Table};
