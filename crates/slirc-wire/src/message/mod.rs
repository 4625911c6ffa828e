//! IRC message types, parsing and rendering.

mod parse;
mod serialize;
mod types;

pub use self::parse::{parse, try_parse, MAX_MIDDLE_PARAMS};
pub use self::serialize::render;
pub use self::types::{RawIrcMsg, Tag};
