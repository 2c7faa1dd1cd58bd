mod bitmap;
mod bits;
mod error;
mod extract;
mod info;
pub mod metadata;
mod reader;

pub use crate::{error::*, extract::*, info::*, reader::*};
