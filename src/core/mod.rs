//! Pack codec internals

pub mod error;
pub mod header;
pub mod inspect;
pub mod io;
pub mod pack;
pub mod reader;
pub mod repack;
pub mod writer;

pub use pack::{DataPack, ResourceId};
