#![doc = include_str!("../README.md")]

mod error;

pub mod catalog;
pub mod chain;
pub mod missions;
pub mod product;
pub mod record;
pub mod stream;

pub use error::{Error, Result};
