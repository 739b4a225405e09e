#![no_std]

mod error;

pub mod bus;
pub mod commands;
pub mod config;
pub mod device;
pub mod interface;
mod log;
pub mod params;

#[cfg(test)]
mod testing;

pub use crate::device::Ee89x;
pub use crate::error::{Error, Result};
