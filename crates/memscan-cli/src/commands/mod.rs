//! CLI command implementations.
//!
//! This module contains the implementation of each CLI command.

pub mod find;
pub mod hex_utils;
pub mod hexdump;
pub mod maps;
pub mod offset;
pub mod replace;
pub mod scan;
pub mod select;
pub mod strings;
