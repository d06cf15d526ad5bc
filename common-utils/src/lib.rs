//! # Common utils
//!
//! This library provides functionality needed in more than one of our reservation synthesiser crates.

pub mod date_utils;
pub mod parsing_utils;
