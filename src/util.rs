//! Shared utilities used across query builders and response parsers.

pub mod encoding;
pub mod named_list;
