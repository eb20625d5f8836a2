//! Shared helpers: template interpolation, tool-name normalization and
//! colored console output.

pub mod printer;
pub mod string_utils;

pub use printer::{Printer, PrinterColor};
pub use string_utils::{interpolate, tool_key, TemplateError};
