//! sheetlens formula
//!
//! Lexical classification of spreadsheet formula text. Nothing here parses
//! or evaluates the expression grammar; every signal is a regex count over
//! the raw string.
//!
//! - [`classify`]: leading function tag, formula family and complexity score
//! - [`sheet_qualifiers`]: sheet names referenced via `Sheet!` / `'Sheet Name'!`
//! - [`families`]: function-name families used by downstream detectors
//!
//! # Example
//!
//! ```rust
//! use sheetlens_formula::classify;
//!
//! let class = classify("=VLOOKUP(A1,'Products'!A:C,2,FALSE)");
//! assert_eq!(class.function_tag, "VLOOKUP");
//! assert!(class.complexity >= 3);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod category;
pub mod classify;
pub mod families;
pub mod references;

pub use category::detect_category;
pub use classify::{
    classify, complexity_score, is_formula, leading_function, record_for, Classification,
    CUSTOM_TAG, MAX_COMPLEXITY, MIN_COMPLEXITY,
};
pub use references::sheet_qualifiers;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
