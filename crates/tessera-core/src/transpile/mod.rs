//! Cell transpilation.
//!
//! This module provides:
//! - A JavaScript lexer tuned for cell sources
//! - Scope analysis that finds each cell's declarations and free references
//! - Import discovery, specifier normalization and static import rewriting
//! - Normalization of script and markup cells into procedure bodies

mod cell;
mod globals;
mod imports;
mod lexer;
mod scope;

pub use cell::{CellShape, TranspiledCell, VIEW_PREFIX, parameter_name, transpile};
pub use globals::is_builtin;
pub use imports::{PackageSpecifier, SpecifierKind, classify_specifier};
pub use lexer::{LexError, Token, TokenKind, tokenize};
pub use scope::{ScopeAnalysis, analyze};
