//! JavaScript and TypeScript import sorting engine.
//!
//! The engine reorders the import block at the top of a module according to
//! an [`ImportOrder`](group::ImportOrder) policy, merges duplicate imports,
//! and carries every comment along with the code it describes.
//!
//! ## Modules
//!
//! - [`parser`], [`ast`]: import-region parser and syntax tree
//! - [`extract`], [`model`]: engine statements with stable node keys
//! - [`classify`]: sortable and unsortable chunks
//! - [`merge`], [`explode`]: duplicate merging and type splitting
//! - [`group`]: group assignment and ordering
//! - [`comments`]: comment reattachment
//! - [`render`]: code generation
//! - [`pipeline`]: [`sort_imports`], the front door
//!
//! ## Example
//!
//! ```
//! use tugsort_js::{sort_imports, SortOptions};
//!
//! let source = "import b from 'b';\nimport fs from 'fs';\nimport a from './a';\n";
//! let outcome = sort_imports(source, &SortOptions::default()).unwrap();
//! assert_eq!(
//!     outcome.text,
//!     "import fs from 'fs';\nimport b from 'b';\n\nimport a from './a';\n"
//! );
//! ```

pub mod ast;
pub mod classify;
pub mod comments;
pub mod error;
pub mod explode;
pub mod extract;
pub mod group;
pub mod merge;
pub mod model;
pub mod options;
pub mod parser;
pub mod patterns;
pub mod pipeline;
pub mod render;

pub use ast::Dialect;
pub use error::{SortError, SortResult};
pub use options::SortOptions;
pub use pipeline::{sort_imports, sort_imports_or_original, SortOutcome};
