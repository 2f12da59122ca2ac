//! Extract, locate, and safely rewrite Python definitions by qualified name.
//!
//! Every operation re-walks the tree, so answers always reflect the files on
//! disk. Nothing is cached or persisted between calls.

pub mod config;
pub mod diagnostics;
pub mod docstring;
pub mod error;
pub mod extractor;
pub mod grammar;
pub mod index;
pub mod locator;
pub mod mutator;
pub mod signature;
pub mod tool;
pub mod types;

pub use config::Config;
pub use error::Error;
pub use extractor::extract;
pub use index::{find, qualify};
pub use locator::{locate_definition_source, locate_module_source};
pub use mutator::replace_definition;
pub use types::{ClassMember, DefinitionKind, DefinitionRecord, EditOutcome, MethodRecord, SourceLookup};
