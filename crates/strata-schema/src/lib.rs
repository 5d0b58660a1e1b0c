//! Schema-directed value handling for strata
//!
//! - [`keypath`]: canonical dot paths and their store-path spelling
//! - [`adapter`]: the [`SchemaAdapter`] capability trait and [`SchemaKind`]
//!   selection
//! - [`json_schema`] / [`shorthand`]: the two supported schema libraries
//! - [`codec`]: provider key-value maps to typed trees and back
//!
//! Raw strings only become typed values through a schema: the same `"5432"`
//! is an integer under an integer field and a string under a string field.

pub mod adapter;
pub mod canonical;
pub mod codec;
pub mod error;
pub mod json_schema;
pub mod keypath;
pub mod parse;
pub mod shorthand;
pub mod types;

pub use adapter::{LeafPath, ParseMode, ResolvedSchemaNode, SchemaAdapter, SchemaKind};
pub use codec::{ParsedKv, flatten, insert_path, parse_provider_kv, serialize_tree, unflatten};
pub use error::{Result, ValidationError};
pub use json_schema::JsonSchemaAdapter;
pub use shorthand::ShorthandAdapter;
pub use types::{JsonType, TypeSet};
