//! PATCH support: operations, path expressions and the engine applying them.
//!
//! - [`operation`] - the `add`/`remove`/`replace` operation model
//! - [`path`] - parser for `attr.sub`, `urn:...:attr` and `attr[sub eq "v"].sub` paths
//! - [`engine`] - [`PatchEngine`], applying operation lists to resources

pub mod engine;
pub mod operation;
pub mod path;

pub use engine::PatchEngine;
pub use operation::{PatchOp, PatchOperation};
pub use path::{AttributePath, FilterExpression, FilterOperator, FilterValue, ValueFilter};
