//! Binding model and validation.
//!
//! A binding describes how the value of one target schema node is produced:
//! a literal, a copy of a source node, or a template over nested bindings.

pub mod builder;
pub mod error;
pub mod executable;
pub mod kind;
pub mod legal;
pub mod model;
pub mod next;
pub mod transformation;

pub use builder::build;
pub use error::BindingError;
pub use executable::ExecutableBinding;
pub use kind::BindingKind;
pub use legal::legal_kinds;
pub use model::{Binding, BindingSpec, BindingUpdate, NewBinding};
pub use next::{resolve_next_to_bind, NextToBind, NextToBindResolution};
pub use transformation::{SchemaTransformation, Transformation};
