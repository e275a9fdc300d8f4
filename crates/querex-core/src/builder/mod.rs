//! Expression builders
//!
//! `ExpressionBuilder<E, K>` is generic over the entity and the key type of
//! the resolved path. `builder_for` bridges a runtime `FieldType` into that
//! generic slot.

pub mod dispatch;
pub mod key_type;
pub mod typed;

pub use dispatch::{builder_for, ErasedBuilder};
pub use key_type::KeyType;
pub use typed::{ExpressionBuilder, TypedKey, PARAMETER_NAME};
