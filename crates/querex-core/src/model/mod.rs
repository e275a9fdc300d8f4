pub mod reflect;
pub mod value;

pub use reflect::{FieldType, PropertyInfo, PropertyValue, Reflect, TypeInfo, TypeKind};
pub use value::{NullOrdering, Value};
