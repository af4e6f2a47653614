//! Named, typed parameters of described constructors.

use std::fmt;

use crate::{metadata::typesystem::TypeRef, Result};

/// A validated constructor parameter.
///
/// The name is non-blank; uniqueness within a parameter list is not enforced. Immutable once
/// created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    name: String,
    ty: TypeRef,
}

impl ParameterDescriptor {
    /// Create a parameter.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] if `name` is empty or whitespace only.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dotforge::{builders::ParameterDescriptor, metadata::typesystem::TypeRef};
    ///
    /// let id = ParameterDescriptor::new("id", TypeRef::new("System.Int32"))?;
    /// assert_eq!(id.name(), "id");
    /// assert!(ParameterDescriptor::new("  ", TypeRef::new("System.Int32")).is_err());
    /// # Ok::<(), dotforge::Error>(())
    /// ```
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(invalid_argument!("parameter name must not be blank"));
        }

        Ok(ParameterDescriptor { name, ty })
    }

    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter type.
    #[must_use]
    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }
}

impl fmt::Display for ParameterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty, self.name)
    }
}
