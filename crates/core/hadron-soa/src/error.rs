//! Error type for fallible [`SoaArray`](crate::SoaArray) operations.

/// Errors that can occur when operating on a [`SoaArray`](crate::SoaArray).
///
/// Every fallible operation leaves the container unchanged when it returns
/// an error, so retrying with the same arguments fails the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoaError {
    /// The operation would exceed the fixed capacity of the `SoaArray`.
    CapacityExceeded,
}

impl core::fmt::Display for SoaError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::CapacityExceeded => f.write_str("capacity exceeded"),
        }
    }
}

impl core::error::Error for SoaError {}

#[cfg(all(test, feature = "std"))]
mod tests {
    extern crate std;
    use std::string::ToString;

    use super::*;

    #[test]
    fn display_message() {
        assert_eq!(SoaError::CapacityExceeded.to_string(), "capacity exceeded");
    }
}
