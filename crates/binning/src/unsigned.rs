//! Fixed-width unsigned integer wrappers.
//!
//! Counters that end up in fixed-width output fields are range checked once,
//! when the wrapper is constructed, so an oversized value never reaches a
//! feature vector.

use crate::error::{BinningError, Result};
use serde::{Deserialize, Serialize};

macro_rules! unsigned_wrapper {
    ($(#[$meta:meta])* $name:ident, $repr:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
        #[serde(try_from = "i64", into = "i64")]
        pub struct $name($repr);

        impl $name {
            /// Smallest representable value.
            pub const MIN_VALUE: i64 = 0;
            /// Largest representable value.
            pub const MAX_VALUE: i64 = <$repr>::MAX as i64;

            /// Wrap `value`, failing if it is outside the representable range.
            pub fn new(value: i64) -> Result<Self> {
                if !(Self::MIN_VALUE..=Self::MAX_VALUE).contains(&value) {
                    return Err(BinningError::ValueOutOfRange {
                        value,
                        min: Self::MIN_VALUE,
                        max: Self::MAX_VALUE,
                    });
                }
                Ok(Self(value as $repr))
            }

            /// The wrapped value.
            pub fn get(self) -> $repr {
                self.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = BinningError;

            fn try_from(value: i64) -> Result<Self> {
                Self::new(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> i64 {
                value.0 as i64
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

unsigned_wrapper!(
    /// An 8-bit unsigned value.
    UnsignedByte,
    u8
);

unsigned_wrapper!(
    /// A 16-bit unsigned value.
    UnsignedShort,
    u16
);

unsigned_wrapper!(
    /// A 32-bit unsigned value, used for observation and pass counters.
    UnsignedInt,
    u32
);
