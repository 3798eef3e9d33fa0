//! fstproc-core — shared primitives for the FST stream processor.
//!
//! Provides:
//! - [`varint`]: the self-delimiting multibyte integer codec (C1) and the
//!   length-prefixed UTF-16 string codec built on top of it.
//! - [`CoreError`] / [`CoreResult`]: the low-level I/O and codec error type
//!   shared by every higher layer (alphabet, transducer, container).
//!
//! This crate deliberately has no knowledge of alphabets, transducers, or
//! stream modes — it is the encoding substrate the rest of the workspace is
//! built on.

#![deny(missing_docs)]

mod error;
pub mod varint;

pub use error::{CoreError, CoreResult};

/// Convenience re-exports for crates consuming the codec.
pub mod prelude {
    pub use crate::varint::{read_u16string, read_uint, write_u16string, write_uint};
    pub use crate::{CoreError, CoreResult};
}
