//! Conversion of engine records into the owned model in [`crate::core`].
//!
//! Every function here copies what it needs; nothing returned keeps a
//! pointer into engine memory.

pub(crate) mod metadata;
pub(crate) mod packages;
pub(crate) mod types;
