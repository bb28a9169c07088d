//! Owned result model.
//!
//! Nothing in here points into engine memory; values stay usable after the
//! session that produced them is closed.

pub mod compiler;
pub mod go_type;
pub mod package;
pub mod type_graph;

pub use compiler::CompilerVersion;
pub use go_type::{ChanDir, GoType, StructField, TypeDetail, TypeId, TypeKind, TypeMethod};
pub use package::{Function, Method, Package, PackageClass};
pub use type_graph::{TypeGraph, TypeView};
