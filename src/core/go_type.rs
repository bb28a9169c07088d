//! Go type descriptors.
//!
//! A [`GoType`] references other types through [`TypeId`]s into the
//! [`TypeGraph`](crate::core::type_graph::TypeGraph) that owns it, so
//! self-referential and mutually recursive types are plain index cycles.
//! Kind-specific data lives in [`TypeDetail`]; a field that does not apply to
//! a kind has nowhere to be stored.

use std::fmt;

use serde::{Deserialize, Serialize};

#[cfg(feature = "python-ext")]
use pyo3::prelude::*;

/// Go type kinds, numbered as the engine reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "python-ext", pyclass(eq, eq_int))]
#[repr(u32)]
pub enum TypeKind {
    Invalid = 0,
    Bool = 1,
    Int = 2,
    Int8 = 3,
    Int16 = 4,
    Int32 = 5,
    Int64 = 6,
    Uint = 7,
    Uint8 = 8,
    Uint16 = 9,
    Uint32 = 10,
    Uint64 = 11,
    Uintptr = 12,
    Float32 = 13,
    Float64 = 14,
    Complex64 = 15,
    Complex128 = 16,
    Array = 17,
    Chan = 18,
    Func = 19,
    Interface = 20,
    Map = 21,
    Ptr = 22,
    Slice = 23,
    String = 24,
    Struct = 25,
    UnsafePointer = 26,
    /// End marker of the engine's kind table
    KindEnd = 27,
}

impl TypeKind {
    /// Map an engine kind value, `None` if it is outside the table.
    pub fn from_raw(value: u32) -> Option<Self> {
        use TypeKind::*;
        let kind = match value {
            0 => Invalid,
            1 => Bool,
            2 => Int,
            3 => Int8,
            4 => Int16,
            5 => Int32,
            6 => Int64,
            7 => Uint,
            8 => Uint8,
            9 => Uint16,
            10 => Uint32,
            11 => Uint64,
            12 => Uintptr,
            13 => Float32,
            14 => Float64,
            15 => Complex64,
            16 => Complex128,
            17 => Array,
            18 => Chan,
            19 => Func,
            20 => Interface,
            21 => Map,
            22 => Ptr,
            23 => Slice,
            24 => String,
            25 => Struct,
            26 => UnsafePointer,
            27 => KindEnd,
            _ => return None,
        };
        Some(kind)
    }

    pub fn value(&self) -> &str {
        use TypeKind::*;
        match self {
            Invalid => "invalid",
            Bool => "bool",
            Int => "int",
            Int8 => "int8",
            Int16 => "int16",
            Int32 => "int32",
            Int64 => "int64",
            Uint => "uint",
            Uint8 => "uint8",
            Uint16 => "uint16",
            Uint32 => "uint32",
            Uint64 => "uint64",
            Uintptr => "uintptr",
            Float32 => "float32",
            Float64 => "float64",
            Complex64 => "complex64",
            Complex128 => "complex128",
            Array => "array",
            Chan => "chan",
            Func => "func",
            Interface => "interface",
            Map => "map",
            Ptr => "ptr",
            Slice => "slice",
            String => "string",
            Struct => "struct",
            UnsafePointer => "unsafe.Pointer",
            KindEnd => "kind_end",
        }
    }

    /// Kinds whose descriptor carries nothing beyond the common attributes.
    pub fn is_basic(&self) -> bool {
        !matches!(
            self,
            TypeKind::Array
                | TypeKind::Chan
                | TypeKind::Func
                | TypeKind::Interface
                | TypeKind::Map
                | TypeKind::Ptr
                | TypeKind::Slice
                | TypeKind::Struct
        )
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// Channel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "python-ext", pyclass(eq, eq_int))]
#[repr(i32)]
pub enum ChanDir {
    Recv = 1,
    Send = 2,
    Both = 3,
}

impl ChanDir {
    pub fn from_raw(value: i32) -> Option<Self> {
        match value {
            1 => Some(ChanDir::Recv),
            2 => Some(ChanDir::Send),
            3 => Some(ChanDir::Both),
            _ => None,
        }
    }

    /// Go spelling of a channel with this direction and element `elem`.
    pub fn spell(&self, elem: &str) -> String {
        match self {
            ChanDir::Recv => format!("<-chan {elem}"),
            ChanDir::Send => format!("chan<- {elem}"),
            ChanDir::Both => format!("chan {elem}"),
        }
    }
}

/// Index of a descriptor inside its [`TypeGraph`](crate::core::type_graph::TypeGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub(crate) usize);

impl TypeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Field of a struct type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructField {
    /// Field name; empty for blank identifiers the compiler emitted
    pub name: String,
    /// Struct tag, if the field has one
    pub tag: Option<String>,
    /// Embedded field without its own name
    pub embedded: bool,
    /// Type of the field
    pub ty: TypeId,
}

/// Method attached to a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeMethod {
    pub name: String,
    /// Function type of the method. Absent for unexported methods or ones
    /// not used to satisfy an interface.
    pub ty: Option<TypeId>,
    /// Code address used for interface calls, zero if the linker dropped it
    pub iface_addr: u64,
    /// Code address used for direct calls, zero if the linker dropped it
    pub func_addr: u64,
}

impl TypeMethod {
    pub fn iface_target(&self) -> Option<u64> {
        (self.iface_addr != 0).then_some(self.iface_addr)
    }

    pub fn func_target(&self) -> Option<u64> {
        (self.func_addr != 0).then_some(self.func_addr)
    }

    /// Both code addresses were eliminated by the linker.
    pub fn is_eliminated(&self) -> bool {
        self.iface_addr == 0 && self.func_addr == 0
    }
}

/// Kind-specific part of a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum TypeDetail {
    /// Booleans, numbers, strings, unsafe pointers and invalid kinds
    Basic,
    Array {
        elem: Option<TypeId>,
        len: i32,
    },
    Slice {
        elem: Option<TypeId>,
    },
    Chan {
        elem: Option<TypeId>,
        dir: Option<ChanDir>,
    },
    Func {
        args: Vec<TypeId>,
        returns: Vec<TypeId>,
        variadic: bool,
    },
    /// Interface methods are in [`GoType::methods`]
    Interface,
    Map {
        key: Option<TypeId>,
        elem: Option<TypeId>,
    },
    Pointer {
        elem: Option<TypeId>,
        /// Address of the structure the pointer resolves to
        resolved: u64,
    },
    Struct {
        fields: Vec<StructField>,
    },
}

/// A Go type found in the binary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoType {
    pub kind: TypeKind,
    pub name: String,
    /// Address of the type structure; identifies the type
    pub addr: u64,
    /// Import path of the package declaring the type
    pub package_path: String,
    pub detail: TypeDetail,
    pub methods: Vec<TypeMethod>,
}

impl GoType {
    /// Element type of arrays, slices, channels, maps and pointers.
    pub fn element(&self) -> Option<TypeId> {
        match &self.detail {
            TypeDetail::Array { elem, .. }
            | TypeDetail::Slice { elem }
            | TypeDetail::Chan { elem, .. }
            | TypeDetail::Map { elem, .. }
            | TypeDetail::Pointer { elem, .. } => *elem,
            _ => None,
        }
    }

    pub fn key(&self) -> Option<TypeId> {
        match &self.detail {
            TypeDetail::Map { key, .. } => *key,
            _ => None,
        }
    }

    pub fn fields(&self) -> Option<&[StructField]> {
        match &self.detail {
            TypeDetail::Struct { fields } => Some(fields),
            _ => None,
        }
    }

    pub fn length(&self) -> Option<i32> {
        match &self.detail {
            TypeDetail::Array { len, .. } => Some(*len),
            _ => None,
        }
    }

    pub fn chan_dir(&self) -> Option<ChanDir> {
        match &self.detail {
            TypeDetail::Chan { dir, .. } => *dir,
            _ => None,
        }
    }

    pub fn ptr_resolved(&self) -> Option<u64> {
        match &self.detail {
            TypeDetail::Pointer { resolved, .. } => Some(*resolved),
            _ => None,
        }
    }

    pub fn func_args(&self) -> Option<&[TypeId]> {
        match &self.detail {
            TypeDetail::Func { args, .. } => Some(args),
            _ => None,
        }
    }

    pub fn func_returns(&self) -> Option<&[TypeId]> {
        match &self.detail {
            TypeDetail::Func { returns, .. } => Some(returns),
            _ => None,
        }
    }

    pub fn is_variadic(&self) -> Option<bool> {
        match &self.detail {
            TypeDetail::Func { variadic, .. } => Some(*variadic),
            _ => None,
        }
    }

    pub fn is_struct(&self) -> bool {
        self.kind == TypeKind::Struct
    }

    pub fn is_pointer(&self) -> bool {
        self.kind == TypeKind::Ptr
    }
}

impl fmt::Display for GoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) @ {:#x}", self.name, self.kind, self.addr)
    }
}
