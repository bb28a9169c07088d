//! Type graph reconstruction.
//!
//! The engine describes types as records pointing at other records, and the
//! same type can be reached through any number of pointers, cycles
//! included. Conversion is a depth-first walk keyed by type address: a
//! descriptor is entered into the graph with its scalar attributes before any
//! referenced type is visited, so a walk that comes back to it stops at the
//! address lookup.

use std::os::raw::c_int;

use tracing::{debug, warn};

use crate::core::go_type::{
    ChanDir, GoType, StructField, TypeDetail, TypeId, TypeKind, TypeMethod,
};
use crate::core::type_graph::TypeGraph;
use crate::ffi::abi::{
    decode_optional_text, decode_text, record_ref, record_slice, RawMethodTypes, RawType, RawTypes,
};

/// Builds a [`TypeGraph`] from engine type arrays.
#[derive(Debug, Default)]
pub(crate) struct TypeGraphBuilder {
    graph: TypeGraph,
}

impl TypeGraphBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Convert every type of a top-level array and report it as an entry.
    ///
    /// # Safety
    ///
    /// `raw` must be null or valid per the [`Engine`](crate::ffi::Engine) contract.
    pub(crate) unsafe fn add_entries(&mut self, raw: *const RawTypes) {
        for id in self.convert_list(raw) {
            self.graph.push_entry(id);
        }
    }

    pub(crate) fn finish(self) -> TypeGraph {
        debug!(
            types = self.graph.len(),
            descriptors = self.graph.descriptor_count(),
            "Reconstructed type graph"
        );
        self.graph
    }

    unsafe fn convert(&mut self, raw: &RawType) -> TypeId {
        if let Some(id) = self.graph.id_of(raw.addr) {
            return id;
        }

        let kind = TypeKind::from_raw(raw.kind).unwrap_or_else(|| {
            warn!(kind = raw.kind, addr = raw.addr, "Unknown type kind");
            TypeKind::Invalid
        });
        let id = self.graph.insert(GoType {
            kind,
            name: decode_text(raw.name),
            addr: raw.addr,
            package_path: decode_text(raw.package_path),
            detail: scalar_detail(kind, raw),
            methods: Vec::new(),
        });

        let detail = self.resolve_detail(kind, raw);
        let methods = self.convert_methods(raw.methods);
        let ty = self.graph.get_mut(id);
        ty.detail = detail;
        ty.methods = methods;
        id
    }

    unsafe fn convert_ptr(&mut self, raw: *const RawType) -> Option<TypeId> {
        record_ref(raw).map(|t| self.convert(t))
    }

    unsafe fn convert_list(&mut self, raw: *const RawTypes) -> Vec<TypeId> {
        let Some(list) = record_ref(raw) else {
            return Vec::new();
        };
        let records = record_slice(list.types, list.length);
        let mut ids = Vec::with_capacity(records.len());
        for t in records {
            if let Some(t) = record_ref(*t) {
                ids.push(self.convert(t));
            }
        }
        ids
    }

    unsafe fn resolve_detail(&mut self, kind: TypeKind, raw: &RawType) -> TypeDetail {
        match kind {
            TypeKind::Array => TypeDetail::Array {
                elem: self.convert_ptr(raw.element),
                len: raw.length,
            },
            TypeKind::Slice => TypeDetail::Slice {
                elem: self.convert_ptr(raw.element),
            },
            TypeKind::Chan => TypeDetail::Chan {
                elem: self.convert_ptr(raw.element),
                dir: chan_dir(raw),
            },
            TypeKind::Func => TypeDetail::Func {
                args: self.convert_list(raw.func_args),
                returns: self.convert_list(raw.func_returns),
                variadic: raw.is_variadic > 0,
            },
            TypeKind::Map => {
                let key = self.convert_ptr(raw.key);
                TypeDetail::Map {
                    key,
                    elem: self.convert_ptr(raw.element),
                }
            }
            TypeKind::Ptr => TypeDetail::Pointer {
                elem: self.convert_ptr(raw.element),
                resolved: raw.ptr_resolved,
            },
            TypeKind::Struct => TypeDetail::Struct {
                fields: self.convert_fields(raw.fields),
            },
            _ => scalar_detail(kind, raw),
        }
    }

    unsafe fn convert_fields(&mut self, raw: *const RawTypes) -> Vec<StructField> {
        let Some(list) = record_ref(raw) else {
            return Vec::new();
        };
        let records = record_slice(list.types, list.length);
        let mut fields = Vec::with_capacity(records.len());
        for f in records {
            let Some(f) = record_ref(*f) else {
                warn!("Skipping null struct field record");
                continue;
            };
            fields.push(StructField {
                name: decode_text(f.field_name),
                tag: decode_optional_text(f.field_tag),
                embedded: f.field_anon > 0,
                ty: self.convert(f),
            });
        }
        fields
    }

    unsafe fn convert_methods(&mut self, raw: *const RawMethodTypes) -> Vec<TypeMethod> {
        let Some(list) = record_ref(raw) else {
            return Vec::new();
        };
        let records = record_slice(list.methods, list.length);
        let mut methods = Vec::with_capacity(records.len());
        for m in records {
            let Some(m) = record_ref(*m) else {
                continue;
            };
            methods.push(TypeMethod {
                name: decode_text(m.name),
                ty: self.convert_ptr(m.gotype),
                iface_addr: m.iface_addr,
                func_addr: m.func_addr,
            });
        }
        methods
    }
}

/// Kind-specific attributes that need no other record, with every type
/// reference left unresolved.
fn scalar_detail(kind: TypeKind, raw: &RawType) -> TypeDetail {
    match kind {
        TypeKind::Array => TypeDetail::Array {
            elem: None,
            len: raw.length,
        },
        TypeKind::Slice => TypeDetail::Slice { elem: None },
        TypeKind::Chan => TypeDetail::Chan {
            elem: None,
            dir: chan_dir(raw),
        },
        TypeKind::Func => TypeDetail::Func {
            args: Vec::new(),
            returns: Vec::new(),
            variadic: raw.is_variadic > 0,
        },
        TypeKind::Interface => TypeDetail::Interface,
        TypeKind::Map => TypeDetail::Map {
            key: None,
            elem: None,
        },
        TypeKind::Ptr => TypeDetail::Pointer {
            elem: None,
            resolved: raw.ptr_resolved,
        },
        TypeKind::Struct => TypeDetail::Struct { fields: Vec::new() },
        _ => TypeDetail::Basic,
    }
}

fn chan_dir(raw: &RawType) -> Option<ChanDir> {
    let dir: c_int = raw.chan_dir;
    let parsed = ChanDir::from_raw(dir);
    if parsed.is_none() && dir != 0 {
        warn!(chan_dir = dir, addr = raw.addr, "Unknown channel direction");
    }
    parsed
}
