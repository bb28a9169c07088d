//! Python view of the type graph.
//!
//! Every Python object holds the graph behind an `Arc` plus an id into it,
//! so type references resolve lazily and cycles cost nothing.

use std::sync::Arc;

use pyo3::exceptions::PyIndexError;
use pyo3::prelude::*;

use crate::core::{ChanDir, StructField, TypeGraph, TypeId, TypeKind, TypeMethod, TypeView};

fn wrap(graph: &Arc<TypeGraph>, id: TypeId) -> PyGoType {
    PyGoType {
        graph: Arc::clone(graph),
        id,
    }
}

fn wrap_all(
    graph: &Arc<TypeGraph>,
    views: Option<Vec<TypeView<'_>>>,
) -> Option<Vec<PyGoType>> {
    views.map(|vs| vs.iter().map(|v| wrap(graph, v.id())).collect())
}

/// Types of a binary.
#[pyclass(name = "TypeGraph", frozen)]
pub struct PyTypeGraph {
    graph: Arc<TypeGraph>,
}

impl PyTypeGraph {
    pub(crate) fn new(graph: TypeGraph) -> Self {
        Self {
            graph: Arc::new(graph),
        }
    }

    pub(crate) fn entries(&self) -> Vec<PyGoType> {
        self.graph
            .entry_ids()
            .iter()
            .map(|id| wrap(&self.graph, *id))
            .collect()
    }
}

#[pymethods]
impl PyTypeGraph {
    fn __len__(&self) -> usize {
        self.graph.len()
    }

    fn __getitem__(&self, index: usize) -> PyResult<PyGoType> {
        self.graph
            .entry_ids()
            .get(index)
            .map(|id| wrap(&self.graph, *id))
            .ok_or_else(|| PyIndexError::new_err(format!("type index {index} out of range")))
    }

    fn descriptor_count(&self) -> usize {
        self.graph.descriptor_count()
    }

    /// Reported types in discovery order.
    fn types(&self) -> Vec<PyGoType> {
        self.entries()
    }

    fn by_address(&self, addr: u64) -> Option<PyGoType> {
        self.graph.id_of(addr).map(|id| wrap(&self.graph, id))
    }

    /// First descriptor named `name`, reported or not.
    fn find(&self, name: &str) -> Option<PyGoType> {
        self.graph
            .all()
            .find(|(_, t)| t.name == name)
            .map(|(id, _)| wrap(&self.graph, id))
    }

    fn names(&self) -> Vec<String> {
        self.graph.iter().map(|t| t.name.clone()).collect()
    }

    fn names_of_kind(&self, kind: TypeKind) -> Vec<String> {
        self.graph.of_kind(kind).map(|t| t.name.clone()).collect()
    }

    fn to_json(&self) -> PyResult<String> {
        Ok(self.graph.to_json_string()?)
    }
}

/// A Go type. Equal objects are the same descriptor of the same graph.
#[pyclass(name = "Type", frozen)]
pub struct PyGoType {
    graph: Arc<TypeGraph>,
    id: TypeId,
}

impl PyGoType {
    fn view(&self) -> TypeView<'_> {
        TypeView::of(&self.graph, self.id)
    }
}

#[pymethods]
impl PyGoType {
    #[getter]
    fn get_kind(&self) -> TypeKind {
        self.view().ty().kind
    }

    #[getter]
    fn get_name(&self) -> String {
        self.view().ty().name.clone()
    }

    #[getter]
    fn get_addr(&self) -> u64 {
        self.view().ty().addr
    }

    #[getter(ptrResolved)]
    fn ptr_resolved(&self) -> Option<u64> {
        self.view().ty().ptr_resolved()
    }

    #[getter(packagePath)]
    fn package_path(&self) -> String {
        self.view().ty().package_path.clone()
    }

    #[getter]
    fn get_fields(&self) -> Option<Vec<PyStructField>> {
        let fields = self.view().fields()?;
        Some(
            fields
                .into_iter()
                .map(|(f, _)| PyStructField {
                    graph: Arc::clone(&self.graph),
                    field: f.clone(),
                })
                .collect(),
        )
    }

    #[getter]
    fn get_element(&self) -> Option<PyGoType> {
        self.view().element().map(|v| wrap(&self.graph, v.id()))
    }

    #[getter]
    fn get_key(&self) -> Option<PyGoType> {
        self.view().key().map(|v| wrap(&self.graph, v.id()))
    }

    #[getter]
    fn get_length(&self) -> Option<i32> {
        self.view().ty().length()
    }

    #[getter(chanDir)]
    fn chan_dir(&self) -> Option<ChanDir> {
        self.view().ty().chan_dir()
    }

    #[getter(funcArgs)]
    fn func_args(&self) -> Option<Vec<PyGoType>> {
        wrap_all(&self.graph, self.view().func_args())
    }

    #[getter(funcReturns)]
    fn func_returns(&self) -> Option<Vec<PyGoType>> {
        wrap_all(&self.graph, self.view().func_returns())
    }

    #[getter(isVariadic)]
    fn is_variadic(&self) -> Option<bool> {
        self.view().ty().is_variadic()
    }

    #[getter]
    fn get_methods(&self) -> Vec<PyTypeMethod> {
        self.view()
            .ty()
            .methods
            .iter()
            .map(|m| PyTypeMethod {
                graph: Arc::clone(&self.graph),
                method: m.clone(),
            })
            .collect()
    }

    fn __eq__(&self, other: &Self) -> bool {
        self.view() == other.view()
    }

    fn __hash__(&self) -> u64 {
        self.view().ty().addr
    }

    fn __repr__(&self) -> String {
        let ty = self.view().ty();
        format!("Type(name={:?}, kind={}, addr={:#x})", ty.name, ty.kind, ty.addr)
    }
}

/// Field of a struct type.
#[pyclass(name = "StructField", frozen)]
pub struct PyStructField {
    graph: Arc<TypeGraph>,
    field: StructField,
}

#[pymethods]
impl PyStructField {
    #[getter(fieldName)]
    fn field_name(&self) -> String {
        self.field.name.clone()
    }

    #[getter(fieldTag)]
    fn field_tag(&self) -> Option<String> {
        self.field.tag.clone()
    }

    #[getter(fieldAnon)]
    fn field_anon(&self) -> bool {
        self.field.embedded
    }

    #[getter]
    fn get_type(&self) -> PyGoType {
        wrap(&self.graph, self.field.ty)
    }

    fn __repr__(&self) -> String {
        format!(
            "StructField(name={:?}, type={:?})",
            self.field.name, self.graph[self.field.ty].name
        )
    }
}

/// Method owned by a type.
#[pyclass(name = "Method_Type", frozen)]
pub struct PyTypeMethod {
    graph: Arc<TypeGraph>,
    method: TypeMethod,
}

#[pymethods]
impl PyTypeMethod {
    #[getter]
    fn get_name(&self) -> String {
        self.method.name.clone()
    }

    /// Function type, `None` for unexported methods.
    #[getter]
    fn get_type(&self) -> Option<PyGoType> {
        self.method.ty.map(|id| wrap(&self.graph, id))
    }

    #[getter(ifaceOffset)]
    fn iface_offset(&self) -> u64 {
        self.method.iface_addr
    }

    #[getter(funcOffset)]
    fn func_offset(&self) -> u64 {
        self.method.func_addr
    }

    fn __repr__(&self) -> String {
        format!(
            "Method_Type(name={:?}, ifaceOffset={:#x}, funcOffset={:#x})",
            self.method.name, self.method.iface_addr, self.method.func_addr
        )
    }
}
