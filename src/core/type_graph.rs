//! Owned graph of the types reported for one binary.

use std::collections::HashMap;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::core::go_type::{GoType, StructField, TypeId, TypeKind, TypeMethod};
use crate::error::{GoreError, Result};

/// Every type descriptor reached while reading the engine's type table,
/// stored once per address.
///
/// Descriptors are kept in discovery order. `entries` lists the types the
/// engine reported at top level; types only reachable through other types
/// (field types, elements, method signatures) are in the graph as well and
/// show up in [`TypeGraph::all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeGraph {
    types: Vec<GoType>,
    entries: Vec<TypeId>,
    #[serde(skip)]
    by_addr: HashMap<u64, TypeId>,
    /// `reported[i]` is set when `TypeId(i)` is in `entries`.
    #[serde(skip)]
    reported: Vec<bool>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of reported types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of descriptors, reported or only referenced.
    pub fn descriptor_count(&self) -> usize {
        self.types.len()
    }

    pub fn get(&self, id: TypeId) -> Option<&GoType> {
        self.types.get(id.0)
    }

    pub fn id_of(&self, addr: u64) -> Option<TypeId> {
        self.by_addr.get(&addr).copied()
    }

    pub fn by_address(&self, addr: u64) -> Option<&GoType> {
        self.id_of(addr).map(|id| &self[id])
    }

    /// Reported types in first-discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &GoType> + '_ {
        self.entries.iter().map(move |id| &self[*id])
    }

    pub fn entry_ids(&self) -> &[TypeId] {
        &self.entries
    }

    /// Every descriptor with its id.
    pub fn all(&self) -> impl Iterator<Item = (TypeId, &GoType)> + '_ {
        self.types.iter().enumerate().map(|(i, t)| (TypeId(i), t))
    }

    pub fn find_by_name(&self, name: &str) -> Option<&GoType> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn of_kind(&self, kind: TypeKind) -> impl Iterator<Item = &GoType> + '_ {
        self.iter().filter(move |t| t.kind == kind)
    }

    /// Descriptor `id` with its references resolved through this graph.
    pub fn view(&self, id: TypeId) -> Option<TypeView<'_>> {
        self.get(id).map(|_| TypeView { graph: self, id })
    }

    /// Views of the reported types.
    pub fn views(&self) -> impl Iterator<Item = TypeView<'_>> + '_ {
        self.entries
            .iter()
            .map(move |id| TypeView { graph: self, id: *id })
    }

    pub fn element(&self, ty: &GoType) -> Option<&GoType> {
        ty.element().and_then(|id| self.get(id))
    }

    pub fn key(&self, ty: &GoType) -> Option<&GoType> {
        ty.key().and_then(|id| self.get(id))
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| GoreError::Serialization(e.to_string()))
    }

    /// Parse a graph written by [`TypeGraph::to_json_string`], rebuilding the
    /// address index.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let mut graph: TypeGraph =
            serde_json::from_str(s).map_err(|e| GoreError::Serialization(e.to_string()))?;
        let count = graph.types.len();
        let dangling = graph
            .entries
            .iter()
            .copied()
            .chain(graph.types.iter().flat_map(referenced_ids))
            .find(|id| id.0 >= count);
        if let Some(bad) = dangling {
            return Err(GoreError::Serialization(format!(
                "type id {} out of range",
                bad.0
            )));
        }
        graph.by_addr = graph
            .types
            .iter()
            .enumerate()
            .map(|(i, t)| (t.addr, TypeId(i)))
            .collect();
        graph.reported = vec![false; count];
        for id in &graph.entries {
            graph.reported[id.0] = true;
        }
        Ok(graph)
    }

    /// Add a descriptor and key it by its address. The caller must have
    /// checked that the address is not present yet.
    pub(crate) fn insert(&mut self, ty: GoType) -> TypeId {
        let id = TypeId(self.types.len());
        self.by_addr.insert(ty.addr, id);
        self.types.push(ty);
        self.reported.push(false);
        id
    }

    pub(crate) fn get_mut(&mut self, id: TypeId) -> &mut GoType {
        &mut self.types[id.0]
    }

    /// Record `id` as reported at top level, once.
    pub(crate) fn push_entry(&mut self, id: TypeId) -> bool {
        if self.reported[id.0] {
            return false;
        }
        self.reported[id.0] = true;
        self.entries.push(id);
        true
    }
}

fn referenced_ids(ty: &GoType) -> Vec<TypeId> {
    use crate::core::go_type::TypeDetail;

    let mut ids: Vec<TypeId> = ty.element().into_iter().chain(ty.key()).collect();
    match &ty.detail {
        TypeDetail::Struct { fields } => ids.extend(fields.iter().map(|f| f.ty)),
        TypeDetail::Func { args, returns, .. } => {
            ids.extend(args.iter().chain(returns.iter()).copied())
        }
        _ => {}
    }
    ids.extend(ty.methods.iter().filter_map(|m| m.ty));
    ids
}

/// A descriptor borrowed together with the graph that owns it, so type
/// references come back as descriptors instead of ids.
///
/// Two views are equal when they are the same descriptor of the same graph.
#[derive(Debug, Clone, Copy)]
pub struct TypeView<'g> {
    graph: &'g TypeGraph,
    id: TypeId,
}

impl<'g> TypeView<'g> {
    /// `id` must come from `graph`.
    pub(crate) fn of(graph: &'g TypeGraph, id: TypeId) -> Self {
        TypeView { graph, id }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn graph(&self) -> &'g TypeGraph {
        self.graph
    }

    pub fn ty(&self) -> &'g GoType {
        &self.graph[self.id]
    }

    fn at(&self, id: TypeId) -> TypeView<'g> {
        TypeView {
            graph: self.graph,
            id,
        }
    }

    fn all_at(&self, ids: &[TypeId]) -> Vec<TypeView<'g>> {
        ids.iter().map(|id| self.at(*id)).collect()
    }

    pub fn element(&self) -> Option<TypeView<'g>> {
        self.ty().element().map(|id| self.at(id))
    }

    pub fn key(&self) -> Option<TypeView<'g>> {
        self.ty().key().map(|id| self.at(id))
    }

    /// Struct fields with their types, `None` unless this is a struct.
    pub fn fields(&self) -> Option<Vec<(&'g StructField, TypeView<'g>)>> {
        let fields = self.ty().fields()?;
        Some(fields.iter().map(|f| (f, self.at(f.ty))).collect())
    }

    pub fn func_args(&self) -> Option<Vec<TypeView<'g>>> {
        self.ty().func_args().map(|ids| self.all_at(ids))
    }

    pub fn func_returns(&self) -> Option<Vec<TypeView<'g>>> {
        self.ty().func_returns().map(|ids| self.all_at(ids))
    }

    pub fn methods(
        &self,
    ) -> impl Iterator<Item = (&'g TypeMethod, Option<TypeView<'g>>)> + 'g {
        let view = *self;
        self.ty()
            .methods
            .iter()
            .map(move |m| (m, m.ty.map(|id| view.at(id))))
    }
}

impl PartialEq for TypeView<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.id == other.id
    }
}

impl Eq for TypeView<'_> {}

impl std::fmt::Display for TypeView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self.ty(), f)
    }
}

impl Index<TypeId> for TypeGraph {
    type Output = GoType;

    fn index(&self, id: TypeId) -> &GoType {
        &self.types[id.0]
    }
}

impl<'a> IntoIterator for &'a TypeGraph {
    type Item = &'a GoType;
    type IntoIter = Box<dyn Iterator<Item = &'a GoType> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
