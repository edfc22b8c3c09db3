//! Subtype lattice
//!
//! A rooted tree of type identities encoding "is-a" relationships. The root
//! is `Any`. Every node has a single parent, but a type may be attached at
//! several nodes, once per group it is bound into; distances take the
//! shortest path over all of its occurrences.

use log::{trace, warn};

use super::type_system::{type_equals, BuiltinKind, Type};

/// Index of a node in the lattice arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node {
    ty: Type,
    parent: Option<NodeId>,
}

/// Subtype tree with `Any` at the root
#[derive(Debug, Clone)]
pub struct TypeLattice {
    nodes: Vec<Node>,
}

impl TypeLattice {
    /// A lattice holding only the given root
    pub fn with_root(root: Type) -> Self {
        Self { nodes: vec![Node { ty: root, parent: None }] }
    }

    /// The builtin hierarchy every compilation starts from
    pub fn new() -> Self {
        let any = Type::any();
        let mut lattice = Self::with_root(any.clone());
        let number = Type::builtin(BuiltinKind::Number);
        lattice.insert(number.clone(), &any);
        lattice.insert(Type::builtin(BuiltinKind::Integer), &number);
        for kind in [
            BuiltinKind::String,
            BuiltinKind::Date,
            BuiltinKind::List,
            BuiltinKind::Table,
            BuiltinKind::Tuple,
            BuiltinKind::Struct,
            BuiltinKind::Enum,
        ] {
            lattice.insert(Type::builtin(kind), &any);
        }
        lattice
    }

    /// Attach `child` under the first node matching `parent`.
    ///
    /// Returns `false` and leaves the lattice untouched when `parent` is not
    /// registered.
    pub fn insert(&mut self, child: Type, parent: &Type) -> bool {
        let found = self.nodes_of(parent).next();
        match found {
            Some(parent_id) => {
                trace!("lattice: {} is a {}", child, parent);
                self.nodes.push(Node { ty: child.with_nullable(false), parent: Some(parent_id) });
                true
            }
            None => {
                warn!("lattice: cannot attach {} under unregistered {}", child, parent);
                false
            }
        }
    }

    /// Whether some node matches the type
    pub fn contains(&self, ty: &Type) -> bool {
        self.nodes_of(ty).next().is_some()
    }

    /// Lookup a registered type by its name
    pub fn find(&self, name: &str) -> Option<&Type> {
        self.nodes
            .iter()
            .map(|node| &node.ty)
            .find(|ty| ty.name() == Some(name))
    }

    /// Direct parents of every occurrence of `ty`, without duplicates
    pub fn find_parents(&self, ty: &Type) -> Vec<&Type> {
        let mut parents: Vec<&Type> = Vec::new();
        for id in self.nodes_of(ty) {
            if let Some(parent) = self.nodes[id.0].parent {
                let parent_ty = &self.nodes[parent.0].ty;
                if !parents.iter().any(|p| p.same_head(parent_ty)) {
                    parents.push(parent_ty);
                }
            }
        }
        parents
    }

    /// Number of parent hops from `child` up to `ancestor`.
    ///
    /// `Some(0)` when both are structurally equal, `None` when `ancestor`
    /// is not reachable.
    pub fn distance(&self, child: &Type, ancestor: &Type) -> Option<usize> {
        if type_equals(child, ancestor) {
            return Some(0);
        }
        let mut frontier: Vec<&Type> = vec![child];
        let mut hops = 0;
        while !frontier.is_empty() {
            hops += 1;
            let mut next: Vec<&Type> = Vec::new();
            for ty in frontier {
                for parent in self.find_parents(ty) {
                    if parent.same_head(ancestor) {
                        return Some(hops);
                    }
                    if !next.iter().any(|t| t.same_head(parent)) {
                        next.push(parent);
                    }
                }
            }
            frontier = next;
        }
        None
    }

    /// Every registered type, root first
    pub fn types(&self) -> impl Iterator<Item = &Type> {
        self.nodes.iter().map(|node| &node.ty)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn nodes_of<'a>(&'a self, ty: &'a Type) -> impl Iterator<Item = NodeId> + 'a {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, node)| node.ty.same_head(ty))
            .map(|(index, _)| NodeId(index))
    }
}

impl Default for TypeLattice {
    fn default() -> Self {
        Self::new()
    }
}
