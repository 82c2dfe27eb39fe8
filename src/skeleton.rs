use crate::error::{Error, Result};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::{fmt, rc::Rc};

/// A named landmark slot.
///
/// Nodes are shared handles compared by identity: clones of one node are
/// equal, two nodes created separately are not, even with the same name.
#[derive(Clone)]
pub struct Node(Rc<str>);

impl Node {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Rc::from(name.as_ref()))
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Node {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as *const u8 as usize).hash(state)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({:?})", self.name())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ways of addressing a node of a skeleton.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeRef {
    Index(usize),
    Name(String),
    Node(Node),
}

impl From<usize> for NodeRef {
    fn from(idx: usize) -> Self {
        NodeRef::Index(idx)
    }
}

impl From<&str> for NodeRef {
    fn from(name: &str) -> Self {
        NodeRef::Name(name.to_string())
    }
}

impl From<String> for NodeRef {
    fn from(name: String) -> Self {
        NodeRef::Name(name)
    }
}

impl From<Node> for NodeRef {
    fn from(node: Node) -> Self {
        NodeRef::Node(node)
    }
}

impl From<&Node> for NodeRef {
    fn from(node: &Node) -> Self {
        NodeRef::Node(node.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub source: Node,
    pub destination: Node,
}

/// Ordered template of nodes every instance is shaped by.
#[derive(Debug)]
pub struct Skeleton {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index: HashMap<Node, usize>,
    names: HashMap<String, usize>,
}

impl Skeleton {
    pub fn new<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let mut skeleton = Self {
            nodes: Vec::with_capacity(names.len()),
            edges: Vec::new(),
            index: HashMap::with_capacity(names.len()),
            names: HashMap::with_capacity(names.len()),
        };

        for name in names {
            let name = name.as_ref();
            if skeleton.names.contains_key(name) {
                return Err(Error::DuplicateNode(name.to_string()));
            }

            let node = Node::new(name);
            let idx = skeleton.nodes.len();

            skeleton.index.insert(node.clone(), idx);
            skeleton.names.insert(name.to_string(), idx);
            skeleton.nodes.push(node);
        }

        Ok(skeleton)
    }

    /// Builds a skeleton and connects nodes by name pairs.
    pub fn with_edges<S: AsRef<str>>(names: &[S], edges: &[(S, S)]) -> Result<Self> {
        let mut skeleton = Self::new(names)?;

        for (src, dst) in edges {
            let source = skeleton.node(src.as_ref())?;
            let destination = skeleton.node(dst.as_ref())?;

            skeleton.edges.push(Edge {
                source,
                destination,
            });
        }

        Ok(skeleton)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(Node::name)
    }

    /// Resolves a selector to a node of this skeleton.
    pub fn node(&self, selector: impl Into<NodeRef>) -> Result<Node> {
        match selector.into() {
            NodeRef::Index(idx) => self.nodes.get(idx).cloned().ok_or(Error::IndexOutOfRange {
                index: idx,
                len: self.nodes.len(),
            }),
            NodeRef::Name(name) => match self.names.get(&name) {
                Some(&idx) => Ok(self.nodes[idx].clone()),
                None => Err(Error::NodeNotFound(name)),
            },
            NodeRef::Node(node) => {
                if self.index.contains_key(&node) {
                    Ok(node)
                } else {
                    Err(Error::NodeNotFound(node.name().to_string()))
                }
            }
        }
    }

    /// Position of `node` in the skeleton's node order.
    pub fn index(&self, node: &Node) -> Result<usize> {
        self.index
            .get(node)
            .copied()
            .ok_or_else(|| Error::NodeNotFound(node.name().to_string()))
    }

    #[inline]
    pub fn contains(&self, node: &Node) -> bool {
        self.index.contains_key(node)
    }
}
