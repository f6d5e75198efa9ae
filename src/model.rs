//! Model tree - definitions paired with ordered children
//!
//! The tree is built once by the caller and read-only during deployment.
//! Child order is significant: children are deployed in insertion order.

use crate::definition::Definition;
use serde::Serialize;
use std::fmt;

/// A definition plus its ordered children
#[derive(Debug)]
pub struct ModelNode {
    definition: Box<dyn Definition>,
    children: Vec<ModelNode>,
}

impl ModelNode {
    pub fn new(definition: impl Definition) -> Self {
        Self {
            definition: Box::new(definition),
            children: Vec::new(),
        }
    }

    pub fn definition(&self) -> &dyn Definition {
        self.definition.as_ref()
    }

    pub fn children(&self) -> &[ModelNode] {
        &self.children
    }

    /// Append a child definition, returning the parent for further chaining
    pub fn add_child(&mut self, definition: impl Definition) -> &mut Self {
        self.children.push(Self::new(definition));
        self
    }

    /// Append a child definition and populate its own children
    ///
    /// ```
    /// # use provision::{Definition, Inspect, ModelNode, Value};
    /// # #[derive(Debug)] struct Site;
    /// # #[derive(Debug)] struct Web;
    /// # #[derive(Debug)] struct List;
    /// # impl Inspect for Site { fn properties(&self) -> Vec<(&'static str, Value)> { vec![] } }
    /// # impl Inspect for Web { fn properties(&self) -> Vec<(&'static str, Value)> { vec![] } }
    /// # impl Inspect for List { fn properties(&self) -> Vec<(&'static str, Value)> { vec![] } }
    /// # impl Definition for Site {}
    /// # impl Definition for Web {}
    /// # impl Definition for List {}
    /// let mut site = ModelNode::new(Site);
    /// site.add_child_with(Web, |web| {
    ///     web.add_child(List).add_child(List);
    /// });
    /// assert_eq!(site.len(), 4);
    /// ```
    pub fn add_child_with<F>(&mut self, definition: impl Definition, build: F) -> &mut Self
    where
        F: FnOnce(&mut ModelNode),
    {
        let mut child = Self::new(definition);
        build(&mut child);
        self.children.push(child);
        self
    }

    /// Owned builder variant of [`add_child`](Self::add_child)
    pub fn with_child(mut self, child: ModelNode) -> Self {
        self.children.push(child);
        self
    }

    /// Total number of nodes in this subtree
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(ModelNode::len).sum::<usize>()
    }

    /// A tree always contains at least its root
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Pre-order walk in deployment order
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }
}

/// Pre-order iterator over a model tree
pub struct Walk<'a> {
    stack: Vec<&'a ModelNode>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a ModelNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Location of a node in a model tree, e.g. `SiteDefinition/WebDefinition[0]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NodePath(Vec<String>);

impl NodePath {
    pub fn root(type_name: &str) -> Self {
        Self(vec![type_name.to_string()])
    }

    /// Path of the `index`-th child of this node
    pub fn child(&self, type_name: &str, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(format!("{type_name}[{index}]"));
        Self(segments)
    }

    /// Number of segments; the root has depth 1
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}
