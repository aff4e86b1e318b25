use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchitectureNode {
    pub code: String,
    pub name: String,
    pub description: String,
    pub children: Vec<ArchitectureNode>,
}

impl ArchitectureNode {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            description: description.into(),
            children: Vec::new(),
        }
    }

    /// Placeholder for an intermediate level nobody defined (yet).
    pub fn stub(code: impl Into<String>) -> Self {
        Self::new(code, String::new(), String::new())
    }

    pub fn is_stub(&self) -> bool {
        self.name.is_empty() && self.description.is_empty()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(ArchitectureNode::node_count)
            .sum::<usize>()
    }

    pub fn find(&self, code: &str) -> Option<&ArchitectureNode> {
        if self.code == code {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(code))
    }
}
