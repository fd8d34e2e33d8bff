//! Assembly model - one gear instance as a flat arena of part references
//!
//! Root nodes are the parts the gear is built from, in insertion order.
//! A compound part's nested fragment lives in its node's `children`
//! (material references), so nothing is stored as an owned recursive tree.

mod builder;
mod codec;

pub use builder::{craft_compound, AssemblyBuilder, Compound, CraftError};
pub use codec::{CodecError, CURRENT_VERSION};

use crate::registry::Snapshot;
use crate::types::{DefinitionId, GearType, Grade, ItemPayload, PartType};

/// Index of a node inside its assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Reference to a part definition, with the instance data stored on the gear
#[derive(Debug, Clone, PartialEq)]
pub struct PartRef {
    pub part: DefinitionId,
    pub grade: Grade,
    /// Item the part was crafted from, if the host kept it
    pub item: Option<ItemPayload>,
}

impl PartRef {
    pub fn new(part: DefinitionId) -> Self {
        PartRef {
            part,
            grade: Grade::None,
            item: None,
        }
    }

    pub fn with_grade(mut self, grade: Grade) -> Self {
        self.grade = grade;
        self
    }

    pub fn with_item(mut self, item: ItemPayload) -> Self {
        self.item = Some(item);
        self
    }
}

/// One material layer of a compound part
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialRef {
    pub material: DefinitionId,
    pub grade: Grade,
}

impl MaterialRef {
    pub fn new(material: DefinitionId, grade: Grade) -> Self {
        MaterialRef { material, grade }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reference {
    Part(PartRef),
    Material(MaterialRef),
}

impl Reference {
    pub fn id(&self) -> &DefinitionId {
        match self {
            Reference::Part(p) => &p.part,
            Reference::Material(m) => &m.material,
        }
    }

    pub fn grade(&self) -> Grade {
        match self {
            Reference::Part(p) => p.grade,
            Reference::Material(m) => m.grade,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub reference: Reference,
    pub children: Vec<NodeId>,
}

/// Result of checking an assembly against its gear type's required slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationResult {
    Ok,
    MissingMain,
    /// More than one part in a MAIN or ROD slot
    DuplicateSingleton(PartType),
    MissingRequiredSlot(PartType),
}

impl ValidationResult {
    pub fn is_ok(self) -> bool {
        self == ValidationResult::Ok
    }
}

/// A node reached by [`Assembly::walk`]
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    pub id: NodeId,
    pub node: &'a Node,
    /// Nearest part reference at or above this node
    pub owner: Option<&'a PartRef>,
    pub depth: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assembly {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl Assembly {
    pub fn new() -> Self {
        Assembly::default()
    }

    /// Append a root part
    pub fn push_part(&mut self, part: PartRef) -> NodeId {
        let id = self.alloc(Reference::Part(part));
        self.roots.push(id);
        id
    }

    /// Append a material to a compound part's fragment. Returns `None` when
    /// `parent` is not a node of this assembly.
    pub fn push_material(&mut self, parent: NodeId, material: MaterialRef) -> Option<NodeId> {
        if parent.0 >= self.nodes.len() {
            return None;
        }
        let id = self.alloc(Reference::Material(material));
        self.nodes[parent.0].children.push(id);
        Some(id)
    }

    fn alloc(&mut self, reference: Reference) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            reference,
            children: Vec::new(),
        });
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root part references with their node ids, in insertion order
    pub fn root_parts(&self) -> impl Iterator<Item = (NodeId, &PartRef)> {
        self.roots.iter().filter_map(|&id| match &self.node(id)?.reference {
            Reference::Part(p) => Some((id, p)),
            Reference::Material(_) => None,
        })
    }

    /// Material children of a node
    pub fn materials_of(&self, id: NodeId) -> impl Iterator<Item = &MaterialRef> {
        self.node(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(|&c| match &self.node(c)?.reference {
                Reference::Material(m) => Some(m),
                Reference::Part(_) => None,
            })
    }

    /// Depth-first, pre-order walk over every node, roots in insertion order
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            assembly: self,
            stack: self.roots.iter().rev().map(|&id| (id, None, 0)).collect(),
        }
    }

    /// Root parts whose definition fills `slot`, in insertion order.
    /// References to parts the snapshot does not know are skipped.
    pub fn parts_of_type(&self, snapshot: &Snapshot, slot: PartType) -> Vec<&PartRef> {
        self.root_parts()
            .filter(|(_, r)| snapshot.part(&r.part).is_some_and(|p| p.slot == slot))
            .map(|(_, r)| r)
            .collect()
    }

    /// Check slot completeness for a gear type. Pure; unknown part ids count as absent.
    pub fn validate(&self, snapshot: &Snapshot, gear_type: GearType) -> ValidationResult {
        let slots: Vec<PartType> = self
            .root_parts()
            .filter_map(|(_, r)| snapshot.part(&r.part).map(|p| p.slot))
            .collect();
        let count = |slot: PartType| slots.iter().filter(|s| **s == slot).count();

        if count(PartType::Main) == 0 {
            return ValidationResult::MissingMain;
        }
        for &slot in PartType::all().iter().filter(|s| s.is_singleton()) {
            if count(slot) > 1 {
                return ValidationResult::DuplicateSingleton(slot);
            }
        }
        for &slot in gear_type.required_parts() {
            if count(slot) == 0 {
                return ValidationResult::MissingRequiredSlot(slot);
            }
        }
        ValidationResult::Ok
    }
}

/// Iterator returned by [`Assembly::walk`]
pub struct Walk<'a> {
    assembly: &'a Assembly,
    stack: Vec<(NodeId, Option<&'a PartRef>, usize)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = Visit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (id, inherited, depth) = self.stack.pop()?;
            let Some(node) = self.assembly.node(id) else {
                continue;
            };
            let owner = match &node.reference {
                Reference::Part(p) => Some(p),
                Reference::Material(_) => inherited,
            };
            for &child in node.children.iter().rev() {
                self.stack.push((child, owner, depth + 1));
            }
            return Some(Visit {
                id,
                node,
                owner,
                depth,
            });
        }
    }
}
