//! The in-process flower hierarchy: flowers, ends, blocks, chains,
//! links, and groups, held in a single arena so that parent/child and
//! link/nested-flower references are cheap stable indices.

use crate::pinch::BlockId as PinchBlockId;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlowerId(pub usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EndId(pub usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainId(pub usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinkId(pub usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub usize);

/// Tagged variant for what an end represents, per the sum-type treatment
/// mandated for pinch-end/cactus-edge/adjacency-component kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndKind {
    BlockFivePrime(BlockId),
    BlockThreePrime(BlockId),
    StubAttached,
    StubFree,
}

#[derive(Debug, Clone)]
pub struct End {
    pub kind: EndKind,
    pub group: Option<GroupId>,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub pinch_block: PinchBlockId,
    pub five_end: EndId,
    pub three_end: EndId,
}

#[derive(Debug, Clone, Default)]
pub struct Chain {
    pub links: Vec<LinkId>,
}

#[derive(Debug, Clone)]
pub struct Link {
    pub group: GroupId,
    pub chain: ChainId,
}

#[derive(Debug, Clone, Default)]
pub struct Group {
    pub ends: IndexSet<EndId>,
    pub nested_flower: Option<FlowerId>,
}

#[derive(Debug, Clone)]
pub struct Flower {
    pub parent: Option<FlowerId>,
    pub ends: IndexSet<EndId>,
    pub blocks: IndexSet<BlockId>,
    pub chains: IndexSet<ChainId>,
    pub groups: IndexSet<GroupId>,
    built_blocks: bool,
}

impl Flower {
    fn new(parent: Option<FlowerId>) -> Self {
        Self {
            parent,
            ends: IndexSet::new(),
            blocks: IndexSet::new(),
            chains: IndexSet::new(),
            groups: IndexSet::new(),
            built_blocks: false,
        }
    }

    pub fn built_blocks(&self) -> bool {
        self.built_blocks
    }

    /// A flower is terminal iff it has no nested child flowers, i.e. no
    /// group in it points further down the hierarchy.
    pub fn is_terminal(&self, model: &FlowerModel) -> bool {
        self.groups
            .iter()
            .all(|g| model.group(*g).nested_flower.is_none())
    }
}

/// Arena owning every flower-hierarchy object produced by one
/// materialisation run.
#[derive(Debug, Clone, Default)]
pub struct FlowerModel {
    flowers: Vec<Flower>,
    ends: Vec<End>,
    blocks: Vec<Block>,
    chains: Vec<Chain>,
    links: Vec<Link>,
    groups: Vec<Group>,
    root: Option<FlowerId>,
}

impl FlowerModel {
    pub fn new_root(&mut self) -> FlowerId {
        let id = FlowerId(self.flowers.len());
        self.flowers.push(Flower::new(None));
        self.root = Some(id);
        id
    }

    pub fn root(&self) -> FlowerId {
        self.root.expect("FlowerModel::new_root must be called first")
    }

    pub fn new_nested_flower(&mut self, parent: FlowerId) -> FlowerId {
        let id = FlowerId(self.flowers.len());
        self.flowers.push(Flower::new(Some(parent)));
        id
    }

    pub fn flower(&self, id: FlowerId) -> &Flower {
        &self.flowers[id.0]
    }

    pub fn flower_mut(&mut self, id: FlowerId) -> &mut Flower {
        &mut self.flowers[id.0]
    }

    pub fn new_end(&mut self, flower: FlowerId, kind: EndKind) -> EndId {
        let id = EndId(self.ends.len());
        self.ends.push(End { kind, group: None });
        self.flowers[flower.0].ends.insert(id);
        id
    }

    pub fn end(&self, id: EndId) -> &End {
        &self.ends[id.0]
    }

    pub fn end_mut(&mut self, id: EndId) -> &mut End {
        &mut self.ends[id.0]
    }

    pub fn new_block(&mut self, flower: FlowerId, pinch_block: PinchBlockId, five_end: EndId, three_end: EndId) -> BlockId {
        let id = BlockId(self.blocks.len());
        self.blocks.push(Block {
            pinch_block,
            five_end,
            three_end,
        });
        self.flowers[flower.0].blocks.insert(id);
        id
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0]
    }

    pub fn new_chain(&mut self, flower: FlowerId) -> ChainId {
        let id = ChainId(self.chains.len());
        self.chains.push(Chain::default());
        self.flowers[flower.0].chains.insert(id);
        id
    }

    pub fn chain(&self, id: ChainId) -> &Chain {
        &self.chains[id.0]
    }

    pub fn new_group(&mut self, flower: FlowerId, ends: impl IntoIterator<Item = EndId>) -> GroupId {
        let id = GroupId(self.groups.len());
        let ends: IndexSet<EndId> = ends.into_iter().collect();
        for &e in &ends {
            self.ends[e.0].group = Some(id);
        }
        self.groups.push(Group {
            ends,
            nested_flower: None,
        });
        self.flowers[flower.0].groups.insert(id);
        id
    }

    pub fn group(&self, id: GroupId) -> &Group {
        &self.groups[id.0]
    }

    /// Create an empty nested flower for `group` and return it, per the
    /// required `group_make_empty_nested_flower` operation.
    pub fn group_make_empty_nested_flower(&mut self, parent: FlowerId, group: GroupId) -> FlowerId {
        let nested = self.new_nested_flower(parent);
        self.groups[group.0].nested_flower = Some(nested);
        nested
    }

    pub fn new_link(&mut self, chain: ChainId, group: GroupId) -> LinkId {
        let id = LinkId(self.links.len());
        self.links.push(Link { group, chain });
        self.chains[chain.0].links.push(id);
        id
    }

    /// Set `built_blocks` on `flower` and recursively on every descendant
    /// reachable through nested groups (I5: write-once, propagates down).
    pub fn set_built_blocks_recursive(&mut self, flower: FlowerId) {
        self.flowers[flower.0].built_blocks = true;
        let children: Vec<FlowerId> = self.flowers[flower.0]
            .groups
            .iter()
            .filter_map(|g| self.groups[g.0].nested_flower)
            .collect();
        for child in children {
            self.set_built_blocks_recursive(child);
        }
    }

    /// `flower_check_recursive`: every descendant flower also has
    /// `built_blocks` set, the postcondition I5 establishes.
    pub fn check_recursive(&self, flower: FlowerId) -> bool {
        if !self.flowers[flower.0].built_blocks {
            return false;
        }
        self.flowers[flower.0]
            .groups
            .iter()
            .filter_map(|g| self.groups[g.0].nested_flower)
            .all(|child| self.check_recursive(child))
    }
}
