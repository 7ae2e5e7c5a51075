use crate::error::{GraphError, Result};

/// `"CRG1"` little-endian
pub const ADJACENCY_MAGIC: u32 = 0x4352_4731;

/// Compressed sparse adjacency: neighbours of node `i` are
/// `targets[offsets[i]..offsets[i + 1]]`.
///
/// Encoded as little-endian `u32`s: magic, node count, edge count, the
/// `node_count + 1` offsets, then the targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjacency {
    pub offsets: Vec<u32>,
    pub targets: Vec<u32>,
}

impl Adjacency {
    /// Build from per-node neighbour lists
    pub fn from_lists(lists: &[Vec<u32>]) -> Result<Self> {
        let mut offsets = Vec::with_capacity(lists.len() + 1);
        let mut targets = Vec::new();
        offsets.push(0);
        for list in lists {
            targets.extend_from_slice(list);
            offsets.push(to_u32(targets.len())?);
        }
        Ok(Self { offsets, targets })
    }

    pub fn node_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn edge_count(&self) -> usize {
        self.targets.len()
    }

    pub fn neighbors(&self, node: usize) -> &[u32] {
        match (self.offsets.get(node), self.offsets.get(node + 1)) {
            (Some(&start), Some(&end)) => &self.targets[start as usize..end as usize],
            _ => &[],
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let words = 3 + self.offsets.len() + self.targets.len();
        let mut out = Vec::with_capacity(words * 4);
        out.extend_from_slice(&ADJACENCY_MAGIC.to_le_bytes());
        out.extend_from_slice(&to_u32(self.node_count())?.to_le_bytes());
        out.extend_from_slice(&to_u32(self.edge_count())?.to_le_bytes());
        for value in self.offsets.iter().chain(&self.targets) {
            out.extend_from_slice(&value.to_le_bytes());
        }
        Ok(out)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 4 != 0 {
            return Err(GraphError::InvalidAdjacency(format!(
                "length {} is not a multiple of 4",
                bytes.len()
            )));
        }
        let words: Vec<u32> = bytes
            .chunks_exact(4)
            .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
            .collect();

        let [magic, nodes, edges, rest @ ..] = words.as_slice() else {
            return Err(GraphError::InvalidAdjacency("truncated header".into()));
        };
        if *magic != ADJACENCY_MAGIC {
            return Err(GraphError::InvalidAdjacency(format!("bad magic {magic:#x}")));
        }
        let (nodes, edges) = (*nodes as usize, *edges as usize);
        if rest.len() != nodes + 1 + edges {
            return Err(GraphError::InvalidAdjacency(format!(
                "expected {} words after header, found {}",
                nodes + 1 + edges,
                rest.len()
            )));
        }

        let (offsets, targets) = rest.split_at(nodes + 1);
        if offsets.last().copied() != Some(to_u32(edges)?) {
            return Err(GraphError::InvalidAdjacency("offsets do not end at edge count".into()));
        }
        if offsets.first() != Some(&0) {
            return Err(GraphError::InvalidAdjacency("offsets do not start at 0".into()));
        }
        // Together with the end check this keeps every offset within the target list
        if let Some(node) = offsets.windows(2).position(|pair| pair[0] > pair[1]) {
            return Err(GraphError::InvalidAdjacency(format!(
                "offsets decrease at node {node}"
            )));
        }
        Ok(Self {
            offsets: offsets.to_vec(),
            targets: targets.to_vec(),
        })
    }

    /// Same edges, reversed direction
    pub fn transpose(&self) -> Result<Self> {
        let mut lists = vec![Vec::new(); self.node_count()];
        for from in 0..self.node_count() {
            for &to in self.neighbors(from) {
                let slot = lists.get_mut(to as usize).ok_or_else(|| {
                    GraphError::InvalidAdjacency(format!("target {to} out of range"))
                })?;
                slot.push(to_u32(from)?);
            }
        }
        Self::from_lists(&lists)
    }
}

fn to_u32(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| GraphError::TooLarge(value))
}
