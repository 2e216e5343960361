//! Brain-model and parcel entries recorded on a header axis

use hashbrown::HashMap;

use crate::header::Structure;

/// Surface brain model: which nodes of a structure's surface map onto the
/// axis, and at which linear indices.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceModel {
    structure: Structure,
    number_of_nodes: u64,
    node_to_index: Vec<i64>,
}

impl SurfaceModel {
    /// Build a model from `(node, axis_index)` pairs. Nodes outside
    /// `[0, number_of_nodes)` are ignored; unmapped nodes have no index.
    pub fn new(structure: Structure, number_of_nodes: u64, mapped: &[(u64, u64)]) -> Self {
        let mut node_to_index = vec![-1i64; number_of_nodes as usize];
        for &(node, index) in mapped {
            if node < number_of_nodes {
                node_to_index[node as usize] = index as i64;
            }
        }
        Self {
            structure,
            number_of_nodes,
            node_to_index,
        }
    }

    pub fn structure(&self) -> Structure {
        self.structure
    }

    pub fn number_of_nodes(&self) -> u64 {
        self.number_of_nodes
    }

    pub fn index_for_node(&self, node: u64) -> Option<u64> {
        let index = *self.node_to_index.get(node as usize)?;
        (index >= 0).then_some(index as u64)
    }
}

/// One entry of the axis's CIFTI-to-volume map: the linear value index and
/// the voxel it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeMapEntry {
    pub value_index: u64,
    pub ijk: [i64; 3],
}

/// Voxel brain model: ordered volume-map entries plus a reverse lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoxelModel {
    entries: Vec<VolumeMapEntry>,
    by_ijk: HashMap<[i64; 3], u64>,
}

impl VoxelModel {
    pub fn new(entries: Vec<VolumeMapEntry>) -> Self {
        let by_ijk = entries
            .iter()
            .map(|entry| (entry.ijk, entry.value_index))
            .collect();
        Self { entries, by_ijk }
    }

    pub fn entries(&self) -> &[VolumeMapEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index_for_voxel(&self, ijk: [i64; 3]) -> Option<u64> {
        self.by_ijk.get(&ijk).copied()
    }
}

/// Named grouping of brainordinates addressed as one index.
#[derive(Debug, Clone, PartialEq)]
pub struct Parcel {
    name: String,
    surface_nodes: Vec<(Structure, Vec<u64>)>,
    voxel_indices: Vec<[i64; 3]>,
}

impl Parcel {
    pub fn new(
        name: impl Into<String>,
        surface_nodes: Vec<(Structure, Vec<u64>)>,
        voxel_indices: Vec<[i64; 3]>,
    ) -> Self {
        Self {
            name: name.into(),
            surface_nodes,
            voxel_indices,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn voxel_indices(&self) -> &[[i64; 3]] {
        &self.voxel_indices
    }

    pub fn contains_node(&self, structure: Structure, node: u64) -> bool {
        self.surface_nodes
            .iter()
            .any(|(s, nodes)| *s == structure && nodes.contains(&node))
    }

    pub fn contains_voxel(&self, ijk: [i64; 3]) -> bool {
        self.voxel_indices.contains(&ijk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_model_lookup() {
        let model = SurfaceModel::new(Structure::CortexLeft, 6, &[(0, 0), (2, 1), (5, 2)]);
        assert_eq!(model.index_for_node(0), Some(0));
        assert_eq!(model.index_for_node(2), Some(1));
        assert_eq!(model.index_for_node(1), None);
        assert_eq!(model.index_for_node(6), None);
    }

    #[test]
    fn voxel_model_reverse_lookup() {
        let model = VoxelModel::new(vec![
            VolumeMapEntry {
                value_index: 3,
                ijk: [1, 2, 0],
            },
            VolumeMapEntry {
                value_index: 4,
                ijk: [2, 2, 0],
            },
        ]);
        assert_eq!(model.index_for_voxel([1, 2, 0]), Some(3));
        assert_eq!(model.index_for_voxel([0, 0, 0]), None);
    }

    #[test]
    fn parcel_membership() {
        let parcel = Parcel::new(
            "V1",
            vec![(Structure::CortexLeft, vec![10, 11])],
            vec![[0, 0, 0]],
        );
        assert!(parcel.contains_node(Structure::CortexLeft, 10));
        assert!(!parcel.contains_node(Structure::CortexRight, 10));
        assert!(parcel.contains_voxel([0, 0, 0]));
    }
}
