use crate::geometry_indices::{FaceIndex, PointIndex};
use crate::point_cloud::PointCloud;
use std::ops::{Deref, DerefMut};

pub type Face = [PointIndex; 3];

/// A point cloud plus triangle connectivity.
#[derive(Debug, Default, Clone)]
pub struct Mesh {
    point_cloud: PointCloud,
    faces: Vec<Face>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_point_cloud(point_cloud: PointCloud) -> Self {
        Self { point_cloud, faces: Vec::new() }
    }

    pub fn add_face(&mut self, face: Face) {
        self.faces.push(face);
    }

    pub fn set_face(&mut self, face_id: FaceIndex, face: Face) {
        if face_id.0 as usize >= self.faces.len() {
            self.faces.resize(face_id.0 as usize + 1, [PointIndex(0); 3]);
        }
        self.faces[face_id.0 as usize] = face;
    }

    pub fn face(&self, face_id: FaceIndex) -> Face {
        self.faces[face_id.0 as usize]
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn set_num_faces(&mut self, num_faces: usize) {
        self.faces.resize(num_faces, [PointIndex(0); 3]);
    }

    /// Point-id deduplication that keeps faces pointing at the merged points.
    pub fn deduplicate_point_ids(&mut self) -> bool {
        match self.point_cloud.deduplicate_point_ids() {
            Some(point_map) => {
                for face in &mut self.faces {
                    for corner in face.iter_mut() {
                        *corner = point_map[corner.0 as usize];
                    }
                }
                true
            }
            None => false,
        }
    }

    /// Drops the connectivity.
    pub fn into_point_cloud(self) -> PointCloud {
        self.point_cloud
    }
}

impl Deref for Mesh {
    type Target = PointCloud;

    fn deref(&self) -> &Self::Target {
        &self.point_cloud
    }
}

impl DerefMut for Mesh {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.point_cloud
    }
}
