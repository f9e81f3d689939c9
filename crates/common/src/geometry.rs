use glam::Vec3;

/// Errors from geometry validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    #[error("normal count {normals} does not match position count {positions}")]
    NormalCountMismatch { positions: usize, normals: usize },
    #[error("index {index} out of range for {positions} positions")]
    IndexOutOfRange { index: u32, positions: usize },
    #[error("index count {0} is not a multiple of 3")]
    NotTriangles(usize),
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Indexed triangle geometry with per-vertex normals.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    indices: Vec<u32>,
}

impl Geometry {
    /// Build geometry from decoded attributes.
    ///
    /// Missing indices produce a non-indexed triangle list; missing normals
    /// are computed by area-weighted averaging of face normals.
    pub fn new(
        positions: Vec<Vec3>,
        normals: Option<Vec<Vec3>>,
        indices: Option<Vec<u32>>,
    ) -> Result<Self, GeometryError> {
        let indices = indices.unwrap_or_else(|| (0..positions.len() as u32).collect());
        if indices.len() % 3 != 0 {
            return Err(GeometryError::NotTriangles(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(GeometryError::IndexOutOfRange {
                index,
                positions: positions.len(),
            });
        }

        let normals = match normals {
            Some(n) if n.len() != positions.len() => {
                return Err(GeometryError::NormalCountMismatch {
                    positions: positions.len(),
                    normals: n.len(),
                });
            }
            Some(n) => n,
            None => compute_vertex_normals(&positions, &indices),
        };

        Ok(Self {
            positions,
            normals,
            indices,
        })
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
    }

    pub fn bounding_box(&self) -> Option<Aabb> {
        let first = *self.positions.first()?;
        let (min, max) = self
            .positions
            .iter()
            .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        Some(Aabb { min, max })
    }
}

fn compute_vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        // Unnormalized cross product weights by triangle area.
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Z))
        .collect()
}
