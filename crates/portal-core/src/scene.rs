//! Scene graph, OBJ loading and material binding.
//!
//! The diorama model arrives asynchronously. A loader sends the parsed graph
//! through a [`SceneSender`]; the frame driver polls the matching
//! [`PendingScene`] on the render thread and splices the result in.

use glam::{Mat4, Vec2, Vec3};
use std::collections::HashMap;
use std::path::Path;
use std::sync::mpsc;

use crate::constants::{BAKED_ROOT_NODE, LAMP_NODES, PORTAL_NODE};
use crate::error::SceneError;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv: uv.to_array(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Material {
    #[default]
    Baked,
    LampLight,
    PortalLights,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MeshNode {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub material: Material,
}

impl MeshNode {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneGraph {
    pub nodes: Vec<MeshNode>,
}

impl SceneGraph {
    /// Parses Wavefront OBJ text. Every OBJ object becomes one node named
    /// after it; faces are triangulated and missing normals are computed.
    pub fn from_obj(source: &str) -> Result<Self, SceneError> {
        let mut cursor = std::io::Cursor::new(source.as_bytes());
        let load_options = tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        };
        let (models, _materials) = tobj::load_obj_buf(&mut cursor, &load_options, |_| {
            Ok((vec![], HashMap::new()))
        })?;

        let nodes: Vec<MeshNode> = models
            .into_iter()
            .filter(|m| !m.mesh.positions.is_empty() && !m.mesh.indices.is_empty())
            .map(|m| node_from_obj(m.name, &m.mesh))
            .collect();
        if nodes.is_empty() {
            return Err(SceneError::Empty);
        }
        Ok(Self { nodes })
    }

    pub fn load_obj_file(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_obj(&text)
    }

    /// Built-in stand-in for the diorama model: a baked ground slab with a
    /// stone arch, two lamp heads and the uv-mapped portal disc.
    pub fn portal_diorama() -> Self {
        let mut base = MeshBuilder::default();
        base.cuboid(Vec3::new(0.0, -0.1, 0.0), Vec3::new(2.0, 0.1, 2.0));
        base.cuboid(Vec3::new(-0.95, 0.8, -1.6), Vec3::new(0.15, 0.8, 0.15));
        base.cuboid(Vec3::new(0.95, 0.8, -1.6), Vec3::new(0.15, 0.8, 0.15));
        base.cuboid(Vec3::new(0.0, 1.7, -1.6), Vec3::new(1.1, 0.1, 0.15));
        base.cuboid(Vec3::new(-1.1, 0.5, 0.3), Vec3::new(0.04, 0.5, 0.04));
        base.cuboid(Vec3::new(1.1, 0.5, 0.3), Vec3::new(0.04, 0.5, 0.04));

        let mut lamp_a = MeshBuilder::default();
        lamp_a.cuboid(Vec3::new(-1.1, 1.1, 0.3), Vec3::splat(0.1));
        let mut lamp_b = MeshBuilder::default();
        lamp_b.cuboid(Vec3::new(1.1, 1.1, 0.3), Vec3::splat(0.1));

        let mut portal = MeshBuilder::default();
        portal.disc(Vec3::new(0.0, 0.8, -1.44), 0.78, 48);

        Self {
            nodes: vec![
                base.finish(BAKED_ROOT_NODE),
                lamp_a.finish(LAMP_NODES[0]),
                lamp_b.finish(LAMP_NODES[1]),
                portal.finish(PORTAL_NODE),
            ],
        }
    }

    pub fn node(&self, name: &str) -> Option<&MeshNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn triangle_count(&self) -> usize {
        self.nodes.iter().map(MeshNode::triangle_count).sum()
    }

    /// Baked material everywhere, lamp material on the lamp heads, portal
    /// material on the portal disc. The graph is left untouched when the
    /// portal node is missing.
    pub fn bind_materials(&mut self) -> Result<(), SceneError> {
        if self.node(PORTAL_NODE).is_none() {
            return Err(SceneError::MissingNode(PORTAL_NODE.to_string()));
        }
        for node in &mut self.nodes {
            node.material = if node.name == PORTAL_NODE {
                Material::PortalLights
            } else if LAMP_NODES.contains(&node.name.as_str()) {
                Material::LampLight
            } else {
                Material::Baked
            };
        }
        log::debug!("[scene] bound materials on {} nodes", self.nodes.len());
        Ok(())
    }
}

fn node_from_obj(name: String, mesh: &tobj::Mesh) -> MeshNode {
    let count = mesh.positions.len() / 3;
    let positions: Vec<Vec3> = mesh
        .positions
        .chunks_exact(3)
        .map(|p| Vec3::new(p[0], p[1], p[2]))
        .collect();
    let normals = if mesh.normals.len() == mesh.positions.len() {
        mesh.normals
            .chunks_exact(3)
            .map(|n| Vec3::new(n[0], n[1], n[2]))
            .collect()
    } else {
        compute_vertex_normals(&positions, &mesh.indices)
    };
    let has_uv = mesh.texcoords.len() == count * 2;
    let vertices = (0..count)
        .map(|i| {
            let uv = if has_uv {
                Vec2::new(mesh.texcoords[i * 2], mesh.texcoords[i * 2 + 1])
            } else {
                Vec2::ZERO
            };
            Vertex::new(positions[i], normals[i], uv)
        })
        .collect();
    MeshNode {
        name,
        vertices,
        indices: mesh.indices.clone(),
        material: Material::Baked,
    }
}

/// Area-weighted vertex normals: unnormalized face normals summed per vertex.
fn compute_vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
        .collect()
}

#[derive(Default)]
struct MeshBuilder {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl MeshBuilder {
    fn quad(&mut self, corners: [Vec3; 4], normal: Vec3) {
        let base = self.vertices.len() as u32;
        let uvs = [Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y];
        for (p, uv) in corners.into_iter().zip(uvs) {
            self.vertices.push(Vertex::new(p, normal, uv));
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    fn cuboid(&mut self, center: Vec3, half: Vec3) {
        // Each face: normal plus the two in-plane axes, wound counter-clockwise.
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];
        for (n, u, v) in faces {
            let c = center + n * half;
            let du = u * half;
            let dv = v * half;
            self.quad([c - du - dv, c + du - dv, c + du + dv, c - du + dv], n);
        }
    }

    /// Disc in the XY plane facing +Z, uv spanning the unit square.
    fn disc(&mut self, center: Vec3, radius: f32, segments: u32) {
        let base = self.vertices.len() as u32;
        self.vertices
            .push(Vertex::new(center, Vec3::Z, Vec2::splat(0.5)));
        for i in 0..=segments {
            let a = i as f32 / segments as f32 * std::f32::consts::TAU;
            let (s, c) = a.sin_cos();
            self.vertices.push(Vertex::new(
                center + Vec3::new(c, s, 0.0) * radius,
                Vec3::Z,
                Vec2::new(0.5 + 0.5 * c, 0.5 + 0.5 * s),
            ));
        }
        for i in 0..segments {
            self.indices.extend_from_slice(&[base, base + 1 + i, base + 2 + i]);
        }
    }

    fn finish(self, name: &str) -> MeshNode {
        MeshNode {
            name: name.to_string(),
            vertices: self.vertices,
            indices: self.indices,
            material: Material::Baked,
        }
    }
}

/// Uniform scale plus a turn about Y, applied to the whole model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneTransform {
    pub scale: f32,
    pub rotation_y: f32,
}

impl SceneTransform {
    pub const IDENTITY: SceneTransform = SceneTransform {
        scale: 1.0,
        rotation_y: 0.0,
    };

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_y(self.rotation_y) * Mat4::from_scale(Vec3::splat(self.scale))
    }
}

impl Default for SceneTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

type SceneResult = Result<SceneGraph, SceneError>;

/// Sending half of the load-completion channel. Consumed on send.
pub struct SceneSender(mpsc::Sender<SceneResult>);

impl SceneSender {
    pub fn send(self, result: SceneResult) {
        if self.0.send(result).is_err() {
            log::warn!("[scene] load finished after the receiver was dropped");
        }
    }
}

pub enum ScenePoll {
    Pending,
    Ready(SceneResult),
    /// Already delivered, or the loader went away without answering.
    Closed,
}

/// Receiving half of the load-completion channel, polled once per frame.
pub struct PendingScene {
    rx: mpsc::Receiver<SceneResult>,
    done: bool,
}

impl PendingScene {
    pub fn channel() -> (SceneSender, PendingScene) {
        let (tx, rx) = mpsc::channel();
        (SceneSender(tx), PendingScene { rx, done: false })
    }

    /// A pending scene that is already resolved.
    pub fn ready(result: SceneResult) -> Self {
        let (tx, pending) = Self::channel();
        tx.send(result);
        pending
    }

    /// Runs `loader` on a worker thread.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn spawn<F>(loader: F) -> Self
    where
        F: FnOnce() -> SceneResult + Send + 'static,
    {
        let (tx, pending) = Self::channel();
        let spawned = std::thread::Builder::new()
            .name("scene-loader".into())
            .spawn(move || tx.send(loader()));
        match spawned {
            Ok(_) => pending,
            Err(e) => Self::ready(Err(SceneError::Worker(e.to_string()))),
        }
    }

    pub fn poll(&mut self) -> ScenePoll {
        if self.done {
            return ScenePoll::Closed;
        }
        match self.rx.try_recv() {
            Ok(result) => {
                self.done = true;
                ScenePoll::Ready(result)
            }
            Err(mpsc::TryRecvError::Empty) => ScenePoll::Pending,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.done = true;
                ScenePoll::Closed
            }
        }
    }
}
