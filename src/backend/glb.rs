use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use glam::Vec3;
use gltf::json;
use gltf::json::validation::Checked::Valid;
use gltf::json::validation::USize64;

use crate::error::{PipelineError, Result};
use crate::generate::bundle::{GaussianSplats, MeshAsset};

/// Writes `mesh` as a single-node binary glTF, with splat appearance baked
/// down to per-vertex colors. Attribute layout follows the gltf crate's
/// export example: one buffer, one view per attribute.
pub fn write_glb(mesh: &MeshAsset, splats: &GaussianSplats, out_path: &Path) -> Result<()> {
    if mesh.mesh.is_empty() {
        return Err(PipelineError::backend("refusing to export an empty mesh"));
    }

    let positions = &mesh.mesh.positions;
    let normals = vertex_normals(mesh);
    let colors = bake_vertex_colors(mesh, splats);
    let indices = &mesh.mesh.indices;

    let bounds = mesh.mesh.bounds().expect("mesh is non-empty");

    let mut bin = Vec::new();
    let positions_view = push_vec3s(&mut bin, positions);
    let normals_view = push_vec3s(&mut bin, &normals);
    let colors_view = push_vec3s(&mut bin, &colors);
    let indices_offset = bin.len();
    for index in indices {
        bin.extend_from_slice(&index.to_le_bytes());
    }
    let indices_view = (indices_offset, bin.len() - indices_offset);
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let mut root = json::Root::default();
    root.asset.generator = Some("multiview".to_string());

    root.buffers.push(json::Buffer {
        byte_length: USize64::from(bin.len()),
        extensions: Default::default(),
        extras: Default::default(),
        name: None,
        uri: None,
    });

    for (offset, length) in [positions_view, normals_view, colors_view, indices_view] {
        root.buffer_views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: USize64::from(length),
            byte_offset: Some(USize64::from(offset)),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: None,
        });
    }

    let vertex_count = positions.len();
    for (view, semantic_min, semantic_max) in [
        (0u32, Some(&bounds.min), Some(&bounds.max)),
        (1, None, None),
        (2, None, None),
    ] {
        root.accessors.push(json::Accessor {
            buffer_view: Some(json::Index::new(view)),
            byte_offset: Some(USize64(0)),
            count: USize64::from(vertex_count),
            component_type: Valid(json::accessor::GenericComponentType(
                json::accessor::ComponentType::F32,
            )),
            extensions: Default::default(),
            extras: Default::default(),
            type_: Valid(json::accessor::Type::Vec3),
            min: semantic_min.map(|min| json::Value::from(min.to_array().to_vec())),
            max: semantic_max.map(|max| json::Value::from(max.to_array().to_vec())),
            name: None,
            normalized: false,
            sparse: None,
        });
    }
    root.accessors.push(json::Accessor {
        buffer_view: Some(json::Index::new(3)),
        byte_offset: Some(USize64(0)),
        count: USize64::from(indices.len()),
        component_type: Valid(json::accessor::GenericComponentType(
            json::accessor::ComponentType::U32,
        )),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(json::accessor::Type::Scalar),
        min: None,
        max: None,
        name: None,
        normalized: false,
        sparse: None,
    });

    let primitive = json::mesh::Primitive {
        attributes: {
            let mut attributes = BTreeMap::new();
            attributes.insert(Valid(json::mesh::Semantic::Positions), json::Index::new(0));
            attributes.insert(Valid(json::mesh::Semantic::Normals), json::Index::new(1));
            attributes.insert(Valid(json::mesh::Semantic::Colors(0)), json::Index::new(2));
            attributes
        },
        extensions: Default::default(),
        extras: Default::default(),
        indices: Some(json::Index::new(3)),
        material: None,
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    };

    root.meshes.push(json::Mesh {
        extensions: Default::default(),
        extras: Default::default(),
        name: None,
        primitives: vec![primitive],
        weights: None,
    });
    root.nodes.push(json::Node {
        mesh: Some(json::Index::new(0)),
        ..Default::default()
    });
    root.scenes.push(json::Scene {
        extensions: Default::default(),
        extras: Default::default(),
        name: None,
        nodes: vec![json::Index::new(0)],
    });
    root.scene = Some(json::Index::new(0));

    let mut json_bytes = json::serialize::to_string(&root)
        .map_err(|error| PipelineError::backend(format!("glTF serialization failed: {error}")))?
        .into_bytes();
    while json_bytes.len() % 4 != 0 {
        json_bytes.push(b' ');
    }

    let glb = gltf::binary::Glb {
        header: gltf::binary::Header {
            magic: *b"glTF",
            version: 2,
            // 12-byte file header plus an 8-byte header per chunk.
            length: (28 + json_bytes.len() + bin.len()) as u32,
        },
        json: Cow::Owned(json_bytes),
        bin: Some(Cow::Owned(bin)),
    };

    let file = File::create(out_path)?;
    glb.to_writer(file)
        .map_err(|error| PipelineError::backend(format!("GLB write failed: {error}")))?;
    Ok(())
}

fn push_vec3s(bin: &mut Vec<u8>, values: &[Vec3]) -> (usize, usize) {
    let offset = bin.len();
    for value in values {
        for component in value.to_array() {
            bin.extend_from_slice(&component.to_le_bytes());
        }
    }
    (offset, bin.len() - offset)
}

/// Per-vertex normals, recomputed by area-weighted face accumulation when
/// the asset's normals do not line up with its vertices.
fn vertex_normals(mesh: &MeshAsset) -> Vec<Vec3> {
    if mesh.normals.len() == mesh.mesh.positions.len() {
        return mesh.normals.clone();
    }

    let positions = &mesh.mesh.positions;
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for triangle in mesh.mesh.indices.chunks_exact(3) {
        let [a, b, c] = [
            positions[triangle[0] as usize],
            positions[triangle[1] as usize],
            positions[triangle[2] as usize],
        ];
        let face_normal = (b - a).cross(c - a);
        for &index in triangle {
            normals[index as usize] += face_normal;
        }
    }
    normals
        .into_iter()
        .map(|normal| normal.normalize_or_zero())
        .collect()
}

/// Nearest-splat color per vertex. This is the headless stand-in for real
/// texture baking; a linear scan is fine at preview sizes.
fn bake_vertex_colors(mesh: &MeshAsset, splats: &GaussianSplats) -> Vec<Vec3> {
    mesh.mesh
        .positions
        .iter()
        .map(|&position| {
            splats
                .splats
                .iter()
                .min_by(|a, b| {
                    position
                        .distance_squared(a.position)
                        .total_cmp(&position.distance_squared(b.position))
                })
                .map(|splat| {
                    Vec3::new(
                        splat.color[0] as f32 / 255.0,
                        splat.color[1] as f32 / 255.0,
                        splat.color[2] as f32 / 255.0,
                    )
                })
                .unwrap_or(Vec3::splat(0.7))
        })
        .collect()
}
