use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use glam::{Mat4, Vec3};

use crate::backend::raster::{rasterize_points, PointSample};
use crate::backend::RenderBackend;
use crate::error::{PipelineError, Result};
use crate::formats::ModelFormat;
use crate::scene::{CameraPose, MeshData, ObjectKind, Scene, SceneObject, Transform};

const BACKGROUND: [u8; 3] = [24, 24, 28];
const UNLIT_LEVEL: u8 = 180;

#[derive(Debug, Clone, Copy)]
pub struct HeadlessConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        HeadlessConfig {
            width: 512,
            height: 512,
        }
    }
}

/// Self-contained `RenderBackend`: file-based importers, a point-projection
/// preview renderer and OBJ scene snapshots. Formats that need the real
/// host application (`.blend`, `.fbx`) are rejected with a backend error.
pub struct HeadlessBackend {
    config: HeadlessConfig,
}

impl HeadlessBackend {
    pub fn new(config: HeadlessConfig) -> Self {
        HeadlessBackend { config }
    }

    fn import_gltf(&self, path: &Path) -> Result<Vec<SceneObject>> {
        let (document, buffers, _images) = gltf::import(path)?;

        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or_else(|| PipelineError::backend("glTF file contains no scenes"))?;

        let mut objects = Vec::new();
        for node in scene.nodes() {
            collect_gltf_node(&node, &buffers, Mat4::IDENTITY, &mut objects)?;
        }
        Ok(objects)
    }

    fn import_obj(&self, path: &Path) -> Result<Vec<SceneObject>> {
        let text = fs::read_to_string(path)?;
        let default_name = file_stem(path);

        // OBJ vertex indices are global across the whole file; each object
        // gets a local remap of the global positions it references.
        let mut positions: Vec<Vec3> = Vec::new();
        let mut meshes: Vec<(String, MeshData, HashMap<usize, u32>)> =
            vec![(default_name, MeshData::default(), HashMap::new())];

        for (line_number, line) in text.lines().enumerate() {
            let mut fields = line.split_whitespace();
            match fields.next() {
                Some("v") => {
                    let mut component = || -> Result<f32> {
                        fields
                            .next()
                            .and_then(|field| field.parse().ok())
                            .ok_or_else(|| {
                                PipelineError::backend(format!(
                                    "malformed OBJ vertex on line {}",
                                    line_number + 1
                                ))
                            })
                    };
                    positions.push(Vec3::new(component()?, component()?, component()?));
                }
                Some("o") | Some("g") => {
                    let name = fields
                        .next()
                        .map(str::to_string)
                        .unwrap_or_else(|| "Unnamed".to_string());
                    meshes.push((name, MeshData::default(), HashMap::new()));
                }
                Some("f") => {
                    let face = fields
                        .map(|field| resolve_obj_index(field, positions.len()))
                        .collect::<Result<Vec<usize>>>()?;
                    if face.len() < 3 {
                        return Err(PipelineError::backend(format!(
                            "face with fewer than 3 vertices on line {}",
                            line_number + 1
                        )));
                    }

                    let (_, mesh, remap) = meshes.last_mut().expect("at least the default mesh");
                    let mut locals = Vec::with_capacity(face.len());
                    for &global in &face {
                        let local = match remap.get(&global) {
                            Some(&local) => local,
                            None => {
                                let local = mesh.positions.len() as u32;
                                mesh.positions.push(positions[global]);
                                remap.insert(global, local);
                                local
                            }
                        };
                        locals.push(local);
                    }

                    // Fan triangulation, as the host importer does for n-gons.
                    let first = locals[0];
                    for pair in locals[1..].windows(2) {
                        mesh.indices.extend([first, pair[0], pair[1]]);
                    }
                }
                _ => {}
            }
        }

        Ok(meshes
            .into_iter()
            .filter(|(_, mesh, _)| !mesh.is_empty())
            .map(|(name, mesh, _)| SceneObject::mesh(name, mesh))
            .collect())
    }

    fn import_stl(&self, path: &Path) -> Result<Vec<SceneObject>> {
        let bytes = fs::read(path)?;
        let mesh = match std::str::from_utf8(&bytes) {
            Ok(text) if text.contains("facet") => parse_ascii_stl(text)?,
            _ => parse_binary_stl(&bytes)?,
        };
        Ok(vec![SceneObject::mesh(file_stem(path), mesh)])
    }
}

impl RenderBackend for HeadlessBackend {
    fn import_mesh(&mut self, path: &Path, format: ModelFormat) -> Result<Vec<SceneObject>> {
        match format {
            ModelFormat::Gltf => self.import_gltf(path),
            ModelFormat::Obj => self.import_obj(path),
            ModelFormat::Stl => self.import_stl(path),
            ModelFormat::Blend | ModelFormat::Fbx => Err(PipelineError::backend(format!(
                "no headless importer for {}; connect a host-backed RenderBackend",
                format.name()
            ))),
        }
    }

    fn render_frame(&mut self, scene: &Scene, pose: &CameraPose, out_path: &Path) -> Result<()> {
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let lights = scene
            .point_lights()
            .map(|light| {
                let energy = match light.kind {
                    ObjectKind::PointLight { energy } => energy,
                    _ => unreachable!("point_lights yields lights only"),
                };
                (light.transform.translation, energy)
            })
            .collect::<Vec<_>>();

        let mut samples = Vec::new();
        for (_, object) in scene.objects() {
            let Some(mesh) = object.mesh_data() else {
                continue;
            };
            let matrix = object.transform.matrix();
            for &position in &mesh.positions {
                let world = matrix.transform_point3(position);
                let level = shade(world, &lights);
                samples.push(PointSample {
                    position: world,
                    color: [level, level, level],
                });
            }
        }

        let image = rasterize_points(
            &samples,
            pose,
            self.config.width,
            self.config.height,
            BACKGROUND,
        );
        image.save(out_path)?;
        Ok(())
    }

    fn scene_extension(&self) -> &'static str {
        "obj"
    }

    fn save_scene(&mut self, scene: &Scene, out_path: &Path) -> Result<()> {
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(out_path)?);
        // OBJ indices are 1-based and global across objects.
        let mut base = 1usize;
        for (_, object) in scene.objects() {
            let Some(mesh) = object.mesh_data() else {
                continue;
            };
            writeln!(writer, "o {}", object.name)?;
            let matrix = object.transform.matrix();
            for &position in &mesh.positions {
                let world = matrix.transform_point3(position);
                writeln!(writer, "v {} {} {}", world.x, world.y, world.z)?;
            }
            for triangle in mesh.indices.chunks_exact(3) {
                writeln!(
                    writer,
                    "f {} {} {}",
                    base + triangle[0] as usize,
                    base + triangle[1] as usize,
                    base + triangle[2] as usize
                )?;
            }
            base += mesh.positions.len();
        }
        writer.flush()?;
        Ok(())
    }
}

fn collect_gltf_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent_matrix: Mat4,
    objects: &mut Vec<SceneObject>,
) -> Result<()> {
    let matrix = parent_matrix * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        let name = node.name().unwrap_or("Unnamed").to_string();
        let mut data = MeshData::default();

        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                return Err(PipelineError::backend(format!(
                    "unsupported primitive mode {:?} in mesh {}",
                    primitive.mode(),
                    name
                )));
            }

            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
            let positions = reader
                .read_positions()
                .ok_or_else(|| PipelineError::backend(format!("mesh {name} has no positions")))?;

            let vertex_base = data.positions.len() as u32;
            data.positions.extend(positions.map(Vec3::from));
            let vertex_count = data.positions.len() as u32 - vertex_base;

            match reader.read_indices() {
                Some(indices) => data
                    .indices
                    .extend(indices.into_u32().map(|index| index + vertex_base)),
                None => data
                    .indices
                    .extend((0..vertex_count).map(|index| vertex_base + index)),
            }
        }

        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        let mut object = SceneObject::mesh(name, data);
        object.transform = Transform {
            translation,
            rotation,
            scale: scale.x, // Assume uniform scale for simplicity
        };
        objects.push(object);
    }

    for child in node.children() {
        collect_gltf_node(&child, buffers, matrix, objects)?;
    }

    Ok(())
}

fn resolve_obj_index(field: &str, vertex_count: usize) -> Result<usize> {
    let position_field = field.split('/').next().unwrap_or(field);
    let index: i64 = position_field
        .parse()
        .map_err(|_| PipelineError::backend(format!("malformed OBJ face index {field:?}")))?;

    let resolved = if index > 0 {
        index as usize - 1
    } else if index < 0 {
        let back = (-index) as usize;
        if back > vertex_count {
            return Err(PipelineError::backend(format!(
                "OBJ face index {index} out of range"
            )));
        }
        vertex_count - back
    } else {
        return Err(PipelineError::backend("OBJ face index 0 is invalid"));
    };

    if resolved >= vertex_count {
        return Err(PipelineError::backend(format!(
            "OBJ face index {index} out of range"
        )));
    }
    Ok(resolved)
}

fn parse_ascii_stl(text: &str) -> Result<MeshData> {
    let mut mesh = MeshData::default();
    for line in text.lines() {
        let mut fields = line.split_whitespace();
        if fields.next() != Some("vertex") {
            continue;
        }
        let mut component = || -> Result<f32> {
            fields
                .next()
                .and_then(|field| field.parse().ok())
                .ok_or_else(|| PipelineError::backend("malformed STL vertex"))
        };
        mesh.indices.push(mesh.positions.len() as u32);
        mesh.positions
            .push(Vec3::new(component()?, component()?, component()?));
    }
    if mesh.positions.len() % 3 != 0 {
        return Err(PipelineError::backend(
            "ASCII STL vertex count is not a multiple of 3",
        ));
    }
    Ok(mesh)
}

fn parse_binary_stl(bytes: &[u8]) -> Result<MeshData> {
    const HEADER: usize = 80;
    const RECORD: usize = 50;

    if bytes.len() < HEADER + 4 {
        return Err(PipelineError::backend("binary STL shorter than its header"));
    }
    let count = u32::from_le_bytes(
        bytes[HEADER..HEADER + 4]
            .try_into()
            .expect("slice is 4 bytes"),
    ) as usize;
    if bytes.len() < HEADER + 4 + count * RECORD {
        return Err(PipelineError::backend("binary STL truncated"));
    }

    let mut mesh = MeshData::default();
    for record in 0..count {
        let offset = HEADER + 4 + record * RECORD;
        // 12 floats per record: facet normal, then 3 vertices.
        let floats: [f32; 12] = bytemuck::pod_read_unaligned(&bytes[offset..offset + 48]);
        for vertex in 0..3 {
            let start = 3 + vertex * 3;
            mesh.indices.push(mesh.positions.len() as u32);
            mesh.positions
                .push(Vec3::new(floats[start], floats[start + 1], floats[start + 2]));
        }
    }
    Ok(mesh)
}

fn shade(point: Vec3, lights: &[(Vec3, f32)]) -> u8 {
    if lights.is_empty() {
        return UNLIT_LEVEL;
    }
    let mut level = 0.0f32;
    for &(position, energy) in lights {
        let falloff = 4.0 * std::f32::consts::PI * (1.0 + point.distance_squared(position));
        level += energy / falloff;
    }
    (40.0 + 215.0 * level.min(1.0)) as u8
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("Unnamed")
        .to_string()
}
