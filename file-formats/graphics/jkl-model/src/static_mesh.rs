//! Static (non-animated) mesh format
//!
//! A static mesh stores separate position, UV and normal tables plus
//! per-triangle corner references and flat-coloured materials. Rendering
//! works on the flattened form: three interleaved vertices per triangle.

use byteorder::{LittleEndian, WriteBytesExt};
use glam::{Mat4, Vec2, Vec3};
use log::debug;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;

use crate::error::{JklError, RecordLocation, Result};
use crate::io_ext::WriteExt;
use crate::reader::RecordReader;

/// Table references of one triangle corner
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Corner {
    pub position: i32,
    pub uv: i32,
    pub normal: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Triangle {
    pub material: u8,
    pub corners: [Corner; 3],
}

impl Triangle {
    const SIZE: u64 = 1 + 3 * 12;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub textured: bool,
    pub color: Vec3,
}

impl Material {
    const SIZE: u64 = 1 + 12;
}

/// One flattened vertex: position, material colour, normal, UV
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticVertex {
    pub position: Vec3,
    pub color: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl StaticVertex {
    /// Floats per flattened vertex
    pub const FLOATS: usize = 11;

    pub fn to_array(&self) -> [f32; Self::FLOATS] {
        [
            self.position.x,
            self.position.y,
            self.position.z,
            self.color.x,
            self.color.y,
            self.color.z,
            self.normal.x,
            self.normal.y,
            self.normal.z,
            self.uv.x,
            self.uv.y,
        ]
    }
}

/// A decoded static mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticMesh {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub triangles: Vec<Triangle>,
    pub materials: Vec<Material>,
}

impl StaticMesh {
    /// Parse a static mesh and check every triangle reference
    pub fn parse<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let mut reader = RecordReader::new(reader, RecordLocation::StaticHeader)?;

        let position_count = reader.read_count("position count", 12)?;
        let uv_count = reader.read_count("uv count", 8)?;
        let normal_count = reader.read_count("normal count", 12)?;
        let triangle_count = reader.read_count("triangle count", Triangle::SIZE)?;
        let material_count = reader.read_count("material count", Material::SIZE)?;

        let mut positions = Vec::with_capacity(position_count);
        for index in 0..position_count {
            reader.at(RecordLocation::StaticEntry {
                table: "position",
                index,
            });
            positions.push(reader.read_vec3("position")?);
        }

        let mut uvs = Vec::with_capacity(uv_count);
        for index in 0..uv_count {
            reader.at(RecordLocation::StaticEntry { table: "uv", index });
            uvs.push(reader.read_vec2("uv")?);
        }

        let mut normals = Vec::with_capacity(normal_count);
        for index in 0..normal_count {
            reader.at(RecordLocation::StaticEntry {
                table: "normal",
                index,
            });
            normals.push(reader.read_vec3("normal")?);
        }

        let mut triangles = Vec::with_capacity(triangle_count);
        for triangle in 0..triangle_count {
            reader.at(RecordLocation::Triangle { triangle });
            let material = reader.read_u8("material id")?;
            let mut corners = [Corner::default(); 3];
            for corner in &mut corners {
                corner.position = reader.read_i32("position reference")?;
                corner.uv = reader.read_i32("uv reference")?;
                corner.normal = reader.read_i32("normal reference")?;
            }
            triangles.push(Triangle { material, corners });
        }

        let mut materials = Vec::with_capacity(material_count);
        for material in 0..material_count {
            reader.at(RecordLocation::Material { material });
            let textured = reader.read_u8("textured flag")? != 0;
            let r = reader.read_f32("red")?;
            let g = reader.read_f32("green")?;
            let b = reader.read_f32("blue")?;
            materials.push(Material {
                textured,
                color: Vec3::new(r, g, b),
            });
        }

        let mesh = Self {
            positions,
            uvs,
            normals,
            triangles,
            materials,
        };
        for index in 0..mesh.triangles.len() {
            mesh.resolve_triangle(index)?;
        }

        debug!(
            "Parsed static mesh: {} positions, {} triangles, {} materials",
            mesh.positions.len(),
            mesh.triangles.len(),
            mesh.materials.len()
        );
        Ok(mesh)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::parse(&mut BufReader::new(file))
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::parse(&mut Cursor::new(data))
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i32::<LittleEndian>(self.positions.len() as i32)?;
        writer.write_i32::<LittleEndian>(self.uvs.len() as i32)?;
        writer.write_i32::<LittleEndian>(self.normals.len() as i32)?;
        writer.write_i32::<LittleEndian>(self.triangles.len() as i32)?;
        writer.write_i32::<LittleEndian>(self.materials.len() as i32)?;

        for position in &self.positions {
            writer.write_vec3(*position)?;
        }
        for uv in &self.uvs {
            writer.write_vec2(*uv)?;
        }
        for normal in &self.normals {
            writer.write_vec3(*normal)?;
        }
        for triangle in &self.triangles {
            writer.write_u8(triangle.material)?;
            for corner in &triangle.corners {
                writer.write_i32::<LittleEndian>(corner.position)?;
                writer.write_i32::<LittleEndian>(corner.uv)?;
                writer.write_i32::<LittleEndian>(corner.normal)?;
            }
        }
        for material in &self.materials {
            writer.write_u8(u8::from(material.textured))?;
            writer.write_vec3(material.color)?;
        }
        Ok(())
    }

    fn resolve_triangle(&self, index: usize) -> Result<[StaticVertex; 3]> {
        let location = RecordLocation::Triangle { triangle: index };
        let triangle = self
            .triangles
            .get(index)
            .ok_or_else(|| JklError::format(location, "triangle index out of range"))?;

        let material = self
            .materials
            .get(triangle.material as usize)
            .ok_or_else(|| {
                JklError::format(
                    location,
                    format!(
                        "material {} out of range for {} materials",
                        triangle.material,
                        self.materials.len()
                    ),
                )
            })?;

        let mut vertices = [StaticVertex {
            position: Vec3::ZERO,
            color: material.color,
            normal: Vec3::ZERO,
            uv: Vec2::ZERO,
        }; 3];

        for (vertex, corner) in vertices.iter_mut().zip(triangle.corners.iter()) {
            vertex.position = lookup(&self.positions, corner.position, "position", location)?;
            vertex.uv = lookup(&self.uvs, corner.uv, "uv", location)?;
            vertex.normal = lookup(&self.normals, corner.normal, "normal", location)?;
        }

        Ok(vertices)
    }

    /// Expand every triangle into three interleaved vertices
    pub fn flatten(&self) -> Result<Vec<StaticVertex>> {
        let mut vertices = Vec::with_capacity(self.triangles.len() * 3);
        for index in 0..self.triangles.len() {
            vertices.extend(self.resolve_triangle(index)?);
        }
        Ok(vertices)
    }

    /// Flattened vertices as a float array, 11 floats per vertex
    pub fn flatten_floats(&self) -> Result<Vec<f32>> {
        Ok(self
            .flatten()?
            .iter()
            .flat_map(StaticVertex::to_array)
            .collect())
    }
}

fn lookup<T: Copy>(
    table: &[T],
    reference: i32,
    name: &str,
    location: RecordLocation,
) -> Result<T> {
    usize::try_from(reference)
        .ok()
        .and_then(|i| table.get(i).copied())
        .ok_or_else(|| {
            JklError::format(
                location,
                format!(
                    "{name} reference {reference} out of range for {} entries",
                    table.len()
                ),
            )
        })
}

/// Model matrix for drawing a static mesh
///
/// `translate(position) * scale * rotX * rotY * rotZ`, angles in degrees.
pub fn model_matrix(position: Vec3, scale: Vec3, rotation_degrees: Vec3) -> Mat4 {
    Mat4::from_translation(position)
        * Mat4::from_scale(scale)
        * Mat4::from_rotation_x(rotation_degrees.x.to_radians())
        * Mat4::from_rotation_y(rotation_degrees.y.to_radians())
        * Mat4::from_rotation_z(rotation_degrees.z.to_radians())
}
