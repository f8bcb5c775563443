//! Little-endian vector and matrix helpers layered over `byteorder`

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use glam::{Mat4, Quat, Vec2, Vec3};
use std::io::{Read, Result, Write};

/// Extension trait for reading the math types used by JKL files
pub trait ReadExt: Read {
    fn read_vec2(&mut self) -> Result<Vec2> {
        let x = self.read_f32::<LittleEndian>()?;
        let y = self.read_f32::<LittleEndian>()?;
        Ok(Vec2::new(x, y))
    }

    fn read_vec3(&mut self) -> Result<Vec3> {
        let x = self.read_f32::<LittleEndian>()?;
        let y = self.read_f32::<LittleEndian>()?;
        let z = self.read_f32::<LittleEndian>()?;
        Ok(Vec3::new(x, y, z))
    }

    /// Quaternions are stored `x, y, z, w`
    fn read_quat(&mut self) -> Result<Quat> {
        let mut xyzw = [0.0f32; 4];
        self.read_f32_into::<LittleEndian>(&mut xyzw)?;
        Ok(Quat::from_array(xyzw))
    }

    /// Matrices are stored as 16 floats, column-major
    fn read_mat4(&mut self) -> Result<Mat4> {
        let mut cols = [0.0f32; 16];
        self.read_f32_into::<LittleEndian>(&mut cols)?;
        Ok(Mat4::from_cols_array(&cols))
    }
}

/// Extension trait for writing the math types used by JKL files
pub trait WriteExt: Write {
    fn write_vec2(&mut self, v: Vec2) -> Result<()> {
        self.write_f32::<LittleEndian>(v.x)?;
        self.write_f32::<LittleEndian>(v.y)
    }

    fn write_vec3(&mut self, v: Vec3) -> Result<()> {
        self.write_f32::<LittleEndian>(v.x)?;
        self.write_f32::<LittleEndian>(v.y)?;
        self.write_f32::<LittleEndian>(v.z)
    }

    fn write_quat(&mut self, q: Quat) -> Result<()> {
        for component in q.to_array() {
            self.write_f32::<LittleEndian>(component)?;
        }
        Ok(())
    }

    fn write_mat4(&mut self, m: &Mat4) -> Result<()> {
        for value in m.to_cols_array() {
            self.write_f32::<LittleEndian>(value)?;
        }
        Ok(())
    }
}

impl<R: Read + ?Sized> ReadExt for R {}
impl<W: Write + ?Sized> WriteExt for W {}
