use std::ffi::c_void;
use thiserror::Error;

pub struct GeometryBuilder<'a> {
    attributes: Vec<VertexAttribute>,
    data: &'a [f32],
    indices: Option<&'a [u32]>,
}

impl<'a> GeometryBuilder<'a> {
    pub fn new(data: &'a [f32]) -> Self {
        Self {
            data,
            attributes: Vec::new(),
            indices: None,
        }
    }

    pub fn with_attribute(mut self, attr: VertexAttribute) -> Self {
        self.attributes.push(attr);
        self
    }

    pub fn with_indices(mut self, indices: &'a [u32]) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Checks the data against the declared layout before anything touches
    /// the GL. Returns (stride in floats, vertex count).
    fn validate(&self) -> Result<(usize, usize), GeometryError> {
        let stride: usize = self.attributes.iter().map(|a| a.size()).sum();

        if stride == 0 || self.data.len() % stride != 0 {
            return Err(GeometryError::InvalidDataLength);
        }

        let vertices = self.data.len() / stride;

        if let Some(indices) = self.indices {
            if let Some(i) = indices.iter().find(|i| **i as usize >= vertices) {
                return Err(GeometryError::IndexOutOfRange {
                    index: *i,
                    vertices,
                });
            }
        }

        Ok((stride, vertices))
    }

    pub fn build(self) -> Result<Geometry, GeometryError> {
        let (stride, vertices) = self.validate()?;

        let mut vao = 0;
        let mut vbo = 0;
        let mut ebo = None;

        unsafe {
            gl::GenVertexArrays(1, (&mut vao) as *mut u32);
            gl::GenBuffers(1, (&mut vbo) as *mut u32);

            gl::BindVertexArray(vao);
            gl::BindBuffer(gl::ARRAY_BUFFER, vbo);

            gl::BufferData(
                gl::ARRAY_BUFFER,
                (self.data.len() * std::mem::size_of::<f32>()) as isize,
                self.data.as_ptr() as *const c_void,
                gl::STATIC_DRAW,
            );

            if let Some(indices) = self.indices {
                let mut id = 0;
                gl::GenBuffers(1, (&mut id) as *mut u32);

                // Stored in the VAO, so it stays bound while the VAO is.
                gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, id);
                gl::BufferData(
                    gl::ELEMENT_ARRAY_BUFFER,
                    (indices.len() * std::mem::size_of::<u32>()) as isize,
                    indices.as_ptr() as *const c_void,
                    gl::STATIC_DRAW,
                );

                ebo = Some(id);
            }

            let mut offset = 0;

            for (i, attr) in self.attributes.iter().enumerate() {
                gl::VertexAttribPointer(
                    i as u32,
                    attr.size() as i32,
                    gl::FLOAT,
                    gl::FALSE,
                    (stride * std::mem::size_of::<f32>()) as i32,
                    (offset * std::mem::size_of::<f32>()) as *const c_void,
                );
                offset += attr.size();
                gl::EnableVertexAttribArray(i as u32);
            }

            gl::BindBuffer(gl::ARRAY_BUFFER, 0);
            gl::BindVertexArray(0);
        }

        let count = match self.indices {
            Some(indices) => indices.len(),
            None => vertices,
        };

        Ok(Geometry {
            vao,
            vbo,
            ebo,
            count,
        })
    }
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum GeometryError {
    #[error("Invalid data length for given attributes")]
    InvalidDataLength,
    #[error("Index {index} references a vertex outside the buffer ({vertices} vertices)")]
    IndexOutOfRange { index: u32, vertices: usize },
}

pub enum VertexAttribute {
    Float,
    Vec2,
    Vec3,
}

impl VertexAttribute {
    pub fn size(&self) -> usize {
        match self {
            VertexAttribute::Float => 1,
            VertexAttribute::Vec2 => 2,
            VertexAttribute::Vec3 => 3,
        }
    }
}

pub struct Geometry {
    vao: u32,
    vbo: u32,
    ebo: Option<u32>,
    count: usize,
}

impl Geometry {
    pub fn vao(&self) -> u32 {
        self.vao
    }

    pub fn indexed(&self) -> bool {
        self.ebo.is_some()
    }

    /// Indices to draw for indexed geometry, vertices otherwise.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl Drop for Geometry {
    fn drop(&mut self) {
        unsafe {
            if let Some(ebo) = self.ebo {
                gl::DeleteBuffers(1, (&ebo) as *const u32);
            }
            gl::DeleteBuffers(1, (&self.vbo) as *const u32);
            gl::DeleteVertexArrays(1, (&self.vao) as *const u32);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_must_match_attribute_stride() {
        let data = [0.0; 7];
        let builder = GeometryBuilder::new(&data).with_attribute(VertexAttribute::Vec3);

        assert_eq!(builder.validate(), Err(GeometryError::InvalidDataLength));
    }

    #[test]
    fn indices_must_reference_existing_vertices() {
        let data = [0.0; 12];
        let indices = [0, 1, 4];
        let builder = GeometryBuilder::new(&data)
            .with_attribute(VertexAttribute::Vec3)
            .with_indices(&indices);

        assert_eq!(
            builder.validate(),
            Err(GeometryError::IndexOutOfRange {
                index: 4,
                vertices: 4
            })
        );
    }

    #[test]
    fn valid_indexed_layout_passes() {
        let data = [0.0; 12];
        let indices = [0, 1, 3, 1, 2, 3];
        let builder = GeometryBuilder::new(&data)
            .with_attribute(VertexAttribute::Vec3)
            .with_indices(&indices);

        assert_eq!(builder.validate(), Ok((3, 4)));
    }
}
