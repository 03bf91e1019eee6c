use std::fmt::Debug;

use glow::HasContext;
use log::{debug, error};

use crate::data::FlatMesh;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub index: u32,
    pub size: i32,
}

impl Layout {
    pub const fn new(index: u32, size: i32) -> Self {
        Self { index, size }
    }

    pub fn stride(&self) -> i32 {
        self.size * std::mem::size_of::<f32>() as i32
    }
}

// Must match the `layout (location = N)` declarations in the shaders.
pub const POSITION_LAYOUT: Layout = Layout::new(0, 3);
pub const NORMAL_LAYOUT: Layout = Layout::new(1, 3);
pub const UV_LAYOUT: Layout = Layout::new(2, 2);

#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("cannot build GPU geometry from an empty mesh")]
    EmptyMesh,

    #[error("{stream} stream has {len} entries but the mesh has {expected} vertices")]
    StreamMismatch {
        stream: &'static str,
        len: usize,
        expected: usize,
    },

    #[error("{0} vertices exceed what a single draw call can address")]
    TooManyVertices(usize),

    #[error("failed to create {0}: {1}")]
    Allocation(&'static str, String),
}

// Checked before anything is allocated; returns the draw count.
fn checked_vertex_count(mesh: &FlatMesh) -> Result<i32, GeometryError> {
    if mesh.is_empty() {
        return Err(GeometryError::EmptyMesh);
    }

    let expected = mesh.vertex_count();
    let mismatch = |stream, len| GeometryError::StreamMismatch {
        stream,
        len,
        expected,
    };
    if mesh.normals.len() != expected {
        return Err(mismatch("normal", mesh.normals.len()));
    }
    if mesh.has_uvs() && mesh.uvs.len() != expected {
        return Err(mismatch("uv", mesh.uvs.len()));
    }

    draw_count(expected)
}

fn draw_count(vertices: usize) -> Result<i32, GeometryError> {
    i32::try_from(vertices).map_err(|_| GeometryError::TooManyVertices(vertices))
}

pub trait GeometryApi {
    type VertexArray: Copy + Debug;
    type Buffer: Copy + Debug;

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;
    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    fn bind_vertex_array(&self, vao: Option<Self::VertexArray>);
    fn bind_array_buffer(&self, buffer: Option<Self::Buffer>);
    // Into the currently bound array buffer
    fn upload_array_buffer(&self, data: &[u8]);
    fn set_attribute_pointer(&self, layout: Layout);
    fn draw_triangles(&self, vertex_count: i32);
    fn delete_vertex_array(&self, vao: Self::VertexArray);
    fn delete_buffer(&self, buffer: Self::Buffer);
}

impl GeometryApi for glow::Context {
    type VertexArray = glow::VertexArray;
    type Buffer = glow::Buffer;

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String> {
        unsafe { HasContext::create_vertex_array(self) }
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        unsafe { HasContext::create_buffer(self) }
    }

    fn bind_vertex_array(&self, vao: Option<Self::VertexArray>) {
        unsafe { HasContext::bind_vertex_array(self, vao) }
    }

    fn bind_array_buffer(&self, buffer: Option<Self::Buffer>) {
        unsafe { self.bind_buffer(glow::ARRAY_BUFFER, buffer) }
    }

    fn upload_array_buffer(&self, data: &[u8]) {
        unsafe { self.buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::STATIC_DRAW) }
    }

    fn set_attribute_pointer(&self, layout: Layout) {
        unsafe {
            self.vertex_attrib_pointer_f32(
                layout.index,
                layout.size,
                glow::FLOAT,
                false,
                layout.stride(),
                0,
            );
            self.enable_vertex_attrib_array(layout.index);
        }
    }

    fn draw_triangles(&self, vertex_count: i32) {
        unsafe { self.draw_arrays(glow::TRIANGLES, 0, vertex_count) }
    }

    fn delete_vertex_array(&self, vao: Self::VertexArray) {
        unsafe { HasContext::delete_vertex_array(self, vao) }
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { HasContext::delete_buffer(self, buffer) }
    }
}

/// GPU copy of a `FlatMesh`: one vertex array and one buffer per stream.
///
/// The handle is move-only. `release` consumes it, so the GL objects are
/// deleted at most once; dropping it unreleased leaks them and is logged.
#[derive(Debug)]
pub struct GpuMesh<V: Copy + Debug, B: Copy + Debug> {
    vao: V,
    position_buffer: B,
    normal_buffer: B,
    uv_buffer: Option<B>,
    vertex_count: i32,
    released: bool,
}

pub type GlMesh = GpuMesh<glow::VertexArray, glow::Buffer>;

impl<V: Copy + Debug, B: Copy + Debug> GpuMesh<V, B> {
    // Leaves nothing bound; on failure everything created so far is deleted
    pub fn build<G>(api: &G, mesh: &FlatMesh) -> Result<Self, GeometryError>
    where
        G: GeometryApi<VertexArray = V, Buffer = B>,
    {
        let vertex_count = checked_vertex_count(mesh)?;

        let vao = api
            .create_vertex_array()
            .map_err(|e| GeometryError::Allocation("vertex array", e))?;
        api.bind_vertex_array(Some(vao));

        let mut buffers: Vec<B> = Vec::with_capacity(3);
        let mut streams: Vec<(&[u8], Layout)> = vec![
            (bytemuck::cast_slice(mesh.positions.as_slice()), POSITION_LAYOUT),
            (bytemuck::cast_slice(mesh.normals.as_slice()), NORMAL_LAYOUT),
        ];
        if mesh.has_uvs() {
            streams.push((bytemuck::cast_slice(mesh.uvs.as_slice()), UV_LAYOUT));
        }

        for (data, layout) in streams {
            match api.create_buffer() {
                Ok(buffer) => {
                    api.bind_array_buffer(Some(buffer));
                    api.upload_array_buffer(data);
                    api.set_attribute_pointer(layout);
                    buffers.push(buffer);
                }
                Err(e) => {
                    api.bind_vertex_array(None);
                    api.bind_array_buffer(None);
                    for buffer in buffers {
                        api.delete_buffer(buffer);
                    }
                    api.delete_vertex_array(vao);
                    return Err(GeometryError::Allocation("vertex buffer", e));
                }
            }
        }

        api.bind_vertex_array(None);
        api.bind_array_buffer(None);

        debug!(
            "Built {:?} with {} buffers, {} vertices",
            vao,
            buffers.len(),
            mesh.vertex_count()
        );

        Ok(Self {
            vao,
            position_buffer: buffers[0],
            normal_buffer: buffers[1],
            uv_buffer: buffers.get(2).copied(),
            vertex_count,
            released: false,
        })
    }

    pub fn draw<G>(&self, api: &G)
    where
        G: GeometryApi<VertexArray = V, Buffer = B>,
    {
        api.bind_vertex_array(Some(self.vao));
        api.draw_triangles(self.vertex_count);
        api.bind_vertex_array(None);
    }

    pub fn release<G>(mut self, api: &G)
    where
        G: GeometryApi<VertexArray = V, Buffer = B>,
    {
        api.delete_buffer(self.position_buffer);
        api.delete_buffer(self.normal_buffer);
        if let Some(uv_buffer) = self.uv_buffer {
            api.delete_buffer(uv_buffer);
        }
        api.delete_vertex_array(self.vao);
        self.released = true;
    }

    pub fn vertex_array(&self) -> V {
        self.vao
    }

    pub fn position_buffer(&self) -> B {
        self.position_buffer
    }

    pub fn normal_buffer(&self) -> B {
        self.normal_buffer
    }

    pub fn uv_buffer(&self) -> Option<B> {
        self.uv_buffer
    }

    pub fn vertex_count(&self) -> i32 {
        self.vertex_count
    }

    pub fn triangle_count(&self) -> i32 {
        self.vertex_count / 3
    }

    pub fn has_uvs(&self) -> bool {
        self.uv_buffer.is_some()
    }
}

impl<V: Copy + Debug, B: Copy + Debug> Drop for GpuMesh<V, B> {
    fn drop(&mut self) {
        if !self.released {
            error!("GPU mesh {:?} dropped without release; GL objects leaked", self.vao);
        }
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeSet;

    use super::{GeometryApi, Layout};

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        CreateVertexArray(u32),
        CreateBuffer(u32),
        BindVertexArray(Option<u32>),
        BindArrayBuffer(Option<u32>),
        Upload(usize),
        AttributePointer(Layout),
        Draw(i32),
        DeleteVertexArray(u32),
        DeleteBuffer(u32),
    }

    #[derive(Default)]
    pub struct RecordingGl {
        pub calls: RefCell<Vec<Call>>,
        pub live: RefCell<BTreeSet<u32>>,
        pub bound_vao: Cell<Option<u32>>,
        pub bound_buffer: Cell<Option<u32>>,
        next_id: Cell<u32>,
        buffers_before_failure: Cell<Option<usize>>,
    }

    impl RecordingGl {
        pub fn failing_after(buffers: usize) -> Self {
            let gl = Self::default();
            gl.buffers_before_failure.set(Some(buffers));
            gl
        }

        fn allocate(&self) -> u32 {
            let id = self.next_id.get() + 1;
            self.next_id.set(id);
            self.live.borrow_mut().insert(id);
            id
        }

        fn free(&self, id: u32) {
            assert!(self.live.borrow_mut().remove(&id), "double delete of {}", id);
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }
    }

    impl GeometryApi for RecordingGl {
        type VertexArray = u32;
        type Buffer = u32;

        fn create_vertex_array(&self) -> Result<u32, String> {
            let id = self.allocate();
            self.calls.borrow_mut().push(Call::CreateVertexArray(id));
            Ok(id)
        }

        fn create_buffer(&self) -> Result<u32, String> {
            if let Some(remaining) = self.buffers_before_failure.get() {
                if remaining == 0 {
                    return Err("out of memory".to_string());
                }
                self.buffers_before_failure.set(Some(remaining - 1));
            }
            let id = self.allocate();
            self.calls.borrow_mut().push(Call::CreateBuffer(id));
            Ok(id)
        }

        fn bind_vertex_array(&self, vao: Option<u32>) {
            self.bound_vao.set(vao);
            self.calls.borrow_mut().push(Call::BindVertexArray(vao));
        }

        fn bind_array_buffer(&self, buffer: Option<u32>) {
            self.bound_buffer.set(buffer);
            self.calls.borrow_mut().push(Call::BindArrayBuffer(buffer));
        }

        fn upload_array_buffer(&self, data: &[u8]) {
            self.calls.borrow_mut().push(Call::Upload(data.len()));
        }

        fn set_attribute_pointer(&self, layout: Layout) {
            self.calls.borrow_mut().push(Call::AttributePointer(layout));
        }

        fn draw_triangles(&self, vertex_count: i32) {
            self.calls.borrow_mut().push(Call::Draw(vertex_count));
        }

        fn delete_vertex_array(&self, vao: u32) {
            self.free(vao);
            self.calls.borrow_mut().push(Call::DeleteVertexArray(vao));
        }

        fn delete_buffer(&self, buffer: u32) {
            self.free(buffer);
            self.calls.borrow_mut().push(Call::DeleteBuffer(buffer));
        }
    }
}
