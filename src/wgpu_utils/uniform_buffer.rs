// src/wgpu_utils/uniform_buffer.rs - uniform, storage-array and dynamic-offset buffers
use std::marker::PhantomData;

use crate::error::{WorldError, WorldResult};

fn type_label<Content>() -> &'static str {
    let type_name = std::any::type_name::<Content>();
    match type_name.rfind(':') {
        Some(pos) => &type_name[(pos + 1)..],
        None => type_name,
    }
}

/// Rounds `size` up to the next multiple of `alignment`
pub fn aligned_stride(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

/// A single uniform value
pub struct UniformBuffer<Content> {
    buffer: wgpu::Buffer,
    content_type: PhantomData<Content>,
    previous_content: Vec<u8>,
}

impl<Content: bytemuck::Pod> UniformBuffer<Content> {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("UniformBuffer: {}", type_label::<Content>())),
            size: std::mem::size_of::<Content>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        UniformBuffer {
            buffer,
            content_type: PhantomData,
            previous_content: Vec::new(),
        }
    }

    /// Writes `content`, skipping the upload when nothing changed
    pub fn update_content(&mut self, queue: &wgpu::Queue, content: Content) {
        let new_content = bytemuck::bytes_of(&content);
        if self.previous_content == new_content {
            return;
        }
        queue.write_buffer(&self.buffer, 0, new_content);
        self.previous_content = new_content.to_vec();
    }

    pub fn binding_resource(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }
}

/// Read-only storage array with a fixed element capacity
pub struct ArrayBuffer<Content> {
    buffer: wgpu::Buffer,
    content_type: PhantomData<Content>,
    capacity: usize,
    current_size: usize,
}

impl<Content: bytemuck::Pod> ArrayBuffer<Content> {
    pub fn new(device: &wgpu::Device, capacity: usize) -> Self {
        // zero-sized storage bindings are invalid
        let capacity = capacity.max(1);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("ArrayBuffer<{}>", type_label::<Content>())),
            size: (capacity * std::mem::size_of::<Content>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        ArrayBuffer {
            buffer,
            content_type: PhantomData,
            capacity,
            current_size: 0,
        }
    }

    pub fn write(&mut self, queue: &wgpu::Queue, data: &[Content]) -> WorldResult<()> {
        if data.len() > self.capacity {
            return Err(WorldError::ResourceExhausted {
                capacity: self.capacity,
            });
        }
        if !data.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(data));
        }
        self.current_size = data.len();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.current_size
    }

    pub fn is_empty(&self) -> bool {
        self.current_size == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn binding_resource(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }
}

/// One uniform slot per draw, addressed with dynamic offsets.
///
/// Values are staged on the CPU during the frame and written in one upload
/// before the pass is recorded. The GPU buffer grows when a frame needs more
/// slots; callers must rebuild bind groups when [`flush`](Self::flush)
/// reports a reallocation.
pub struct DynamicUniformBuffer<Content> {
    buffer: wgpu::Buffer,
    content_type: PhantomData<Content>,
    stride: u64,
    slots: usize,
    staged: Vec<u8>,
}

impl<Content: bytemuck::Pod> DynamicUniformBuffer<Content> {
    pub fn new(device: &wgpu::Device, initial_slots: usize) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = aligned_stride(std::mem::size_of::<Content>() as u64, alignment);
        let slots = initial_slots.max(1);

        Self {
            buffer: Self::allocate(device, stride, slots),
            content_type: PhantomData,
            stride,
            slots,
            staged: Vec::new(),
        }
    }

    fn allocate(device: &wgpu::Device, stride: u64, slots: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("DynamicUniformBuffer: {}", type_label::<Content>())),
            size: stride * slots as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    pub fn clear(&mut self) {
        self.staged.clear();
    }

    /// Stages a value and returns its dynamic offset
    pub fn push(&mut self, content: &Content) -> u32 {
        let offset = self.staged.len();
        self.staged.extend_from_slice(bytemuck::bytes_of(content));
        self.staged.resize(offset + self.stride as usize, 0);
        offset as u32
    }

    pub fn staged_slots(&self) -> usize {
        self.staged.len() / self.stride as usize
    }

    /// Uploads the staged values. Returns true when the buffer was reallocated.
    pub fn flush(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> bool {
        let needed = self.staged_slots();
        let grown = needed > self.slots;
        if grown {
            self.slots = needed.next_power_of_two();
            self.buffer = Self::allocate(device, self.stride, self.slots);
            log::debug!(
                "grew {} to {} slots",
                type_label::<Content>(),
                self.slots
            );
        }
        if !self.staged.is_empty() {
            queue.write_buffer(&self.buffer, 0, &self.staged);
        }
        grown
    }

    /// Binding covering a single element
    pub fn binding_resource(&self) -> wgpu::BindingResource {
        wgpu::BindingResource::Buffer(wgpu::BufferBinding {
            buffer: &self.buffer,
            offset: 0,
            size: wgpu::BufferSize::new(std::mem::size_of::<Content>() as u64),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aligned_stride() {
        assert_eq!(aligned_stride(256, 256), 256);
        assert_eq!(aligned_stride(48, 256), 256);
        assert_eq!(aligned_stride(257, 256), 512);
        assert_eq!(aligned_stride(10, 0), 10);
    }

    #[test]
    fn test_type_label_strips_path() {
        assert_eq!(type_label::<crate::gfx::lighting::GpuLight>(), "GpuLight");
        assert_eq!(type_label::<u32>(), "u32");
    }
}
