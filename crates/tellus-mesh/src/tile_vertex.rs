//! Canonical vertex format and `wgpu::VertexBufferLayout` for terrain tiles.
//!
//! Every terrain render pipeline references [`TILE_VERTEX_LAYOUT`] to avoid
//! layout drift bugs.
//!
//! ## Attribute Packing
//!
//! | Location | Offset | Format    | Fields        |
//! |----------|--------|-----------|---------------|
//! | 0        | 0      | Float32x3 | position (km) |
//! | 1        | 12     | Float32x3 | normal        |

use std::mem;

use glam::DVec3;
use static_assertions::const_assert_eq;
use wgpu::{VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

/// One interleaved terrain vertex: position followed by normal.
///
/// Positions are in kilometers relative to the planet center; normals are the
/// radial direction of the vertex (see the tile builder).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TileVertex {
    /// Position relative to the planet center, in km.
    pub position: [f32; 3],
    /// Unit surface normal.
    pub normal: [f32; 3],
}

impl TileVertex {
    /// Build a vertex from f64 working precision.
    #[inline]
    #[must_use]
    pub fn new(position: DVec3, normal: DVec3) -> Self {
        Self {
            position: position.as_vec3().to_array(),
            normal: normal.as_vec3().to_array(),
        }
    }
}

/// Vertex attributes for the terrain tile format: two `Float32x3` attributes
/// covering all 24 bytes of [`TileVertex`].
pub const TILE_VERTEX_ATTRIBUTES: [VertexAttribute; 2] = [
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    },
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 12,
        shader_location: 1,
    },
];

/// The vertex buffer layout shared by all terrain render pipelines.
pub const TILE_VERTEX_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<TileVertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &TILE_VERTEX_ATTRIBUTES,
};

// ---------------------------------------------------------------------------
// Compile-time validation
// ---------------------------------------------------------------------------

/// Stride must match `TileVertex` size.
const_assert_eq!(mem::size_of::<TileVertex>(), 24);

/// Attribute offsets must match the struct layout.
const _: () = assert!(TILE_VERTEX_ATTRIBUTES[0].offset == 0);
const _: () = assert!(TILE_VERTEX_ATTRIBUTES[1].offset == 12);

/// Last attribute must fit within the stride.
const _: () = assert!(
    TILE_VERTEX_ATTRIBUTES[1].offset + 12 <= mem::size_of::<TileVertex>() as u64,
    "last attribute exceeds vertex stride"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_stride_matches_vertex_struct_size() {
        assert_eq!(
            TILE_VERTEX_LAYOUT.array_stride,
            mem::size_of::<TileVertex>() as u64,
        );
    }

    #[test]
    fn test_attribute_offsets_match_field_layout() {
        assert_eq!(TILE_VERTEX_ATTRIBUTES[0].offset, 0);
        assert_eq!(
            TILE_VERTEX_ATTRIBUTES[1].offset,
            mem::size_of::<[f32; 3]>() as u64
        );
    }

    #[test]
    fn test_attribute_formats_are_float32x3() {
        for attr in &TILE_VERTEX_ATTRIBUTES {
            assert_eq!(attr.format, VertexFormat::Float32x3);
        }
    }

    #[test]
    fn test_shader_locations_are_sequential() {
        for (i, attr) in TILE_VERTEX_ATTRIBUTES.iter().enumerate() {
            assert_eq!(attr.shader_location, i as u32);
        }
    }

    #[test]
    fn test_vertex_round_trips_through_bytes() {
        let vertex = TileVertex::new(DVec3::new(1.0, 2.0, 3.0), DVec3::new(0.0, 1.0, 0.0));
        let bytes: &[u8] = bytemuck::bytes_of(&vertex);
        assert_eq!(bytes.len(), 24);
        let back: &TileVertex = bytemuck::from_bytes(bytes);
        assert_eq!(*back, vertex);
    }

    #[test]
    fn test_layout_is_valid_for_wgpu_pipeline() {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            force_fallback_adapter: true,
            ..Default::default()
        }));

        let Ok(adapter) = adapter else {
            // No adapter available (headless CI without GPU) — skip.
            return;
        };

        let (device, _queue) =
            pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default()))
                .expect("failed to create device");

        let shader_source = r#"
            @vertex
            fn vs_main(
                @location(0) position: vec3<f32>,
                @location(1) normal: vec3<f32>,
            ) -> @builtin(position) vec4<f32> {
                return vec4<f32>(position + normal * 0.0, 1.0);
            }

            @fragment
            fn fs_main() -> @location(0) vec4<f32> {
                return vec4<f32>(1.0, 1.0, 1.0, 1.0);
            }
        "#;

        let shader: wgpu::ShaderModule =
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("test_tile_shader"),
                source: wgpu::ShaderSource::Wgsl(shader_source.into()),
            });

        let _pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("test_tile_pipeline"),
            layout: None,
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[TILE_VERTEX_LAYOUT],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: wgpu::TextureFormat::Bgra8UnormSrgb,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview_mask: None,
            cache: None,
        });
    }
}
