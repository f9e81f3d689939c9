use std::collections::BTreeMap;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4};
use murex_common::{Geometry, NodeId, PhongMaterial, Viewport};
use murex_render::PerspectiveCamera;
use murex_scene::{Light, Scene};
use wgpu::util::DeviceExt;

use crate::shaders;

/// Format of the scene target and the ping-pong post targets.
pub const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

const MAX_POINT_LIGHTS: usize = 4;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct PointLightUniform {
    position: [f32; 3],
    intensity: f32,
    color: [f32; 3],
    distance: f32,
    decay: f32,
    _pad: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    camera_position: [f32; 3],
    light_count: u32,
    ambient: [f32; 3],
    _pad: f32,
    lights: [PointLightUniform; MAX_POINT_LIGHTS],
}

impl FrameUniforms {
    fn new(scene: &Scene, camera: &PerspectiveCamera) -> Self {
        let mut frame = Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera_position: camera.position.to_array(),
            ..Zeroable::zeroed()
        };
        let mut ambient = glam::Vec3::ZERO;
        for (light, position) in scene.lights() {
            match light {
                Light::Ambient(a) => ambient += a.color.rgb() * a.intensity,
                Light::Point(p) => {
                    let slot = frame.light_count as usize;
                    if slot == MAX_POINT_LIGHTS {
                        tracing::debug!("point light limit reached, ignoring extra lights");
                        continue;
                    }
                    frame.lights[slot] = PointLightUniform {
                        position: position.to_array(),
                        intensity: p.intensity,
                        color: p.color.rgb().to_array(),
                        distance: p.distance,
                        decay: p.decay,
                        _pad: [0.0; 3],
                    };
                    frame.light_count += 1;
                }
            }
        }
        frame.ambient = ambient.to_array();
        frame
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct MeshUniforms {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    /// rgb, shininess
    color: [f32; 4],
    specular: [f32; 4],
}

impl MeshUniforms {
    fn new(world: Mat4, material: &PhongMaterial) -> Self {
        let normal = Mat4::from_mat3(Mat3::from_mat4(world).inverse().transpose());
        Self {
            model: world.to_cols_array_2d(),
            normal_matrix: normal.to_cols_array_2d(),
            color: material.color.rgb().extend(material.shininess).to_array(),
            specular: material.specular.rgb().extend(0.0).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

fn mesh_data(geometry: &Geometry) -> (Vec<Vertex>, Vec<u32>) {
    let vertices = geometry
        .positions()
        .iter()
        .zip(geometry.normals())
        .map(|(p, n)| Vertex {
            position: p.to_array(),
            normal: n.to_array(),
        })
        .collect();
    let indices = geometry
        .triangles()
        .flat_map(|tri| tri.map(|i| i as u32))
        .collect();
    (vertices, indices)
}

struct GpuMesh {
    geometry: Arc<Geometry>,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Draws the scene's meshes with Blinn-Phong lighting into an offscreen target.
pub struct GpuSceneRenderer {
    pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    mesh_layout: wgpu::BindGroupLayout,
    meshes: BTreeMap<NodeId, GpuMesh>,
    depth_texture: wgpu::TextureView,
    pub clear_color: wgpu::Color,
}

fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

impl GpuSceneRenderer {
    pub fn new(device: &wgpu::Device, viewport: Viewport) -> Self {
        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame_uniforms"),
            contents: bytemuck::bytes_of(&FrameUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let frame_layout = uniform_layout(device, "frame_bind_group_layout");
        let mesh_layout = uniform_layout(device, "mesh_bind_group_layout");

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &mesh_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: OFFSCREEN_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            frame_buffer,
            frame_bind_group,
            mesh_layout,
            meshes: BTreeMap::new(),
            depth_texture: Self::create_depth_texture(device, viewport),
            clear_color: wgpu::Color::BLACK,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, viewport: Viewport) {
        self.depth_texture = Self::create_depth_texture(device, viewport);
    }

    /// Number of meshes with uploaded buffers.
    pub fn cached_meshes(&self) -> usize {
        self.meshes.len()
    }

    fn upload(&self, device: &wgpu::Device, geometry: &Arc<Geometry>) -> GpuMesh {
        let (vertices, indices) = mesh_data(geometry);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_vertex_buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_index_buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("mesh_uniforms"),
            size: std::mem::size_of::<MeshUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mesh_bind_group"),
            layout: &self.mesh_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        GpuMesh {
            geometry: Arc::clone(geometry),
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            uniform_buffer,
            bind_group,
        }
    }

    /// Record the scene pass into `encoder`, targeting `target`.
    pub fn encode(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) {
        queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms::new(scene, camera)),
        );

        let meshes = scene.meshes();
        self.meshes
            .retain(|id, _| meshes.iter().any(|(live, _, _)| live == id));
        for (id, mesh, world) in &meshes {
            let stale = self
                .meshes
                .get(id)
                .is_none_or(|cached| !Arc::ptr_eq(&cached.geometry, &mesh.geometry));
            if stale {
                let uploaded = self.upload(device, &mesh.geometry);
                tracing::debug!(node = %id.short(), "uploaded mesh buffers");
                self.meshes.insert(*id, uploaded);
            }
            if let Some(cached) = self.meshes.get(id) {
                queue.write_buffer(
                    &cached.uniform_buffer,
                    0,
                    bytemuck::bytes_of(&MeshUniforms::new(*world, &mesh.material)),
                );
            }
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.frame_bind_group, &[]);
        for mesh in self.meshes.values() {
            pass.set_bind_group(1, &mesh.bind_group, &[]);
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }

    fn create_depth_texture(device: &wgpu::Device, viewport: Viewport) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: viewport.width(),
                height: viewport.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}
