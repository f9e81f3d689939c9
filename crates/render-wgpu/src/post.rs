use murex_common::Viewport;
use murex_render::post::{Composer, PassDescriptor};
use thiserror::Error;
use wgpu::util::DeviceExt;

use crate::gpu::OFFSCREEN_FORMAT;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PostChainError {
    #[error("composer has no post passes to present")]
    Empty,
}

struct GpuPass {
    name: String,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    /// Indexed by which ping-pong texture is the input.
    bind_groups: [wgpu::BindGroup; 2],
    to_surface: bool,
}

/// GPU execution of a composer's post passes.
///
/// Every pass but the last renders into the ping-pong textures; the last
/// renders to the surface.
pub struct GpuPostChain {
    layout: wgpu::BindGroupLayout,
    views: [wgpu::TextureView; 2],
    passes: Vec<GpuPass>,
}

fn uniform_bytes(descriptor: &PassDescriptor) -> Vec<u8> {
    bytemuck::cast_slice(&descriptor.packed_uniforms()).to_vec()
}

impl GpuPostChain {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        composer: &Composer,
    ) -> Result<Self, PostChainError> {
        let descriptors: Vec<&PassDescriptor> =
            composer.passes().iter().map(|p| p.descriptor()).collect();
        if descriptors.is_empty() {
            return Err(PostChainError::Empty);
        }

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("post_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("post_pipeline_layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let views = Self::create_targets(device, composer.viewport());
        let last = descriptors.len() - 1;
        let passes = descriptors
            .iter()
            .enumerate()
            .map(|(i, descriptor)| {
                let to_surface = i == last;
                let format = if to_surface {
                    surface_format
                } else {
                    OFFSCREEN_FORMAT
                };
                let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some(descriptor.name.as_str()),
                    source: wgpu::ShaderSource::Wgsl(descriptor.shader_module_source().into()),
                });
                let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(descriptor.name.as_str()),
                    layout: Some(&pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: Some("vs_main"),
                        compilation_options: Default::default(),
                        buffers: &[],
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &shader,
                        entry_point: Some("fs_main"),
                        compilation_options: Default::default(),
                        targets: &[Some(wgpu::ColorTargetState {
                            format,
                            blend: Some(wgpu::BlendState::REPLACE),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                    }),
                    primitive: wgpu::PrimitiveState::default(),
                    depth_stencil: None,
                    multisample: Default::default(),
                    multiview: None,
                    cache: None,
                });

                // WGSL forbids empty uniform structs; every pass gets at least 16 bytes.
                let mut contents = uniform_bytes(descriptor);
                if contents.is_empty() {
                    contents.resize(16, 0);
                }
                let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("post_uniforms"),
                    contents: &contents,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                let bind_groups = Self::bind_groups(device, &layout, &views, &uniform_buffer);

                GpuPass {
                    name: descriptor.name.clone(),
                    pipeline,
                    uniform_buffer,
                    bind_groups,
                    to_surface,
                }
            })
            .collect();

        tracing::debug!(passes = descriptors.len(), "gpu post chain built");
        Ok(Self {
            layout,
            views,
            passes,
        })
    }

    /// The texture the scene pass renders into.
    pub fn scene_target(&self) -> &wgpu::TextureView {
        &self.views[0]
    }

    pub fn resize(&mut self, device: &wgpu::Device, viewport: Viewport) {
        self.views = Self::create_targets(device, viewport);
        for pass in &mut self.passes {
            pass.bind_groups =
                Self::bind_groups(device, &self.layout, &self.views, &pass.uniform_buffer);
        }
    }

    /// Record every post pass. Uniforms are copied from `composer`.
    pub fn encode(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        composer: &Composer,
    ) {
        let mut read = 0;
        for (pass, cpu) in self.passes.iter().zip(composer.passes()) {
            let bytes = uniform_bytes(cpu.descriptor());
            if !bytes.is_empty() {
                queue.write_buffer(&pass.uniform_buffer, 0, &bytes);
            }

            let (view, load) = if pass.to_surface {
                (surface_view, wgpu::LoadOp::Clear(wgpu::Color::BLACK))
            } else {
                (&self.views[1 - read], wgpu::LoadOp::Load)
            };

            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(pass.name.as_str()),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });
            rpass.set_pipeline(&pass.pipeline);
            rpass.set_bind_group(0, &pass.bind_groups[read], &[]);
            rpass.draw(0..3, 0..1);
            drop(rpass);

            if !pass.to_surface && cpu.needs_swap() {
                read = 1 - read;
            }
        }
    }

    fn bind_groups(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        views: &[wgpu::TextureView; 2],
        uniforms: &wgpu::Buffer,
    ) -> [wgpu::BindGroup; 2] {
        views.each_ref().map(|view| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("post_bind_group"),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: uniforms.as_entire_binding(),
                    },
                ],
            })
        })
    }

    fn create_targets(device: &wgpu::Device, viewport: Viewport) -> [wgpu::TextureView; 2] {
        ["post_target_a", "post_target_b"].map(|label| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some(label),
                    size: wgpu::Extent3d {
                        width: viewport.width(),
                        height: viewport.height(),
                        depth_or_array_layers: 1,
                    },
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: OFFSCREEN_FORMAT,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                        | wgpu::TextureUsages::TEXTURE_BINDING,
                    view_formats: &[],
                })
                .create_view(&Default::default())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use murex_render::post::{DotScreenSettings, GammaCorrection, Posterize, stylization_chain};

    #[test]
    fn dot_screen_uniform_bytes_follow_declaration_order() {
        let vp = Viewport::new(200, 100).unwrap();
        let composer = stylization_chain(vp, DotScreenSettings::default()).unwrap();
        let bytes = uniform_bytes(composer.passes()[0].descriptor());
        let floats: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(&floats[..5], &[8.5, 10.0, 200.0, 100.0, 2.0]);
        assert_eq!(floats.len() % 4, 0);
    }

    #[test]
    fn texture_only_passes_pack_nothing() {
        assert!(uniform_bytes(&Posterize::descriptor()).is_empty());
        assert!(uniform_bytes(&GammaCorrection::descriptor()).is_empty());
    }
}
