use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::{ModelVertex, Vertex},
        texture::Texture,
    },
    pipelines::basic::{mk_render_pipeline, mk_uniform_layout},
    scene::PhongMaterial,
};

/// GPU side of a [`PhongMaterial`].
///
/// Field order follows the WGSL struct: each `vec3` is followed by the scalar
/// that fills its 16 byte slot.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub light_position: [f32; 3],
    pub ambient_intensity: f32,
    pub diffuse_color: [f32; 3],
    pub shininess: f32,
    pub specular_color: [f32; 3],
    pub specular_model: u32,
}

impl From<&PhongMaterial> for MaterialUniform {
    fn from(material: &PhongMaterial) -> Self {
        Self {
            light_position: material.light_position.into(),
            ambient_intensity: material.ambient_intensity,
            diffuse_color: material.diffuse_color,
            shininess: material.shininess,
            specular_color: material.specular_color,
            specular_model: material.specular_model.as_u32(),
        }
    }
}

#[derive(Debug)]
pub struct MaterialResources {
    pub uniform: MaterialUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl MaterialResources {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        material: &PhongMaterial,
        label: &str,
    ) -> Self {
        let uniform = MaterialUniform::from(material);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Material Buffer", label)),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some(&format!("{} Material Bind Group", label)),
        });
        Self {
            uniform,
            buffer,
            bind_group,
        }
    }

    /// Uploads the material if it changed since the last upload.
    pub fn update(&mut self, queue: &wgpu::Queue, material: &PhongMaterial) {
        let uniform = MaterialUniform::from(material);
        if uniform != self.uniform {
            self.uniform = uniform;
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[uniform]));
        }
    }
}

pub fn mk_material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    mk_uniform_layout(device, "material_bind_group_layout")
}

/**
 * Lit pipeline for the extruded text.
 *
 * Bind groups: 0 camera, 1 point light, 2 material. Vertex slots: 0 mesh,
 * 1 instance.
 */
pub fn mk_phong_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    light_bind_group_layout: &wgpu::BindGroupLayout,
    material_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Phong Pipeline Layout"),
        bind_group_layouts: &[
            Some(camera_bind_group_layout),
            Some(light_bind_group_layout),
            Some(material_bind_group_layout),
        ],
        immediate_size: 0,
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Phong Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("phong.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &render_pipeline_layout,
        config.format,
        Some(wgpu::BlendState::REPLACE),
        Some(Texture::DEPTH_FORMAT),
        &[ModelVertex::desc(), InstanceRaw::desc()],
        shader,
    )
}
