//! Draws a [`Scene`] with the GPU resources held by a [`Context`].
//!
//! Text is drawn first with the lit pipeline, the glow cube last so it blends
//! over whatever is behind it.

use std::iter;

use wgpu::util::DeviceExt;

use crate::{
    config::MaterialSlot,
    context::Context,
    data_structures::{
        instance::Instance,
        model::{DrawMesh, Mesh},
    },
    pipelines::{
        glow::mk_glow_pipeline,
        phong::{MaterialResources, mk_material_layout, mk_phong_pipeline},
    },
    resources::cube::cube,
    scene::Scene,
};

/// A text label living on the GPU.
#[derive(Debug)]
struct LabelMesh {
    mesh: Mesh,
    instance_buffer: wgpu::Buffer,
    material: MaterialSlot,
}

#[derive(Debug)]
pub struct Renderer {
    phong: wgpu::RenderPipeline,
    glow: wgpu::RenderPipeline,
    letter: MaterialResources,
    number: MaterialResources,
    cube: Mesh,
    cube_instance: wgpu::Buffer,
    labels: Vec<LabelMesh>,
}

fn mk_instance_buffer(device: &wgpu::Device, label: &str, instance: &Instance) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(&[instance.to_raw()]),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    })
}

impl Renderer {
    pub fn new(ctx: &Context, scene: &Scene) -> Self {
        let material_layout = mk_material_layout(&ctx.device);
        let phong = mk_phong_pipeline(
            &ctx.device,
            &ctx.config,
            &ctx.camera.bind_group_layout,
            &ctx.light.bind_group_layout,
            &material_layout,
        );
        let glow = mk_glow_pipeline(&ctx.device, &ctx.config, &ctx.camera.bind_group_layout);
        let letter = MaterialResources::new(
            &ctx.device,
            &material_layout,
            scene.material(MaterialSlot::Letter),
            "Letter",
        );
        let number = MaterialResources::new(
            &ctx.device,
            &material_layout,
            scene.material(MaterialSlot::Number),
            "Number",
        );
        let cube = Mesh::new(&ctx.device, "glow cube", &cube(scene.config().cube_size));
        let cube_instance =
            mk_instance_buffer(&ctx.device, "Glow Cube Instance Buffer", &scene.cube.instance());

        Self {
            phong,
            glow,
            letter,
            number,
            cube,
            cube_instance,
            labels: Vec::new(),
        }
    }

    /// Uploads the scene state of this frame: uniforms, the cube transform
    /// and any labels that appeared since the last call.
    pub fn sync(&mut self, ctx: &mut Context, scene: &Scene) {
        ctx.camera.update(&ctx.queue, &scene.camera, &scene.projection);
        ctx.light.update(&ctx.queue, &scene.light);
        self.letter.update(&ctx.queue, scene.material(MaterialSlot::Letter));
        self.number.update(&ctx.queue, scene.material(MaterialSlot::Number));
        ctx.queue.write_buffer(
            &self.cube_instance,
            0,
            bytemuck::cast_slice(&[scene.cube.instance().to_raw()]),
        );

        for label in scene.labels().iter().skip(self.labels.len()) {
            if label.geometry.is_empty() {
                log::warn!("text {:?} produced no geometry", label.text);
            }
            let mesh = Mesh::new(&ctx.device, &label.text, &label.geometry);
            let instance_buffer = mk_instance_buffer(
                &ctx.device,
                &format!("{:?} Instance Buffer", label.text),
                &label.transform,
            );
            log::debug!(
                "uploaded text {:?} with {} triangles",
                label.text,
                label.geometry.triangle_count()
            );
            self.labels.push(LabelMesh {
                mesh,
                instance_buffer,
                material: label.material,
            });
        }
    }

    pub fn render(&self, ctx: &Context) -> Result<(), wgpu::CurrentSurfaceTexture> {
        let output = match ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output)
            | wgpu::CurrentSurfaceTexture::Suboptimal(output) => output,
            other => return Err(other),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.phong);
            for label in self.labels.iter().filter(|l| l.mesh.num_elements > 0) {
                let material = match label.material {
                    MaterialSlot::Letter => &self.letter,
                    MaterialSlot::Number => &self.number,
                };
                render_pass.draw_mesh_instanced(
                    &label.mesh,
                    &label.instance_buffer,
                    0..1,
                    &[
                        &ctx.camera.bind_group,
                        &ctx.light.bind_group,
                        &material.bind_group,
                    ],
                );
            }

            render_pass.set_pipeline(&self.glow);
            render_pass.draw_mesh_instanced(
                &self.cube,
                &self.cube_instance,
                0..1,
                &[&ctx.camera.bind_group],
            );
        }

        ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
