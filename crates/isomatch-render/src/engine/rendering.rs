use wgpu::util::DeviceExt;

use super::{CameraUniforms, LineVertex, MaterialUniforms, RenderEngine, SurfaceVertex};
use crate::error::RenderResult;
use crate::scene::{LineActor, Scene, SurfaceActor};

struct SurfaceResources {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    material_bind_group: wgpu::BindGroup,
}

struct LineResources {
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
}

/// GPU buffers uploaded for one [`Scene`].
///
/// Geometry is immutable once uploaded; only the camera uniforms are
/// rewritten every frame.
pub struct SceneResources {
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    surfaces: Vec<SurfaceResources>,
    lines: Vec<LineResources>,
}

fn gpu_count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

impl RenderEngine {
    /// Uploads the geometry of every visible, non-empty actor of `scene`.
    pub fn prepare_scene(&self, scene: &Scene) -> SceneResources {
        let camera_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera uniforms"),
            contents: bytemuck::cast_slice(&[CameraUniforms::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera bind group"),
            layout: &self.camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let surfaces = scene
            .surfaces()
            .iter()
            .filter(|actor| actor.visible && !actor.mesh.is_empty())
            .map(|actor| self.upload_surface(actor))
            .collect();
        let lines = scene
            .lines()
            .iter()
            .filter(|actor| actor.visible && actor.num_segments() > 0)
            .map(|actor| self.upload_lines(actor))
            .collect();

        SceneResources {
            camera_buffer,
            camera_bind_group,
            surfaces,
            lines,
        }
    }

    fn upload_surface(&self, actor: &SurfaceActor) -> SurfaceResources {
        let vertices: Vec<SurfaceVertex> = actor
            .mesh
            .positions
            .iter()
            .zip(&actor.mesh.normals)
            .map(|(p, n)| SurfaceVertex {
                position: p.to_array(),
                normal: n.to_array(),
            })
            .collect();
        let indices = actor.mesh.index_buffer();
        log::debug!(
            "uploading surface '{}': {} vertices, {} strip indices",
            actor.name,
            vertices.len(),
            indices.len()
        );

        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("surface vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("surface strip indices"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let material_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("material uniforms"),
            contents: bytemuck::cast_slice(&[MaterialUniforms::from(&actor.material)]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let material_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("material bind group"),
            layout: &self.material_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: material_buffer.as_entire_binding(),
            }],
        });

        SurfaceResources {
            vertex_buffer,
            index_buffer,
            index_count: gpu_count(indices.len()),
            material_bind_group,
        }
    }

    fn upload_lines(&self, actor: &LineActor) -> LineResources {
        let vertices: Vec<LineVertex> = actor
            .positions
            .iter()
            .zip(&actor.colors)
            .map(|(p, c)| LineVertex {
                position: p.to_array(),
                color: c.to_array(),
            })
            .collect();
        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("line vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        LineResources {
            vertex_buffer,
            vertex_count: gpu_count(vertices.len() & !1),
        }
    }

    /// Draws every scene into its viewport and presents the frame.
    pub fn render(&mut self, scenes: &[(&Scene, &SceneResources)]) -> RenderResult<()> {
        for (scene, resources) in scenes {
            let aspect = scene.viewport().aspect_ratio(self.width, self.height);
            let uniforms = CameraUniforms::new(&scene.active_camera().borrow(), aspect);
            self.queue
                .write_buffer(&resources.camera_buffer, 0, bytemuck::cast_slice(&[uniforms]));
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(self.background.x),
                            g: f64::from(self.background.y),
                            b: f64::from(self.background.z),
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            for (scene, resources) in scenes {
                let Some([x, y, w, h]) = self.clamped_rect(scene) else {
                    continue;
                };
                render_pass.set_viewport(x as f32, y as f32, w as f32, h as f32, 0.0, 1.0);
                render_pass.set_scissor_rect(x, y, w, h);
                render_pass.set_bind_group(0, &resources.camera_bind_group, &[]);

                render_pass.set_pipeline(&self.line_pipeline);
                for lines in &resources.lines {
                    render_pass.set_vertex_buffer(0, lines.vertex_buffer.slice(..));
                    render_pass.draw(0..lines.vertex_count, 0..1);
                }

                render_pass.set_pipeline(&self.surface_pipeline);
                for surface in &resources.surfaces {
                    render_pass.set_bind_group(1, &surface.material_bind_group, &[]);
                    render_pass.set_vertex_buffer(0, surface.vertex_buffer.slice(..));
                    render_pass
                        .set_index_buffer(surface.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..surface.index_count, 0, 0..1);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Pixel rectangle of the scene's viewport, clipped to the surface.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn clamped_rect(&self, scene: &Scene) -> Option<[u32; 4]> {
        let [x, y, w, h] = scene.viewport().pixel_rect(self.width, self.height);
        let x0 = (x.round().max(0.0) as u32).min(self.width);
        let y0 = (y.round().max(0.0) as u32).min(self.height);
        let x1 = ((x + w).round().max(0.0) as u32).min(self.width);
        let y1 = ((y + h).round().max(0.0) as u32).min(self.height);
        (x1 > x0 && y1 > y0).then(|| [x0, y0, x1 - x0, y1 - y0])
    }
}
