pub mod draw;
pub mod font;
pub mod pipeline;
pub mod sprite_atlas;
pub mod viewport;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, trace};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

pub use draw::{Align, Color, DrawCmd, DrawList};
use pipeline::{SpritePipeline, SpriteVertex, create_sprite_pipeline, orthographic_projection};
use sprite_atlas::{SpriteAtlas, SpriteData, WHITE_TEXEL};
use viewport::{Viewport, letterbox};

use crate::assets::Assets;
use crate::error::RenderError;
use crate::geometry::Rect;

// ── Draw list → vertices (pure) ──────────────────────────────────────────────

fn push_quad(out: &mut Vec<SpriteVertex>, rect: Rect, uv: SpriteData, flip_x: bool, color: Color) {
    let (x0, y0) = (rect.x as f32, rect.y as f32);
    let (x1, y1) = (rect.right() as f32, rect.bottom() as f32);
    let (mut u0, v0) = (uv.uv_min[0], uv.uv_min[1]);
    let (mut u1, v1) = (uv.uv_max[0], uv.uv_max[1]);
    if flip_x {
        std::mem::swap(&mut u0, &mut u1);
    }
    let color = color.0;
    let v = |x, y, u, w| SpriteVertex { position: [x, y], uv: [u, w], color };
    out.extend_from_slice(&[
        v(x0, y0, u0, v0),
        v(x1, y0, u1, v0),
        v(x0, y1, u0, v1),
        v(x1, y0, u1, v0),
        v(x1, y1, u1, v1),
        v(x0, y1, u0, v1),
    ]);
}

/// Triangulate a draw list against the atlas lookup, six vertices per quad.
/// Sprites missing from the atlas are skipped.
pub fn build_vertices(list: &DrawList, sprites: &HashMap<String, SpriteData>) -> Vec<SpriteVertex> {
    let mut out = Vec::with_capacity(list.len() * 6);
    let white = sprites.get(WHITE_TEXEL).copied();
    for cmd in list.commands() {
        match cmd {
            DrawCmd::Sprite { name, rect, flip_x, tint } => match sprites.get(name) {
                Some(uv) => push_quad(&mut out, *rect, *uv, *flip_x, *tint),
                None => trace!(sprite = %name, "not in atlas"),
            },
            DrawCmd::Fill { rect, color } => {
                if let Some(uv) = white {
                    push_quad(&mut out, *rect, uv, false, *color);
                }
            }
            DrawCmd::Text { text, x, y, scale, color, align } => {
                for (glyph, rect) in font::layout(text, *x, *y, *scale, *align) {
                    if let Some(uv) = sprites.get(&glyph) {
                        push_quad(&mut out, rect, *uv, false, *color);
                    }
                }
            }
        }
    }
    out
}

// ── Renderer ─────────────────────────────────────────────────────────────────

pub struct Renderer {
    pub window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: SpritePipeline,
    projection_bind_group: wgpu::BindGroup,
    atlas: SpriteAtlas,
    atlas_bind_group: wgpu::BindGroup,
    /// Logical screen every draw list is laid out against.
    logical: (u32, u32),
    viewport: Viewport,
    /// Grown on demand, never shrunk.
    vertex_buffer: Option<wgpu::Buffer>,
    vertex_capacity: u32,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, assets: &Assets, logical: (u32, u32)) -> Result<Self, RenderError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(Arc::clone(&window))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await?;
        let (device, queue) = adapter.request_device(&wgpu::DeviceDescriptor::default()).await?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or(RenderError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let pipeline = create_sprite_pipeline(&device, format);

        let proj = orthographic_projection(logical.0 as f32, logical.1 as f32);
        let projection_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("projection_buffer"),
            contents: bytemuck::cast_slice(&proj),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let projection_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("projection_bg"),
            layout: &pipeline.projection_bind_group_layout,
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: projection_buffer.as_entire_binding() }],
        });

        let glyphs = font::glyph_images();
        let atlas = SpriteAtlas::build(
            &device,
            &queue,
            assets.images().chain(glyphs.iter().map(|(name, img)| (name.as_str(), img))),
        );
        let atlas_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("atlas_bg"),
            layout: &pipeline.atlas_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&atlas.texture_view),
                },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(&atlas.sampler) },
            ],
        });
        info!(format = ?format, sprites = atlas.sprites.len(), "renderer ready");

        Ok(Self {
            window,
            surface,
            device,
            queue,
            viewport: letterbox((config.width, config.height), logical),
            config,
            pipeline,
            projection_bind_group,
            atlas,
            atlas_bind_group,
            logical,
            vertex_buffer: None,
            vertex_capacity: 0,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.viewport = letterbox((new_size.width, new_size.height), self.logical);
    }

    fn upload(&mut self, vertices: &[SpriteVertex]) {
        let count = vertices.len() as u32;
        if count > self.vertex_capacity || self.vertex_buffer.is_none() {
            let capacity = count.next_power_of_two().max(1024);
            self.vertex_buffer = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("sprite_vertex_buffer"),
                size: u64::from(capacity) * std::mem::size_of::<SpriteVertex>() as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.vertex_capacity = capacity;
        }
        if let Some(buffer) = &self.vertex_buffer {
            self.queue.write_buffer(buffer, 0, bytemuck::cast_slice(vertices));
        }
    }

    /// Present one frame of `list`, letterboxed into the window.
    pub fn render(&mut self, list: &DrawList) -> Result<(), wgpu::SurfaceError> {
        let vertices = build_vertices(list, &self.atlas.sprites);
        if !vertices.is_empty() {
            self.upload(&vertices);
        }

        let frame = self.surface.get_current_texture()?;
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("frame") });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sprites"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let vp = self.viewport;
            let visible = !vertices.is_empty() && vp.width >= 1.0 && vp.height >= 1.0;
            if let Some(buffer) = self.vertex_buffer.as_ref().filter(|_| visible) {
                let byte_len = (vertices.len() * std::mem::size_of::<SpriteVertex>()) as u64;
                pass.set_viewport(vp.x, vp.y, vp.width, vp.height, 0.0, 1.0);
                pass.set_pipeline(&self.pipeline.render_pipeline);
                pass.set_bind_group(0, &self.projection_bind_group, &[]);
                pass.set_bind_group(1, &self.atlas_bind_group, &[]);
                pass.set_vertex_buffer(0, buffer.slice(..byte_len));
                pass.draw(0..vertices.len() as u32, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
