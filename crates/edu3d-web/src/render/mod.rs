//! WebGPU backend for the scene graph.
//!
//! One lit pass over fixtures and attached models, preceded by a depth-only
//! shadow pass from the key light when the quality tier enables shadows.
//! Per-draw uniforms live in one buffer addressed by dynamic offsets.

mod helpers;
mod mesh;
mod uniforms;

use crate::constants::{DEPTH_FORMAT, DRAW_UNIFORM_STRIDE, MAX_DRAWS, MSAA_SAMPLES, SHADOW_BIAS};
use edu3d_core::{Camera, MeshId, RenderSettings, Renderer, Scene, Topology};
use fnv::FnvHashMap;
use glam::{Mat4, Vec3};
use helpers::PassStyle;
use mesh::GpuMesh;
use uniforms::{pack_globals, DrawUniforms, Globals};
use web_sys as web;

const SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");

struct Pipelines {
    sample_count: u32,
    opaque: wgpu::RenderPipeline,
    blended: wgpu::RenderPipeline,
    lines: wgpu::RenderPipeline,
}

struct Targets {
    _msaa: Option<wgpu::Texture>,
    msaa_view: Option<wgpu::TextureView>,
    _depth: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

struct ShadowMap {
    size: u32,
    _tex: wgpu::Texture,
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
}

#[derive(Clone, Copy)]
struct DrawItem {
    id: MeshId,
    slot: u32,
    topology: Topology,
    transparent: bool,
    cast_shadow: bool,
    depth: f32,
}

pub struct GpuRenderer {
    canvas: web::HtmlCanvasElement,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    shader: wgpu::ShaderModule,
    scene_layout: wgpu::PipelineLayout,
    shadow_pipeline: wgpu::RenderPipeline,
    shadow_bgl: wgpu::BindGroupLayout,
    shadow_sampler: wgpu::Sampler,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    pipelines: Option<Pipelines>,
    targets: Option<Targets>,
    shadow_map: ShadowMap,
    meshes: FnvHashMap<MeshId, GpuMesh>,
    settings: Option<RenderSettings>,
    draw_bytes: Vec<u8>,
    disposed: bool,
}

impl GpuRenderer {
    /// Acquire a WebGPU device for `canvas`. The canvas must already be in the DOM.
    pub async fn new(canvas: web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(SCENE_WGSL.into()),
        });

        let globals_size = std::mem::size_of::<Globals>() as u64;
        let draw_size = std::mem::size_of::<DrawUniforms>() as u64;
        let globals_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bgl"),
            entries: &[helpers::uniform_layout_entry(false, globals_size)],
        });
        let draw_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw_bgl"),
            entries: &[helpers::uniform_layout_entry(true, draw_size)],
        });
        let shadow_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shadow_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: globals_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bg"),
            layout: &globals_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });
        let draw_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("draws"),
            size: DRAW_UNIFORM_STRIDE * MAX_DRAWS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let draw_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw_bg"),
            layout: &draw_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &draw_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(draw_size),
                }),
            }],
        });

        let shadow_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shadow_layout"),
            bind_group_layouts: &[&globals_bgl, &draw_bgl],
            push_constant_ranges: &[],
        });
        let scene_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_layout"),
            bind_group_layouts: &[&globals_bgl, &draw_bgl, &shadow_bgl],
            push_constant_ranges: &[],
        });
        let shadow_pipeline = helpers::make_shadow_pipeline(&device, &shadow_layout, &shader);
        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });
        // placeholder until a profile with shadows configures a real map
        let shadow_map = make_shadow_map(&device, &shadow_bgl, &shadow_sampler, 1);

        log::info!(
            "[gpu] ready format={:?} size={}x{}",
            format,
            width,
            height
        );
        Ok(Self {
            canvas,
            surface,
            device,
            queue,
            config,
            shader,
            scene_layout,
            shadow_pipeline,
            shadow_bgl,
            shadow_sampler,
            globals_buffer,
            globals_bind_group,
            draw_buffer,
            draw_bind_group,
            pipelines: None,
            targets: None,
            shadow_map,
            meshes: FnvHashMap::default(),
            settings: None,
            draw_bytes: Vec::with_capacity(DRAW_UNIFORM_STRIDE as usize * 64),
            disposed: false,
        })
    }

    fn sample_count(&self) -> u32 {
        match self.settings {
            Some(s) if s.antialias => MSAA_SAMPLES,
            _ => 1,
        }
    }

    fn ensure_pipelines(&mut self) {
        let sample_count = self.sample_count();
        if matches!(&self.pipelines, Some(p) if p.sample_count == sample_count) {
            return;
        }
        let alpha = Some(wgpu::BlendState::ALPHA_BLENDING);
        let build = |style: PassStyle| {
            helpers::make_scene_pipeline(
                &self.device,
                &self.scene_layout,
                &self.shader,
                self.config.format,
                sample_count,
                &style,
            )
        };
        let opaque = build(PassStyle {
            label: "mesh_opaque",
            frag_entry: "fs_main",
            topology: wgpu::PrimitiveTopology::TriangleList,
            blend: Some(wgpu::BlendState::REPLACE),
            depth_write: true,
            cull: None,
        });
        let blended = build(PassStyle {
            label: "mesh_blended",
            frag_entry: "fs_main",
            topology: wgpu::PrimitiveTopology::TriangleList,
            blend: alpha,
            depth_write: false,
            cull: None,
        });
        let lines = build(PassStyle {
            label: "lines",
            frag_entry: "fs_line",
            topology: wgpu::PrimitiveTopology::LineList,
            blend: alpha,
            depth_write: false,
            cull: None,
        });
        self.pipelines = Some(Pipelines {
            sample_count,
            opaque,
            blended,
            lines,
        });
        self.targets = None;
    }

    /// Resize the backing store to CSS size times the capped pixel ratio.
    fn apply_size(&mut self) {
        let Some(s) = self.settings else {
            return;
        };
        let width = ((s.width * s.pixel_ratio).round() as u32).max(1);
        let height = ((s.height * s.pixel_ratio).round() as u32).max(1);
        if width != self.config.width || height != self.config.height || self.targets.is_none() {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.targets = None;
            log::debug!("[gpu] backing store {}x{} (ratio {:.2})", width, height, s.pixel_ratio);
        }
    }

    fn ensure_targets(&mut self) {
        if self.targets.is_some() {
            return;
        }
        let sample_count = self.sample_count();
        let (w, h) = (self.config.width, self.config.height);
        let (msaa, msaa_view) = if sample_count > 1 {
            let (t, v) = helpers::create_texture(
                &self.device,
                "msaa_color",
                w,
                h,
                sample_count,
                self.config.format,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            );
            (Some(t), Some(v))
        } else {
            (None, None)
        };
        let (depth, depth_view) = helpers::create_texture(
            &self.device,
            "depth",
            w,
            h,
            sample_count,
            DEPTH_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );
        self.targets = Some(Targets {
            _msaa: msaa,
            msaa_view,
            _depth: depth,
            depth_view,
        });
    }

    /// Upload missing meshes, pack per-draw uniforms and return the draw list,
    /// opaque first then transparent back to front.
    fn collect_draws(&mut self, scene: &Scene, camera: &Camera) -> Vec<DrawItem> {
        let device = &self.device;
        let meshes = &mut self.meshes;
        let bytes = &mut self.draw_bytes;
        bytes.clear();
        let mut draws = Vec::new();
        let mut overflow = false;
        scene.visit_visible_meshes(&mut |mesh, world: Mat4| {
            if draws.len() >= MAX_DRAWS {
                overflow = true;
                return;
            }
            let gpu = meshes
                .entry(mesh.id)
                .or_insert_with(|| GpuMesh::upload(device, &mesh.geometry));
            if gpu.index_count == 0 {
                return;
            }
            let slot = draws.len() as u32;
            let uniforms = DrawUniforms::new(world, &mesh.material, mesh.receive_shadow);
            bytes.extend_from_slice(bytemuck::bytes_of(&uniforms));
            bytes.resize(((slot + 1) as u64 * DRAW_UNIFORM_STRIDE) as usize, 0);
            draws.push(DrawItem {
                id: mesh.id,
                slot,
                topology: gpu.topology,
                transparent: mesh.material.transparent,
                cast_shadow: mesh.cast_shadow,
                depth: (world.transform_point3(Vec3::ZERO) - camera.eye).length(),
            });
        });
        if overflow {
            log::warn!("[gpu] draw list truncated at {}", MAX_DRAWS);
        }
        // Lines are blended too, so they sort with transparent meshes.
        draws.sort_by(|a, b| {
            let ka = a.transparent || a.topology == Topology::Lines;
            let kb = b.transparent || b.topology == Topology::Lines;
            ka.cmp(&kb).then_with(|| {
                if ka {
                    b.depth.total_cmp(&a.depth)
                } else {
                    std::cmp::Ordering::Equal
                }
            })
        });
        draws
    }

    fn sync_shadow_map(&mut self) {
        let size = match self.settings {
            Some(s) if s.shadows => s.shadow_map_size.max(1),
            _ => 1,
        };
        if self.shadow_map.size != size {
            self.shadow_map =
                make_shadow_map(&self.device, &self.shadow_bgl, &self.shadow_sampler, size);
        }
    }
}

fn make_shadow_map(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    size: u32,
) -> ShadowMap {
    let (tex, view) = helpers::create_texture(
        device,
        "shadow_map",
        size,
        size,
        1,
        DEPTH_FORMAT,
        wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
    );
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("shadow_bg"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });
    ShadowMap {
        size,
        _tex: tex,
        view,
        bind_group,
    }
}

impl Renderer for GpuRenderer {
    fn configure(&mut self, settings: &RenderSettings) {
        if self.disposed {
            return;
        }
        self.settings = Some(*settings);
        self.ensure_pipelines();
        self.sync_shadow_map();
        self.targets = None;
        self.apply_size();
        log::info!(
            "[gpu] configure antialias={} shadows={} map={} ratio={:.2}",
            settings.antialias,
            settings.shadows,
            settings.shadow_map_size,
            settings.pixel_ratio
        );
    }

    fn set_pixel_ratio(&mut self, ratio: f64) {
        if let Some(s) = self.settings.as_mut() {
            s.pixel_ratio = ratio;
        }
        self.apply_size();
    }

    fn set_size(&mut self, width: f64, height: f64) {
        if let Some(s) = self.settings.as_mut() {
            s.width = width;
            s.height = height;
        }
        self.apply_size();
    }

    fn render(&mut self, scene: &Scene, camera: &Camera) {
        if self.disposed || self.settings.is_none() {
            return;
        }
        self.ensure_pipelines();
        self.ensure_targets();
        let shadows = self.settings.map(|s| s.shadows).unwrap_or(false);
        let (globals, light_matrix) = pack_globals(scene, camera, shadows, SHADOW_BIAS);
        let draws = self.collect_draws(scene, camera);
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
        if !self.draw_bytes.is_empty() {
            self.queue.write_buffer(&self.draw_buffer, 0, &self.draw_bytes);
        }

        let frame = match self.surface.get_current_texture() {
            Ok(f) => f,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                log::warn!("[gpu] surface error: {:?}", e);
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });

        if light_matrix.is_some() {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shadow_pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.shadow_pipeline);
            pass.set_bind_group(0, &self.globals_bind_group, &[]);
            for d in draws
                .iter()
                .filter(|d| d.cast_shadow && d.topology == Topology::Triangles)
            {
                let Some(gpu) = self.meshes.get(&d.id) else {
                    continue;
                };
                let offset = (d.slot as u64 * DRAW_UNIFORM_STRIDE) as u32;
                pass.set_bind_group(1, &self.draw_bind_group, &[offset]);
                pass.set_vertex_buffer(0, gpu.vertices.slice(..));
                pass.set_index_buffer(gpu.indices.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..gpu.index_count, 0, 0..1);
            }
        }

        if let (Some(pipelines), Some(targets)) = (&self.pipelines, &self.targets) {
            let [r, g, b] = scene.background;
            let (attachment, resolve_target) = match &targets.msaa_view {
                Some(msaa) => (msaa, Some(&view)),
                None => (&view, None),
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: attachment,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_bind_group(0, &self.globals_bind_group, &[]);
            pass.set_bind_group(2, &self.shadow_map.bind_group, &[]);
            for d in &draws {
                let Some(gpu) = self.meshes.get(&d.id) else {
                    continue;
                };
                let pipeline = match (d.topology, d.transparent) {
                    (Topology::Lines, _) => &pipelines.lines,
                    (Topology::Triangles, true) => &pipelines.blended,
                    (Topology::Triangles, false) => &pipelines.opaque,
                };
                let offset = (d.slot as u64 * DRAW_UNIFORM_STRIDE) as u32;
                pass.set_pipeline(pipeline);
                pass.set_bind_group(1, &self.draw_bind_group, &[offset]);
                pass.set_vertex_buffer(0, gpu.vertices.slice(..));
                pass.set_index_buffer(gpu.indices.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..gpu.index_count, 0, 0..1);
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
    }

    fn release_mesh(&mut self, id: MeshId) {
        self.meshes.remove(&id);
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        let cached = self.meshes.len();
        self.meshes.clear();
        self.pipelines = None;
        self.targets = None;
        self.device.destroy();
        self.disposed = true;
        log::info!("[gpu] disposed ({} cached meshes dropped)", cached);
    }

    fn detach(&mut self) {
        self.canvas.remove();
    }
}
