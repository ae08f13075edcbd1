use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result};
use wgpu::util::DeviceExt;
use winit::window::Window;

use super::first_light_colour;
use crate::composer::MeshStatus;
use crate::math::Colour;
use crate::scene::SharedScene;
use crate::traits::Viewer;
use crate::ui::{show_scene_outline, EguiDebugPanel};

/// Backdrop uniform buffer data for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct BackdropUniform {
    light_colour: [f32; 4],
}

impl BackdropUniform {
    fn new(colour: Colour) -> Self {
        let [r, g, b] = colour.to_linear_rgb();
        Self {
            light_colour: [r, g, b, 1.0],
        }
    }
}

struct GpuState {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    backdrop_pipeline: wgpu::RenderPipeline,
    backdrop_bind_group: wgpu::BindGroup,
    backdrop_buffer: wgpu::Buffer,
    egui_renderer: egui_wgpu::Renderer,
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,
}

/// Window viewer: paints a backdrop tinted by the scene light and the egui
/// overlay (scene outline and debug panel). Redraw requests collapse into
/// a single `request_redraw` until the next paint.
pub struct WindowViewer {
    window: Arc<Window>,
    scenes: RefCell<Vec<SharedScene>>,
    redraw_pending: Cell<bool>,
    gpu: RefCell<GpuState>,
}

impl WindowViewer {
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to find appropriate adapter")?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .context("Failed to create device")?;

        let surface_config = Self::create_surface_config(&surface, &adapter, size)?;
        surface.configure(&device, &surface_config);

        let backdrop_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Backdrop Buffer"),
            contents: bytemuck::cast_slice(&[BackdropUniform::new(Colour::WHITE)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let (backdrop_pipeline, backdrop_bind_group) =
            Self::create_backdrop_pipeline(&device, &backdrop_buffer, surface_config.format);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &device,
            surface_config.format,
            egui_wgpu::RendererOptions::default(),
        );

        log::info!(
            "Viewer initialized: {}x{} ({:?})",
            size.width,
            size.height,
            surface_config.format
        );

        Ok(Self {
            window,
            scenes: RefCell::new(Vec::new()),
            redraw_pending: Cell::new(false),
            gpu: RefCell::new(GpuState {
                device,
                queue,
                surface,
                surface_config,
                backdrop_pipeline,
                backdrop_bind_group,
                backdrop_buffer,
                egui_renderer,
                egui_state,
                egui_ctx,
            }),
        })
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        size: winit::dpi::PhysicalSize<u32>,
    ) -> Result<wgpu::SurfaceConfiguration> {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("Surface reports no supported formats")?;

        Ok(wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        })
    }

    fn create_backdrop_pipeline(
        device: &wgpu::Device,
        backdrop_buffer: &wgpu::Buffer,
        surface_format: wgpu::TextureFormat,
    ) -> (wgpu::RenderPipeline, wgpu::BindGroup) {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Backdrop Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("backdrop.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("backdrop_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: backdrop_buffer.as_entire_binding(),
            }],
            label: Some("backdrop_bind_group"),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Backdrop Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Backdrop Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        (pipeline, bind_group)
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn resize(&self, size: winit::dpi::PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        let mut gpu = self.gpu.borrow_mut();
        gpu.surface_config.width = size.width;
        gpu.surface_config.height = size.height;
        gpu.surface.configure(&gpu.device, &gpu.surface_config);
        drop(gpu);
        self.update();
    }

    /// Forward a window event to egui. Returns true if egui consumed it.
    pub fn handle_event(&self, event: &winit::event::WindowEvent) -> bool {
        let response = self
            .gpu
            .borrow_mut()
            .egui_state
            .on_window_event(&self.window, event);
        if response.repaint {
            self.update();
        }
        response.consumed
    }

    /// Paint one frame. Panel edits made during this frame run their
    /// observers before the frame is submitted.
    pub fn render(
        &self,
        panel: &mut EguiDebugPanel,
        status: &MeshStatus,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        self.redraw_pending.set(false);

        let scenes: Vec<SharedScene> = self.scenes.borrow().iter().map(Rc::clone).collect();
        let light_colour = first_light_colour(&scenes).unwrap_or(Colour::BLACK);

        let mut gpu = self.gpu.borrow_mut();
        let gpu = &mut *gpu;

        gpu.queue.write_buffer(
            &gpu.backdrop_buffer,
            0,
            bytemuck::cast_slice(&[BackdropUniform::new(light_colour)]),
        );

        let output = gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Backdrop Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&gpu.backdrop_pipeline);
            render_pass.set_bind_group(0, &gpu.backdrop_bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }

        let raw_input = gpu.egui_state.take_egui_input(&self.window);
        let full_output = gpu.egui_ctx.run(raw_input, |ctx| {
            show_scene_outline(ctx, &scenes, status);
            panel.show(ctx);
        });

        gpu.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);

        let tris = gpu
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.surface_config.width, gpu.surface_config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &tris,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();

            gpu.egui_renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        // egui asks for another frame while a popup or animation is live
        let wants_repaint = full_output
            .viewport_output
            .get(&egui::ViewportId::ROOT)
            .is_some_and(|v| v.repaint_delay.is_zero());
        if wants_repaint {
            self.update();
        }

        Ok(())
    }

    /// Reconfigure the surface after it was lost or became outdated
    pub fn reconfigure(&self) {
        let gpu = self.gpu.borrow();
        gpu.surface.configure(&gpu.device, &gpu.surface_config);
    }
}

impl Viewer for WindowViewer {
    fn add_scene_object(&self, scene: SharedScene) {
        self.scenes.borrow_mut().push(scene);
    }

    fn update(&self) {
        if !self.redraw_pending.replace(true) {
            self.window.request_redraw();
        }
    }
}
