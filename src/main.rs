use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use futures::executor::LocalPool;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use scene_composer::cli::Cli;
use scene_composer::loaders::GltfMeshLoader;
use scene_composer::traits::Viewer;
use scene_composer::ui::EguiDebugPanel;
use scene_composer::viewer::{HeadlessViewer, WindowViewer};
use scene_composer::{MeshStatus, SceneComposer, SceneConfig};

// === Constants ===

const INITIAL_WINDOW_WIDTH: u32 = 800;
const INITIAL_WINDOW_HEIGHT: u32 = 600;
const MESH_POLL_INTERVAL: Duration = Duration::from_millis(50);

struct App {
    config: SceneConfig,
    pool: LocalPool,
    panel: EguiDebugPanel,
    viewer: Option<Rc<WindowViewer>>,
    composer: Option<SceneComposer>,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: SceneConfig) -> Self {
        Self {
            config,
            pool: LocalPool::new(),
            panel: EguiDebugPanel::default(),
            viewer: None,
            composer: None,
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = event_loop
            .create_window(
                Window::default_attributes()
                    .with_title("Scene Composer")
                    .with_inner_size(winit::dpi::LogicalSize::new(
                        INITIAL_WINDOW_WIDTH,
                        INITIAL_WINDOW_HEIGHT,
                    )),
            )
            .context("Failed to create window")?;

        let viewer = Rc::new(
            pollster::block_on(WindowViewer::new(Arc::new(window)))
                .context("Failed to initialize viewer")?,
        );
        let dyn_viewer: Rc<dyn Viewer> = viewer.clone();

        let mut composer = SceneComposer::new(dyn_viewer, self.config.clone());
        composer.compose(&GltfMeshLoader::new(), &self.pool.spawner(), &mut self.panel)?;

        self.viewer = Some(viewer);
        self.composer = Some(composer);
        Ok(())
    }

    fn mesh_status(&self) -> MeshStatus {
        self.composer
            .as_ref()
            .map(SceneComposer::mesh_status)
            .unwrap_or_default()
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            log::error!("{:#}", e);
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(viewer) = self.viewer.clone() else {
            return;
        };

        // Let egui handle the event first
        if viewer.handle_event(&event) {
            return;
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => viewer.resize(size),
            WindowEvent::RedrawRequested => {
                let status = self.mesh_status();
                match viewer.render(&mut self.panel, &status) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        viewer.reconfigure();
                        viewer.update();
                    }
                    Err(e) => log::error!("Render error: {}", e),
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // Mesh continuations run here, on the event loop thread
        self.pool.run_until_stalled();

        if self.mesh_status().is_pending() {
            event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + MESH_POLL_INTERVAL));
        } else {
            event_loop.set_control_flow(ControlFlow::Wait);
        }
    }
}

fn run_headless(config: SceneConfig, dump: bool) -> Result<()> {
    let viewer = Rc::new(HeadlessViewer::new());
    let mut panel = EguiDebugPanel::default();
    let mut pool = LocalPool::new();

    let mut composer = SceneComposer::new(viewer.clone(), config);
    composer.compose(&GltfMeshLoader::new(), &pool.spawner(), &mut panel)?;

    // Drive the mesh continuation to completion
    pool.run();
    viewer.take_redraw();

    log::info!(
        "Headless run: {} redraw requests, {} frames, mesh {}",
        viewer.update_requests(),
        viewer.frames_presented(),
        composer.mesh_status()
    );

    if dump {
        let summary = composer.scene().borrow().summary();
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    if let MeshStatus::Failed(err) = composer.mesh_status() {
        anyhow::bail!("Mesh load failed: {}", err);
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = SceneConfig::resolve(cli.config.as_deref(), cli.model.as_deref())?;

    if cli.headless {
        return run_headless(config, cli.dump);
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);

    println!("Scene Composer - Escape to quit");
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
