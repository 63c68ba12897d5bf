use std::collections::HashSet;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use raycast_maze::clock::{FpsCounter, FrameClock, FrameSpeeds};
use raycast_maze::input::Command;
use raycast_maze::scaler::{ScaleLut, blit_nearest};
use raycast_maze::{
    CameraState, Config, FrameBuffer, Grid, InputState, RenderMode, RenderSettings, TextureSet,
    render_frame,
};

const TITLE: &str = "Maze 3D";

#[derive(Parser)]
#[command(name = "raycast-maze", about = "First-person ray-cast maze viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Map file (overrides the config)
    #[arg(short, long)]
    map: Option<PathBuf>,

    /// Render width in pixels
    #[arg(long)]
    width: Option<usize>,

    /// Render height in pixels
    #[arg(long)]
    height: Option<usize>,

    /// Start in flat-colour mode
    #[arg(long)]
    flat: bool,

    /// Render one frame to this PNG and exit, without opening a window
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

/// Everything the frame loop owns besides the window.
struct Scene {
    grid: Grid,
    camera: CameraState,
    textures: TextureSet,
    settings: RenderSettings,
    config: Config,
}

impl Scene {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(map) = &cli.map {
            config.map = Some(map.clone());
        }
        if let Some(w) = cli.width {
            config.screen_width = w;
        }
        if let Some(h) = cli.height {
            config.screen_height = h;
        }
        if cli.flat {
            config.render_mode = RenderMode::Flat;
        }
        config.validate()?;

        let grid = match &config.map {
            Some(path) => Grid::load(path)?,
            None => Grid::builtin(),
        };
        config.validate_start(&grid)?;

        let fallback = config.fallback_color.packed();
        let textures = if config.textures.is_empty() {
            TextureSet::procedural(config.texture_size(), fallback)
        } else {
            TextureSet::load(&config.textures, config.texture_size(), fallback)
        };
        if usize::from(grid.max_tile()) > textures.len() {
            tracing::warn!(
                max_tile = grid.max_tile(),
                textures = textures.len(),
                "map uses more materials than textures; extra walls use the fallback colour"
            );
        }

        let settings = RenderSettings::from(&config);
        for (surface, id) in settings.unresolved_textures(&textures) {
            tracing::warn!(
                surface,
                id,
                textures = textures.len(),
                "texture id not loaded; drawing a flat colour instead"
            );
        }

        let camera = config.initial_camera();
        tracing::info!(
            width = config.screen_width,
            height = config.screen_height,
            fov = camera.fov_degrees(),
            mode = ?config.render_mode,
            "scene ready"
        );

        Ok(Self {
            grid,
            camera,
            textures,
            settings,
            config,
        })
    }
}

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    scene: Scene,

    // Internal buffer at the configured resolution
    frame: FrameBuffer,
    scale_lut: ScaleLut,

    // Input and timing
    keys_down: HashSet<KeyCode>,
    clock: FrameClock,
    fps: FpsCounter,
}

impl App {
    fn new(scene: Scene) -> Self {
        let frame = FrameBuffer::new(scene.config.screen_width, scene.config.screen_height);
        Self {
            window: None,
            surface: None,
            scene,
            frame,
            scale_lut: ScaleLut::empty(),
            keys_down: HashSet::new(),
            clock: FrameClock::new(),
            fps: FpsCounter::new(),
        }
    }

    /// Sample input once and move the camera by this frame's share of the speeds.
    fn tick(&mut self) {
        let dt = self.clock.tick();
        let speeds = FrameSpeeds::from_frame_time(
            dt,
            self.scene.config.move_speed,
            self.scene.config.rot_speed,
        );
        let input = InputState::from_keys(&self.keys_down);
        if !input.is_idle() {
            self.scene
                .camera
                .update(&self.scene.grid, &input, speeds.move_speed, speeds.rot_speed);
        }
    }

    fn handle_command(&mut self, command: Command, event_loop: &ActiveEventLoop) {
        match command {
            Command::ToggleRenderMode => {
                self.scene.settings.mode = self.scene.settings.mode.toggled();
                tracing::info!(mode = ?self.scene.settings.mode, "render mode changed");
            }
            Command::Quit => event_loop.exit(),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(LogicalSize::new(
                self.scene.config.screen_width as f64,
                self.scene.config.screen_height as f64,
            ));

        let window = match event_loop.create_window(attributes) {
            Ok(w) => Rc::new(w),
            Err(err) => {
                tracing::error!(%err, "failed to create window");
                event_loop.exit();
                return;
            }
        };
        let surface = softbuffer::Context::new(window.clone())
            .and_then(|context| softbuffer::Surface::new(&context, window.clone()));
        match surface {
            Ok(surface) => self.surface = Some(surface),
            Err(err) => {
                tracing::error!(%err, "failed to create softbuffer surface");
                event_loop.exit();
                return;
            }
        }

        self.clock.reset();
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("close requested; stopping");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => match state {
                ElementState::Pressed => {
                    self.keys_down.insert(code);
                    if !repeat {
                        if let Some(command) = Command::from_key(code) {
                            self.handle_command(command, event_loop);
                        }
                    }
                }
                ElementState::Released => {
                    self.keys_down.remove(&code);
                }
            },

            WindowEvent::RedrawRequested => {
                self.tick();

                let (window, surface) = match (&self.window, &mut self.surface) {
                    (Some(w), Some(s)) if w.id() == id => (w, s),
                    _ => return,
                };

                let size = window.inner_size();
                let (Some(dw), Some(dh)) =
                    (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                else {
                    return; // Minimized window, skip drawing
                };
                if let Err(err) = surface.resize(dw, dh) {
                    tracing::error!(%err, "surface resize failed");
                    return;
                }
                let (dw, dh) = (dw.get() as usize, dh.get() as usize);
                if !self.scale_lut.matches(dw, dh) {
                    self.scale_lut =
                        ScaleLut::new(dw, dh, self.frame.width(), self.frame.height());
                }

                let scene = &self.scene;
                render_frame(
                    &mut self.frame,
                    &scene.grid,
                    &scene.camera,
                    &scene.textures,
                    &scene.settings,
                );

                let mut buf = match surface.buffer_mut() {
                    Ok(buf) => buf,
                    Err(err) => {
                        tracing::error!(%err, "no surface buffer");
                        return;
                    }
                };
                blit_nearest(&mut buf, self.frame.pixels(), self.frame.width(), &self.scale_lut);
                if let Err(err) = buf.present() {
                    tracing::error!(%err, "present failed");
                }

                if let Some(fps) = self.fps.frame() {
                    tracing::debug!(fps, "frame rate");
                    window.set_title(&format!("{TITLE} | {fps:.1} fps"));
                }

                window.request_redraw();
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let scene = Scene::from_cli(&cli)?;

    if let Some(path) = &cli.snapshot {
        let mut frame = FrameBuffer::new(scene.config.screen_width, scene.config.screen_height);
        let stats = render_frame(
            &mut frame,
            &scene.grid,
            &scene.camera,
            &scene.textures,
            &scene.settings,
        );
        frame
            .save_png(path)
            .with_context(|| format!("writing snapshot {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            walls = stats.walls,
            escaped = stats.escaped,
            "snapshot written"
        );
        return Ok(());
    }

    let event_loop = EventLoop::new().context("creating event loop")?;
    // Redraws are requested continuously, so the loop never idles.
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(scene);
    event_loop.run_app(&mut app).context("event loop failed")?;
    Ok(())
}
