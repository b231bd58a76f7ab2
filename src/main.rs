use std::collections::HashSet;
use std::error::Error;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

use clap::Parser;
use glam::DVec2;
use log::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use gridray::raycast::RayCaster;
use gridray::renderer;
use gridray::scaler::{StretchLut, blit_stretch};
use gridray::viewpoint::{Direction, MOVE_SPEED, TURN_STEP, Turn, Viewpoint};
use gridray::world::{CELL_WIDTH, WorldMap};

// Internal 3D viewport; one ray per column plus the closing edge sample.
const VIEW_WIDTH: usize = 640;
const VIEW_HEIGHT: usize = 480;

#[derive(Parser, Debug)]
#[command(about = "First-person view of a 2D tile map")]
struct Args {
    /// Map file, one row of digit cells per line; commas are ignored
    #[arg(long, default_value = "res/map.csv")]
    map: PathBuf,
}

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    map: WorldMap,
    viewpoint: Viewpoint,
    caster: RayCaster,

    // Internal framebuffer the columns render into
    fb: Vec<u32>,
    scale_lut: StretchLut,

    keys_down: HashSet<KeyCode>,

    frame_counter: u32,
    last_fps_log: Instant,
}

impl App {
    fn new(map: WorldMap) -> Self {
        let position = map.first_open_cell().unwrap_or(DVec2::new(
            map.width() as f64 * CELL_WIDTH / 2.0,
            map.height() as f64 * CELL_WIDTH / 2.0,
        ));

        Self {
            window: None,
            surface: None,
            map,
            // facing -X with an equal-magnitude fov plane: 90 degree view
            viewpoint: Viewpoint::new(position, DVec2::new(-16.0, 0.0), DVec2::new(0.0, 16.0)),
            caster: RayCaster::new(VIEW_WIDTH),

            fb: vec![0; VIEW_WIDTH * VIEW_HEIGHT],
            scale_lut: StretchLut::empty(),

            keys_down: HashSet::new(),

            frame_counter: 0,
            last_fps_log: Instant::now(),
        }
    }

    /// Consume held keys once per frame as discrete movement events: one
    /// translation step per direction key and one rotation step per turn key.
    fn apply_input(&mut self) {
        for key in &self.keys_down {
            match key {
                KeyCode::ArrowUp => self.viewpoint.translate(Direction::Up, MOVE_SPEED),
                KeyCode::ArrowDown => self.viewpoint.translate(Direction::Down, MOVE_SPEED),
                KeyCode::ArrowLeft => self.viewpoint.translate(Direction::Left, MOVE_SPEED),
                KeyCode::ArrowRight => self.viewpoint.translate(Direction::Right, MOVE_SPEED),
                KeyCode::KeyQ => self.viewpoint.rotate(Turn::Left, TURN_STEP),
                KeyCode::KeyE => self.viewpoint.rotate(Turn::Right, TURN_STEP),
                _ => {}
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = Window::default_attributes()
            .with_title("gridray")
            .with_inner_size(LogicalSize::new(800.0, 600.0));

        let window = Rc::new(event_loop.create_window(attributes).expect("create window"));

        let context = softbuffer::Context::new(window.clone()).expect("softbuffer context");
        let surface =
            softbuffer::Surface::new(&context, window.clone()).expect("softbuffer surface");

        let size = window.inner_size();
        self.scale_lut = StretchLut::build(
            size.width as usize,
            size.height as usize,
            VIEW_WIDTH,
            VIEW_HEIGHT,
        );

        self.surface = Some(surface);
        self.window = Some(window);

        self.window.as_ref().unwrap().request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("close requested; stopping");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key,
                        state,
                        ..
                    },
                ..
            } => {
                if let PhysicalKey::Code(code) = physical_key {
                    match state {
                        ElementState::Pressed => {
                            self.keys_down.insert(code);
                        }
                        ElementState::Released => {
                            self.keys_down.remove(&code);
                        }
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                self.apply_input();

                let (window, surface) = match (&self.window, &mut self.surface) {
                    (Some(w), Some(s)) if w.id() == id => (w, s),
                    _ => return,
                };

                let size = window.inner_size();
                let (dw, dh) = (size.width as usize, size.height as usize);
                if dw == 0 || dh == 0 {
                    return; // Minimized window, skip drawing
                }

                surface
                    .resize(
                        NonZeroU32::new(dw as u32).unwrap(),
                        NonZeroU32::new(dh as u32).unwrap(),
                    )
                    .unwrap();

                let hits = self.caster.cast_all(&self.viewpoint, &self.map);
                renderer::render_frame(
                    &mut self.fb,
                    VIEW_WIDTH,
                    VIEW_HEIGHT,
                    &self.map,
                    &self.viewpoint,
                    &hits,
                );

                let mut buf = surface.buffer_mut().expect("buffer_mut");
                blit_stretch(&mut buf, dw, &self.fb, VIEW_WIDTH, &self.scale_lut);
                buf.present().unwrap();

                self.frame_counter += 1;
                let now = Instant::now();
                let elapsed = now.duration_since(self.last_fps_log).as_secs_f32();
                if elapsed >= 1.0 {
                    debug!("fps: {:.1}", self.frame_counter as f32 / elapsed);
                    self.frame_counter = 0;
                    self.last_fps_log = now;
                }

                self.window.as_ref().unwrap().request_redraw();
            }

            WindowEvent::Resized(new_size) => {
                let (dw, dh) = (new_size.width as usize, new_size.height as usize);
                if dw > 0 && dh > 0 {
                    self.scale_lut = StretchLut::build(dw, dh, VIEW_WIDTH, VIEW_HEIGHT);
                }
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

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let map = match WorldMap::load(&args.map) {
        Ok(map) => map,
        Err(err) => {
            error!("failed to load map {}: {err}", args.map.display());
            return Err(err.into());
        }
    };
    info!(
        "loaded {}x{} map from {}",
        map.width(),
        map.height(),
        args.map.display()
    );
    if !map.has_solid_border() {
        // rays that slip out of an unbordered map stop at the step cap
        warn!("map border is not fully solid; escaped rays render as no hit");
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(map);
    event_loop.run_app(&mut app)?;
    Ok(())
}
