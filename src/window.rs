//! The panel window: winit for the display and input, pixels for the frame buffer.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use bon::Builder;
use log::{error, info};
use pixels::{Pixels, SurfaceTexture};
use rusttype::Font;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowBuilder};

use crate::canvas::{load_font, Canvas};
use crate::error::PanelError;
use crate::host::{MonitorInfo, PanelHost};
use crate::interaction::{Flow, Key};
use crate::placement::DisplayPlacement;
use crate::scheduler::{FrameScheduler, PanelEvent, TickClock, DEFAULT_TICK_RATE};

#[derive(Debug, Clone, Builder)]
pub struct WindowOptions {
    #[builder(into, default = "Instrument Panel".to_string())]
    pub title: String,
    #[builder(default = DEFAULT_TICK_RATE)]
    pub tick_rate: f64,
    /// Plain window instead of borderless fullscreen
    #[builder(default = false)]
    pub windowed: bool,
    #[builder(default = (1280, 720))]
    pub windowed_size: (u32, u32),
    pub font: Option<PathBuf>,
    /// Monitor origin to move to on startup, if still attached
    pub restore_origin: Option<(i32, i32)>,
}

/// [`PanelHost`] backed by a real window.
pub struct WinitHost {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    /// Without a font the panel is drawn without labels
    font: Option<Font<'static>>,
    width: usize,
    height: usize,
}

impl WinitHost {
    pub fn new(window: Arc<Window>, font: Option<Font<'static>>) -> Result<Self, PanelError> {
        let size = window.inner_size();
        let surface_texture = SurfaceTexture::new(size.width, size.height, Arc::clone(&window));
        let pixels = Pixels::new(size.width, size.height, surface_texture)?;
        Ok(Self {
            window,
            pixels,
            font,
            width: size.width as usize,
            height: size.height as usize,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }

    /// Origin of the monitor the window is on.
    pub fn current_origin(&self) -> Option<(i32, i32)> {
        self.window.current_monitor().map(|monitor| {
            let position = monitor.position();
            (position.x, position.y)
        })
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) -> Result<(), PanelError> {
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(size.width, size.height)?;
        self.pixels.resize_buffer(size.width, size.height)?;
        self.width = size.width as usize;
        self.height = size.height as usize;
        Ok(())
    }
}

impl PanelHost for WinitHost {
    fn monitors(&self) -> Vec<MonitorInfo> {
        self.window
            .available_monitors()
            .map(|monitor| {
                let position = monitor.position();
                MonitorInfo::new(position.x, position.y)
            })
            .collect()
    }

    fn move_window(&mut self, (x, y): (i32, i32)) {
        if self.window.fullscreen().is_some() {
            let target = self
                .window
                .available_monitors()
                .find(|monitor| monitor.position() == PhysicalPosition::new(x, y));
            if target.is_some() {
                self.window.set_fullscreen(Some(Fullscreen::Borderless(target)));
                return;
            }
        }
        self.window.set_outer_position(PhysicalPosition::new(x, y));
    }

    fn canvas(&mut self) -> Canvas<'_> {
        let canvas = Canvas::new(self.pixels.frame_mut(), self.width, self.height);
        match &self.font {
            Some(font) => canvas.with_font(font),
            None => canvas,
        }
    }

    fn present(&mut self) -> Result<(), PanelError> {
        self.pixels
            .render()
            .map_err(|err| PanelError::Present(err.to_string()))
    }
}

/// Maps a physical key to the panel's keyboard surface.
pub fn map_key(code: KeyCode) -> Key {
    match code {
        KeyCode::KeyP => Key::P,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyM => Key::M,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyT => Key::T,
        KeyCode::Escape => Key::Escape,
        KeyCode::ArrowUp => Key::Up,
        KeyCode::ArrowDown => Key::Down,
        KeyCode::ArrowLeft => Key::Left,
        KeyCode::ArrowRight => Key::Right,
        KeyCode::Numpad4 => Key::NumpadLeft,
        KeyCode::Numpad6 => Key::NumpadRight,
        _ => Key::Other,
    }
}

/// Opens the panel window and runs `scheduler` until the panel is closed.
///
/// Ticks come from `ControlFlow::WaitUntil` on the tick clock's deadline. winit only
/// reports `AboutToWait` once every queued event has been handled, which makes it the
/// point where a pending redraw is settled.
pub fn run(scheduler: &mut FrameScheduler, options: WindowOptions) -> Result<(), PanelError> {
    let font = load_font(options.font.as_deref())?;
    let event_loop = EventLoop::new()?;

    let builder = WindowBuilder::new().with_title(&options.title);
    let builder = if options.windowed {
        let (width, height) = options.windowed_size;
        builder.with_inner_size(LogicalSize::new(width as f64, height as f64))
    } else {
        builder.with_fullscreen(Some(Fullscreen::Borderless(None)))
    };
    let window = Arc::new(builder.build(&event_loop)?);
    window.set_cursor_visible(false);

    let mut host = WinitHost::new(window, font)?;
    {
        let (width, height) = host.size();
        let ctx = scheduler.ctx_mut();
        ctx.display_width = width;
        ctx.display_height = height;
        if let Some(origin) = host.current_origin() {
            ctx.set_origin(origin);
        }
    }
    if DisplayPlacement.restore(scheduler.ctx_mut(), &mut host, options.restore_origin) {
        info!("Restored display to {:?}", scheduler.ctx().origin());
    }
    info!(
        "Panel {}x{} at {:?}",
        scheduler.ctx().display_width,
        scheduler.ctx().display_height,
        scheduler.ctx().origin()
    );

    scheduler.prime();
    let mut clock = TickClock::new(options.tick_rate, Instant::now());

    event_loop.run(move |event, elwt| {
        // the rest of the batch is dropped once a quit has been seen
        if scheduler.is_finished() {
            return;
        }
        let mut event_flow = Flow::Continue;
        match event {
            Event::NewEvents(_) => {
                if clock.poll(Instant::now()) {
                    event_flow = scheduler.dispatch(PanelEvent::Tick, &mut host);
                }
            }
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    event_flow = scheduler.dispatch(PanelEvent::Close, &mut host);
                }
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            physical_key: PhysicalKey::Code(code),
                            state: ElementState::Pressed,
                            ..
                        },
                    ..
                } => {
                    event_flow = scheduler.dispatch(PanelEvent::Key(map_key(code)), &mut host);
                }
                WindowEvent::Resized(size) => match host.resize(size) {
                    Ok(()) => {
                        let (width, height) = host.size();
                        let ctx = scheduler.ctx_mut();
                        ctx.display_width = width;
                        ctx.display_height = height;
                    }
                    Err(err) => error!("{err}"),
                },
                _ => {}
            },
            Event::AboutToWait => {
                if let Err(err) = scheduler.settle(true, &mut host) {
                    error!("{err}");
                }
                elwt.set_control_flow(ControlFlow::WaitUntil(clock.deadline()));
            }
            _ => {}
        }

        if event_flow == Flow::Quit {
            elwt.exit();
        }
    })?;

    Ok(())
}
