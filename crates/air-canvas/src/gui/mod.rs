//! A minimal window system integration: shows images and reports key presses.
//!
//! The event loop has to own the main thread on some platforms, so [`run`] keeps it there and moves
//! the application code to a background thread. The two sides talk through [`show_image`] and
//! [`poll_input`].

mod gpu;
mod renderer;

use std::{
    collections::HashMap,
    mem,
    panic::{catch_unwind, AssertUnwindSafe},
    process,
    rc::Rc,
    sync::{Mutex, MutexGuard},
};

use anyhow::anyhow;
use once_cell::sync::OnceCell;
use winit::{
    event::{ElementState, Event, KeyboardInput, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopBuilder, EventLoopProxy},
    window::WindowId,
};

use crate::{
    image::{Image, Resolution},
    termination::Termination,
};

use self::{
    gpu::Gpu,
    renderer::{Renderer, Window},
};

pub use winit::event::VirtualKeyCode as Key;

/// User input received by any window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyPressed(Key),
    /// The user asked to close a window.
    Closed,
}

struct Gui {
    gpu: Rc<Gpu>,
    windows: HashMap<String, Renderer>,
    win_id_to_key: HashMap<WindowId, String>,
}

impl Gui {
    fn new() -> anyhow::Result<Self> {
        Ok(Self {
            gpu: Rc::new(pollster::block_on(Gpu::open())?),
            windows: HashMap::new(),
            win_id_to_key: HashMap::new(),
        })
    }

    fn renderer_mut(&mut self, win: WindowId) -> Option<&mut Renderer> {
        let key = self.win_id_to_key.get(&win)?;
        self.windows.get_mut(key)
    }

    fn show(
        &mut self,
        target: &winit::event_loop::EventLoopWindowTarget<Msg>,
        key: String,
        res: Resolution,
        data: Vec<u8>,
    ) -> anyhow::Result<()> {
        if !self.windows.contains_key(&key) {
            log::debug!("creating window for image '{key}' at {res}");

            let win = Window::open(target, &key, res)?;
            let renderer = Renderer::new(win, self.gpu.clone())?;
            self.win_id_to_key.insert(renderer.window().id(), key.clone());
            self.windows.insert(key.clone(), renderer);
        }

        if let Some(renderer) = self.windows.get_mut(&key) {
            renderer.update_texture(res, &data);
            renderer.window().request_redraw();
        }
        Ok(())
    }

    fn run(mut self, event_loop: EventLoop<Msg>) -> ! {
        event_loop.run(move |event, target, flow| {
            *flow = ControlFlow::Wait;
            match event {
                Event::UserEvent(Msg::Image { key, res, data }) => {
                    if let Err(e) = self.show(target, key, res, data) {
                        log::error!("failed to display image: {e:#}");
                        process::exit(1);
                    }
                }
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::KeyboardInput {
                        input:
                            KeyboardInput {
                                state: ElementState::Pressed,
                                virtual_keycode: Some(key),
                                ..
                            },
                        ..
                    } => push_input(InputEvent::KeyPressed(key)),
                    WindowEvent::CloseRequested => push_input(InputEvent::Closed),
                    _ => {}
                },
                Event::RedrawRequested(window) => {
                    if let Some(renderer) = self.renderer_mut(window) {
                        renderer.redraw();
                    }
                }
                _ => {}
            }
        });
    }
}

#[derive(Debug)]
enum Msg {
    Image {
        key: String,
        res: Resolution,
        data: Vec<u8>,
    },
}

/// A connection to the event loop running on the main thread.
struct Display {
    proxy: Mutex<EventLoopProxy<Msg>>,
    input: Mutex<Vec<InputEvent>>,
}

static DISPLAY: OnceCell<Display> = OnceCell::new();

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn push_input(event: InputEvent) {
    if let Some(display) = DISPLAY.get() {
        lock(&display.input).push(event);
    }
}

fn send(msg: Msg) -> anyhow::Result<()> {
    let display = DISPLAY
        .get()
        .ok_or_else(|| anyhow!("GUI not initialized; call this from `air_canvas::main`"))?;
    lock(&display.proxy)
        .send_event(msg)
        .map_err(|_closed| anyhow!("GUI event loop has exited"))
}

pub(crate) fn run<F, R>(cb: F) -> !
where
    F: FnOnce() -> R + Send + 'static,
    R: Termination + Send,
{
    let event_loop = EventLoopBuilder::with_user_event().build();
    let display = Display {
        proxy: Mutex::new(event_loop.create_proxy()),
        input: Mutex::new(Vec::new()),
    };
    if DISPLAY.set(display).is_err() {
        log::error!("GUI already initialized");
        process::exit(1);
    }

    let gui = match Gui::new() {
        Ok(gui) => gui,
        Err(e) => {
            log::error!("{}", gpu_failure_message(&e));
            process::exit(1);
        }
    };

    // The event loop is ready; run the application code on another thread.
    std::thread::spawn(move || match catch_unwind(AssertUnwindSafe(cb)) {
        Ok(r) => {
            if r.is_success() {
                process::exit(0);
            } else {
                r.log_failure();
                process::exit(1);
            }
        }
        Err(_payload) => {
            // The panic hook has already printed the message. 101 matches libstd.
            process::exit(101);
        }
    });

    gui.run(event_loop);
}

fn gpu_failure_message(e: &anyhow::Error) -> String {
    format!(
        "failed to initialize GPU: {e:#} (air canvas needs a graphics adapter with Vulkan, Metal \
         or DirectX 12 support to show its window)"
    )
}

/// Displays an image in the window identified by `key`.
///
/// The window is created when an image is first shown under a given key.
pub fn show_image(key: impl Into<String>, image: &Image) -> anyhow::Result<()> {
    // Image data is RGBA8 already, so no conversion is needed before the upload.
    send(Msg::Image {
        key: key.into(),
        res: image.resolution(),
        data: image.data().to_vec(),
    })
}

/// Returns and clears the input events received since the last call.
pub fn poll_input() -> Vec<InputEvent> {
    match DISPLAY.get() {
        Some(display) => mem::take(&mut *lock(&display.input)),
        None => Vec::new(),
    }
}
