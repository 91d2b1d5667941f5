use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, NotCurrentGlContextSurfaceAccessor,
    PossiblyCurrentContext, Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SurfaceAttributesBuilder, WindowSurface};

use glutin_winit::DisplayBuilder;

use raw_window_handle::HasRawWindowHandle;

use std::ffi::CString;
use std::num::NonZeroU32;

use thiserror::Error;

use winit::dpi::{PhysicalSize, Size};
use winit::event::{ElementState, Event, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use gl_wrapper::geometry::{Geometry, GeometryBuilder, GeometryError, VertexAttribute};
use gl_wrapper::program::{Program, ProgramBuilder, ProgramError};
use gl_wrapper::renderer::GlRenderer;

use crate::args::Args;
use crate::quad;

pub struct App {
    event_loop: EventLoop<()>,
    gl_context: PossiblyCurrentContext,
    gl_window: GlWindow,
    renderer: GlRenderer,
    program: Program,
    quad: Geometry,
}

impl App {
    /// Ordered startup: window, context, entry points, shaders, geometry.
    /// Any failure here is fatal, nothing is retried.
    pub fn new(args: &Args) -> Result<Self, AppError> {
        let event_loop = EventLoop::new();
        let window_builder = WindowBuilder::new()
            .with_inner_size(Size::Physical(PhysicalSize::new(args.width, args.height)))
            .with_title("Hello, OpenGL!");
        let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));
        let template = ConfigTemplateBuilder::new();

        let (window, gl_config) = display_builder
            .build(&event_loop, template, |mut configs| configs.next().unwrap())
            .map_err(|e| AppError::WindowCreation(e.to_string()))?;

        let window =
            window.ok_or_else(|| AppError::WindowCreation("no window was created".into()))?;

        let handle = window.raw_window_handle();
        let gl_display = gl_config.display();

        let context_attr = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .build(Some(handle));

        let gl_window = GlWindow::new(window, &gl_config)?;

        let gl_context = unsafe { gl_display.create_context(&gl_config, &context_attr)? }
            .make_current(&gl_window.surface)?;

        gl::load_with(|s| {
            gl_display
                .get_proc_address(CString::new(s).unwrap().as_c_str())
                .cast()
        });

        if !gl::CreateShader::is_loaded() || !gl::DrawElements::is_loaded() {
            return Err(AppError::Loader);
        }

        let renderer = GlRenderer::new();

        let size = gl_window.window.inner_size();
        renderer.resize(size.width, size.height);

        let program = ProgramBuilder::new(
            include_str!("gl_shaders/quad.glsl"),
            include_str!("gl_shaders/solid.glsl"),
        )?
        .build()?;

        let quad = GeometryBuilder::new(&quad::VERTICES)
            .with_attribute(VertexAttribute::Vec3)
            .with_indices(&quad::INDICES)
            .build()?;

        log::debug!("GL setup done, window is {}x{}", size.width, size.height);

        Ok(Self {
            event_loop,
            gl_context,
            gl_window,
            renderer,
            program,
            quad,
        })
    }

    pub fn run(mut self) -> ! {
        log::info!("entering render loop");

        self.event_loop
            .run(move |event, _window_target, control_flow| {
                *control_flow = ControlFlow::Poll;
                match event {
                    Event::WindowEvent { event, .. } => match event {
                        WindowEvent::Resized(size) => {
                            if size.width != 0 && size.height != 0 {
                                self.gl_window.surface.resize(
                                    &self.gl_context,
                                    NonZeroU32::new(size.width).unwrap(),
                                    NonZeroU32::new(size.height).unwrap(),
                                );
                                self.renderer.resize(size.width, size.height);
                            }
                        }
                        WindowEvent::KeyboardInput { input, .. } => {
                            if key_action(input.virtual_keycode, input.state) == KeyAction::Close {
                                control_flow.set_exit();
                            }
                        }
                        WindowEvent::CloseRequested => control_flow.set_exit(),
                        _ => (),
                    },
                    Event::MainEventsCleared => self.gl_window.window.request_redraw(),
                    Event::RedrawRequested(_) => {
                        let [r, g, b] = quad::CLEAR_COLOR;
                        self.renderer.clear_color(r, g, b);
                        self.renderer.draw(&self.quad, &self.program);

                        if let Err(e) = self.gl_window.surface.swap_buffers(&self.gl_context) {
                            log::warn!("failed to swap buffers: {e}");
                        }
                    }
                    _ => (),
                }
            })
    }
}

#[derive(Debug, Eq, PartialEq)]
enum KeyAction {
    Close,
    None,
}

/// Escape is the only key the loop reacts to.
fn key_action(key: Option<VirtualKeyCode>, state: ElementState) -> KeyAction {
    match (key, state) {
        (Some(VirtualKeyCode::Escape), ElementState::Pressed) => KeyAction::Close,
        _ => KeyAction::None,
    }
}

pub struct GlWindow {
    // XXX the surface must be dropped before the window.
    pub surface: Surface<WindowSurface>,
    pub window: Window,
}

impl GlWindow {
    pub fn new(window: Window, config: &Config) -> Result<Self, AppError> {
        let (width, height): (u32, u32) = window.inner_size().into();

        let (width, height) = match (NonZeroU32::new(width), NonZeroU32::new(height)) {
            (Some(w), Some(h)) => (w, h),
            _ => return Err(AppError::WindowCreation("window has zero size".into())),
        };

        let attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            window.raw_window_handle(),
            width,
            height,
        );

        let surface = unsafe { config.display().create_window_surface(config, &attrs)? };

        Ok(Self { window, surface })
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create window: {0}")]
    WindowCreation(String),
    #[error("failed to create GL surface or context: {0}")]
    Context(#[from] glutin::error::Error),
    #[error("failed to load OpenGL entry points")]
    Loader,
    #[error("failed to build shader program: {0}")]
    Program(#[from] ProgramError),
    #[error("failed to upload geometry: {0}")]
    Geometry(#[from] GeometryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_press_closes() {
        assert_eq!(
            key_action(Some(VirtualKeyCode::Escape), ElementState::Pressed),
            KeyAction::Close
        );
    }

    #[test]
    fn escape_release_does_nothing() {
        assert_eq!(
            key_action(Some(VirtualKeyCode::Escape), ElementState::Released),
            KeyAction::None
        );
    }

    #[test]
    fn other_keys_are_ignored() {
        assert_eq!(
            key_action(Some(VirtualKeyCode::Q), ElementState::Pressed),
            KeyAction::None
        );
        assert_eq!(key_action(None, ElementState::Pressed), KeyAction::None);
    }
}
