//! SDL2 and OpenGL application management.
//!
//! This module defines the [`App`] struct which encapsulates the SDL2
//! and OpenGL context necessary for creating a windowed application.

use std::sync::Arc;

use glow::HasContext;

use crate::{
    config::WindowConfig,
    error::{Error, Result},
};

/// The [`App`] struct encapsulates the SDL2 and OpenGL context.
pub struct App {
    pub sdl: sdl2::Sdl,
    pub video_subsystem: sdl2::VideoSubsystem,
    pub window: sdl2::video::Window,
    pub gl_context: sdl2::video::GLContext,
    pub gl: Arc<glow::Context>,
    pub event_pump: sdl2::EventPump,
}

impl App {
    /// Opens a window with an OpenGL 3.3 core context made current on this thread.
    /// The width and height options are ignored if `fullscreen` is set to `true`.
    pub fn new(config: &WindowConfig) -> Result<Self> {
        let sdl = sdl2::init().map_err(Error::window)?;
        let video_subsystem = sdl.video().map_err(Error::window)?;
        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(sdl2::video::GLProfile::Core);
        gl_attr.set_context_version(3, 3);

        let (width, height) = if config.fullscreen {
            let display_mode = video_subsystem
                .current_display_mode(0)
                .map_err(Error::window)?;
            (display_mode.w as u32, display_mode.h as u32)
        } else {
            (config.width, config.height)
        };

        let mut window = video_subsystem
            .window(&config.title, width, height)
            .opengl()
            .resizable()
            .build()
            .map_err(Error::window)?;
        if config.fullscreen {
            window
                .set_fullscreen(sdl2::video::FullscreenType::Desktop)
                .map_err(Error::window)?;
        }

        let gl_context = window.gl_create_context().map_err(Error::window)?;
        window.gl_make_current(&gl_context).map_err(Error::window)?;

        let interval = if config.vsync {
            sdl2::video::SwapInterval::VSync
        } else {
            sdl2::video::SwapInterval::Immediate
        };
        if let Err(e) = video_subsystem.gl_set_swap_interval(interval) {
            log::warn!("Could not set swap interval: {e}");
        }

        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                video_subsystem.gl_get_proc_address(s) as *const _
            })
        };
        let event_pump = sdl.event_pump().map_err(Error::window)?;

        unsafe {
            gl.enable(glow::DEPTH_TEST);
        }

        let app = Self {
            sdl,
            video_subsystem,
            window,
            gl_context,
            gl: Arc::new(gl),
            event_pump,
        };
        let (width, height) = app.resize_viewport();
        log::info!(
            "Opened {}x{} window \"{}\" ({})",
            width,
            height,
            config.title,
            unsafe { app.gl.get_parameter_string(glow::VERSION) }
        );

        Ok(app)
    }

    /// Resizes the GL viewport to the window's drawable area and returns that size in
    /// pixels. On HiDPI displays it is larger than the window size in screen units.
    pub fn resize_viewport(&self) -> (u32, u32) {
        let (width, height) = self.window.drawable_size();
        unsafe {
            self.gl.viewport(0, 0, width as i32, height as i32);
        }
        (width, height)
    }

    /// Captures or frees the mouse for free-look.
    pub fn set_cursor_grabbed(&mut self, grabbed: bool) {
        self.sdl.mouse().set_relative_mouse_mode(grabbed);
        self.window.set_mouse_grab(grabbed);
    }

    /// Clears colour and depth to the background colour.
    pub fn clear(&self) {
        unsafe {
            self.gl.clear_color(0.2, 0.2, 0.2, 1.0);
            self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    pub fn swap(&self) {
        self.window.gl_swap_window();
    }
}
