//! Per-frame input and timing state.
//!
//! [`FrameContext`] owns the camera together with everything the event handlers need
//! between frames. It is created once at startup and passed to the input and render steps
//! in order: [`FrameContext::begin_frame`], [`FrameContext::handle_event`] for each polled
//! event, [`FrameContext::process_input`], then the draw.

use std::{collections::HashSet, time::Instant};

use glam::{Mat4, Vec2};
use sdl2::{event::Event, event::WindowEvent, keyboard::Keycode, mouse::MouseButton};

use crate::camera::{Camera, Direction};

/// The keys currently held down.
#[derive(Debug, Default)]
pub struct KeyboardState {
    pub down: HashSet<Keycode>,
}

/// Whether the window wants the cursor captured after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorRequest {
    Grab,
    Release,
}

pub struct FrameContext {
    pub camera: Camera,
    pub keyboard: KeyboardState,
    pub delta_time: f32,
    last_frame: Instant,
    last_cursor: Option<Vec2>,
    cursor_grabbed: bool,
    viewport: (u32, u32),
}

impl FrameContext {
    pub fn new(camera: Camera, viewport: (u32, u32), now: Instant) -> Self {
        Self {
            camera,
            keyboard: KeyboardState::default(),
            delta_time: 0.0,
            last_frame: now,
            last_cursor: None,
            cursor_grabbed: false,
            viewport,
        }
    }

    /// Updates `delta_time` from the previous frame start.
    pub fn begin_frame(&mut self, now: Instant) {
        self.delta_time = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
    }

    /// Feeds one window event into the camera and key state.
    ///
    /// Returns a cursor request when the event should change cursor capture.
    pub fn handle_event(&mut self, event: &Event) -> Option<CursorRequest> {
        match event {
            Event::KeyDown {
                keycode: Some(key), ..
            } => return self.key_down(*key),
            Event::KeyUp {
                keycode: Some(key), ..
            } => self.key_up(*key),
            Event::MouseButtonDown { mouse_btn, .. } => return self.mouse_button_down(*mouse_btn),
            Event::MouseMotion {
                x, y, xrel, yrel, ..
            } => self.mouse_motion(
                Vec2::new(*x as f32, *y as f32),
                Vec2::new(*xrel as f32, *yrel as f32),
            ),
            Event::MouseWheel { y, .. } => self.scroll(*y as f32),
            Event::Window {
                win_event: WindowEvent::Resized(width, height),
                ..
            } => self.resize(*width, *height),
            _ => {}
        }
        None
    }

    pub fn key_down(&mut self, key: Keycode) -> Option<CursorRequest> {
        if key == Keycode::Escape {
            self.set_cursor_grabbed(false);
            return Some(CursorRequest::Release);
        }
        self.keyboard.down.insert(key);
        None
    }

    pub fn key_up(&mut self, key: Keycode) {
        self.keyboard.down.remove(&key);
    }

    pub fn mouse_button_down(&mut self, button: MouseButton) -> Option<CursorRequest> {
        if button == MouseButton::Left && !self.cursor_grabbed {
            self.set_cursor_grabbed(true);
            return Some(CursorRequest::Grab);
        }
        None
    }

    /// Rotates the camera. While grabbed the relative motion is used directly, otherwise
    /// the delta is taken from successive absolute positions.
    pub fn mouse_motion(&mut self, position: Vec2, relative: Vec2) {
        if self.cursor_grabbed {
            // y grows downwards on screen
            self.camera
                .process_mouse_movement(relative.x, -relative.y, true);
        } else {
            self.cursor_moved(position);
        }
    }

    /// Scroll drives the zoom, never the orientation.
    pub fn scroll(&mut self, y: f32) {
        self.camera.process_mouse_scroll(y);
    }

    pub fn resize(&mut self, width: i32, height: i32) {
        self.set_viewport((width.max(0) as u32, height.max(0) as u32));
    }

    /// Sets the viewport size in pixels. Zero sizes are raised to one.
    pub fn set_viewport(&mut self, (width, height): (u32, u32)) {
        self.viewport = (width.max(1), height.max(1));
    }

    /// Turns an absolute cursor position into a pointer delta. The first sample only
    /// records the position.
    pub fn cursor_moved(&mut self, position: Vec2) {
        if let Some(last) = self.last_cursor {
            let offset = position - last;
            self.camera.process_mouse_movement(offset.x, -offset.y, true);
        }
        self.last_cursor = Some(position);
    }

    /// Moves the camera for every held movement key.
    pub fn process_input(&mut self) {
        const BINDINGS: [(Keycode, Direction); 4] = [
            (Keycode::W, Direction::Forward),
            (Keycode::S, Direction::Backward),
            (Keycode::A, Direction::Left),
            (Keycode::D, Direction::Right),
        ];

        for (key, direction) in BINDINGS {
            if self.keyboard.down.contains(&key) {
                self.camera.process_keyboard(direction, self.delta_time);
            }
        }
    }

    pub fn set_cursor_grabbed(&mut self, grabbed: bool) {
        self.cursor_grabbed = grabbed;
        // absolute tracking restarts after a capture change
        self.last_cursor = None;
    }

    pub fn cursor_grabbed(&self) -> bool {
        self.cursor_grabbed
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.viewport.0 as f32 / self.viewport.1.max(1) as f32
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.camera.view_matrix()
    }

    pub fn projection_matrix(&self, near: f32, far: f32) -> Mat4 {
        self.camera.projection_matrix(self.aspect_ratio(), near, far)
    }
}
