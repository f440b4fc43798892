use std::{path::PathBuf, time::Instant};

use sdl2::event::{Event, WindowEvent};

use poor_engine::{
    abs::App,
    config::EngineConfig,
    input::{CursorRequest, FrameContext},
    logging,
    render::Renderer,
};

fn main() {
    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> poor_engine::Result<()> {
    if let Err(e) = logging::init(log::LevelFilter::Info) {
        eprintln!("Logger already installed: {e}");
    }

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = EngineConfig::load(config_path.as_deref())?;
    logging::set_level(config.log_level());

    let mut app = App::new(&config.window)?;
    let renderer = Renderer::load(&app.gl, &config.assets, &config.camera)?;

    let viewport = app.resize_viewport();
    let mut ctx = FrameContext::new(config.camera.build(), viewport, Instant::now());
    if config.window.grab_cursor {
        ctx.set_cursor_grabbed(true);
        app.set_cursor_grabbed(true);
    }

    'running: loop {
        ctx.begin_frame(Instant::now());

        for event in app.event_pump.poll_iter().collect::<Vec<_>>() {
            if let Event::Quit { .. } = event {
                break 'running;
            }
            match ctx.handle_event(&event) {
                Some(CursorRequest::Grab) => app.set_cursor_grabbed(true),
                Some(CursorRequest::Release) => app.set_cursor_grabbed(false),
                None => {}
            }
            if let Event::Window {
                win_event: WindowEvent::Resized(..),
                ..
            } = event
            {
                // the event carries screen units; the viewport needs pixels
                ctx.set_viewport(app.resize_viewport());
            }
        }

        ctx.process_input();

        app.clear();
        renderer.draw(&ctx);
        app.swap();
    }

    log::info!("Shutting down");
    Ok(())
}
