mod app;
mod config;
mod constants;
mod error;
mod renderer;
mod scene;
mod snowfall;
mod snowflake;
mod texture;
mod timer;

use {
    crate::{app::App, error::AppError},
    std::process,
    winit::event_loop::{ControlFlow, EventLoop},
};

const EXIT_FAILURE: i32 = -1;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("{}", AppError::from(e));
            process::exit(EXIT_FAILURE);
        }
    };

    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::default();
    let result = event_loop.run_app(&mut app);
    let error = app.take_error();

    // Release the window and GPU context before exiting.
    drop(app);

    if let Err(e) = result {
        log::error!("Event loop failed: {e}");
        process::exit(EXIT_FAILURE);
    }

    if let Some(e) = error {
        log::error!("Initialization failed: {e}");
        process::exit(EXIT_FAILURE);
    }
}
