//! jsonview - a minimal viewer for JSON documents
//!
//! Usage: jsonview <file.json | https://...> [--config style.toml] [--font font.ttf]
//!
//! Opens a window with the document laid out and colored. `--dump` prints
//! the paint commands as JSON lines instead, `--layout-log` prints every
//! node's measured span.

use clap::Parser;
use jsonview::{
    source, DocumentStatus, EstimatedMetrics, FontCanvas, FontMetrics, FrameBuffer, JsonView, PaintList,
    StyleOptions, SurfaceSize, TextMetrics, ViewError,
};
use softbuffer::{Context, SoftBufferError, Surface};
use std::error::Error;
use std::io::Write;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, VirtualKeyCode, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

const DEFAULT_WIDTH: u32 = 1024;
const DEFAULT_HEIGHT: u32 = 768;
const MIN_WIDTH: u32 = 320;
const MIN_HEIGHT: u32 = 200;

const FONT_ENV: &str = "JSONVIEW_FONT";
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu-sans-mono-fonts/DejaVuSansMono.ttf",
    "/Library/Fonts/Courier New.ttf",
    "C:\\Windows\\Fonts\\consola.ttf",
];

#[derive(Parser, Debug)]
#[command(name = "jsonview", version, about = "Render a JSON document as syntax-colored text")]
struct Cli {
    /// JSON file path or http(s) URL
    source: String,

    /// TOML file with style options (textSize, textColor, ...)
    #[arg(long)]
    config: Option<PathBuf>,

    /// TrueType/OpenType font used to measure and paint text
    #[arg(long)]
    font: Option<PathBuf>,

    /// Desired surface width in pixels
    #[arg(long, default_value_t = 0)]
    width: u32,

    /// Print the surface size and paint commands as JSON lines
    #[arg(long, conflicts_with = "layout_log")]
    dump: bool,

    /// Print the measured span of every node
    #[arg(long)]
    layout_log: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("jsonview: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let options = match &cli.config {
        Some(path) => StyleOptions::load(path)?,
        None => StyleOptions::default(),
    };
    let config = options.resolve()?;

    let text = source::load(&cli.source)?;
    let mut view = JsonView::new(config);
    match view.set_json(&text)? {
        DocumentStatus::Loaded => log::info!("Loaded: {} ({} bytes)", cli.source, text.len()),
        DocumentStatus::UnsupportedTopLevel => {
            log::warn!("{}: top-level value is not an object or array, nothing to display", cli.source)
        }
    }

    let font = find_font(cli.font.as_deref())?;

    if cli.dump || cli.layout_log {
        let metrics: Box<dyn TextMetrics> = match font {
            Some(font) => Box::new(font),
            None => {
                log::warn!("no font found, falling back to estimated text metrics");
                Box::new(EstimatedMetrics::new())
            }
        };
        let size = view.measure(cli.width, metrics.as_ref());
        if cli.layout_log {
            if let Some(report) = view.layout_report() {
                print!("{}", report);
            }
            return Ok(());
        }
        dump(&view, size, metrics.as_ref())?;
        return Ok(());
    }

    let font = font.ok_or_else(|| ViewError::Font(format!("no font found; pass --font or set {}", FONT_ENV)))?;
    run_window(view, font, &cli.source)
}

/// An explicit `--font` must load; otherwise try the environment and a few
/// well-known system paths.
fn find_font(explicit: Option<&Path>) -> Result<Option<FontMetrics>, ViewError> {
    if let Some(path) = explicit {
        return FontMetrics::load(path).map(Some);
    }
    if let Ok(path) = std::env::var(FONT_ENV) {
        return FontMetrics::load(Path::new(&path)).map(Some);
    }
    for candidate in SYSTEM_FONTS {
        let path = Path::new(candidate);
        if !path.exists() {
            continue;
        }
        match FontMetrics::load(path) {
            Ok(font) => return Ok(Some(font)),
            Err(e) => log::debug!("skipping {}: {}", path.display(), e),
        }
    }
    Ok(None)
}

fn dump(view: &JsonView, size: SurfaceSize, metrics: &dyn TextMetrics) -> Result<(), ViewError> {
    let mut list = PaintList::new();
    view.draw(metrics, &mut list);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer(&mut out, &size).map_err(std::io::Error::from)?;
    writeln!(out)?;
    for cmd in list.commands() {
        serde_json::to_writer(&mut out, cmd).map_err(std::io::Error::from)?;
        writeln!(out)?;
    }
    Ok(())
}

fn run_window(mut view: JsonView, metrics: FontMetrics, title: &str) -> Result<(), Box<dyn Error>> {
    let content = view.measure(0, &metrics);
    let width = content.width.clamp(MIN_WIDTH, DEFAULT_WIDTH);
    let height = content.height.clamp(MIN_HEIGHT, DEFAULT_HEIGHT);

    // Create window and graphics context
    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_inner_size(PhysicalSize::new(width, height))
        .with_title(format!("jsonview - {}", title))
        .build(&event_loop)?;

    let context = unsafe { Context::new(&window) }?;
    let mut surface = unsafe { Surface::new(&context, &window) }?;
    resize_surface(&mut surface, width, height)?;
    let mut fb = FrameBuffer::new(width as usize, height as usize);

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::KeyboardInput { input, .. }
                    if input.state == ElementState::Pressed
                        && input.virtual_keycode == Some(VirtualKeyCode::Escape) =>
                {
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::Resized(new_size) => {
                    let (w, h) = (new_size.width.max(1), new_size.height.max(1));
                    if let Err(e) = resize_surface(&mut surface, w, h) {
                        log::error!("failed to resize surface: {}", e);
                        *control_flow = ControlFlow::Exit;
                        return;
                    }
                    fb = FrameBuffer::new(w as usize, h as usize);
                    window.request_redraw();
                }
                _ => {}
            },
            Event::RedrawRequested(_) => {
                fb.clear(0xFFFFFF);
                view.measure(fb.width as u32, &metrics);
                view.draw(&metrics, &mut FontCanvas::new(&mut fb, metrics.font()));

                if let Err(e) = present(&mut surface, &fb) {
                    log::error!("failed to present frame: {}", e);
                    *control_flow = ControlFlow::Exit;
                }
            }
            _ => {}
        }
    })
}

fn resize_surface(surface: &mut Surface, width: u32, height: u32) -> Result<(), SoftBufferError> {
    match (NonZeroU32::new(width), NonZeroU32::new(height)) {
        (Some(w), Some(h)) => surface.resize(w, h),
        _ => Ok(()),
    }
}

fn present(surface: &mut Surface, fb: &FrameBuffer) -> Result<(), SoftBufferError> {
    let mut buffer = surface.buffer_mut()?;
    if !copy_frame(&mut buffer, fb) {
        log::warn!(
            "surface has {} pixels but frame has {}, skipping present",
            buffer.len(),
            fb.pixels.len()
        );
        return Ok(());
    }
    buffer.present()
}

/// Copy the frame into a surface buffer of the same size
fn copy_frame(buffer: &mut [u32], fb: &FrameBuffer) -> bool {
    if buffer.len() != fb.pixels.len() {
        return false;
    }
    buffer.copy_from_slice(&fb.pixels);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_copy_only_into_matching_buffers() {
        let mut fb = FrameBuffer::new(2, 2);
        fb.clear(0x123456);

        let mut stale = vec![0u32; 6];
        assert!(!copy_frame(&mut stale, &fb));
        assert_eq!(stale, vec![0; 6]);

        let mut matching = vec![0u32; 4];
        assert!(copy_frame(&mut matching, &fb));
        assert_eq!(matching, vec![0x123456; 4]);
    }

    #[test]
    fn cli_parses_dump_mode() {
        let cli = Cli::try_parse_from(["jsonview", "data.json", "--dump", "--width", "300"]).unwrap();
        assert!(cli.dump);
        assert_eq!(cli.width, 300);
        assert!(Cli::try_parse_from(["jsonview", "data.json", "--dump", "--layout-log"]).is_err());
    }
}
