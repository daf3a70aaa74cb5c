use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use desk_scene::{desk, FileImageDecoder, RecordingBackend, RenderSession, ViewerConfig};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;
    let config = options.load_config()?;

    if options.summary_only {
        run_headless(&config)
    } else {
        desk_scene::run(config)
    }
}

/// Builds the scene against a recording backend and prints what one frame
/// would submit.
fn run_headless(config: &ViewerConfig) -> Result<()> {
    let bindings = config.keys.resolve()?;
    let mut backend = RecordingBackend::new();
    let (mut scene, report) = desk::prepare(&mut backend, &FileImageDecoder, &config.textures)
        .context("failed to prepare the desk scene")?;

    println!(
        "Loaded {} texture(s), {} failed",
        report.loaded.len(),
        report.failed.len()
    );
    for (tag, err) in &report.failed {
        println!(" ! {tag}: {err}");
    }
    println!("Defined {} material(s)", scene.registry().materials().len());
    println!("Scene ready with {} object(s)", scene.objects().len());
    for object in scene.objects() {
        println!(" - {} ({})", object.name, object.shape.name());
    }

    backend.clear();
    let session = RenderSession::from_config(config, bindings);
    session.apply_view(&mut backend);
    let stats = scene.render(&mut backend)?;
    println!(
        "Frame issued {} uniform push(es) and {} draw call(s)",
        backend.uniform_count(),
        backend.draw_count()
    );
    if stats.unresolved_textures > 0 || stats.unmatched_materials > 0 {
        println!(
            "{} unresolved texture(s), {} unmatched material(s)",
            stats.unresolved_textures, stats.unmatched_materials
        );
    }

    scene.shutdown(&mut backend)?;
    Ok(())
}

const USAGE: &str =
    "Usage: desk-scene [--config <file.toml>] [--textures <dir>] [--size WIDTHxHEIGHT] [--summary-only]";

#[derive(Debug, Default)]
struct CliOptions {
    config: Option<PathBuf>,
    textures: Option<PathBuf>,
    size: Option<String>,
    summary_only: bool,
}

impl CliOptions {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut options = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .ok_or_else(|| anyhow!("{flag} expects a value. {USAGE}"))
            };
            match arg.as_str() {
                "--config" => options.config = Some(PathBuf::from(value("--config")?)),
                "--textures" => options.textures = Some(PathBuf::from(value("--textures")?)),
                "--size" => options.size = Some(value("--size")?),
                "--summary-only" => options.summary_only = true,
                "--help" | "-h" => return Err(anyhow!(USAGE)),
                other => return Err(anyhow!("Unknown argument: {other}. {USAGE}")),
            }
        }
        Ok(options)
    }

    fn load_config(&self) -> Result<ViewerConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                ViewerConfig::from_toml_str(&text)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => ViewerConfig::default(),
        };
        if let Some(textures) = &self.textures {
            config.textures = textures.clone();
        }
        if let Some(size) = &self.size {
            config.set_window_size(size)?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use desk_scene::KeyBindings;

    fn parse(args: &[&str]) -> Result<CliOptions> {
        CliOptions::parse(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn parses_all_flags() {
        let options = parse(&["--textures", "assets", "--size", "640x480", "--summary-only"]).unwrap();
        assert_eq!(options.textures, Some(PathBuf::from("assets")));
        assert!(options.summary_only);
        let config = options.load_config().unwrap();
        assert_eq!((config.window.width, config.window.height), (640, 480));
        assert_eq!(config.textures, PathBuf::from("assets"));
    }

    #[test]
    fn missing_value_and_unknown_flag_fail() {
        assert!(parse(&["--textures"]).is_err());
        assert!(parse(&["--wireframe"]).is_err());
    }

    #[test]
    fn default_bindings_resolve() {
        let config = parse(&[]).unwrap().load_config().unwrap();
        assert_eq!(config.keys.resolve().unwrap(), KeyBindings::default());
    }
}
