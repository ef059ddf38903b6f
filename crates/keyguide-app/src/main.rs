//! Main application entry point (native).

#[cfg(feature = "native")]
mod cli {
    use std::path::PathBuf;
    use std::sync::Arc;

    use clap::Parser;
    use keyguide_app::{AppResult, Controller, SceneConfig};
    use keyguide_core::{ParamBag, Update};
    use keyguide_render::{RecordingSurface, to_svg};

    /// Render the connector overlay of a keyboard reference scene as SVG.
    #[derive(Debug, Parser)]
    #[command(name = "keyguide", version, about)]
    pub struct Cli {
        /// Scene file (JSON)
        pub scene: PathBuf,

        /// Query string to start from, e.g. "kg-map=base&kg-key=l-f-1-1"
        #[arg(short, long, default_value = "")]
        pub query: String,

        /// Write the SVG here instead of stdout
        #[arg(short, long)]
        pub output: Option<PathBuf>,

        /// Overlay width override in pixels
        #[arg(long)]
        pub width: Option<f64>,

        /// Overlay height override in pixels
        #[arg(long)]
        pub height: Option<f64>,

        /// Select a key after loading
        #[arg(short, long)]
        pub key: Option<String>,

        /// Enter a guide after loading
        #[arg(short, long)]
        pub guide: Option<String>,

        /// Guide step to show
        #[arg(short, long)]
        pub step: Option<usize>,
    }

    pub fn run(cli: Cli) -> AppResult<()> {
        let scene = SceneConfig::load(&cli.scene)?;
        let catalog = Arc::new(scene.catalog()?);
        log::info!(
            "Loaded {} keymaps on {} keyboards",
            catalog.keymaps().len(),
            catalog.keyboards().len()
        );

        let mut controller = Controller::new(
            catalog,
            scene.host(),
            RecordingSurface::new(),
            scene.diagram.clone(),
            scene.query.clone(),
            ParamBag::parse(&cli.query),
        )?;

        let mut update = Update::new();
        if let Some(guide) = cli.guide {
            update = update.guide(guide);
        }
        if let Some(step) = cli.step {
            update = update.step(step);
        }
        if let Some(key) = cli.key {
            update = update.select(key);
        }
        if !update.is_empty() {
            controller.dispatch(update)?;
        }

        let laid_out = controller.overlay_size();
        controller.resize(
            cli.width.unwrap_or(laid_out.width),
            cli.height.unwrap_or(laid_out.height),
        )?;

        if let Some(panel) = controller.panel() {
            log::info!("Info panel: {} ({} paragraphs)", panel.title, panel.paragraphs.len());
        }
        log::info!("Query: ?{}", controller.query_string());

        let svg = to_svg(&controller.surface());
        match cli.output {
            Some(path) => {
                std::fs::write(&path, svg)?;
                log::info!("Wrote {} connectors to {}", controller.lines().len(), path.display());
            }
            None => print!("{svg}"),
        }
        Ok(())
    }
}

#[cfg(feature = "native")]
fn main() -> std::process::ExitCode {
    use clap::Parser;

    env_logger::init();
    log::info!("Starting keyguide");

    match cli::run(cli::Cli::parse()) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            eprintln!("keyguide: {err}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
