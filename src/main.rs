use clap::Parser;
use eframe::egui;

use ditzui::app::DitzUiApp;
use ditzui::cli::{Cli, Commands};
use ditzui::config::Config;
use ditzui::hooks::{self, Hooks};
use ditzui::listing::DisplayFilter;
use ditzui::plugins;
use ditzui::session::Session;
use ditzui::storage::{self, FileStorage};

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if cli.list_hooks {
        print!("{}", hooks::describe_hooks());
        return;
    }

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn setup_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "ditzui=debug,warn" } else { "ditzui=info,warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;

    plugins::load_plugins_or_warn(&cli.plugins_path(&cwd));
    let config = Config::load(&cli.config_path(&cwd));
    let issue_dir = cli.issue_dir(&config);

    if let Some(Commands::Init(args)) = &cli.command {
        let name = args
            .name
            .clone()
            .or_else(|| cwd.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "project".to_string());
        let dir = cwd.join(&issue_dir);
        FileStorage::init(&dir, &name, &args.components)?;
        println!("Initialized ditz project {} in {}", name, dir.display());
        return Ok(());
    }

    // Nothing is shown unless the whole project loads.
    let dir = storage::locate_issue_dir(&cwd, &issue_dir)?;
    let session = Session::open(config, Box::new(FileStorage::new(&dir)), Hooks::discover(&dir))
        .map_err(|e| format!("{} (use 'ditzui init' to initialize)", e))?;
    let filter = DisplayFilter { show_all: cli.all };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "ditzui",
        options,
        Box::new(move |cc| Ok(Box::new(DitzUiApp::new(cc, session, filter)))),
    )?;
    Ok(())
}
