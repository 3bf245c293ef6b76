mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::{DesktopGuiApp, PersistedDesktopSettings, StartupConfig, SETTINGS_STORAGE_KEY};

#[derive(Debug, Parser)]
#[command(name = "recipe-grid", about = "Recipe grid editor")]
struct Cli {
    /// Object store that receives exported PDFs.
    #[arg(long, env = "RECIPE_GRID_SERVER_URL", default_value = "http://127.0.0.1:8443")]
    server_url: String,
    /// Open the editor directly instead of the landing page.
    #[arg(long)]
    skip_landing: bool,
}

impl From<Cli> for StartupConfig {
    fn from(cli: Cli) -> Self {
        Self {
            server_url: cli.server_url,
            skip_landing: cli.skip_landing,
        }
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let startup = StartupConfig::from(Cli::parse());

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(cmd_rx, ui_tx, startup.server_url.clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Recipe Grid")
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([980.0, 640.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Recipe Grid",
        options,
        Box::new(|cc| {
            let persisted_settings = cc.storage.and_then(|storage| {
                storage
                    .get_string(SETTINGS_STORAGE_KEY)
                    .and_then(|text| serde_json::from_str::<PersistedDesktopSettings>(&text).ok())
            });
            Ok(Box::new(DesktopGuiApp::new(
                cmd_tx,
                ui_rx,
                persisted_settings,
                startup,
            )))
        }),
    )
}
