//! Application entry point — Studiekompis.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Build the assistant client and the speech synthesizer from config.
//! 5. Resolve the credential from the environment, if present.
//! 6. Create the worker channels (`command`, `result`) and spawn the worker.
//! 7. Run [`eframe::run_native`] — blocks the main thread until the window
//!    is closed.

use std::sync::Arc;

use tokio::sync::mpsc;

use studiekompis::{
    app::StudiekompisApp,
    assistant::{Assistant, Credential, GeminiClient},
    config::AppConfig,
    speech::{SpeechSynthesizer, TranslateTts},
    subjects::SubjectStore,
    worker::{run_worker, StudyCommand, StudyResult},
};

use eframe::egui;

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let mut vp = egui::ViewportBuilder::default()
        .with_inner_size([1000.0, 700.0])
        .with_min_inner_size([800.0, 520.0]);

    if let Some((x, y)) = config.ui.window_position {
        vp = vp.with_position(egui::pos2(x, y));
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Studiekompis starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime (2 worker threads — one for the command loop, one
    //    spare for spawn_blocking extraction work)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 4. Remote service clients
    let assistant: Arc<dyn Assistant> = Arc::new(GeminiClient::from_config(&config.assistant));
    let synthesizer: Arc<dyn SpeechSynthesizer> =
        Arc::new(TranslateTts::from_config(&config.speech));

    // 5. Credential — from the environment when present, otherwise the
    //    sidebar shows a masked input field.  Never persisted either way.
    let credential = Credential::from_env();
    match &credential {
        Some(_) => log::info!("Credential resolved from {}", Credential::ENV_VAR),
        None => log::info!(
            "{} not set; the key must be entered in the sidebar",
            Credential::ENV_VAR
        ),
    }

    // 6. Channel setup + worker
    let (command_tx, command_rx) = mpsc::channel::<StudyCommand>(16);
    let (result_tx, result_rx) = mpsc::channel::<StudyResult>(32);

    rt.spawn(run_worker(assistant, synthesizer, command_rx, result_tx));

    // 7. Build the egui app and run it (blocks until the window is closed)
    let store = SubjectStore::new(&config.ui.default_subject);
    let app = StudiekompisApp::new(store, credential, command_tx, result_rx, config.clone());
    let options = native_options(&config);

    eframe::run_native(
        "Studiekompis",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
}
