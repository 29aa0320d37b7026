mod app;
use studysync_app::*;

use app::StudyApp;
use log::{error, info};
use std::sync::Arc;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };

    let store = match SqliteCardStore::open(&config.database_path, config.srs.clone()) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!("Failed to open card store: {}", e);
            std::process::exit(1);
        }
    };

    if store.list_decks(&config.user_id).unwrap_or_default().is_empty() {
        seed_sample_deck(&store, &config.user_id);
    }

    info!("Starting StudySync for user '{}'", config.user_id);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([520.0, 720.0]),
        ..Default::default()
    };
    eframe::run_native(
        "StudySync Flashcards",
        options,
        Box::new(|_cc| Ok(Box::new(StudyApp::new(config, store)))),
    )
}

fn seed_sample_deck(store: &SqliteCardStore, user_id: &str) {
    let now = chrono::Utc::now().timestamp_millis();
    let deck = match store.create_deck(user_id, "Polish Vocabulary") {
        Ok(deck) => deck,
        Err(e) => {
            error!("Could not create sample deck: {}", e);
            return;
        }
    };
    for (front, back) in [("cześć", "hello"), ("dziękuję", "thank you"), ("proszę", "please")] {
        if let Err(e) = store.add_flashcard(user_id, &deck.id, front, back, now) {
            error!("Could not add sample card '{}': {}", front, e);
        }
    }
    info!("Sample deck created");
}
