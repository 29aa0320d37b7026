//! Main application UI and state management.
//! Handles deck and card management, the study screen and user notifications.

use chrono::{DateTime, Local};
use eframe::egui;
use log::{info, warn};
use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;
use studysync_app::config::AppConfig;
use studysync_app::database::{CardStore, CardsChanged, SqliteCardStore};
use studysync_app::error::StudyError;
use studysync_app::export::json::{export_json_to_path, import_json};
use studysync_app::models::sm2::format_interval;
use studysync_app::models::stats::due_forecast;
use studysync_app::models::{Deck, DeckStats, Flashcard, Rating, SessionSummary, StudySession};

/// Application screen states
#[derive(Default, PartialEq)]
enum AppScreen {
    #[default]
    Main,
    Study,
}

/// Main application state
pub struct StudyApp {
    config: AppConfig,
    store: Arc<SqliteCardStore>,
    changes: Receiver<CardsChanged>,

    decks: Vec<Deck>,
    cards: Vec<Flashcard>,
    selected_deck_index: Option<usize>,
    current_front: String,
    current_back: String,
    new_deck_name: String,

    current_screen: AppScreen,
    session: Option<StudySession>,
    last_summary: Option<SessionSummary>,

    notifications: Vec<String>,
    show_export_dialog: bool,
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Formats epoch millis as YYYY-MM-DD in local time
fn format_millis(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|utc| utc.with_timezone(&Local).format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "?".to_string())
}

impl eframe::App for StudyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Live updates refresh the deck list only; a running session keeps its queue
        if self.changes.try_iter().count() > 0 {
            self.reload();
        }
        if let Some(session) = &self.session {
            for failure in session.take_failures() {
                self.notifications.push(format!(
                    "Could not save card {}: {}",
                    failure.card_id, failure.message
                ));
            }
        }

        match self.current_screen {
            AppScreen::Main => self.render_main_screen(ctx),
            AppScreen::Study => self.render_study_screen(ctx),
        }

        if self.show_export_dialog {
            let mut export_deck_index: Option<usize> = None;
            let mut should_cancel = false;

            egui::Window::new("Export Deck")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label("Select a deck to export:");
                    ui.separator();

                    for (i, deck) in self.decks.iter().enumerate() {
                        if ui.button(&deck.name).clicked() {
                            export_deck_index = Some(i);
                        }
                    }

                    ui.separator();

                    if ui.button("Cancel").clicked() {
                        should_cancel = true;
                    }
                });

            if let Some(i) = export_deck_index {
                self.handle_export(i);
            }
            if should_cancel {
                self.show_export_dialog = false;
            }
        }

        if !self.notifications.is_empty() {
            let mut dismiss = false;
            egui::Window::new("Notifications")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::RIGHT_BOTTOM, [-10.0, -10.0])
                .show(ctx, |ui| {
                    for message in &self.notifications {
                        ui.label(message);
                    }
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        dismiss = true;
                    }
                });
            if dismiss {
                self.notifications.clear();
            }
        }

        // Poll store events and background write failures
        ctx.request_repaint_after(Duration::from_millis(500));
    }
}

impl StudyApp {
    pub fn new(config: AppConfig, store: Arc<SqliteCardStore>) -> Self {
        let changes = store.on_cards_changed(&config.user_id);
        let mut app = Self {
            config,
            store,
            changes,
            decks: Vec::new(),
            cards: Vec::new(),
            selected_deck_index: None,
            current_front: String::new(),
            current_back: String::new(),
            new_deck_name: String::new(),
            current_screen: AppScreen::Main,
            session: None,
            last_summary: None,
            notifications: Vec::new(),
            show_export_dialog: false,
        };
        app.reload();
        if !app.decks.is_empty() {
            app.selected_deck_index = Some(0);
        }
        app
    }

    /// Re-reads decks and cards from the store
    fn reload(&mut self) {
        let user_id = &self.config.user_id;
        match (self.store.list_decks(user_id), self.store.load_cards(user_id)) {
            (Ok(decks), Ok(cards)) => {
                self.decks = decks;
                self.cards = cards;
                if self.selected_deck_index.is_some_and(|i| i >= self.decks.len()) {
                    self.selected_deck_index = None;
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!("Reload failed: {}", e);
                self.notifications.push(format!("Could not load cards: {}", e));
            }
        }
    }

    fn deck_cards(&self, deck_id: &str) -> impl Iterator<Item = &Flashcard> {
        self.cards.iter().filter(move |card| card.deck_id == deck_id)
    }

    /// Renders the main screen with deck management interface
    fn render_main_screen(&mut self, ctx: &egui::Context) {
        let now = now_millis();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format_millis(now));
                ui.separator();
                let forecast = due_forecast(&self.cards, now, 7);
                ui.label(format!("Due this week: {:?}", forecast));
            });
            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("Export Deck").clicked() {
                    self.show_export_dialog = true;
                }
                if ui.button("Import Deck").clicked() {
                    self.handle_import();
                }
            });

            ui.separator();

            ui.heading("Create New Deck");
            ui.horizontal(|ui| {
                ui.label("Deck name:");
                ui.text_edit_singleline(&mut self.new_deck_name);
                if ui.button("Create Deck").clicked() && !self.new_deck_name.trim().is_empty() {
                    match self
                        .store
                        .create_deck(&self.config.user_id, self.new_deck_name.trim())
                    {
                        Ok(deck) => {
                            info!("Created deck {}", deck.name);
                            self.new_deck_name.clear();
                            self.reload();
                        }
                        Err(e) => self.notifications.push(format!("Could not create deck: {}", e)),
                    }
                }
            });

            ui.separator();

            ui.heading(format!("Decks ({})", self.decks.len()));

            // Actions run after rendering to avoid borrowing conflicts
            let mut action_select: Option<usize> = None;
            let mut action_study: Option<usize> = None;

            egui::ScrollArea::vertical()
                .id_source("decks_list")
                .max_height(150.0)
                .show(ui, |ui| {
                    for (i, deck) in self.decks.iter().enumerate() {
                        let stats = DeckStats::compute(self.deck_cards(&deck.id), now);
                        let is_selected = self.selected_deck_index == Some(i);

                        ui.horizontal(|ui| {
                            if ui
                                .selectable_label(
                                    is_selected,
                                    format!(
                                        "{}. {} ({} cards, {} due, {} mature)",
                                        i + 1,
                                        deck.name,
                                        stats.total,
                                        stats.due,
                                        stats.mature
                                    ),
                                )
                                .clicked()
                            {
                                action_select = Some(i);
                            }

                            if ui.button("Study").clicked() {
                                action_study = Some(i);
                            }
                        });
                    }
                });

            if let Some(i) = action_select {
                self.selected_deck_index = Some(i);
            }
            if let Some(i) = action_study {
                self.start_study_session(i);
            }

            if let Some(summary) = &self.last_summary {
                ui.separator();
                ui.label(format!(
                    "Last session: {} reviewed, recall {}",
                    summary.reviewed,
                    summary
                        .recall_rate()
                        .map(|r| format!("{:.0}%", r * 100.0))
                        .unwrap_or_else(|| "-".to_string())
                ));
            }

            ui.separator();

            let Some(deck) = self
                .selected_deck_index
                .and_then(|i| self.decks.get(i))
                .cloned()
            else {
                ui.label("Select a deck to add flashcards");
                return;
            };

            ui.heading(format!("Selected Deck: {}", deck.name));

            ui.horizontal(|ui| {
                ui.label("Front:");
                ui.text_edit_singleline(&mut self.current_front);
            });
            ui.horizontal(|ui| {
                ui.label("Back:");
                ui.text_edit_singleline(&mut self.current_back);
            });
            if ui.button("Add Flashcard").clicked()
                && !self.current_front.is_empty()
                && !self.current_back.is_empty()
            {
                match self.store.add_flashcard(
                    &self.config.user_id,
                    &deck.id,
                    &self.current_front,
                    &self.current_back,
                    now,
                ) {
                    Ok(_) => {
                        self.current_front.clear();
                        self.current_back.clear();
                    }
                    Err(e) => self.notifications.push(format!("Could not add card: {}", e)),
                }
            }

            ui.separator();

            let mut action_delete: Option<String> = None;
            let deck_cards: Vec<&Flashcard> = self.deck_cards(&deck.id).collect();
            ui.heading(format!("Flashcards ({})", deck_cards.len()));

            egui::ScrollArea::vertical()
                .id_source("flashcards_list")
                .max_height(200.0)
                .show(ui, |ui| {
                    for (i, card) in deck_cards.iter().enumerate() {
                        ui.group(|ui| {
                            ui.label(format!("{}. Front: {}", i + 1, card.front));
                            ui.label(format!("   Back: {}", card.back));
                            ui.horizontal(|ui| {
                                ui.label(format!(
                                    "   Next review: {} (every {})",
                                    format_millis(card.srs.next_review),
                                    format_interval(card.srs.interval)
                                ));
                                if ui.small_button("Delete").clicked() {
                                    action_delete = Some(card.id.clone());
                                }
                            });
                        });
                    }
                });

            if let Some(card_id) = action_delete {
                if let Err(e) = self.store.delete_flashcard(&self.config.user_id, &card_id) {
                    self.notifications.push(format!("Could not delete card: {}", e));
                }
            }
        });
    }

    /// Renders the study screen with the reveal / rate loop
    fn render_study_screen(&mut self, ctx: &egui::Context) {
        let now = now_millis();

        let pressed: Vec<char> = ctx.input(|i| {
            [
                (egui::Key::Space, ' '),
                (egui::Key::Num1, '1'),
                (egui::Key::Num2, '2'),
                (egui::Key::Num3, '3'),
                (egui::Key::Num4, '4'),
            ]
            .into_iter()
            .filter(|(key, _)| i.key_pressed(*key))
            .map(|(_, c)| c)
            .collect()
        });

        let mut action_leave = false;
        let mut action_rate: Option<Rating> = None;
        let mut action_reveal = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(session) = &self.session else {
                action_leave = true;
                return;
            };

            ui.heading("Study");
            ui.label(session.progress());
            ui.add_space(20.0);

            if session.is_finished() {
                let summary = session.summary();
                ui.heading("Session complete!");
                for rating in Rating::ALL {
                    ui.label(format!("{}: {}", rating, summary.count(rating)));
                }
                ui.add_space(20.0);
                if ui.button("Back to Main Screen").clicked() {
                    action_leave = true;
                }
                return;
            }

            if let Some(card) = session.current_card() {
                ui.group(|ui| {
                    ui.set_min_height(200.0);
                    ui.vertical_centered(|ui| {
                        ui.add_space(20.0);
                        ui.heading("Front:");
                        ui.label(&card.front);
                        ui.add_space(20.0);
                        if session.is_revealed() {
                            ui.heading("Back:");
                            ui.label(&card.back);
                        } else {
                            ui.label("(Press Space to reveal)");
                        }
                        ui.add_space(20.0);
                    });
                });
            }

            ui.add_space(20.0);

            if !session.is_revealed() {
                if ui.button("Show Answer (Space)").clicked() {
                    action_reveal = true;
                }
            } else {
                let previews = session.preview_intervals().unwrap_or_default();
                ui.label("Rate your recall:");
                ui.horizontal(|ui| {
                    for (n, rating) in Rating::ALL.into_iter().enumerate() {
                        let label = format!(
                            "{} - {} ({})",
                            n + 1,
                            rating,
                            format_interval(previews[rating.index()])
                        );
                        if ui.button(label).clicked() {
                            action_rate = Some(rating);
                        }
                    }
                });
            }

            ui.add_space(20.0);
            if ui.button("End Session").clicked() {
                action_leave = true;
            }
        });

        if let Some(session) = &mut self.session {
            let mut outcome: Result<(), StudyError> = Ok(());
            if action_reveal {
                session.reveal();
            }
            if let Some(rating) = action_rate {
                outcome = session.rate(rating, now).map(|_| ());
            }
            for key in pressed {
                if outcome.is_err() {
                    break;
                }
                outcome = session.handle_key(key, now).map(|_| ());
            }
            match outcome {
                Ok(()) | Err(StudyError::AnswerNotRevealed) | Err(StudyError::SessionFinished) => {}
                Err(e) => self.notifications.push(e.to_string()),
            }
        }

        if action_leave {
            self.leave_study_session();
        }
    }

    /// Starts a session over the cards of one deck
    fn start_study_session(&mut self, deck_index: usize) {
        let Some(deck) = self.decks.get(deck_index) else {
            return;
        };
        let cards: Vec<Flashcard> = self.deck_cards(&deck.id).cloned().collect();
        let store: Arc<dyn CardStore> = self.store.clone();
        let session = StudySession::start(
            &self.config.user_id,
            &cards,
            now_millis(),
            &self.config.session,
            self.config.srs.clone(),
            store,
            &mut rand::thread_rng(),
        );

        if session.is_finished() {
            self.notifications
                .push(format!("Deck '{}' has no cards to study", deck.name));
            return;
        }
        self.session = Some(session);
        self.current_screen = AppScreen::Study;
    }

    /// Returns to the main screen. A completed session waits for its writes; an
    /// abandoned one lets in-flight writes finish on their own.
    fn leave_study_session(&mut self) {
        if let Some(session) = self.session.take() {
            if session.is_finished() {
                let (summary, failures) = session.finish();
                for failure in failures {
                    self.notifications.push(format!(
                        "Could not save card {}: {}",
                        failure.card_id, failure.message
                    ));
                }
                self.last_summary = Some(summary);
            } else {
                self.last_summary = Some(session.summary().clone());
            }
        }
        self.current_screen = AppScreen::Main;
        self.reload();
    }

    /// Handles deck export to JSON file
    fn handle_export(&mut self, deck_index: usize) {
        self.show_export_dialog = false;
        let Some(deck) = self.decks.get(deck_index).cloned() else {
            return;
        };
        let export = match self.store.export_deck(&self.config.user_id, &deck) {
            Ok(export) => export,
            Err(e) => {
                self.notifications.push(format!("Export failed: {}", e));
                return;
            }
        };

        if let Some(path) = rfd::FileDialog::new()
            .set_file_name(format!("{}.json", deck.name))
            .add_filter("JSON files", &["json"])
            .save_file()
        {
            match export_json_to_path(&export, &path) {
                Ok(()) => self
                    .notifications
                    .push(format!("Deck '{}' exported successfully!", deck.name)),
                Err(e) => self.notifications.push(format!("Export failed: {}", e)),
            }
        }
    }

    /// Handles deck import from JSON file
    fn handle_import(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON files", &["json"])
            .pick_file()
        else {
            return;
        };

        let export = match import_json(&path) {
            Ok(export) => export,
            Err(e) => {
                self.notifications.push(format!(
                    "Import failed: {}\n\nExpected structure:\n{{\n  \"name\": \"Deck Name\",\n  \"flashcards\": [{{ \"front\": \"...\", \"back\": \"...\" }}]\n}}",
                    e
                ));
                return;
            }
        };

        match self
            .store
            .import_deck(&self.config.user_id, &export, now_millis())
        {
            Ok(deck) => {
                self.notifications.push(format!(
                    "Deck '{}' imported successfully with {} cards!",
                    deck.name,
                    export.flashcards.len()
                ));
                self.reload();
            }
            Err(e) => self.notifications.push(format!("Import failed: {}", e)),
        }
    }
}
