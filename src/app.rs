//! Studiekompis — egui/eframe application.
//!
//! # Architecture
//!
//! [`StudiekompisApp`] is the top-level [`eframe::App`].  It owns the whole
//! session state — the [`SubjectStore`], the credential, the edit buffers
//! and the conversation log — plus two channel endpoints:
//!
//! * `command_tx` — sends [`StudyCommand`] to the background worker.
//! * `result_rx`  — receives [`StudyResult`] back, drained non-blocking
//!   every frame.
//!
//! While a command is in flight the app holds a [`Pending`] marker, shows a
//! spinner with the action's Swedish busy label and disables every action
//! surface, so actions are strictly one at a time.
//!
//! Failure presentation lives entirely here: the worker delivers typed
//! errors, and this layer turns each into a notice banner plus, for
//! assistant calls, a visible answer text stating the failure.

use std::path::PathBuf;
use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc;

use crate::assistant::{AssistantError, AssistantTask, Credential};
use crate::config::AppConfig;
use crate::speech::{excerpt, AudioPlayer};
use crate::subjects::SubjectStore;
use crate::worker::{StudyCommand, StudyResult};

// ---------------------------------------------------------------------------
// Pending — the one command currently in flight
// ---------------------------------------------------------------------------

/// Marker for the command the worker is busy with.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    /// An upload batch is being extracted.
    Save,
    /// An assistant call is running.
    Ask(AssistantTask),
    /// Speech is being synthesized.
    Speak,
}

impl Pending {
    fn busy_label(&self) -> &'static str {
        match self {
            Pending::Save => "Sparar materialet...",
            Pending::Ask(task) => task.busy_label(),
            Pending::Speak => "Skapar ljud...",
        }
    }
}

// ---------------------------------------------------------------------------
// Notice — the colored status banner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoticeKind {
    Success,
    Info,
    Warning,
    Error,
}

impl NoticeKind {
    fn color(self) -> egui::Color32 {
        match self {
            NoticeKind::Success => egui::Color32::from_rgb(80, 200, 120),
            NoticeKind::Info => egui::Color32::from_rgb(68, 136, 255),
            NoticeKind::Warning => egui::Color32::from_rgb(255, 136, 68),
            NoticeKind::Error => egui::Color32::from_rgb(255, 80, 80),
        }
    }
}

/// One status message, mirroring the success/info/warning/error banners of
/// the study-assistant UI.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Notice {
    kind: NoticeKind,
    text: String,
}

impl Notice {
    fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    fn warning(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

/// Swedish notice for an assistant failure, one message per failure kind.
fn notice_for(error: &AssistantError) -> Notice {
    match error {
        AssistantError::MissingCredential => Notice::warning(
            "API-nyckel saknas. Lägg in nyckeln i sidomenyn innan du använder AI-funktionerna.",
        ),
        AssistantError::InvalidCredential(_) => {
            Notice::error("Google avvisar nyckeln! Kontrollera att den är korrekt.")
        }
        AssistantError::ModelNotFound(_) => {
            Notice::error("Modellen hittades inte. Kontrollera att du använder rätt modellnamn.")
        }
        AssistantError::QuotaExceeded(_) => {
            Notice::warning("Du har nått din kvot hos Google AI. Vänta eller uppgradera din plan.")
        }
        AssistantError::Timeout => {
            Notice::warning("Anropet tog för lång tid. Testa igen senare.")
        }
        other => Notice::error(format!("Oväntat fel: {other}")),
    }
}

/// The visible answer text recorded for a failed assistant call.
fn failure_answer(error: &AssistantError) -> String {
    format!("Ett fel uppstod vid AI-anropet.\n\nDetaljer: {error}")
}

// ---------------------------------------------------------------------------
// Conversation log
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Speaker {
    User,
    Assistant,
}

/// One entry in the append-only question/answer transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ChatEntry {
    speaker: Speaker,
    text: String,
}

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Material,
    Listen,
    Study,
}

// ---------------------------------------------------------------------------
// StudiekompisApp
// ---------------------------------------------------------------------------

/// eframe application — the study assistant window.
pub struct StudiekompisApp {
    // ── Session state ────────────────────────────────────────────────────
    /// All subjects and the current-subject pointer.
    store: SubjectStore,
    /// The Gemini API key (env-resolved or typed into the sidebar).
    credential: Credential,
    /// Whether the credential came from the environment (hides the field).
    credential_from_env: bool,

    // ── Sidebar inputs ───────────────────────────────────────────────────
    credential_input: String,
    new_subject_input: String,
    path_input: String,
    /// Files staged for the next "Spara materialet".
    staged_files: Vec<PathBuf>,

    // ── Central buffers ──────────────────────────────────────────────────
    /// Working copy of the current subject's material.
    editor: String,
    /// The read-aloud buffer, seeded with an excerpt of the material.
    read_aloud: String,
    question_input: String,
    conversation: Vec<ChatEntry>,
    chapters_output: Option<String>,
    study_output: Option<String>,

    // ── Transient UI state ───────────────────────────────────────────────
    active_tab: Tab,
    notice: Option<Notice>,
    pending: Option<Pending>,
    /// Path of the most recently synthesized audio file.
    last_audio: Option<PathBuf>,
    player: AudioPlayer,

    // ── Channels ─────────────────────────────────────────────────────────
    command_tx: mpsc::Sender<StudyCommand>,
    result_rx: mpsc::Receiver<StudyResult>,

    // ── Configuration ────────────────────────────────────────────────────
    config: AppConfig,
}

impl StudiekompisApp {
    /// Create a new [`StudiekompisApp`].
    ///
    /// * `store`      — the subject store, seeded with the default subject.
    /// * `credential` — env-resolved credential, if any; `None` shows the
    ///   masked input field.
    /// * `command_tx` / `result_rx` — the worker channel endpoints.
    pub fn new(
        store: SubjectStore,
        credential: Option<Credential>,
        command_tx: mpsc::Sender<StudyCommand>,
        result_rx: mpsc::Receiver<StudyResult>,
        config: AppConfig,
    ) -> Self {
        let editor = store.current_text().to_string();
        let read_aloud = excerpt(&editor, config.speech.excerpt_chars).to_string();
        let credential_from_env = credential.is_some();

        Self {
            store,
            credential: credential.unwrap_or_default(),
            credential_from_env,
            credential_input: String::new(),
            new_subject_input: String::new(),
            path_input: String::new(),
            staged_files: Vec::new(),
            editor,
            read_aloud,
            question_input: String::new(),
            conversation: Vec::new(),
            chapters_output: None,
            study_output: None,
            active_tab: Tab::Material,
            notice: None,
            pending: None,
            last_audio: None,
            player: AudioPlayer::new(),
            command_tx,
            result_rx,
            config,
        }
    }

    // ── Actions ──────────────────────────────────────────────────────────

    fn select_subject(&mut self, name: &str) {
        if name == self.store.current_name() {
            return;
        }
        match self.store.select(name) {
            Ok(()) => {
                self.reload_buffers();
                self.chapters_output = None;
                self.study_output = None;
            }
            Err(e) => self.notice = Some(Notice::error(e.to_string())),
        }
    }

    fn create_subject(&mut self) {
        let name = self.new_subject_input.trim().to_string();
        match self.store.create(&name) {
            Ok(()) => {
                self.new_subject_input.clear();
                self.reload_buffers();
                self.chapters_output = None;
                self.study_output = None;
                self.notice = Some(Notice::success(format!("Mappen '{name}' skapad!")));
            }
            Err(_) => {
                self.notice = Some(Notice::warning("Skriv in ett namn på det nya ämnet först."));
            }
        }
    }

    fn save_uploads(&mut self) {
        let files = std::mem::take(&mut self.staged_files);
        let subject = self.store.current_name().to_string();
        self.dispatch(StudyCommand::SaveMaterial { subject, files }, Pending::Save);
    }

    fn save_edited_text(&mut self) {
        self.store.set_current_text(self.editor.clone());
        self.read_aloud =
            excerpt(&self.editor, self.config.speech.excerpt_chars).to_string();
        self.notice = Some(Notice::success("Uppdaterat!"));
    }

    fn ask(&mut self, task: AssistantTask) {
        if let AssistantTask::Question(q) = &task {
            self.conversation.push(ChatEntry {
                speaker: Speaker::User,
                text: q.clone(),
            });
        }
        let command = StudyCommand::AskAssistant {
            task: task.clone(),
            context: self.editor.clone(),
            credential: self.credential.clone(),
        };
        self.dispatch(command, Pending::Ask(task));
    }

    fn ask_question(&mut self) {
        let question = self.question_input.trim().to_string();
        if question.is_empty() {
            return;
        }
        self.question_input.clear();
        self.ask(AssistantTask::Question(question));
    }

    fn play_audio(&mut self) {
        let text = excerpt(&self.read_aloud, self.config.speech.excerpt_chars).to_string();
        self.dispatch(StudyCommand::Synthesize { text }, Pending::Speak);
    }

    /// Queue `command` and mark it pending, or surface a notice if the
    /// worker queue is unexpectedly full.
    fn dispatch(&mut self, command: StudyCommand, pending: Pending) {
        match self.command_tx.try_send(command) {
            Ok(()) => self.pending = Some(pending),
            Err(e) => {
                log::warn!("could not queue command: {e}");
                self.notice = Some(Notice::error("Appen är upptagen. Försök igen."));
            }
        }
    }

    /// Reload the edit and read-aloud buffers from the current subject.
    fn reload_buffers(&mut self) {
        self.editor = self.store.current_text().to_string();
        self.read_aloud =
            excerpt(&self.editor, self.config.speech.excerpt_chars).to_string();
    }

    // ── Result handling ──────────────────────────────────────────────────

    /// Drain all pending worker results (non-blocking).
    fn poll_results(&mut self) {
        while let Ok(result) = self.result_rx.try_recv() {
            self.handle_result(result);
        }
    }

    fn handle_result(&mut self, result: StudyResult) {
        self.pending = None;

        match result {
            StudyResult::MaterialSaved {
                subject,
                block,
                processed,
                skipped,
            } => {
                if let Err(e) = self.store.append_text(&subject, &block) {
                    // Subjects are never deleted, so the save target always
                    // still exists; guard anyway.
                    self.notice = Some(Notice::error(e.to_string()));
                    return;
                }
                if subject == self.store.current_name() {
                    self.reload_buffers();
                }

                let mut text = format!("Sparade {processed} filer i {subject}!");
                if skipped.is_empty() {
                    self.notice = Some(Notice::success(text));
                } else {
                    text.push_str(&format!(
                        " Hoppade över filer som inte stöds: {}.",
                        skipped.join(", ")
                    ));
                    self.notice = Some(Notice::warning(text));
                }
            }

            StudyResult::SaveFailed { message } => {
                self.notice = Some(Notice::error(format!(
                    "Kunde inte läsa in materialet: {message}"
                )));
            }

            StudyResult::AssistantAnswer { task, text } => {
                self.record_assistant_output(&task, text);
            }

            StudyResult::AssistantFailed { task, error } => {
                self.record_assistant_output(&task, failure_answer(&error));
                self.notice = Some(notice_for(&error));
            }

            StudyResult::SpeechReady { path } => {
                match self.player.play_file(&path) {
                    Ok(()) => self.notice = Some(Notice::info("Ljudet spelas upp.")),
                    Err(e) => {
                        self.notice = Some(Notice::warning(format!(
                            "Ljudet skapades men kunde inte spelas upp: {e}"
                        )));
                    }
                }
                self.last_audio = Some(path);
            }

            StudyResult::SpeechFailed { error } => {
                self.notice = Some(Notice::error(format!("Kunde inte skapa ljud: {error}")));
            }
        }
    }

    /// Route an assistant response (or failure text) to where the task's
    /// answer is shown.
    fn record_assistant_output(&mut self, task: &AssistantTask, text: String) {
        match task {
            AssistantTask::Chapters => self.chapters_output = Some(text),
            AssistantTask::Quiz | AssistantTask::Summary => self.study_output = Some(text),
            AssistantTask::Question(_) => self.conversation.push(ChatEntry {
                speaker: Speaker::Assistant,
                text,
            }),
        }
    }

    /// Stage files dropped anywhere on the window.
    fn collect_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            if let Some(path) = file.path {
                self.staged_files.push(path);
            }
        }
    }

    // ── Sidebar ──────────────────────────────────────────────────────────

    fn draw_sidebar(&mut self, ui: &mut egui::Ui) {
        ui.heading("Studiekompis");
        ui.add_space(4.0);

        self.draw_credential_section(ui);
        ui.separator();
        self.draw_subject_section(ui);
        ui.separator();
        self.draw_upload_section(ui);
    }

    fn draw_credential_section(&mut self, ui: &mut egui::Ui) {
        if self.credential_from_env {
            ui.colored_label(
                NoticeKind::Success.color(),
                format!("Nyckel laddad från {}.", Credential::ENV_VAR),
            );
            return;
        }

        ui.label("Gemini API-nyckel:");
        let response = ui.add(
            egui::TextEdit::singleline(&mut self.credential_input)
                .password(true)
                .hint_text("AIza..."),
        );
        if response.changed() {
            self.credential = Credential::new(self.credential_input.clone());
        }
        if self.credential.is_empty() {
            ui.colored_label(
                NoticeKind::Warning.color(),
                "Nyckel saknas — AI-funktionerna är låsta tills du lägger in den.",
            );
        }
    }

    fn draw_subject_section(&mut self, ui: &mut egui::Ui) {
        ui.label("Mina ämnen");

        let names: Vec<String> = self.store.names().map(String::from).collect();
        let current = self.store.current_name().to_string();
        let mut chosen: Option<String> = None;

        egui::ComboBox::from_id_salt("subject-picker")
            .width(ui.available_width() - 8.0)
            .selected_text(current.clone())
            .show_ui(ui, |ui| {
                for name in &names {
                    if ui.selectable_label(*name == current, name).clicked() {
                        chosen = Some(name.clone());
                    }
                }
            });
        if let Some(name) = chosen {
            self.select_subject(&name);
        }

        ui.add_space(4.0);
        ui.label("Lägg till nytt ämne (t.ex. Kemi):");
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.new_subject_input)
                    .desired_width(ui.available_width() - 90.0),
            );
            if ui.button("Skapa mapp").clicked() {
                self.create_subject();
            }
        });
    }

    fn draw_upload_section(&mut self, ui: &mut egui::Ui) {
        ui.label(format!("Ladda upp till: {}", self.store.current_name()));
        ui.small("Släpp filer på fönstret (PDF, PPTX) eller skriv in en sökväg.");

        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.path_input)
                    .hint_text("/sökväg/till/fil.pdf")
                    .desired_width(ui.available_width() - 80.0),
            );
            if ui.button("Lägg till").clicked() {
                let path = self.path_input.trim();
                if !path.is_empty() {
                    self.staged_files.push(PathBuf::from(path));
                    self.path_input.clear();
                }
            }
        });

        let mut remove: Option<usize> = None;
        for (i, path) in self.staged_files.iter().enumerate() {
            ui.horizontal(|ui| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                ui.label(name);
                if ui.small_button("x").clicked() {
                    remove = Some(i);
                }
            });
        }
        if let Some(i) = remove {
            self.staged_files.remove(i);
        }

        ui.add_space(4.0);
        if ui.button("Spara materialet").clicked() {
            self.save_uploads();
        }
    }

    // ── Central panel ────────────────────────────────────────────────────

    fn draw_main(&mut self, ui: &mut egui::Ui) {
        ui.heading(format!("Studerar: {}", self.store.current_name()));
        ui.add_space(4.0);

        if self.store.current_text().is_empty() && self.editor.is_empty() {
            ui.colored_label(
                NoticeKind::Info.color(),
                "Den här mappen är tom. Börja med att ladda upp material i menyn!",
            );
            return;
        }

        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.active_tab, Tab::Material, "Material & Struktur");
            ui.selectable_value(&mut self.active_tab, Tab::Listen, "Lyssna");
            ui.selectable_value(&mut self.active_tab, Tab::Study, "Förhör & Chatt");
        });
        ui.separator();

        match self.active_tab {
            Tab::Material => self.draw_material_tab(ui),
            Tab::Listen => self.draw_listen_tab(ui),
            Tab::Study => self.draw_study_tab(ui),
        }
    }

    fn draw_material_tab(&mut self, ui: &mut egui::Ui) {
        ui.label("Ditt material");
        ui.small("Här kan du se texten som appen läst in och ändra om något blev fel.");

        egui::ScrollArea::vertical()
            .id_salt("editor")
            .max_height(300.0)
            .show(ui, |ui| {
                ui.add(
                    egui::TextEdit::multiline(&mut self.editor)
                        .desired_rows(14)
                        .desired_width(f32::INFINITY),
                );
            });

        if ui.button("Spara ändringar i texten").clicked() {
            self.save_edited_text();
        }

        ui.separator();

        let has_text = !self.editor.trim().is_empty();
        if ui
            .add_enabled(has_text, egui::Button::new("Dela upp texten i kapitel (AI)"))
            .clicked()
        {
            self.ask(AssistantTask::Chapters);
        }

        if let Some(chapters) = self.chapters_output.clone() {
            ui.add_space(4.0);
            egui::ScrollArea::vertical()
                .id_salt("chapters")
                .max_height(260.0)
                .show(ui, |ui| {
                    ui.label(chapters);
                });
        }
    }

    fn draw_listen_tab(&mut self, ui: &mut egui::Ui) {
        ui.label("Uppläsning");
        ui.small("Texten kortas till ett utdrag innan den läses upp.");

        egui::ScrollArea::vertical()
            .id_salt("read-aloud")
            .max_height(180.0)
            .show(ui, |ui| {
                ui.add(
                    egui::TextEdit::multiline(&mut self.read_aloud)
                        .desired_rows(8)
                        .desired_width(f32::INFINITY),
                );
            });

        ui.horizontal(|ui| {
            if ui.button("Spela upp").clicked() {
                self.play_audio();
            }
            if self.player.is_playing() && ui.button("Stoppa").clicked() {
                self.player.stop();
            }
        });

        if let Some(path) = &self.last_audio {
            ui.small(format!("Senaste ljudfil: {}", path.display()));
        }
    }

    fn draw_study_tab(&mut self, ui: &mut egui::Ui) {
        ui.label("Plugga med AI");

        let has_text = !self.editor.trim().is_empty();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(has_text, egui::Button::new("Skapa ett prov"))
                .clicked()
            {
                self.ask(AssistantTask::Quiz);
            }
            if ui
                .add_enabled(has_text, egui::Button::new("Sammanfatta allt"))
                .clicked()
            {
                self.ask(AssistantTask::Summary);
            }
        });

        if let Some(output) = self.study_output.clone() {
            ui.add_space(4.0);
            egui::ScrollArea::vertical()
                .id_salt("study-output")
                .max_height(220.0)
                .show(ui, |ui| {
                    ui.label(output.as_str());
                });
            if ui.small_button("Kopiera").clicked() {
                ui.ctx().copy_text(output);
            }
        }

        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("conversation")
            .max_height(220.0)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for entry in &self.conversation {
                    let (prefix, color) = match entry.speaker {
                        Speaker::User => ("Du:", egui::Color32::from_rgb(200, 200, 200)),
                        Speaker::Assistant => {
                            ("Studiecoachen:", NoticeKind::Success.color())
                        }
                    };
                    ui.colored_label(color, prefix);
                    ui.label(entry.text.as_str());
                    ui.add_space(6.0);
                }
            });

        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.question_input)
                    .hint_text("Ställ en fråga om materialet...")
                    .desired_width(ui.available_width() - 70.0),
            );
            let submitted =
                response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Skicka").clicked() || submitted {
                self.ask_question();
            }
        });
    }

    fn draw_notice(&mut self, ui: &mut egui::Ui) {
        let Some(notice) = self.notice.clone() else {
            return;
        };

        let mut dismissed = false;
        ui.horizontal(|ui| {
            ui.colored_label(notice.kind.color(), notice.text);
            if ui.small_button("x").clicked() {
                dismissed = true;
            }
        });
        ui.separator();

        if dismissed {
            self.notice = None;
        }
    }

    fn draw_busy(&mut self, ui: &mut egui::Ui) {
        let Some(pending) = &self.pending else {
            return;
        };
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(pending.busy_label());
        });
        ui.separator();
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for StudiekompisApp {
    /// Called every frame by eframe.  Drains worker results and dropped
    /// files, then renders the window.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_results();
        self.collect_dropped_files(ctx);

        // Poll for the in-flight result even when the user is idle.
        if self.pending.is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        let idle = self.pending.is_none();

        egui::SidePanel::left("sidomeny")
            .default_width(300.0)
            .show(ctx, |ui| {
                ui.add_enabled_ui(idle, |ui| self.draw_sidebar(ui));
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_notice(ui);
            self.draw_busy(ui);
            ui.add_enabled_ui(idle, |ui| self.draw_main(ui));
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.player.stop();
        log::info!("Studiekompis closing");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
