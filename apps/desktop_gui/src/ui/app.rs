use card_core::{config::Settings, PunchCardController, RecordingRenderer};
use eframe::egui;
use shared::protocol::{CardView, CupView};
use storage::{FileStore, KeyValueStore, MemoryStore};

use crate::controller::events::{reduce, ResetPrompt, UiEvent};
use crate::controller::orchestration::dispatch_card_event;

const CUPS_PER_ROW: usize = 5;
const CUP_SIZE: f32 = 56.0;

pub type DesktopCard = PunchCardController<Box<dyn KeyValueStore>, RecordingRenderer>;

#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    pub settings: Settings,
    /// Keep the card in memory only; nothing is read from or written to disk.
    pub ephemeral: bool,
}

impl StartupConfig {
    pub fn open_card(&self) -> anyhow::Result<DesktopCard> {
        let config = self.settings.card_config()?;
        let store: Box<dyn KeyValueStore> = if self.ephemeral {
            Box::new(MemoryStore::new())
        } else {
            Box::new(FileStore::open(&self.settings.store_path)?)
        };
        Ok(PunchCardController::initialize(
            config,
            store,
            RecordingRenderer::new(),
        ))
    }
}

pub struct PunchCardApp {
    card: DesktopCard,
    reset_prompt: ResetPrompt,
}

impl PunchCardApp {
    pub fn bootstrap(card: DesktopCard) -> Self {
        Self {
            card,
            reset_prompt: ResetPrompt::default(),
        }
    }

    pub fn apply_ui_event(&mut self, event: UiEvent) {
        if let Some(card_event) = reduce(&mut self.reset_prompt, event) {
            dispatch_card_event(&mut self.card, card_event);
        }
    }

    fn current_view(&self) -> CardView {
        self.card
            .renderer()
            .last_view()
            .cloned()
            .unwrap_or_else(|| self.card.view())
    }

    fn show_card(&self, ui: &mut egui::Ui, view: &CardView, events: &mut Vec<UiEvent>) {
        ui.vertical_centered(|ui| {
            ui.heading("Coffee punch card");
            ui.add_space(12.0);
        });

        egui::Grid::new("cup_grid")
            .spacing([8.0, 8.0])
            .show(ui, |ui| {
                for cup in &view.cups {
                    if show_cup(ui, cup).clicked() {
                        events.push(UiEvent::CupClicked(cup.index));
                    }
                    if (cup.index + 1) % CUPS_PER_ROW == 0 {
                        ui.end_row();
                    }
                }
            });

        ui.add_space(12.0);
        ui.label(egui::RichText::new(&view.status_text).size(18.0));
        if !view.reward_message.is_empty() {
            ui.label(
                egui::RichText::new(&view.reward_message)
                    .size(18.0)
                    .strong()
                    .color(egui::Color32::from_rgb(196, 132, 48)),
            );
        }

        ui.add_space(16.0);
        if ui.button("Reset card").clicked() {
            events.push(UiEvent::ResetClicked);
        }
    }

    fn show_reset_prompt(&self, ctx: &egui::Context, events: &mut Vec<UiEvent>) {
        if self.reset_prompt != ResetPrompt::Open {
            return;
        }

        egui::Window::new("Reset this punch card?")
            .id(egui::Id::new("reset_prompt_window"))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label("Every stamped cup will be cleared.");
                ui.horizontal(|ui| {
                    if ui.button("Reset").clicked() {
                        events.push(UiEvent::ResetConfirmed);
                    }
                    if ui.button("Cancel").clicked() {
                        events.push(UiEvent::ResetCancelled);
                    }
                });
            });
    }
}

fn show_cup(ui: &mut egui::Ui, cup: &CupView) -> egui::Response {
    let label = egui::RichText::new("☕").size(26.0);
    let button = egui::Button::new(label)
        .selected(cup.pressed)
        .min_size(egui::vec2(CUP_SIZE, CUP_SIZE));
    let hover = if cup.pressed {
        format!("Cup {} stamped", cup.index + 1)
    } else {
        format!("Stamp cup {}", cup.index + 1)
    };
    ui.add(button).on_hover_text(hover)
}

impl eframe::App for PunchCardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let view = self.current_view();
        let mut events = Vec::new();

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_card(ui, &view, &mut events);
        });
        self.show_reset_prompt(ctx, &mut events);

        for event in events {
            self.apply_ui_event(event);
        }
    }
}
