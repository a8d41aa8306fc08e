//! Desktop preview app for pwm-light-programs
//!
//! Shows two PCA9685 banks as a grid of lamps driven by the real engine.
//! All changes go through the command queue, as they would from a web API.

use std::convert::Infallible;
use std::time::Instant as StdInstant;

use eframe::egui::{self};
use pwm_light_programs::{
    BankRegistry, CommandQueue, CommandSender, Instant, ProgramCommand, ProgramEngine,
    ProgramKind, PwmDriver, PwmOutput, TickScheduler, bank::PCA9685_CHANNELS, duty::MAX_DUTY,
    program::CATALOGUE,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Number of simulated banks
const BANKS: usize = 2;

/// I2C addresses of the simulated banks
const BANK_ADDRESSES: [u8; BANKS] = [0x40, 0x41];

/// Size of each lamp in pixels
const LAMP_SIZE: f32 = 36.0;

/// Gap between lamps
const LAMP_GAP: f32 = 6.0;

/// Command queue size
const COMMAND_QUEUE_SIZE: usize = 16;

/// Static command queue between UI and engine
static COMMANDS: CommandQueue<COMMAND_QUEUE_SIZE> = CommandQueue::<COMMAND_QUEUE_SIZE>::new();

type PreviewScheduler = TickScheduler<
    'static,
    PreviewDriver,
    SmallRng,
    BANKS,
    PCA9685_CHANNELS,
    COMMAND_QUEUE_SIZE,
>;

/// Driver that keeps the last output of every channel for display
#[derive(Debug, Default)]
struct PreviewDriver {
    outputs: [[u16; PCA9685_CHANNELS]; BANKS],
}

impl PreviewDriver {
    fn duty(&self, bank: usize, channel: usize) -> u16 {
        self.outputs[bank][channel]
    }
}

impl PwmDriver for PreviewDriver {
    type Error = Infallible;

    fn write(&mut self, address: u8, channel: u8, output: PwmOutput) -> Result<(), Self::Error> {
        if let Some(bank) = BANK_ADDRESSES.iter().position(|a| *a == address) {
            self.outputs[bank][usize::from(channel)] = output.duty();
        }
        Ok(())
    }
}

fn main() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 420.0])
            .with_title("PWM Light Programs Preview"),
        ..Default::default()
    };

    eframe::run_native(
        "pwm-light-preview",
        options,
        Box::new(|_cc| Ok(Box::new(PreviewApp::new()))),
    )
}

struct PreviewApp {
    scheduler: PreviewScheduler,
    commands: CommandSender<'static, COMMAND_QUEUE_SIZE>,

    /// Selected bank and channel
    selected: (u8, u8),
    /// Manual duty for unassigned channels
    manual_duty: u16,
    /// Synthetic time in milliseconds
    t_ms: u64,
    /// Wall-clock reference for delta time
    last_frame: StdInstant,
    /// Whether time is running
    playing: bool,
    /// Time scale multiplier (1.0 = realtime)
    time_scale: f32,
}

impl PreviewApp {
    fn new() -> Self {
        let registry = BankRegistry::with_addresses(PreviewDriver::default(), &BANK_ADDRESSES)
            .unwrap_or_else(|err| panic!("invalid preview banks: {err}"));
        let engine = ProgramEngine::new(registry, SmallRng::seed_from_u64(0x5eed));
        let scheduler = TickScheduler::new(engine, COMMANDS.receiver());

        Self {
            scheduler,
            commands: COMMANDS.sender(),
            selected: (0, 0),
            manual_duty: MAX_DUTY / 2,
            t_ms: 0,
            last_frame: StdInstant::now(),
            playing: true,
            time_scale: 1.0,
        }
    }

    fn send(&self, command: ProgramCommand) {
        let _ = self.commands.submit(command);
    }

    /// Update synthetic time based on wall clock and time scale
    fn update_time(&mut self) {
        let now = StdInstant::now();
        let delta = now.duration_since(self.last_frame);
        self.last_frame = now;

        if self.playing {
            let delta_ms_f64 = delta.as_secs_f64() * 1000.0 * f64::from(self.time_scale);
            let delta_ms_f64 = if delta_ms_f64.is_finite() {
                delta_ms_f64.max(0.0)
            } else {
                0.0
            };
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let delta_ms = delta_ms_f64 as u64;
            self.t_ms = self.t_ms.wrapping_add(delta_ms);
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui
                .button(if self.playing { "⏸ Pause" } else { "▶ Play" })
                .clicked()
            {
                self.playing = !self.playing;
            }
            let secs = self.t_ms / 1000;
            let ms = self.t_ms % 1000;
            ui.label(format!("Time: {secs}.{ms:03}s"));
            ui.add_space(8.0);
            ui.label("Speed:");
            ui.add(egui::Slider::new(&mut self.time_scale, 0.1..=5.0).logarithmic(true));
            ui.add_space(8.0);
            if ui.button("Clear all").clicked() {
                self.send(ProgramCommand::ClearAll);
            }
        });

        ui.add_space(8.0);

        let (bank, channel) = self.selected;
        let engine = self.scheduler.engine();
        let Some(state) = engine.registry().channel(bank, channel) else {
            return;
        };
        let current = state.kind();
        let enabled = state.is_enabled();
        let name = state.name().to_owned();

        ui.horizontal(|ui| {
            ui.label(format!("{name} (bank {bank}, channel {channel})"));
            ui.add_space(8.0);

            let mut selected_kind = current;
            egui::ComboBox::from_id_salt("program_selector")
                .selected_text(current.display_name())
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut selected_kind, ProgramKind::None, "None");
                    for info in CATALOGUE {
                        ui.selectable_value(&mut selected_kind, info.kind, info.name)
                            .on_hover_text(info.description);
                    }
                });
            if selected_kind != current {
                self.send(ProgramCommand::Assign {
                    bank,
                    channel,
                    kind: selected_kind,
                });
            }

            let mut checked = enabled;
            if ui.checkbox(&mut checked, "Enabled").changed() {
                self.send(ProgramCommand::SetEnabled {
                    bank,
                    channel,
                    enabled: checked,
                });
            }

            if current.is_none() {
                ui.label("Duty:");
                if ui
                    .add(egui::Slider::new(&mut self.manual_duty, 0..=MAX_DUTY))
                    .changed()
                {
                    self.send(ProgramCommand::SetDuty {
                        bank,
                        channel,
                        duty: self.manual_duty,
                    });
                }
            }
        });
    }

    fn lamps(&mut self, ui: &mut egui::Ui) {
        let pitch = LAMP_SIZE + LAMP_GAP;
        #[allow(clippy::cast_precision_loss)]
        let size = egui::vec2(
            PCA9685_CHANNELS as f32 * pitch,
            BANKS as f32 * (pitch + LAMP_GAP),
        );
        let (response, painter) = ui.allocate_painter(size, egui::Sense::click());
        let origin = response.rect.min;
        let driver = self.scheduler.engine().registry().driver();

        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
        for bank in 0..BANKS {
            for channel in 0..PCA9685_CHANNELS {
                let min = egui::pos2(
                    origin.x + channel as f32 * pitch,
                    origin.y + bank as f32 * (pitch + LAMP_GAP),
                );
                let rect = egui::Rect::from_min_size(min, egui::vec2(LAMP_SIZE, LAMP_SIZE));

                let level = u32::from(driver.duty(bank, channel)) * 255 / u32::from(MAX_DUTY);
                let level = level as u8;
                painter.rect_filled(rect, 6.0, egui::Color32::from_rgb(level, level, level / 2));

                if self.selected == (bank as u8, channel as u8) {
                    painter.rect_stroke(
                        rect,
                        6.0,
                        egui::Stroke::new(2.0, egui::Color32::LIGHT_BLUE),
                        egui::StrokeKind::Outside,
                    );
                }
            }
        }

        if let Some(pos) = response.interact_pointer_pos().filter(|_| response.clicked()) {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let channel = ((pos.x - origin.x) / pitch) as usize;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let bank = ((pos.y - origin.y) / (pitch + LAMP_GAP)) as usize;
            if bank < BANKS && channel < PCA9685_CHANNELS {
                #[allow(clippy::cast_possible_truncation)]
                let selected = (bank as u8, channel as u8);
                self.selected = selected;
            }
        }
    }
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_time();
        self.scheduler.tick(Instant::from_millis(self.t_ms));

        ctx.request_repaint();

        egui::CentralPanel::default().show(ctx, |ui| {
            self.controls(ui);
            ui.add_space(16.0);
            self.lamps(ui);
        });
    }
}
