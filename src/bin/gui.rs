use eframe::egui;
use memristor_sim::three_view::ThreeViewRenderer;
use memristor_sim::{
    presets, DeviceParameters, Memristor, OrbitCamera, Sample, ScrollingBuffer, SimConfig, Simulator,
    StimulusConfig, Waveform,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

struct MemristorApp {
    sim: Simulator,
    scope: ScrollingBuffer<Sample>,
    camera: OrbitCamera,
    view: ThreeViewRenderer,
    preset: usize,
    paused: bool,
    config_path: String,
    status: String,
}

impl MemristorApp {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let preset = &presets()[0];
        let device = Memristor::with_random_seed(preset.params);
        info!("noise seed {}", device.seed());
        Self {
            sim: Simulator::new(device, StimulusConfig::new(Waveform::Sine, 2.0, 1.0)),
            scope: ScrollingBuffer::default(),
            camera: OrbitCamera::default(),
            view: ThreeViewRenderer::new(),
            preset: 0,
            paused: false,
            config_path: "memristor_config.json".to_owned(),
            status: String::new(),
        }
    }

    fn draw_controls(&mut self, ui: &mut egui::Ui) {
        ui.heading("Stimulus");
        let stim = &mut self.sim.stimulus;
        egui::ComboBox::from_label("Input")
            .selected_text(stim.waveform.label())
            .show_ui(ui, |ui| {
                for wf in Waveform::ALL {
                    ui.selectable_value(&mut stim.waveform, wf, wf.label());
                }
            });
        ui.add(egui::DragValue::new(&mut stim.amplitude).speed(0.1).clamp_range(-100.0..=100.0).prefix("Amplitude: ").suffix(" V"));
        ui.add(egui::DragValue::new(&mut stim.frequency).speed(0.1).clamp_range(0.01..=1000.0).prefix("Frequency: ").suffix(" Hz"));
        if stim.waveform == Waveform::PulseSequence {
            let pulse = &mut stim.pulse;
            ui.add(egui::DragValue::new(&mut pulse.v_set).speed(0.05).prefix("Set: ").suffix(" V"));
            ui.add(egui::DragValue::new(&mut pulse.v_reset).speed(0.05).prefix("Reset: ").suffix(" V"));
            ui.add(egui::DragValue::new(&mut pulse.v_read).speed(0.01).prefix("Read: ").suffix(" V"));
            ui.add(egui::DragValue::new(&mut pulse.pulse_width).speed(0.005).clamp_range(0.001..=10.0).prefix("Width: ").suffix(" s"));
        }

        ui.separator();
        ui.heading("Material");
        let mut params = *self.sim.device.params();
        egui::ComboBox::from_label("Preset")
            .selected_text(presets()[self.preset].name)
            .show_ui(ui, |ui| {
                for (idx, p) in presets().iter().enumerate() {
                    if ui.selectable_label(self.preset == idx, p.name).on_hover_text(p.description).clicked() {
                        self.preset = idx;
                        params = p.params;
                    }
                }
            });
        ui.add(egui::Slider::new(&mut params.k_on, -1000.0..=-1.0).text("Mobility (k_on)"));
        ui.add(egui::Slider::new(&mut params.k_off, 1.0..=1000.0).text("Mobility (k_off)"));
        ui.add(egui::Slider::new(&mut params.v_on, -10.0..=-0.1).text("Threshold (v_on)"));
        ui.add(egui::Slider::new(&mut params.v_off, 0.1..=10.0).text("Threshold (v_off)"));
        ui.add(egui::Slider::new(&mut params.i_compliance, 1e-4..=0.5).logarithmic(true).text("Compliance (A)"));
        ui.add(egui::Slider::new(&mut params.theta_thermal, 1e-3..=1e3).logarithmic(true).text("θ thermal"));
        ui.add(egui::Slider::new(&mut params.t_critical, 0.1..=20.0).text("T critical"));
        if params != *self.sim.device.params() {
            self.sim.device.set_params(params);
        }
        if let Err(e) = params.validate() {
            ui.colored_label(egui::Color32::YELLOW, e.to_string());
        }

        ui.horizontal(|ui| {
            if ui.button("Reset Device").clicked() {
                self.sim.reset();
                self.scope.clear();
            }
            let label = if self.paused { "Resume" } else { "Pause" };
            if ui.button(label).clicked() {
                self.paused = !self.paused;
            }
        });

        ui.separator();
        let d = &self.sim.device;
        ui.monospace(format!("w = {:.4}", d.w()));
        ui.monospace(format!("R = {:.1} Ω", d.r()));
        ui.monospace(format!("I = {:.6} A", d.i()));
        ui.monospace(format!("P = {:.6} W", d.power()));
        if d.overheated() {
            ui.colored_label(egui::Color32::RED, "THERMAL RUNAWAY");
        }

        ui.separator();
        ui.heading("Config");
        ui.text_edit_singleline(&mut self.config_path);
        ui.horizontal(|ui| {
            if ui.button("Save").clicked() {
                let cfg = SimConfig::new(*self.sim.device.params(), self.sim.stimulus.clone());
                self.status = match cfg.save(&self.config_path) {
                    Ok(()) => format!("saved {}", self.config_path),
                    Err(e) => {
                        error!("{e}");
                        e.to_string()
                    }
                };
            }
            if ui.button("Load").clicked() {
                let mut cfg = SimConfig::new(*self.sim.device.params(), self.sim.stimulus.clone());
                self.status = match cfg.load_into(&self.config_path) {
                    Ok(()) => {
                        self.sim.device.set_params(cfg.params);
                        self.sim.stimulus = cfg.stimulus;
                        format!("loaded {}", self.config_path)
                    }
                    Err(e) => {
                        error!("{e}");
                        e.to_string()
                    }
                };
            }
        });
        if !self.status.is_empty() {
            ui.small(&self.status);
        }
    }

    fn draw_viewport(&mut self, ui: &mut egui::Ui) {
        let size = ui.available_size();
        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::drag());
        if response.dragged() {
            let delta = response.drag_delta();
            self.camera.orbit(delta.x, delta.y);
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                self.camera.zoom(scroll / 50.0);
            }
        }
        let d = &self.sim.device;
        let tex = self.view.ensure_texture(ui.ctx(), &self.camera, d.w(), d.power(), size);
        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
        ui.painter().image(tex, rect, uv, egui::Color32::WHITE);
    }
}

// Plots (x, y) pairs scaled to fill the allocated rect.
fn plot_line(ui: &mut egui::Ui, title: &str, points: &[(f64, f64)], color: egui::Color32) {
    let size = egui::vec2(ui.available_width(), ui.available_height().max(120.0));
    let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_stroke(rect, 2.0, egui::Stroke::new(1.0, egui::Color32::DARK_GRAY));
    painter.text(rect.left_top() + egui::vec2(4.0, 2.0), egui::Align2::LEFT_TOP, title, egui::FontId::monospace(11.0), egui::Color32::GRAY);
    if points.len() < 2 {
        return;
    }

    let (mut x0, mut x1, mut y0, mut y1) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
    for &(x, y) in points {
        x0 = x0.min(x);
        x1 = x1.max(x);
        y0 = y0.min(y);
        y1 = y1.max(y);
    }
    let sx = if x1 > x0 { x1 - x0 } else { 1.0 };
    let sy = if y1 > y0 { y1 - y0 } else { 1.0 };
    let inner = rect.shrink(6.0);
    let line: Vec<egui::Pos2> = points
        .iter()
        .map(|&(x, y)| {
            egui::pos2(
                inner.left() + ((x - x0) / sx) as f32 * inner.width(),
                inner.bottom() - ((y - y0) / sy) as f32 * inner.height(),
            )
        })
        .collect();
    painter.add(egui::Shape::line(line, egui::Stroke::new(1.5, color)));
}

fn draw_oscilloscope(ui: &mut egui::Ui, scope: &ScrollingBuffer<Sample>) {
    let iv: Vec<(f64, f64)> = scope.iter().map(|s| (s.voltage, s.current)).collect();
    let state: Vec<(f64, f64)> = scope.iter().map(|s| (s.time, s.state)).collect();
    ui.columns(2, |cols| {
        plot_line(&mut cols[0], "I-V", &iv, egui::Color32::from_rgb(255, 170, 60));
        plot_line(&mut cols[1], "w(t)", &state, egui::Color32::from_rgb(90, 200, 255));
    });
}

impl eframe::App for MemristorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.paused {
            let dt = ctx.input(|i| i.stable_dt) as f64;
            let sample = self.sim.tick(dt);
            self.scope.push(sample);
        }

        egui::SidePanel::left("controls").resizable(true).show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| self.draw_controls(ui));
        });
        egui::TopBottomPanel::bottom("oscilloscope")
            .resizable(true)
            .min_height(200.0)
            .show(ctx, |ui| draw_oscilloscope(ui, &self.scope));
        egui::CentralPanel::default().show(ctx, |ui| self.draw_viewport(ui));

        ctx.request_repaint();
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // keeps the default parameters visible in the log for bug reports
    info!("default device {:?}", DeviceParameters::default());

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("MemristorSim"),
        ..Default::default()
    };
    eframe::run_native("MemristorSim", native_options, Box::new(|cc| Box::new(MemristorApp::new(cc))))
}
