//! Application shell and eframe integration.
//!
//! Lays out the three regions of the figure: the solar system scatter plot,
//! the distance table, and the closest-planet pie chart, with the year
//! inputs and start/stop controls that drive playback.

use std::f64::consts::TAU;

use eframe::egui;
use egui_plot::{Legend, Plot, PlotBounds, Points};

use crate::celestial::Body;
use crate::ephem::SpiceKernel;
use crate::playback::Playback;
use crate::timeline::{jd_to_date, SimRange};
use crate::tracker::FrameReport;

/// Defaults cover the full span of a long ephemeris like DE422.
const DEFAULT_START_YEAR: &str = "0";
const DEFAULT_END_YEAR: &str = "2999";
const STEP_DAYS: i64 = 1;
/// Fixed plot extent in AU, top-down view.
const AXIS_LIMIT: f64 = 30.0;
const SUN_MARKER_RADIUS: f32 = 6.0;
const PIE_HEIGHT: f32 = 220.0;

pub(crate) enum KernelState {
    Loaded(SpiceKernel),
    Failed(String),
}

pub(crate) struct App {
    kernel: KernelState,
    playback: Playback,
    report: Option<FrameReport>,
    start_year_text: String,
    end_year_text: String,
    status: Option<String>,
}

impl App {
    pub(crate) fn new(kernel: KernelState) -> Self {
        App {
            kernel,
            playback: Playback::default(),
            report: None,
            start_year_text: DEFAULT_START_YEAR.to_string(),
            end_year_text: DEFAULT_END_YEAR.to_string(),
            status: None,
        }
    }

    fn start_clicked(&mut self) {
        let parse = |label: &str, text: &str| {
            text.trim()
                .parse::<i32>()
                .map_err(|_| format!("{label} year '{}' is not a number", text.trim()))
        };
        let start_year = match parse("Start", &self.start_year_text) {
            Ok(year) => year,
            Err(message) => {
                self.status = Some(message);
                return;
            }
        };
        let end_year = match parse("End", &self.end_year_text) {
            Ok(year) => year,
            Err(message) => {
                self.status = Some(message);
                return;
            }
        };

        let outcome = SimRange::new(start_year, end_year, STEP_DAYS)
            .and_then(|range| self.playback.start(range));
        match outcome {
            Ok(()) => {
                self.report = None;
                self.status = None;
            }
            Err(error) => self.status = Some(error.to_string()),
        }
    }

    fn show_header(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            let text = match &self.report {
                Some(report) => {
                    let date = jd_to_date(report.jd)
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "????-??-??".to_string());
                    format!(
                        "Solar System Simulation | Date: {date} | Days Elapsed: {}",
                        self.playback.elapsed_days()
                    )
                }
                None => "Solar System Simulation | Planets and their Distances to Earth".to_string(),
            };
            ui.label(egui::RichText::new(text).heading());
        });
    }

    fn show_controls(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("controls")
            .resizable(false)
            .default_width(380.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui.label(egui::RichText::new("Simulation").strong());
                ui.horizontal(|ui| {
                    ui.label("Start year:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.start_year_text).desired_width(60.0),
                    );
                    ui.label("End year:");
                    ui.add(egui::TextEdit::singleline(&mut self.end_year_text).desired_width(60.0));
                });
                ui.horizontal(|ui| {
                    let loaded = matches!(self.kernel, KernelState::Loaded(_));
                    if ui.add_enabled(loaded, egui::Button::new("Start")).clicked() {
                        self.start_clicked();
                    }
                    if ui.button("Stop").clicked() {
                        self.playback.stop();
                    }
                });
                if let KernelState::Failed(message) = &self.kernel {
                    ui.colored_label(egui::Color32::LIGHT_RED, message);
                }
                if let Some(status) = &self.status {
                    ui.colored_label(egui::Color32::LIGHT_RED, status);
                }

                ui.separator();
                ui.label(egui::RichText::new("Distances from Earth").strong());
                self.show_table(ui);

                ui.separator();
                ui.label(egui::RichText::new("% Time Closest to Earth").strong());
                self.show_pie(ui);
            });
    }

    fn show_table(&self, ui: &mut egui::Ui) {
        egui::Grid::new("distance_grid")
            .striped(true)
            .min_col_width(52.0)
            .show(ui, |ui| {
                for header in ["Planet", "Current (AU)", "Average (AU)", "Rank", "Closest (%)"] {
                    ui.label(egui::RichText::new(header).strong());
                }
                ui.end_row();

                match &self.report {
                    Some(report) => {
                        for planet in &report.planets {
                            ui.colored_label(planet.body.color(), planet.body.label());
                            ui.label(format!("{:05.2}", planet.distance_au));
                            ui.label(format!("{:05.2}", planet.average_au));
                            ui.label(planet.rank.to_string());
                            ui.label(format!("{:05.2}", planet.closest_pct));
                            ui.end_row();
                        }
                    }
                    None => {
                        for body in Body::PLANETS {
                            ui.colored_label(body.color(), body.label());
                            for _ in 0..4 {
                                ui.label("-");
                            }
                            ui.end_row();
                        }
                    }
                }
            });
    }

    fn show_pie(&self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(
            egui::Vec2::new(ui.available_width(), PIE_HEIGHT),
            egui::Sense::hover(),
        );
        let rect = response.rect;
        let center = rect.center();
        let radius = rect.width().min(rect.height()) * 0.38;

        let slices: Vec<_> = match &self.report {
            Some(report) => report
                .planets
                .iter()
                .filter(|p| p.closest_pct > 0.0)
                .map(|p| (p.body, p.closest_pct))
                .collect(),
            None => Vec::new(),
        };

        if slices.is_empty() {
            painter.text(
                center,
                egui::Align2::CENTER_CENTER,
                "No data yet",
                egui::FontId::proportional(14.0),
                ui.visuals().text_color(),
            );
            return;
        }

        // Start at 12 o'clock and sweep counterclockwise, screen y down.
        let point_at = |angle: f64, r: f32| {
            center + egui::Vec2::new(angle.cos() as f32, -angle.sin() as f32) * r
        };
        let mut angle = TAU / 4.0;
        for (body, pct) in slices {
            let sweep = pct / 100.0 * TAU;
            let steps = ((sweep / 0.05).ceil() as usize).max(2);

            let mut points = vec![center];
            for step in 0..=steps {
                points.push(point_at(angle + sweep * step as f64 / steps as f64, radius));
            }
            painter.add(egui::Shape::convex_polygon(
                points,
                body.color(),
                egui::Stroke::NONE,
            ));

            painter.text(
                point_at(angle + sweep / 2.0, radius + 16.0),
                egui::Align2::CENTER_CENTER,
                format!("{} {pct:.1}%", body.label()),
                egui::FontId::proportional(11.0),
                body.color(),
            );
            angle += sweep;
        }
    }

    fn show_solar_system(&self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            Plot::new("solar_system")
                .data_aspect(1.0)
                .legend(Legend::default())
                .x_axis_label("X Position (AU)")
                .y_axis_label("Y Position (AU)")
                .allow_scroll(false)
                .show(ui, |plot_ui| {
                    plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                        [-AXIS_LIMIT, -AXIS_LIMIT],
                        [AXIS_LIMIT, AXIS_LIMIT],
                    ));
                    plot_ui.points(
                        Points::new("Sun", vec![[0.0, 0.0]])
                            .radius(SUN_MARKER_RADIUS)
                            .color(Body::Sun.color()),
                    );
                    if let Some(report) = &self.report {
                        plot_ui.points(
                            Points::new("Earth", vec![report.earth])
                                .radius(Body::Earth.marker_radius())
                                .color(Body::Earth.color()),
                        );
                        for planet in &report.planets {
                            plot_ui.points(
                                Points::new(planet.body.label(), vec![planet.position])
                                    .radius(planet.body.marker_radius())
                                    .color(planet.body.color()),
                            );
                        }
                    }
                });
        });
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.playback.is_running() {
            if let KernelState::Loaded(kernel) = &mut self.kernel {
                match self.playback.tick(kernel) {
                    Some(Ok(report)) => self.report = Some(report),
                    Some(Err(error)) => {
                        log::warn!("frame aborted, ephemeris lookup failed: {error}");
                        self.status = Some(format!("No ephemeris data: {error}"));
                        self.playback.stop();
                    }
                    None => {}
                }
            }
            ctx.request_repaint();
        }

        self.show_header(ctx);
        self.show_controls(ctx);
        self.show_solar_system(ctx);
    }
}
