mod app;
mod celestial;
mod ephem;
mod playback;
mod timeline;
mod tracker;

use eframe::egui;

use crate::app::{App, KernelState};
use crate::ephem::SpiceKernel;

const DEFAULT_BSP: &str = "de421.bsp";

fn main() -> eframe::Result<()> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_BSP.to_string());
    let kernel = match SpiceKernel::open(&path) {
        Ok(kernel) => {
            log::info!("loaded ephemeris {path} ({} segments)", kernel.segment_count());
            KernelState::Loaded(kernel)
        }
        Err(error) => {
            log::error!("failed to load ephemeris {path}: {error}");
            KernelState::Failed(format!("Could not load {path}: {error}"))
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1500.0, 950.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Planets and their Relative Distances to Earth",
        options,
        Box::new(|_cc| Ok(Box::new(App::new(kernel)))),
    )
}
