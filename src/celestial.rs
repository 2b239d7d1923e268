use crate::ephem::AU_KM;
use eframe::egui::Color32;

/// Marker area scale applied to physical radii for the scatter plot.
const MARKER_SCALE: f64 = 500_000.0;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Body {
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Sun,
}

impl Body {
    /// Plot and legend order, Earth included.
    pub const ALL: [Body; 8] = [
        Body::Mercury,
        Body::Venus,
        Body::Earth,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
    ];

    /// Tracked planets, Earth excluded. This order is the tie-break order
    /// for closest-planet selection and the table row order.
    pub const PLANETS: [Body; 7] = [
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Earth => "Earth",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
            Body::Sun => "Sun",
        }
    }

    /// NAIF target ID. Inner planets resolve to the planet itself; the DE
    /// kernels carry the outer planets only as barycenters.
    pub fn naif_id(&self) -> i32 {
        match self {
            Body::Mercury => 199,
            Body::Venus => 299,
            Body::Earth => 399,
            Body::Mars => 499,
            Body::Jupiter => 5,
            Body::Saturn => 6,
            Body::Uranus => 7,
            Body::Neptune => 8,
            Body::Sun => 10,
        }
    }

    pub fn radius_km(&self) -> f64 {
        match self {
            Body::Mercury => 2_439.7,
            Body::Venus => 6_051.8,
            Body::Earth => 6_371.0,
            Body::Mars => 3_389.5,
            Body::Jupiter => 69_911.0,
            Body::Saturn => 58_232.0,
            Body::Uranus => 25_362.0,
            Body::Neptune => 24_622.0,
            Body::Sun => 695_700.0,
        }
    }

    pub fn color(&self) -> Color32 {
        match self {
            Body::Mercury => Color32::from_rgb(0x8C, 0x88, 0x88),
            Body::Venus => Color32::from_rgb(0xF2, 0xDA, 0xC4),
            Body::Earth => Color32::from_rgb(0xBA, 0xCB, 0xD9),
            Body::Mars => Color32::from_rgb(0xF2, 0x7A, 0x5E),
            Body::Jupiter => Color32::from_rgb(0xBF, 0xAE, 0x99),
            Body::Saturn => Color32::from_rgb(0x73, 0x6A, 0x5A),
            Body::Uranus => Color32::from_rgb(0x95, 0xBB, 0xBF),
            Body::Neptune => Color32::from_rgb(0x4D, 0x5D, 0x73),
            Body::Sun => Color32::YELLOW,
        }
    }

    /// Scatter marker radius in points, derived from the physical radius.
    pub fn marker_radius(&self) -> f32 {
        (self.radius_km() / AU_KM * MARKER_SCALE).sqrt() as f32
    }
}
