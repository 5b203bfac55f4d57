//! Control sidebar for the orbital viewer
//!
//! egui panel with the quantum-number sliders, orbital mode selection,
//! render quality knobs, the radial probability curve and a reference
//! block of the governing equations.

use egui::{Color32, Context, FontFamily, FontId, RichText, Sense, Shape, Stroke};

use crate::state::{HybridFamily, HybridSpec, OrbitalConfig, OrbitalMode, ShadingMode};

/// Equation entry with label and formula
pub struct Equation {
    pub name: &'static str,
    pub formula: &'static str,
    pub description: &'static str,
}

pub const ORBITAL_EQUATIONS: &[Equation] = &[
    Equation {
        name: "Wave Function",
        formula: "ψ(r,θ,φ) = R_nl(r) · Y_lm(θ,φ)",
        description: "Separable into radial and angular parts",
    },
    Equation {
        name: "Radial Part",
        formula: "R_nl = N e^(-ρ/2) ρ^l L_(n-l-1)^(2l+1)(ρ)",
        description: "ρ = 2r/(n·a₀), L is an associated Laguerre polynomial",
    },
    Equation {
        name: "Angular Part",
        formula: "Y_lm = N P_l^m(cos θ) e^(imφ)",
        description: "P is an associated Legendre polynomial",
    },
    Equation {
        name: "Radial Probability",
        formula: "P(r) = r² R_nl(r)²",
        description: "Chance of finding the electron at radius r",
    },
];

pub const ORBITAL_VARIABLES: &[(&str, &str)] = &[
    ("n", "principal quantum number (shell)"),
    ("l", "azimuthal quantum number (shape)"),
    ("m", "magnetic quantum number (orientation)"),
    ("a₀", "Bohr radius (unit of length here)"),
];

/// Draw the full control sidebar, mutating `config` through its clamping
/// transitions. Mutations can never leave the quantum numbers invalid.
pub fn draw_control_sidebar(ctx: &Context, config: &mut OrbitalConfig, radial_curve: &[(f64, f64)]) {
    egui::SidePanel::right("orbital_controls")
        .min_width(280.0)
        .max_width(350.0)
        .resizable(true)
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(RichText::new("Hydrogen Orbitals").color(Color32::from_rgb(100, 200, 255)));
            });

            ui.add_space(10.0);
            ui.separator();
            ui.add_space(5.0);

            section_label(ui, "Quantum Numbers");

            let mut n = config.qn.n();
            if ui.add(egui::Slider::new(&mut n, 1..=7).text("n")).changed() {
                config.qn = config.qn.with_n(n);
            }
            let mut l = config.qn.l();
            if ui
                .add(egui::Slider::new(&mut l, 0..=config.qn.n() - 1).text("l"))
                .changed()
            {
                config.qn = config.qn.with_l(l);
            }
            let l_now = config.qn.l() as i32;
            let mut m = config.qn.m();
            if ui.add(egui::Slider::new(&mut m, -l_now..=l_now).text("m")).changed() {
                config.qn = config.qn.with_m(m);
            }
            ui.label(
                RichText::new(format!("Orbital: {}", config.qn.name()))
                    .color(Color32::from_rgb(150, 255, 150))
                    .font(FontId::new(14.0, FontFamily::Monospace)),
            );

            ui.add_space(10.0);
            ui.separator();
            ui.add_space(5.0);

            section_label(ui, "Orbital Mode");
            mode_selector(ui, &mut config.mode);

            ui.add_space(10.0);
            ui.separator();
            ui.add_space(5.0);

            section_label(ui, "Rendering");
            ui.horizontal(|ui| {
                ui.selectable_value(&mut config.shading, ShadingMode::Cloud, "Cloud");
                ui.selectable_value(&mut config.shading, ShadingMode::Isosurface, "Isosurface");
            });
            ui.add(egui::Slider::new(&mut config.opacity, 0.05..=1.0).text("Opacity"));
            ui.add(
                egui::Slider::new(
                    &mut config.quality,
                    OrbitalConfig::MIN_QUALITY..=OrbitalConfig::MAX_QUALITY,
                )
                .text("Quality"),
            );

            ui.add_space(10.0);
            ui.separator();
            ui.add_space(5.0);

            section_label(ui, "Radial Probability");
            draw_radial_curve(ui, radial_curve);

            ui.add_space(10.0);
            ui.separator();
            ui.add_space(5.0);

            section_label(ui, "Equations");
            for eq in ORBITAL_EQUATIONS {
                draw_equation(ui, eq);
                ui.add_space(8.0);
            }

            ui.add_space(5.0);
            section_label(ui, "Variables");
            for (symbol, meaning) in ORBITAL_VARIABLES {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new(*symbol)
                            .color(Color32::from_rgb(150, 255, 150))
                            .font(FontId::new(14.0, FontFamily::Monospace)),
                    );
                    ui.label(RichText::new("=").color(Color32::GRAY));
                    ui.label(RichText::new(*meaning).color(Color32::LIGHT_GRAY));
                });
            }
        });
}

fn section_label(ui: &mut egui::Ui, text: &str) {
    ui.label(RichText::new(text).strong().color(Color32::from_rgb(255, 200, 100)));
    ui.add_space(5.0);
}

fn mode_selector(ui: &mut egui::Ui, mode: &mut OrbitalMode) {
    let mut tag = match mode {
        OrbitalMode::Complex => 0,
        OrbitalMode::Real => 1,
        OrbitalMode::Hybrid(_) => 2,
    };
    ui.horizontal(|ui| {
        ui.selectable_value(&mut tag, 0, "Complex");
        ui.selectable_value(&mut tag, 1, "Real");
        ui.selectable_value(&mut tag, 2, "Hybrid");
    });
    *mode = match tag {
        0 => OrbitalMode::Complex,
        1 => OrbitalMode::Real,
        _ => match *mode {
            OrbitalMode::Hybrid(spec) => OrbitalMode::Hybrid(spec),
            _ => OrbitalMode::Hybrid(HybridSpec::default()),
        },
    };

    if let OrbitalMode::Hybrid(spec) = mode {
        let mut family = spec.family();
        egui::ComboBox::from_label("Family")
            .selected_text(family.label())
            .show_ui(ui, |ui| {
                for f in HybridFamily::ALL {
                    ui.selectable_value(&mut family, f, f.label());
                }
            });
        // Changing family resets to the first lobe
        let mut index = if family == spec.family() { spec.index() } else { 0 };
        ui.add(egui::Slider::new(&mut index, 0..=family.orbital_count() - 1).text("Lobe"));
        if let Ok(valid) = HybridSpec::new(family, index) {
            *spec = valid;
        }
    }
}

/// Polyline plot of (r, P(r)) normalized into the allocated rect.
fn draw_radial_curve(ui: &mut egui::Ui, samples: &[(f64, f64)]) {
    let (response, painter) =
        ui.allocate_painter(egui::vec2(ui.available_width(), 90.0), Sense::hover());
    let rect = response.rect.shrink(2.0);
    painter.rect_filled(rect, 4.0, Color32::from_gray(18));

    if samples.len() < 2 {
        return;
    }
    let max_r = samples.last().map(|s| s.0).unwrap_or(1.0).max(1e-9);
    let max_p = samples.iter().map(|s| s.1).fold(0.0f64, f64::max).max(1e-12);

    let points: Vec<egui::Pos2> = samples
        .iter()
        .map(|&(r, p)| {
            egui::pos2(
                rect.left() + (r / max_r) as f32 * rect.width(),
                rect.bottom() - (p / max_p) as f32 * (rect.height() - 4.0),
            )
        })
        .collect();
    painter.add(Shape::line(points, Stroke::new(1.5, Color32::from_rgb(79, 172, 254))));
}

fn draw_equation(ui: &mut egui::Ui, eq: &Equation) {
    ui.label(RichText::new(eq.name).color(Color32::from_rgb(200, 200, 255)).strong());
    ui.label(
        RichText::new(eq.formula)
            .color(Color32::WHITE)
            .font(FontId::new(13.0, FontFamily::Monospace)),
    );
    ui.label(
        RichText::new(eq.description)
            .color(Color32::GRAY)
            .font(FontId::new(11.0, FontFamily::Proportional)),
    );
}
