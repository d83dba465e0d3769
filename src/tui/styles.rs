//! Terminal palette for the Obesense screens.
//!
//! Every colour the UI draws comes from here. The BMI banner and the
//! predicted obesity level share one four-step weight scale, so a
//! "Normal" BMI and a `Normal_Weight` prediction always look the same.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::BmiCategory;

/// Style presets for every screen.
pub struct MedicalTheme;

impl MedicalTheme {
    /// Titles, key hints and the focused field.
    pub const ACCENT: Color = Color::Rgb(94, 234, 212); // #5EEAD4
    pub const ACCENT_DEEP: Color = Color::Rgb(20, 184, 166); // #14B8A6

    pub const FRAME: Color = Color::Rgb(113, 128, 150); // #718096

    pub const INK: Color = Color::Rgb(241, 245, 249); // #F1F5F9
    pub const INK_SOFT: Color = Color::Rgb(160, 174, 192); // #A0AEC0
    pub const INK_FAINT: Color = Color::Rgb(99, 110, 130); // #636E82

    /// Failed requests and rejected input.
    pub const ALERT: Color = Color::Rgb(239, 68, 68); // #EF4444

    /// Weight scale in band order: underweight, normal, overweight, obese.
    pub const WEIGHT_SCALE: [Color; 4] = [
        Color::Rgb(96, 165, 250),  // #60A5FA
        Color::Rgb(52, 211, 153),  // #34D399
        Color::Rgb(250, 204, 21),  // #FACC15
        Color::Rgb(251, 113, 133), // #FB7185
    ];

    #[must_use]
    pub fn title() -> Style {
        Style::default().fg(Self::INK).add_modifier(Modifier::BOLD)
    }

    /// Panel titles.
    #[must_use]
    pub fn subtitle() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::INK)
    }

    #[must_use]
    pub fn text_secondary() -> Style {
        Style::default().fg(Self::INK_SOFT)
    }

    #[must_use]
    pub fn text_muted() -> Style {
        Style::default().fg(Self::INK_FAINT)
    }

    /// Healthy status, drawn in the normal-band colour.
    #[must_use]
    pub fn success() -> Style {
        Style::default().fg(Self::band_color(BmiCategory::Normal))
    }

    /// Unknown-category notices.
    #[must_use]
    pub fn warning() -> Style {
        Style::default().fg(Self::band_color(BmiCategory::Overweight))
    }

    #[must_use]
    pub fn danger() -> Style {
        Style::default().fg(Self::ALERT)
    }

    #[must_use]
    pub fn focused() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::FRAME)
    }

    #[must_use]
    pub fn border_focused() -> Style {
        Style::default().fg(Self::ACCENT_DEEP)
    }

    #[must_use]
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_desc() -> Style {
        Style::default().fg(Self::INK_SOFT)
    }

    #[must_use]
    pub fn cursor() -> Style {
        Style::default().fg(Self::ACCENT)
    }

    /// Colour of a weight band on the shared scale.
    #[must_use]
    pub fn band_color(category: BmiCategory) -> Color {
        let step = match category {
            BmiCategory::Underweight => 0,
            BmiCategory::Normal => 1,
            BmiCategory::Overweight => 2,
            BmiCategory::Obese => 3,
        };
        Self::WEIGHT_SCALE[step]
    }

    /// BMI banner.
    #[must_use]
    pub fn bmi_category(category: BmiCategory) -> Style {
        Style::default()
            .fg(Self::band_color(category))
            .add_modifier(Modifier::BOLD)
    }

    /// Predicted obesity level. Labels outside the known families
    /// are drawn as plain secondary text.
    #[must_use]
    pub fn obesity_level(label: &str) -> Style {
        match band_of_level(label) {
            Some(category) => Style::default().fg(Self::band_color(category)),
            None => Self::text_secondary(),
        }
    }
}

/// Weight band a predicted label belongs to, by label family.
fn band_of_level(label: &str) -> Option<BmiCategory> {
    if label == "Insufficient_Weight" || label == "Underweight" {
        Some(BmiCategory::Underweight)
    } else if label.starts_with("Normal") {
        Some(BmiCategory::Normal)
    } else if label.starts_with("Overweight") {
        Some(BmiCategory::Overweight)
    } else if label.starts_with("Obesity") {
        Some(BmiCategory::Obese)
    } else {
        None
    }
}
