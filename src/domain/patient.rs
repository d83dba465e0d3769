//! Patient record types for obesity-level prediction.
//!
//! Based on the "Estimation of obesity levels based on eating habits and
//! physical condition" survey. Column names and category spellings match the
//! dataset because the exported encoders and scaler are keyed on them.

use serde::{Deserialize, Serialize};

/// A survey answer drawn from a fixed list of options.
pub trait Categorical: Copy + PartialEq + Sized + 'static {
    /// All options in form order. The first one is the form default.
    const OPTIONS: &'static [Self];

    /// Spelling used by the dataset (and therefore by the encoders).
    fn as_str(&self) -> &'static str;

    /// Position of this option in [`Categorical::OPTIONS`].
    fn index(&self) -> usize {
        Self::OPTIONS.iter().position(|o| o == self).unwrap_or(0)
    }

    /// Option at `index`, wrapping around.
    fn from_index(index: usize) -> Self {
        Self::OPTIONS[index % Self::OPTIONS.len()]
    }
}

/// Gender (`Gender`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Categorical for Gender {
    const OPTIONS: &'static [Self] = &[Self::Male, Self::Female];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

/// Binary answer (`family_history_with_overweight`, `FAVC`, `SMOKE`, `SCC`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    No,
}

impl Categorical for YesNo {
    const OPTIONS: &'static [Self] = &[Self::Yes, Self::No];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }
}

/// Consumption frequency (`CAEC` snacking, `CALC` alcohol)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    #[serde(rename = "no")]
    No,
    Sometimes,
    Frequently,
    Always,
}

impl Categorical for Frequency {
    const OPTIONS: &'static [Self] = &[Self::No, Self::Sometimes, Self::Frequently, Self::Always];

    fn as_str(&self) -> &'static str {
        match self {
            Self::No => "no",
            Self::Sometimes => "Sometimes",
            Self::Frequently => "Frequently",
            Self::Always => "Always",
        }
    }
}

/// Usual transport mode (`MTRANS`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transport {
    Automobile,
    Motorbike,
    Bike,
    #[serde(rename = "Public_Transportation")]
    PublicTransportation,
    Walking,
}

impl Categorical for Transport {
    const OPTIONS: &'static [Self] = &[
        Self::Automobile,
        Self::Motorbike,
        Self::Bike,
        Self::PublicTransportation,
        Self::Walking,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Automobile => "Automobile",
            Self::Motorbike => "Motorbike",
            Self::Bike => "Bike",
            Self::PublicTransportation => "Public_Transportation",
            Self::Walking => "Walking",
        }
    }
}

/// Dataset column names in the order the form collects them.
pub const COLUMN_NAMES: [&str; 16] = [
    "Gender",
    "Age",
    "Height",
    "Weight",
    "family_history_with_overweight",
    "FAVC",
    "FCVC",
    "NCP",
    "CAEC",
    "SMOKE",
    "CH2O",
    "SCC",
    "FAF",
    "TUE",
    "CALC",
    "MTRANS",
];

/// Columns whose answers go through a label encoder.
pub const CATEGORICAL_COLUMNS: [&str; 8] = [
    "Gender",
    "family_history_with_overweight",
    "FAVC",
    "CAEC",
    "SMOKE",
    "SCC",
    "CALC",
    "MTRANS",
];

/// One raw column value before encoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnValue {
    Numeric(f64),
    Category(&'static str),
}

/// The 16 survey answers for one patient.
///
/// Numeric fields are only guaranteed to be in range after
/// [`PatientRecord::validate`] succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub gender: Gender,

    /// Age in years
    pub age: f64,

    /// Height in meters
    pub height: f64,

    /// Weight in kilograms
    pub weight: f64,

    /// A family member has suffered or suffers from overweight
    pub family_history: YesNo,

    /// Frequently eats high-calorie food (FAVC)
    pub high_calorie_food: YesNo,

    /// Vegetable consumption frequency, 1-3 (FCVC)
    pub vegetable_frequency: f64,

    /// Number of main meals per day, 1-4 (NCP)
    pub main_meals: f64,

    /// Eating between meals (CAEC)
    pub snacking: Frequency,

    pub smoking: YesNo,

    /// Daily water intake in liters (CH2O)
    pub water_intake: f64,

    /// Monitors calorie intake (SCC)
    pub calorie_monitoring: YesNo,

    /// Physical activity frequency, 0-3 (FAF)
    pub physical_activity: f64,

    /// Hours per day using technological devices (TUE)
    pub tech_use: f64,

    /// Alcohol consumption (CALC)
    pub alcohol: Frequency,

    /// Usual transport (MTRANS)
    pub transport: Transport,
}

impl PatientRecord {
    /// Column values paired with their dataset names, in form order.
    #[must_use]
    pub fn columns(&self) -> [(&'static str, ColumnValue); 16] {
        use ColumnValue::{Category, Numeric};
        let values = [
            Category(self.gender.as_str()),
            Numeric(self.age),
            Numeric(self.height),
            Numeric(self.weight),
            Category(self.family_history.as_str()),
            Category(self.high_calorie_food.as_str()),
            Numeric(self.vegetable_frequency),
            Numeric(self.main_meals),
            Category(self.snacking.as_str()),
            Category(self.smoking.as_str()),
            Numeric(self.water_intake),
            Category(self.calorie_monitoring.as_str()),
            Numeric(self.physical_activity),
            Numeric(self.tech_use),
            Category(self.alcohol.as_str()),
            Category(self.transport.as_str()),
        ];
        let mut out = [("", Numeric(0.0)); 16];
        for (slot, (name, value)) in out.iter_mut().zip(COLUMN_NAMES.iter().zip(values)) {
            *slot = (*name, value);
        }
        out
    }
}
