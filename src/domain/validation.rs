//! Input validation for the numeric survey answers.
//!
//! Validation is fail-fast: the first field that cannot be parsed, or the
//! first value outside its interval, stops the request. Fields are checked in
//! form order.

use serde::{Deserialize, Serialize};

use super::patient::{Frequency, Gender, PatientRecord, Transport, YesNo};

/// The eight numeric survey fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumericField {
    Age,
    Height,
    Weight,
    VegetableFrequency,
    MainMeals,
    WaterIntake,
    PhysicalActivity,
    TechUse,
}

impl NumericField {
    /// All numeric fields in the order they are checked.
    pub const ALL: [Self; 8] = [
        Self::Age,
        Self::Height,
        Self::Weight,
        Self::VegetableFrequency,
        Self::MainMeals,
        Self::WaterIntake,
        Self::PhysicalActivity,
        Self::TechUse,
    ];

    /// Human-readable field name.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Height => "Height",
            Self::Weight => "Weight",
            Self::VegetableFrequency => "Vegetable consumption frequency",
            Self::MainMeals => "Number of main meals",
            Self::WaterIntake => "Water intake",
            Self::PhysicalActivity => "Physical activity frequency",
            Self::TechUse => "Technology use",
        }
    }

    /// Closed interval of accepted values.
    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        match self {
            Self::Age => (10.0, 100.0),
            Self::Height => (1.0, 2.5),
            Self::Weight => (30.0, 300.0),
            Self::VegetableFrequency => (1.0, 3.0),
            Self::MainMeals => (1.0, 4.0),
            Self::WaterIntake => (0.0, 5.0),
            Self::PhysicalActivity => (0.0, 3.0),
            Self::TechUse => (0.0, 24.0),
        }
    }

    /// Unit suffix for error messages and form hints ("" when unitless).
    #[must_use]
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Age => "years",
            Self::Height => "meters",
            Self::Weight => "kg",
            Self::WaterIntake => "liters",
            Self::TechUse => "hours",
            Self::VegetableFrequency | Self::MainMeals | Self::PhysicalActivity => "",
        }
    }

    /// Whether `value` lies in the field's closed interval. NaN never does.
    #[must_use]
    pub fn accepts(&self, value: f64) -> bool {
        let (min, max) = self.range();
        (min..=max).contains(&value)
    }

    /// Read this field from a record.
    #[must_use]
    pub fn value_of(&self, record: &PatientRecord) -> f64 {
        match self {
            Self::Age => record.age,
            Self::Height => record.height,
            Self::Weight => record.weight,
            Self::VegetableFrequency => record.vegetable_frequency,
            Self::MainMeals => record.main_meals,
            Self::WaterIntake => record.water_intake,
            Self::PhysicalActivity => record.physical_activity,
            Self::TechUse => record.tech_use,
        }
    }
}

impl std::fmt::Display for NumericField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Rejected input. Only the first problem found is reported.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be a number (got {input:?})")]
    NotNumeric { field: NumericField, input: String },

    #[error("{field} must be between {min} and {max}{}", unit_suffix(.field))]
    OutOfRange {
        field: NumericField,
        value: f64,
        min: f64,
        max: f64,
    },
}

fn unit_suffix(field: &NumericField) -> String {
    match field.unit() {
        "" => String::new(),
        unit => format!(" {unit}"),
    }
}

impl ValidationError {
    /// The field that was rejected.
    #[must_use]
    pub fn field(&self) -> NumericField {
        match self {
            Self::NotNumeric { field, .. } | Self::OutOfRange { field, .. } => *field,
        }
    }
}

impl PatientRecord {
    /// Check every numeric field against its interval.
    ///
    /// # Errors
    /// Returns the first field (in form order) whose value is out of range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for field in NumericField::ALL {
            let value = field.value_of(self);
            if !field.accepts(value) {
                let (min, max) = field.range();
                return Err(ValidationError::OutOfRange {
                    field,
                    value,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }
}

/// Form submission as typed by the user: numeric answers are still text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSubmission {
    pub gender: Gender,
    pub age: String,
    pub height: String,
    pub weight: String,
    pub family_history: YesNo,
    pub high_calorie_food: YesNo,
    pub vegetable_frequency: String,
    pub main_meals: String,
    pub snacking: Frequency,
    pub smoking: YesNo,
    pub water_intake: String,
    pub calorie_monitoring: YesNo,
    pub physical_activity: String,
    pub tech_use: String,
    pub alcohol: Frequency,
    pub transport: Transport,
}

impl Default for RawSubmission {
    /// The values the form is pre-filled with.
    fn default() -> Self {
        Self {
            gender: Gender::Male,
            age: "25".to_string(),
            height: "1.80".to_string(),
            weight: "85.0".to_string(),
            family_history: YesNo::Yes,
            high_calorie_food: YesNo::Yes,
            vegetable_frequency: "2.0".to_string(),
            main_meals: "3.0".to_string(),
            snacking: Frequency::No,
            smoking: YesNo::Yes,
            water_intake: "2.0".to_string(),
            calorie_monitoring: YesNo::Yes,
            physical_activity: "1.0".to_string(),
            tech_use: "1.0".to_string(),
            alcohol: Frequency::No,
            transport: Transport::Automobile,
        }
    }
}

impl RawSubmission {
    /// Text typed for a numeric field.
    #[must_use]
    pub fn text(&self, field: NumericField) -> &str {
        match field {
            NumericField::Age => &self.age,
            NumericField::Height => &self.height,
            NumericField::Weight => &self.weight,
            NumericField::VegetableFrequency => &self.vegetable_frequency,
            NumericField::MainMeals => &self.main_meals,
            NumericField::WaterIntake => &self.water_intake,
            NumericField::PhysicalActivity => &self.physical_activity,
            NumericField::TechUse => &self.tech_use,
        }
    }

    /// Mutable access to the text of a numeric field.
    pub fn text_mut(&mut self, field: NumericField) -> &mut String {
        match field {
            NumericField::Age => &mut self.age,
            NumericField::Height => &mut self.height,
            NumericField::Weight => &mut self.weight,
            NumericField::VegetableFrequency => &mut self.vegetable_frequency,
            NumericField::MainMeals => &mut self.main_meals,
            NumericField::WaterIntake => &mut self.water_intake,
            NumericField::PhysicalActivity => &mut self.physical_activity,
            NumericField::TechUse => &mut self.tech_use,
        }
    }

    /// Parse every numeric field, then range-check the record.
    ///
    /// All fields are parsed before any range check, so a non-numeric entry
    /// is reported even when an earlier field is out of range.
    ///
    /// # Errors
    /// Returns the first [`ValidationError`] encountered.
    pub fn parse(&self) -> Result<PatientRecord, ValidationError> {
        let mut values = [0.0_f64; 8];
        for (slot, field) in values.iter_mut().zip(NumericField::ALL) {
            *slot = parse_number(field, self.text(field))?;
        }
        let [age, height, weight, vegetable_frequency, main_meals, water_intake, physical_activity, tech_use] =
            values;

        let record = PatientRecord {
            gender: self.gender,
            age,
            height,
            weight,
            family_history: self.family_history,
            high_calorie_food: self.high_calorie_food,
            vegetable_frequency,
            main_meals,
            snacking: self.snacking,
            smoking: self.smoking,
            water_intake,
            calorie_monitoring: self.calorie_monitoring,
            physical_activity,
            tech_use,
            alcohol: self.alcohol,
            transport: self.transport,
        };
        record.validate()?;
        Ok(record)
    }
}

fn parse_number(field: NumericField, input: &str) -> Result<f64, ValidationError> {
    input
        .trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::NotNumeric {
            field,
            input: input.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_text(field: NumericField, text: &str) -> RawSubmission {
        let mut raw = RawSubmission::default();
        *raw.text_mut(field) = text.to_string();
        raw
    }

    #[test]
    fn test_defaults_are_valid() {
        let record = RawSubmission::default().parse().expect("Defaults should parse");
        assert!((record.height - 1.80).abs() < f64::EPSILON);
        assert_eq!(record.transport, Transport::Automobile);
    }

    #[test]
    fn test_boundaries_are_accepted() {
        for field in NumericField::ALL {
            let (min, max) = field.range();
            for bound in [min, max] {
                let raw = with_text(field, &bound.to_string());
                assert!(raw.parse().is_ok(), "{field} should accept {bound}");
            }
        }
    }

    #[test]
    fn test_one_unit_outside_is_rejected() {
        for field in NumericField::ALL {
            let (min, max) = field.range();
            for outside in [min - 1.0, max + 1.0] {
                let err = with_text(field, &outside.to_string())
                    .parse()
                    .expect_err("Should reject");
                assert_eq!(err.field(), field);
                assert!(matches!(err, ValidationError::OutOfRange { .. }));
            }
        }
    }

    #[test]
    fn test_just_below_height_minimum() {
        let err = with_text(NumericField::Height, "0.99").parse().expect_err("Should reject");
        assert_eq!(err.field(), NumericField::Height);
    }

    #[test]
    fn test_age_below_range_message() {
        let err = with_text(NumericField::Age, "5").parse().expect_err("Should reject");
        assert_eq!(err.to_string(), "Age must be between 10 and 100 years");
    }

    #[test]
    fn test_unitless_message() {
        let err = with_text(NumericField::MainMeals, "7").parse().expect_err("Should reject");
        assert_eq!(err.to_string(), "Number of main meals must be between 1 and 4");
    }

    #[test]
    fn test_non_numeric_is_distinct_error() {
        let err = with_text(NumericField::Weight, "eighty").parse().expect_err("Should reject");
        assert_eq!(
            err,
            ValidationError::NotNumeric {
                field: NumericField::Weight,
                input: "eighty".to_string()
            }
        );
    }

    #[test]
    fn test_parse_errors_win_over_range_errors() {
        let mut raw = with_text(NumericField::Age, "500");
        raw.tech_use = "lots".to_string();
        let err = raw.parse().expect_err("Should reject");
        assert!(matches!(
            err,
            ValidationError::NotNumeric { field: NumericField::TechUse, .. }
        ));
    }

    #[test]
    fn test_first_violation_only() {
        let mut raw = with_text(NumericField::Weight, "10");
        raw.tech_use = "30".to_string();
        let err = raw.parse().expect_err("Should reject");
        assert_eq!(err.field(), NumericField::Weight);
    }

    #[test]
    fn test_nan_is_out_of_range() {
        let err = with_text(NumericField::WaterIntake, "NaN").parse().expect_err("Should reject");
        assert!(matches!(err, ValidationError::OutOfRange { .. }));
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let raw = with_text(NumericField::Age, " 42 ");
        assert!((raw.parse().expect("Should parse").age - 42.0).abs() < f64::EPSILON);
    }
}
