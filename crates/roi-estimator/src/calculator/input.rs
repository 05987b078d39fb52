use serde::{Deserialize, Serialize};

/// Declared range and slider step for a bounded input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldBounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl FieldBounds {
    const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Clamp into `[min, max]`. NaN resolves to the minimum.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// The six user-adjustable inputs of the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputField {
    ManualHours,
    HourlyRate,
    TeamSize,
    AutomationPercentage,
    SoftwareCost,
    ImplementationCost,
}

impl InputField {
    pub fn ordered() -> [InputField; 6] {
        [
            InputField::ManualHours,
            InputField::HourlyRate,
            InputField::TeamSize,
            InputField::AutomationPercentage,
            InputField::SoftwareCost,
            InputField::ImplementationCost,
        ]
    }

    /// Slider range for bounded fields; `None` for free-form cost entry.
    pub fn bounds(self) -> Option<FieldBounds> {
        match self {
            InputField::ManualHours => Some(FieldBounds::new(10.0, 80.0, 1.0)),
            InputField::HourlyRate => Some(FieldBounds::new(20.0, 150.0, 5.0)),
            InputField::TeamSize => Some(FieldBounds::new(1.0, 50.0, 1.0)),
            InputField::AutomationPercentage => Some(FieldBounds::new(10.0, 90.0, 5.0)),
            InputField::SoftwareCost | InputField::ImplementationCost => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InputField::ManualHours => "Hours per week on manual tasks (per person)",
            InputField::HourlyRate => "Average hourly rate",
            InputField::TeamSize => "Team size",
            InputField::AutomationPercentage => "Work that can be automated (%)",
            InputField::SoftwareCost => "Monthly software cost",
            InputField::ImplementationCost => "One-time implementation cost",
        }
    }

    /// Bring a raw value into the field's accepted domain.
    pub fn normalize(self, value: f64) -> f64 {
        match self.bounds() {
            Some(bounds) => bounds.clamp(value),
            None => non_negative_or_zero(value),
        }
    }
}

/// Session-owned calculator inputs.
///
/// Values produced through [`CalculatorInput::set`] or
/// [`CalculatorInput::sanitized`] are always finite, non-negative and within
/// the slider bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorInput {
    pub manual_hours: f64,
    pub hourly_rate: f64,
    pub team_size: f64,
    pub automation_percentage: f64,
    pub software_cost: f64,
    pub implementation_cost: f64,
}

impl Default for CalculatorInput {
    fn default() -> Self {
        Self {
            manual_hours: 40.0,
            hourly_rate: 50.0,
            team_size: 5.0,
            automation_percentage: 60.0,
            software_cost: 500.0,
            implementation_cost: 5000.0,
        }
    }
}

impl CalculatorInput {
    pub fn get(&self, field: InputField) -> f64 {
        match field {
            InputField::ManualHours => self.manual_hours,
            InputField::HourlyRate => self.hourly_rate,
            InputField::TeamSize => self.team_size,
            InputField::AutomationPercentage => self.automation_percentage,
            InputField::SoftwareCost => self.software_cost,
            InputField::ImplementationCost => self.implementation_cost,
        }
    }

    /// Apply a single change event, clamping or coercing as the field demands.
    pub fn set(&mut self, field: InputField, value: f64) {
        let value = field.normalize(value);
        let slot = match field {
            InputField::ManualHours => &mut self.manual_hours,
            InputField::HourlyRate => &mut self.hourly_rate,
            InputField::TeamSize => &mut self.team_size,
            InputField::AutomationPercentage => &mut self.automation_percentage,
            InputField::SoftwareCost => &mut self.software_cost,
            InputField::ImplementationCost => &mut self.implementation_cost,
        };
        *slot = value;
    }

    /// Same input with every field brought into its accepted domain.
    pub fn sanitized(&self) -> Self {
        let mut cleaned = *self;
        for field in InputField::ordered() {
            cleaned.set(field, self.get(field));
        }
        cleaned
    }

    pub fn is_valid(&self) -> bool {
        InputField::ordered().into_iter().all(|field| {
            let value = self.get(field);
            value.is_finite()
                && value >= 0.0
                && field.bounds().map_or(true, |bounds| bounds.contains(value))
        })
    }
}

/// Parse free-form numeric entry. Anything unusable becomes `0`.
///
/// Accepts surrounding whitespace, a leading `$`, and `,` thousands separators.
pub fn coerce_amount(raw: &str) -> f64 {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|ch| *ch != ',')
        .collect();

    cleaned
        .trim()
        .parse::<f64>()
        .map(non_negative_or_zero)
        .unwrap_or(0.0)
}

/// A field value as clients send it: a JSON number, free-form text, or
/// anything else (booleans, arrays, objects), which counts as unusable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawValue {
    fn resolve(&self, field: InputField) -> f64 {
        match self {
            RawValue::Number(value) => field.normalize(*value),
            RawValue::Text(text) => field.normalize(coerce_amount(text)),
            // NaN clamps sliders to their minimum and zeroes costs.
            RawValue::Other(_) => field.normalize(f64::NAN),
        }
    }
}

/// Loosely-typed input from the wire. Missing fields take the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCalculatorInput {
    pub manual_hours: Option<RawValue>,
    pub hourly_rate: Option<RawValue>,
    pub team_size: Option<RawValue>,
    pub automation_percentage: Option<RawValue>,
    pub software_cost: Option<RawValue>,
    pub implementation_cost: Option<RawValue>,
}

impl RawCalculatorInput {
    fn raw(&self, field: InputField) -> Option<&RawValue> {
        match field {
            InputField::ManualHours => self.manual_hours.as_ref(),
            InputField::HourlyRate => self.hourly_rate.as_ref(),
            InputField::TeamSize => self.team_size.as_ref(),
            InputField::AutomationPercentage => self.automation_percentage.as_ref(),
            InputField::SoftwareCost => self.software_cost.as_ref(),
            InputField::ImplementationCost => self.implementation_cost.as_ref(),
        }
    }

    pub fn resolve(&self) -> CalculatorInput {
        let mut input = CalculatorInput::default();
        for field in InputField::ordered() {
            if let Some(raw) = self.raw(field) {
                input.set(field, raw.resolve(field));
            }
        }
        input
    }
}

fn non_negative_or_zero(value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        0.0
    }
}

/// One row of the bounds table exposed to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub field: InputField,
    pub label: &'static str,
    pub default: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<FieldBounds>,
}

pub fn field_descriptors() -> Vec<FieldDescriptor> {
    let defaults = CalculatorInput::default();
    InputField::ordered()
        .into_iter()
        .map(|field| FieldDescriptor {
            field,
            label: field.label(),
            default: defaults.get(field),
            bounds: field.bounds(),
        })
        .collect()
}
