pub mod format;
mod input;
mod model;

pub use format::RoiDisplay;
pub use input::{
    coerce_amount, field_descriptors, CalculatorInput, FieldBounds, FieldDescriptor, InputField,
    RawCalculatorInput, RawValue,
};
pub use model::{
    compute_roi, Investment, ManualCost, RoiResult, Savings, ThreeYearProjection,
    MONTHS_PER_YEAR, WEEKS_PER_MONTH,
};
