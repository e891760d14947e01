//! Trip analysis and fleet aggregation.
//!
//! Each trip passes through load classification and acceleration detection,
//! which feed the fuel estimator, whose output is turned into savings
//! recommendations. Processed trips are then aggregated into fleet and driver
//! summaries.

pub mod acceleration;
pub mod aggregate;
pub mod analyzer;
pub mod fuel;
pub mod grade;
pub mod load;
pub mod savings;
pub mod scenarios;
pub mod types;
pub mod utility;
