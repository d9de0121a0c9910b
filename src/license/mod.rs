pub mod header;

pub use header::{DEFAULT_TEMPLATE, LicenseError, LicenseHeader, YEAR_PROPERTY, render};
