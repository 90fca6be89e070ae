//! The fixed set of FRED series this tool tracks.

use std::collections::HashSet;

use crate::domain::{DerivedSpec, Frequency, SeriesSpec};
use crate::error::AppError;

use Frequency::{Daily, Monthly, Quarterly, Weekly};

/// Built-in indicators: display name, FRED series id, native frequency.
const BUILTIN: &[(&str, &str, Frequency)] = &[
    ("GDP", "GDPC1", Quarterly),
    ("Real Consumer Exp", "PCEC96", Quarterly),
    ("Business Inv", "W790RC1Q027SBEA", Quarterly),
    ("Govt Expenditure", "W068RCQ027SBEA", Quarterly),
    ("Net Exports", "NETEXC", Quarterly),
    ("Imports", "IMPGSCA", Quarterly),
    ("Exports", "EXPGSC1", Quarterly),
    ("CPI", "CPIAUCSL", Monthly),
    ("Real Disposable Income", "DSPIC96", Monthly),
    ("Unemployment Rate", "UNRATE", Monthly),
    ("Initial Jobless Claims", "ICSA", Weekly),
    ("Continued Jobless Claims", "CCSA", Weekly),
    ("Personal Savings", "PMSAVE", Monthly),
    ("Consumer Debt % DI", "CDSP", Quarterly),
    ("Credit Card Delinquency", "DRCCLACBS", Quarterly),
    ("Mortgage Delinquency", "DRSFRMACBS", Quarterly),
    ("Consumer Sentiment", "UMCSENT", Monthly),
    ("Avg Home Price", "CSUSHPINSA", Monthly),
    ("Grocery Sales", "RSGCS", Monthly),
    ("CPI (Food at Home)", "CUSR0000SAF11", Monthly),
    ("CPI (Food away from Home)", "CUSR0000SEFV", Monthly),
    ("Restaurant Sales", "MRTSSM7225USN", Monthly),
    ("Oil Prices", "DCOILWTICO", Daily),
    ("PPI Farm Products", "WPU01", Monthly),
    ("PPI Food Manufacture", "PCU311311", Monthly),
    ("PPI Grocery", "PCU445110445110", Monthly),
    ("Retail Wages", "CES4200000003", Monthly),
    ("US Population", "POPTHM", Monthly),
];

/// Built-in derived ratios, evaluated in this order.
const BUILTIN_DERIVED: &[(&str, &str, &str)] = &[
    ("Grocery Units", "Grocery Sales", "CPI (Food at Home)"),
    ("Restaurant Units", "Restaurant Sales", "CPI (Food away from Home)"),
    ("Grocery Units per Capita", "Grocery Units", "US Population"),
    ("Restaurant Units per Capita", "Restaurant Units", "US Population"),
];

/// An ordered, duplicate-free set of series specs.
///
/// Iteration order is insertion order; the assembler relies on it when two
/// columns would otherwise collide.
#[derive(Debug, Clone)]
pub struct SeriesRegistry {
    specs: Vec<SeriesSpec>,
    derived: Vec<DerivedSpec>,
}

impl SeriesRegistry {
    /// Build a registry, rejecting duplicate display names.
    pub fn new(specs: Vec<SeriesSpec>) -> Result<Self, AppError> {
        let mut seen = HashSet::new();
        for spec in &specs {
            if !seen.insert(spec.display_name.as_str()) {
                return Err(AppError::new(
                    2,
                    format!("Duplicate series name '{}' in registry.", spec.display_name),
                ));
            }
        }
        Ok(Self {
            specs,
            derived: Vec::new(),
        })
    }

    /// Attach derived ratios. Their names must not shadow a fetched series.
    pub fn with_derived(mut self, derived: Vec<DerivedSpec>) -> Result<Self, AppError> {
        let mut seen: HashSet<&str> = self.specs.iter().map(|s| s.display_name.as_str()).collect();
        for spec in &derived {
            if !seen.insert(spec.name.as_str()) {
                return Err(AppError::new(
                    2,
                    format!("Derived column '{}' collides with another column.", spec.name),
                ));
            }
        }
        self.derived = derived;
        Ok(self)
    }

    /// The FRED indicator set the dashboard was built around.
    pub fn builtin() -> Self {
        Self {
            specs: BUILTIN
                .iter()
                .map(|(name, id, freq)| SeriesSpec::new(*name, *id, *freq))
                .collect(),
            derived: BUILTIN_DERIVED
                .iter()
                .map(|(name, num, den)| DerivedSpec::new(*name, *num, *den))
                .collect(),
        }
    }

    pub fn all_specs(&self) -> &[SeriesSpec] {
        &self.specs
    }

    pub fn derived(&self) -> &[DerivedSpec] {
        &self.derived
    }

    pub fn get(&self, display_name: &str) -> Option<&SeriesSpec> {
        self.specs.iter().find(|s| s.display_name == display_name)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
