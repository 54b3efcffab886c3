//! Feature-matrix enumeration
//!
//! Turns an ordered feature list into the complete set of configurations
//! to verify: `--all-features`, `--no-default-features`, and every
//! non-empty feature subset.

use std::fmt;

/// One feature selection under which the project is verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Configuration {
    /// Enable everything via `--all-features`.
    AllFeatures,
    /// Disable default features, enable nothing.
    NoDefaultFeatures,
    /// Disable default features, enable exactly this non-empty subset.
    FeatureSubset(Vec<String>),
}

impl Configuration {
    /// Feature-selection flags passed to the build tool.
    pub fn flags(&self) -> Vec<String> {
        match self {
            Configuration::AllFeatures => vec!["--all-features".to_string()],
            Configuration::NoDefaultFeatures => vec!["--no-default-features".to_string()],
            Configuration::FeatureSubset(features) => vec![
                "--no-default-features".to_string(),
                "--features".to_string(),
                features.join(","),
            ],
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.flags().join(" "))
    }
}

/// Number of configurations [`enumerate`] yields for `n` features.
pub fn configuration_count(n: usize) -> usize {
    2 + (1usize << n) - 1
}

/// Enumerate every configuration for the given feature list.
///
/// Yields the two sentinels first, then each non-empty subset of
/// `features` in ascending bitmask order, for a total of
/// `2 + (2^N - 1)` configurations. The output is fully determined by
/// the input order; an empty feature list yields only the sentinels.
pub fn enumerate(features: &[String]) -> Vec<Configuration> {
    let mut configurations = Vec::with_capacity(configuration_count(features.len()));
    configurations.push(Configuration::AllFeatures);
    configurations.push(Configuration::NoDefaultFeatures);

    // Bit i of the counter selects features[i]. Counter 0 is the empty
    // subset, which has no meaningful --features argument.
    for mask in 1u64..1u64 << features.len() {
        let subset = features
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, feature)| feature.clone())
            .collect();
        configurations.push(Configuration::FeatureSubset(subset));
    }

    configurations
}
