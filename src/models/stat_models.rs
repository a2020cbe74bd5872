use crate::animation::count_up::DEFAULT_COUNT_UP_DURATION_MS;

/// One headline number on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatDefinition {
    pub end: u64,
    pub prefix: &'static str,
    pub suffix: &'static str,
    pub label: &'static str,
    pub duration_ms: f64,
}

impl StatDefinition {
    pub const fn new(end: u64, suffix: &'static str, label: &'static str) -> Self {
        Self {
            end,
            prefix: "",
            suffix,
            label,
            duration_ms: DEFAULT_COUNT_UP_DURATION_MS,
        }
    }
}

/// The proof-of-concept numbers shown under the pilot market section.
pub const PROOF_STATS: [StatDefinition; 4] = [
    StatDefinition::new(13, "", "Data Sources Integrated"),
    StatDefinition::new(280, "+", "Clean Listings"),
    StatDefinition::new(16, "", "Locations Across Cape Verde"),
    StatDefinition::new(100, "%", "Automation Rate"),
];
