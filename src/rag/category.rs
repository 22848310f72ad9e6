/// Topical category of a question, used to pick the answer heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Driver,
    Team,
    Race,
    Stats,
    History,
    Rules,
    General,
}

/// Checked top to bottom; the first category with a matching keyword wins.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Driver,
        &[
            "driver",
            "pilot",
            "racer",
            "hamilton",
            "verstappen",
            "leclerc",
            "russell",
            "norris",
            "alonso",
        ],
    ),
    (
        Category::Team,
        &[
            "team",
            "constructor",
            "mercedes",
            "ferrari",
            "red bull",
            "mclaren",
            "aston martin",
            "alpine",
        ],
    ),
    (
        Category::Race,
        &[
            "race",
            "circuit",
            "track",
            "monaco",
            "silverstone",
            "spa",
            "monza",
            "championship",
        ],
    ),
    (
        Category::Stats,
        &["statistic", "record", "fastest", "pole", "win", "point", "standing"],
    ),
    (
        Category::History,
        &[
            "history",
            "past",
            "legend",
            "classic",
            "old",
            "vintage",
            "historical",
        ],
    ),
    (
        Category::Rules,
        &["rule", "regulation", "technical", "drs", "kers", "ers", "penalty"],
    ),
];

impl Category {
    /// Plain substring match on the lowercased query, so "ers" also hits
    /// "drivers" and "old" hits "hold". Priority order resolves the overlaps.
    pub fn classify(query: &str) -> Self {
        let query = query.to_lowercase();
        CATEGORY_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|kw| query.contains(kw)))
            .map(|(category, _)| *category)
            .unwrap_or(Category::General)
    }

    pub fn heading(&self) -> &'static str {
        match self {
            Category::Driver => "🏎️ **F1 Driver Information:**\n\n",
            Category::Team => "🏁 **F1 Team Information:**\n\n",
            Category::Race => "🏆 **F1 Race Information:**\n\n",
            Category::Stats => "📊 **F1 Statistics:**\n\n",
            Category::History => "📚 **F1 History:**\n\n",
            Category::Rules => "📋 **F1 Rules & Regulations:**\n\n",
            Category::General => "🏎️ **F1 Information:**\n\n",
        }
    }
}
