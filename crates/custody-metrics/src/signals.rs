use regex::Regex;

pub const TECHNICAL_TERMS: [&str; 15] = [
    "api",
    "database",
    "security",
    "authentication",
    "encryption",
    "optimization",
    "scalability",
    "performance",
    "architecture",
    "algorithm",
    "framework",
    "pattern",
    "design",
    "implementation",
    "deployment",
];

pub const INNOVATION_TERMS: [&str; 9] = [
    "novel",
    "innovative",
    "creative",
    "unique",
    "advanced",
    "breakthrough",
    "revolutionary",
    "cutting-edge",
    "state-of-the-art",
];

pub const TECHNICAL_POINTS: f64 = 8.0;
pub const TECHNICAL_CAP: f64 = 35.0;
pub const INNOVATION_POINTS: f64 = 6.0;
pub const INNOVATION_CAP: f64 = 25.0;
pub const CODE_POINTS: f64 = 30.0;
pub const STRUCTURE_POINTS: f64 = 20.0;

/// Points for answer length in characters.
pub fn length_points(chars: usize) -> f64 {
    match chars {
        n if n > 800 => 25.0,
        n if n > 500 => 20.0,
        n if n > 200 => 15.0,
        n if n > 100 => 10.0,
        _ => 0.0,
    }
}

/// Terms from `terms` that occur anywhere in `lowered`. Each term counts once.
pub fn distinct_terms<'a>(lowered: &str, terms: &[&'a str]) -> Vec<&'a str> {
    terms
        .iter()
        .copied()
        .filter(|t| lowered.contains(t))
        .collect()
}

/// Compiled patterns for code and structure markers.
pub struct Markers {
    code: Regex,
    structure: Regex,
}

impl Markers {
    pub fn new() -> anyhow::Result<Self> {
        let code = Regex::new(r"```|\b(?:def|class|function)\s+[A-Za-z_][A-Za-z0-9_]*")
            .map_err(|e| anyhow::anyhow!("invalid code marker pattern: {}", e))?;
        let structure = Regex::new(r"(?m)^[ \t]*(?:\d+\.\s|[-*•]\s|#{1,6}\s)")
            .map_err(|e| anyhow::anyhow!("invalid structure marker pattern: {}", e))?;
        Ok(Self { code, structure })
    }

    pub fn has_code(&self, text: &str) -> bool {
        self.code.is_match(text)
    }

    pub fn has_structure(&self, text: &str) -> bool {
        self.structure.is_match(text)
    }
}
