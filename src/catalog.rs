/// A difficulty preset. Pure data, fixed at startup, selected by catalog
/// index and shared read-only with the session.
///
/// The color/icon/tagline fields are presentation metadata: the core passes
/// them through untouched and only the rendering layer interprets them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifficultyPreset {
    pub name: &'static str,
    /// Numbers flashed per round. Always >= 1 in the built-in catalog.
    pub count: usize,
    /// Display duration per value, and the pause before answering begins.
    pub interval_ms: u64,
    /// Inclusive upper bound for generated values; lower bound is fixed at 1.
    pub max_value: u32,
    pub color: &'static str,
    pub icon: &'static str,
    pub tagline: &'static str,
}

/// The built-in catalog, ordered easiest first. Never mutated.
pub const PRESETS: &[DifficultyPreset] = &[
    DifficultyPreset {
        name: "gentle",
        count: 3,
        interval_ms: 1200,
        max_value: 9,
        color: "green",
        icon: "~",
        tagline: "three small numbers, plenty of time",
    },
    DifficultyPreset {
        name: "steady",
        count: 5,
        interval_ms: 1000,
        max_value: 9,
        color: "cyan",
        icon: "=",
        tagline: "five digits at a walking pace",
    },
    DifficultyPreset {
        name: "brisk",
        count: 7,
        interval_ms: 800,
        max_value: 20,
        color: "yellow",
        icon: ">",
        tagline: "seven numbers up to twenty",
    },
    DifficultyPreset {
        name: "blazing",
        count: 10,
        interval_ms: 600,
        max_value: 50,
        color: "red",
        icon: "!",
        tagline: "ten big numbers, no mercy",
    },
];

/// Look a preset up by (case-insensitive) name.
pub fn index_of(name: &str) -> Option<usize> {
    PRESETS.iter().position(|p| p.name.eq_ignore_ascii_case(name))
}
