use std::collections::HashMap;
use std::sync::RwLock;

pub const DEFAULT_COLOR: &str = "#424242";

/// Known NYT sections and their star colors, keyed by lowercase name.
const SECTION_COLORS: &[(&str, &str)] = &[
    ("world", "#4285F4"),
    ("us", "#34A853"),
    ("u.s.", "#34A853"),
    ("politics", "#EA4335"),
    ("business", "#FBBC05"),
    ("business day", "#FBBC05"),
    ("technology", "#7B1FA2"),
    ("science", "#0097A7"),
    ("health", "#F06292"),
    ("well", "#F06292"),
    ("sports", "#FF9800"),
    ("arts", "#9C27B0"),
    ("books", "#795548"),
    ("book review", "#795548"),
    ("style", "#E91E63"),
    ("fashion", "#E91E63"),
    ("t-magazine", "#AD1457"),
    ("t magazine", "#AD1457"),
    ("food", "#8BC34A"),
    ("cooking", "#8BC34A"),
    ("travel", "#03A9F4"),
    ("magazine", "#FF5722"),
    ("realestate", "#607D8B"),
    ("real estate", "#607D8B"),
    ("opinion", "#9E9E9E"),
    ("sunday-review", "#9E9E9E"),
    ("nyregion", "#3949AB"),
    ("new york", "#3949AB"),
    ("climate", "#2E7D32"),
    ("energy-environment", "#2E7D32"),
    ("upshot", "#00897B"),
    ("the upshot", "#00897B"),
    ("obituaries", "#5D4037"),
    ("movies", "#8E24AA"),
    ("theater", "#6A1B9A"),
    ("television", "#7E57C2"),
    ("arts & leisure", "#9C27B0"),
    ("music", "#BA68C8"),
    ("dance", "#CE93D8"),
    ("education", "#1E88E5"),
    ("your-money", "#F9A825"),
    ("your money", "#F9A825"),
    ("economy", "#FBC02D"),
    ("dealbook", "#FFB300"),
    ("media", "#FFA000"),
    ("automobiles", "#546E7A"),
    ("briefing", "#26A69A"),
    ("podcasts", "#00ACC1"),
    ("video", "#D84315"),
    ("multimedia", "#D84315"),
    ("lens", "#BF360C"),
    ("insider", "#78909C"),
    ("times insider", "#78909C"),
    ("crosswords", "#FDD835"),
    ("crosswords & games", "#FDD835"),
    ("smarter-living", "#AED581"),
    ("parenting", "#F48FB1"),
    ("weather", "#4FC3F7"),
    ("admin", DEFAULT_COLOR),
    ("corrections", "#BDBDBD"),
    ("reader-center", "#90A4AE"),
];

/// Palette for sections without a table entry under [`ColorPolicy::HashPalette`].
const HASH_PALETTE: &[&str] = &[
    "#00BCD4", "#673AB7", "#CDDC39", "#2196F3", "#009688", "#FFC107", "#9C27B0", "#FF5722",
    "#4CAF50", "#3F51B5", "#E91E63", "#8BC34A", "#00BCD4", "#FF9800", "#9E9E9E", "#607D8B",
];

/// How sections missing from the table get their color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorPolicy {
    /// Every unknown section shares [`DEFAULT_COLOR`]
    #[default]
    FlatDefault,
    /// Unknown sections hash into a secondary palette, memoized per resolver
    HashPalette,
}

#[derive(Debug, Default)]
pub struct ColorResolver {
    policy: ColorPolicy,
    cache: RwLock<HashMap<String, &'static str>>,
}

impl ColorResolver {
    pub fn new(policy: ColorPolicy) -> Self {
        Self {
            policy,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn color_for(&self, section: Option<&str>) -> &'static str {
        let section = match section {
            Some(s) if !s.is_empty() => s.to_lowercase(),
            _ => return DEFAULT_COLOR,
        };

        if let Some(color) = table_color(&section) {
            return color;
        }

        match self.policy {
            ColorPolicy::FlatDefault => DEFAULT_COLOR,
            ColorPolicy::HashPalette => self.palette_color(section),
        }
    }

    fn palette_color(&self, section: String) -> &'static str {
        if let Some(color) = self
            .cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&section)
            .copied()
        {
            return color;
        }

        let color = HASH_PALETTE[(string_hash(&section) % HASH_PALETTE.len() as u64) as usize];
        self.cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(section, color);
        color
    }

    /// Number of sections memoized by the hash policy
    pub fn cached_sections(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

fn table_color(section: &str) -> Option<&'static str> {
    SECTION_COLORS
        .iter()
        .find(|(name, _)| *name == section)
        .map(|(_, color)| *color)
}

/// `h = c + (h << 5) - h` over UTF-16 code units, returned as an absolute
/// value. Only the shift operand is truncated to 32 bits, so the running
/// value can leave the i32 range between steps.
pub fn string_hash(s: &str) -> u64 {
    let hash = s.encode_utf16().fold(0i64, |hash, unit| {
        i64::from(unit) + i64::from((hash as i32).wrapping_shl(5)) - hash
    });
    hash.unsigned_abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sections() {
        let resolver = ColorResolver::default();
        assert_eq!(resolver.color_for(Some("world")), "#4285F4");
        assert_eq!(resolver.color_for(Some("technology")), "#7B1FA2");
        assert_eq!(resolver.color_for(Some("opinion")), "#9E9E9E");
    }

    #[test]
    fn test_case_insensitive() {
        let resolver = ColorResolver::default();
        assert_eq!(
            resolver.color_for(Some("Technology")),
            resolver.color_for(Some("technology"))
        );
        assert_eq!(
            resolver.color_for(Some("WORLD")),
            resolver.color_for(Some("World"))
        );
    }

    #[test]
    fn test_empty_or_missing_is_default() {
        let resolver = ColorResolver::default();
        assert_eq!(resolver.color_for(None), DEFAULT_COLOR);
        assert_eq!(resolver.color_for(Some("")), DEFAULT_COLOR);
    }

    #[test]
    fn test_flat_policy_unknown_is_default() {
        let resolver = ColorResolver::new(ColorPolicy::FlatDefault);
        assert_eq!(resolver.color_for(Some("Gardening")), DEFAULT_COLOR);
        assert_eq!(resolver.color_for(Some("gardening")), DEFAULT_COLOR);
        assert_eq!(resolver.cached_sections(), 0);
    }

    #[test]
    fn test_string_hash_values() {
        assert_eq!(string_hash(""), 0);
        assert_eq!(string_hash("x"), 120);
        assert_eq!(string_hash("ab"), 3105);
    }

    #[test]
    fn test_hash_policy_is_stable() {
        let resolver = ColorResolver::new(ColorPolicy::HashPalette);

        // 120 % 16 == 8, 3105 % 16 == 1
        assert_eq!(resolver.color_for(Some("x")), "#4CAF50");
        assert_eq!(resolver.color_for(Some("AB")), "#673AB7");

        let first = resolver.color_for(Some("Gardening"));
        for _ in 0..5 {
            assert_eq!(resolver.color_for(Some("gardening")), first);
        }
        assert!(HASH_PALETTE.contains(&first));
        assert_eq!(resolver.cached_sections(), 3);

        // table entries win over the palette
        assert_eq!(resolver.color_for(Some("World")), "#4285F4");
    }

    #[test]
    fn test_resolvers_do_not_share_cache() {
        let a = ColorResolver::new(ColorPolicy::HashPalette);
        let b = ColorResolver::new(ColorPolicy::HashPalette);
        a.color_for(Some("gardening"));
        assert_eq!(a.cached_sections(), 1);
        assert_eq!(b.cached_sections(), 0);
    }

    #[test]
    fn test_long_names_do_not_overflow() {
        let resolver = ColorResolver::new(ColorPolicy::HashPalette);
        let name = "a very long section name that overflows a 32 bit hash several times";
        assert_eq!(resolver.color_for(Some(name)), resolver.color_for(Some(name)));
    }
}
