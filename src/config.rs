//! Pipeline options, filled from the command line in `main.rs`.

/// Keywords of physical building elements; matched against type names.
pub const PHYSICAL_ELEMENT_KEYWORDS: &[&str] = &[
    "wall",
    "slab",
    "door",
    "window",
    "column",
    "beam",
    "roof",
    "stair",
    "railing",
    "furnishing element",
    "curtain wall",
    "member",
    "plate",
];

/// Case-insensitive substring allow-list over type names.
///
/// Keywords are stored lowercase with spaces removed, so `"curtain wall"`
/// matches `IFCCURTAINWALL`. An empty list accepts every type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementFilter {
    keywords: Vec<String>,
}

impl ElementFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().to_lowercase().replace(' ', ""))
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    #[must_use]
    pub fn physical() -> Self {
        Self::new(PHYSICAL_ELEMENT_KEYWORDS)
    }

    #[must_use]
    pub fn accept_all() -> Self {
        Self {
            keywords: Vec::new(),
        }
    }

    #[must_use]
    pub fn accepts(&self, type_name: &str) -> bool {
        if self.keywords.is_empty() {
            return true;
        }
        let type_name = type_name.to_lowercase();
        self.keywords.iter().any(|k| type_name.contains(k.as_str()))
    }

    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for ElementFilter {
    fn default() -> Self {
        Self::physical()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Name unnamed properties `IsExternal`/`LoadBearing` by position.
    ///
    /// Assumes the common `Pset_*Common` ordering, which IFC does not
    /// guarantee. When off, unnamed properties are called `Property N`.
    pub positional_names: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            positional_names: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Keep every spatial node, not only filtered element types.
    pub include_all: bool,
    pub filter: ElementFilter,
    pub normalize: NormalizeOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_filter_matches_structural_types() {
        let filter = ElementFilter::physical();
        assert!(filter.accepts("IFCWALL"));
        assert!(filter.accepts("IfcWallStandardCase"));
        assert!(filter.accepts("IFCCURTAINWALL"));
        assert!(filter.accepts("IFCFURNISHINGELEMENT"));
        assert!(!filter.accepts("IFCSPACE"));
        assert!(!filter.accepts("IFCBUILDINGSTOREY"));
    }

    #[test]
    fn empty_filter_accepts_everything() {
        let filter = ElementFilter::new(Vec::<String>::new());
        assert!(filter.accepts("IFCSPACE"));
        assert!(ElementFilter::accept_all().accepts("anything"));
    }

    #[test]
    fn custom_keywords_are_normalized() {
        let filter = ElementFilter::new(["Flow Terminal", " "]);
        assert_eq!(filter.keywords(), ["flowterminal"]);
        assert!(filter.accepts("IFCFLOWTERMINAL"));
    }
}
