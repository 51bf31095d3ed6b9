//! Tag-based scenario filtering

use crate::scenario::ScenarioDefinition;
use stacload_config::RunConfig;
use std::collections::BTreeSet;
use std::fmt;

/// Include/exclude tag sets.
///
/// A scenario matches when `include` is empty or shares a tag with it, and
/// shares no tag with `exclude`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    include: BTreeSet<String>,
    exclude: BTreeSet<String>,
}

impl TagFilter {
    /// Filter that lets everything through
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new<I, E, T, U>(include: I, exclude: E) -> Self
    where
        I: IntoIterator<Item = T>,
        E: IntoIterator<Item = U>,
        T: Into<String>,
        U: Into<String>,
    {
        Self {
            include: include.into_iter().map(Into::into).collect(),
            exclude: exclude.into_iter().map(Into::into).collect(),
        }
    }

    pub fn including<I, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::new(tags, Vec::<String>::new())
    }

    pub fn excluding<I, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::new(Vec::<String>::new(), tags)
    }

    pub fn include(&self) -> &BTreeSet<String> {
        &self.include
    }

    pub fn exclude(&self) -> &BTreeSet<String> {
        &self.exclude
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Tag test only; weights are the catalog's concern
    pub fn matches(&self, definition: &ScenarioDefinition) -> bool {
        let included =
            self.include.is_empty() || definition.tags.iter().any(|t| self.include.contains(t));
        let excluded = definition.tags.iter().any(|t| self.exclude.contains(t));
        included && !excluded
    }
}

impl From<&RunConfig> for TagFilter {
    fn from(config: &RunConfig) -> Self {
        Self::new(config.tags.iter().cloned(), config.exclude_tags.iter().cloned())
    }
}

impl fmt::Display for TagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |set: &BTreeSet<String>| set.iter().cloned().collect::<Vec<_>>().join(",");
        write!(
            f,
            "tags [{}] excluding [{}]",
            join(&self.include),
            join(&self.exclude)
        )
    }
}
