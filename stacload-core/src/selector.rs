//! Weighted random scenario selection

use crate::catalog::ScenarioCatalog;
use crate::error::{ScenarioError, ScenarioResult};
use crate::scenario::ScenarioDefinition;
use crate::tags::TagFilter;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;

/// Picks scenarios with probability proportional to their weight among the
/// catalog entries a tag filter allows.
///
/// The eligible set is fixed at construction. All randomness comes from the
/// caller's generator.
#[derive(Debug, Clone)]
pub struct ScenarioSelector {
    eligible: Vec<ScenarioDefinition>,
    index: WeightedIndex<u32>,
}

impl ScenarioSelector {
    pub fn new(catalog: &ScenarioCatalog, filter: &TagFilter) -> ScenarioResult<Self> {
        let eligible: Vec<ScenarioDefinition> = catalog
            .scenarios_matching(filter)
            .into_iter()
            .cloned()
            .collect();

        let index = weighted_index(&eligible, filter)?;
        Ok(Self { eligible, index })
    }

    pub fn next<R: Rng + ?Sized>(&self, rng: &mut R) -> &ScenarioDefinition {
        &self.eligible[self.index.sample(rng)]
    }

    pub fn eligible(&self) -> &[ScenarioDefinition] {
        &self.eligible
    }
}

/// One-shot selection without keeping a selector around
pub fn next_scenario<'a, R: Rng + ?Sized>(
    catalog: &'a ScenarioCatalog,
    filter: &TagFilter,
    rng: &mut R,
) -> ScenarioResult<&'a ScenarioDefinition> {
    let eligible = catalog.scenarios_matching(filter);
    let index = weighted_index(eligible.iter().copied(), filter)?;
    Ok(eligible[index.sample(rng)])
}

fn weighted_index<'a, I>(eligible: I, filter: &TagFilter) -> ScenarioResult<WeightedIndex<u32>>
where
    I: IntoIterator<Item = &'a ScenarioDefinition>,
{
    let weights: Vec<u32> = eligible.into_iter().map(|s| s.weight).collect();
    if weights.is_empty() {
        return Err(ScenarioError::NoEligibleScenario(filter.to_string()));
    }
    WeightedIndex::new(weights).map_err(|e| ScenarioError::Config(e.to_string()))
}
