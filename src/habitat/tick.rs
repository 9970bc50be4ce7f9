//! Tick driver - applies net production to stored resources and grows
//! the population

use crate::character::bonus::BonusContext;
use crate::core::config::EngineConfig;
use crate::economy::blueprint::BlueprintCatalog;
use crate::economy::resources::Resource;
use crate::habitat::recalc::recalculate_stats;
use crate::habitat::state::Habitat;

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// Stored energy went negative this tick. Penalty policy is left to
    /// the host; the engine only reports the condition.
    pub energy_deficit: bool,
    /// Population gained this tick
    pub population_growth: f32,
}

/// Advance the habitat by `time_delta` ticks
pub fn advance_tick(
    habitat: &mut Habitat,
    catalog: &BlueprintCatalog,
    bonuses: &BonusContext,
    config: &EngineConfig,
    time_delta: f32,
) -> TickOutcome {
    recalculate_stats(habitat, catalog, bonuses, config);

    let mut energy_deficit = false;
    for resource in Resource::ALL {
        let net = habitat
            .current_net_production
            .get(&resource)
            .copied()
            .unwrap_or(0.0);
        let current = habitat.resources.get(resource);
        let mut new_amount = current + net * time_delta;
        let capacity = habitat.storage_capacity.get(resource);

        if resource == Resource::Energy {
            // Energy clamps at the top only; a negative value signals a
            // deficit instead of being floored away
            if new_amount > capacity {
                new_amount = capacity;
            }
            if new_amount < 0.0 {
                energy_deficit = true;
                tracing::warn!(
                    habitat = %habitat.name,
                    stored = new_amount,
                    "energy deficit"
                );
            }
        } else {
            new_amount = new_amount.clamp(0.0, capacity);
        }
        habitat.resources.set(resource, new_amount);
    }

    let has_food = habitat.resources.get(Resource::Food) > 0.0;
    let has_water = habitat.resources.get(Resource::WaterIce) > 0.0;
    let has_space = habitat.population < habitat.max_population;

    let mut population_growth = 0.0;
    if has_food && has_water && has_space {
        let growth = habitat.population
            * habitat.population_growth_rate
            * habitat.morale
            * time_delta;
        let new_population = (habitat.population + growth).min(habitat.max_population);
        population_growth = new_population - habitat.population;
        habitat.population = new_population;
    }

    TickOutcome { energy_deficit, population_growth }
}
