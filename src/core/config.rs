//! Engine configuration with documented constants
//!
//! The tuning numbers of the colony economy are collected here with
//! explanations of their purpose. The config is passed explicitly into the
//! session that hosts a game; there is no global accessor.

/// Configuration for the habitat economy
///
/// These values reproduce the baseline colony pacing. Changing them affects
/// how quickly a colony becomes self-sustaining.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    // === POPULATION ===
    /// Fractional population growth per tick, before morale scaling
    ///
    /// At 0.01 and morale 0.75, a colony of 50 grows by ~0.375/tick when
    /// fed and watered, reaching a 100-capacity habitat in ~95 ticks.
    pub population_growth_rate: f32,

    /// Starting population of a freshly founded habitat
    pub starting_population: f32,

    /// Starting morale (0.0 to 1.0), multiplies the growth rate
    pub starting_morale: f32,

    // === UPKEEP ===
    /// Food consumed per colonist per tick
    ///
    /// 50 colonists draw 5 food/tick, exactly half the output of a level-1
    /// HydroponicsFarmMk1. Upkeep uses the population at recalculation
    /// time, before any growth this tick.
    pub food_per_capita: f32,

    /// Water ice consumed per colonist per tick
    pub water_per_capita: f32,

    // === BASE RATES ===
    /// Energy drawn by habitat systems regardless of buildings
    ///
    /// Paired with the base energy trickle in
    /// [`crate::economy::resources::base_production`], a habitat with no
    /// generators is exactly energy-neutral before building consumption.
    pub base_energy_draw: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            population_growth_rate: 0.01,
            starting_population: 50.0,
            starting_morale: 0.75,
            food_per_capita: 0.1,
            water_per_capita: 0.05,
            base_energy_draw: 5.0,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.population_growth_rate < 0.0 {
            return Err("population_growth_rate must be non-negative".into());
        }

        if !(0.0..=1.0).contains(&self.starting_morale) {
            return Err(format!(
                "starting_morale ({}) must be within [0.0, 1.0]",
                self.starting_morale
            ));
        }

        if self.food_per_capita < 0.0 || self.water_per_capita < 0.0 {
            return Err("per-capita upkeep rates must be non-negative".into());
        }

        Ok(())
    }
}
