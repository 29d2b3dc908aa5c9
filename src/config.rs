use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Simulation configuration parameters.
///
/// Loaded from a TOML file and validated before use. The configuration is
/// immutable for the lifetime of a run. See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    pub run: RunConfig,
    pub world: WorldConfig,
    pub movement: MovementConfig,
    pub population: PopulationConfig,
    pub disease: DiseaseConfig,
}

/// Run-level parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of agents in the initial population.
    pub n_agents: usize,
    /// Number of simulated days.
    pub max_days: u32,
    /// Record the daily time series and export it at run completion.
    pub gather_stats: bool,
}

/// Bounds of the rectangular simulation area `[0, width] x [0, height]`.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    pub width: f64,
    pub height: f64,
}

/// Agent movement parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct MovementConfig {
    /// Probability of an agent staying in place for a day.
    pub no_move_prob: f64,
    /// Maximum distance per day on each axis.
    pub max_speed: f64,
    /// Multipliers on `max_speed` through the week, indexed by `day % 7`.
    pub weekly_speed_mod: Vec<f64>,
}

/// Population dynamics parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Daily probability of a susceptible agent being vaccinated.
    pub vaccination_rate: f64,
    /// Probability that a transmission trial happens at halved radius.
    pub mask_rate: f64,
    /// Fraction of newly created agents that are fearful.
    pub fearful_fraction: f64,
    /// Fraction of newly created agents that refuse vaccination.
    pub anti_vaccine_fraction: f64,
    /// Days of life before natural death becomes possible.
    pub min_lifespan_days: u32,
    /// Daily probability of natural death past the minimum lifespan.
    pub natural_death_prob: f64,
    /// Daily probability of reproducing with a nearby agent.
    pub reproduction_prob: f64,
    pub reproduction_radius: f64,
}

/// Disease parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct DiseaseConfig {
    pub infection_radius: f64,
    /// Probability that an exposure becomes an infection.
    pub infection_prob: f64,
    /// Fraction of the initial population infected on day 0.
    pub initial_infected_fraction: f64,
    /// Days of infection before a cure becomes possible.
    pub min_infectious_days: u32,
    /// Daily probability of curing past the minimum infectious duration.
    pub cure_prob: f64,
    /// Days of immunity after curing or vaccination.
    pub immunity_days: u32,
    /// Daily probability of an infected agent dying of the disease.
    pub disease_death_prob: f64,
}

impl Config {
    /// Load a [`Config`] from a TOML file.
    ///
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate a [`Config`] from a TOML string.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        check_num(self.run.n_agents, 1..1_000_000).context("invalid agent count")?;
        check_num(self.run.max_days, 0..1_000_000).context("invalid maximum days")?;

        check_num(self.world.width, 1.0..).context("invalid world width")?;
        check_num(self.world.height, 1.0..).context("invalid world height")?;

        check_prob(self.movement.no_move_prob).context("invalid no-move probability")?;
        check_num(self.movement.max_speed, 0.0..).context("invalid maximum speed")?;
        check_weekly(&self.movement.weekly_speed_mod)
            .context("invalid weekly speed modifiers")?;

        check_prob(self.population.vaccination_rate).context("invalid vaccination rate")?;
        check_prob(self.population.mask_rate).context("invalid mask rate")?;
        check_prob(self.population.fearful_fraction).context("invalid fearful fraction")?;
        check_prob(self.population.anti_vaccine_fraction)
            .context("invalid anti-vaccine fraction")?;
        check_num(self.population.min_lifespan_days, 0..1_000_000)
            .context("invalid minimum lifespan")?;
        check_prob(self.population.natural_death_prob)
            .context("invalid natural death probability")?;
        check_prob(self.population.reproduction_prob)
            .context("invalid reproduction probability")?;
        check_num(self.population.reproduction_radius, 0.0..)
            .context("invalid reproduction radius")?;

        check_num(self.disease.infection_radius, 0.0..).context("invalid infection radius")?;
        check_prob(self.disease.infection_prob).context("invalid infection probability")?;
        check_prob(self.disease.initial_infected_fraction)
            .context("invalid initial infected fraction")?;
        check_num(self.disease.min_infectious_days, 0..1_000_000)
            .context("invalid minimum infectious duration")?;
        check_prob(self.disease.cure_prob).context("invalid cure probability")?;
        check_num(self.disease.immunity_days, 0..1_000_000)
            .context("invalid immunity duration")?;
        check_prob(self.disease.disease_death_prob)
            .context("invalid disease death probability")?;

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

fn check_prob(prob: f64) -> Result<()> {
    check_num(prob, 0.0..=1.0)
}

fn check_weekly(mods: &[f64]) -> Result<()> {
    let len = mods.len();
    if len != 7 {
        bail!("modifier list must have exactly 7 entries, but has {len}");
    }
    if mods.iter().any(|&m| m < 0.0) {
        bail!("modifier list must have only non-negative entries");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_TOML: &str = r#"
[run]
n_agents = 200
max_days = 300
gather_stats = true

[world]
width = 1200.0
height = 1000.0

[movement]
no_move_prob = 0.3
max_speed = 10.0
weekly_speed_mod = [0.2, 0.5, 0.8, 0.4, 0.3, 1.0, 0.9]

[population]
vaccination_rate = 0.01
mask_rate = 0.02
fearful_fraction = 0.2
anti_vaccine_fraction = 0.1
min_lifespan_days = 100
natural_death_prob = 0.01
reproduction_prob = 0.0005
reproduction_radius = 30.0

[disease]
infection_radius = 50.0
infection_prob = 0.2
initial_infected_fraction = 0.2
min_infectious_days = 30
cure_prob = 0.01
immunity_days = 90
disease_death_prob = 0.02
"#;

    #[test]
    fn parses_valid_config() {
        let cfg = Config::from_toml_str(VALID_TOML).expect("config should parse");
        assert_eq!(cfg.run.n_agents, 200);
        assert_eq!(cfg.run.max_days, 300);
        assert_eq!(cfg.movement.weekly_speed_mod.len(), 7);
        assert_eq!(cfg.disease.immunity_days, 90);
    }

    #[test]
    fn rejects_out_of_range_probability() {
        let toml = VALID_TOML.replace("infection_prob = 0.2", "infection_prob = 1.5");
        let err = Config::from_toml_str(&toml).unwrap_err();
        assert!(format!("{err:#}").contains("invalid infection probability"));
    }

    #[test]
    fn rejects_wrong_weekly_modifier_count() {
        let toml = VALID_TOML.replace(
            "weekly_speed_mod = [0.2, 0.5, 0.8, 0.4, 0.3, 1.0, 0.9]",
            "weekly_speed_mod = [0.2, 0.5, 0.8]",
        );
        let err = Config::from_toml_str(&toml).unwrap_err();
        assert!(format!("{err:#}").contains("invalid weekly speed modifiers"));
    }

    #[test]
    fn rejects_negative_radius() {
        let toml = VALID_TOML.replace("infection_radius = 50.0", "infection_radius = -1.0");
        let err = Config::from_toml_str(&toml).unwrap_err();
        assert!(format!("{err:#}").contains("invalid infection radius"));
    }

    #[test]
    fn rejects_empty_population() {
        let toml = VALID_TOML.replace("n_agents = 200", "n_agents = 0");
        let err = Config::from_toml_str(&toml).unwrap_err();
        assert!(format!("{err:#}").contains("invalid agent count"));
    }
}
