use crate::config::Config;
use crate::model::{Agent, Status, StepOutcome};
use crate::stats::{StatsSnapshot, TimeSeries};
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::{Bernoulli, Uniform};

/// Simulation engine.
///
/// Holds the configuration, the live population, the day counter, and the
/// random number generator, and advances the population one day at a time.
pub struct Engine {
    cfg: Config,
    agents: Vec<Agent>,
    day: u32,
    vaccinated_today: usize,
    rng: ChaCha12Rng,
}

/// Distributions for one day's stochastic transitions.
///
/// Rebuilt at the start of every day because the velocity range depends on
/// the weekly speed modifier.
struct Draws {
    no_move: Bernoulli,
    velocity: Uniform<f64>,
    natural_death: Bernoulli,
    vaccination: Bernoulli,
    mask: Bernoulli,
    infection: Bernoulli,
    cure: Bernoulli,
    disease_death: Bernoulli,
    reproduction: Bernoulli,
    anti_vaccine: Bernoulli,
    fearful: Bernoulli,
}

impl Draws {
    fn new(cfg: &Config, speed: f64) -> Result<Self> {
        Ok(Self {
            no_move: Bernoulli::new(cfg.movement.no_move_prob)?,
            velocity: Uniform::new_inclusive(-speed, speed)?,
            natural_death: Bernoulli::new(cfg.population.natural_death_prob)?,
            vaccination: Bernoulli::new(cfg.population.vaccination_rate)?,
            mask: Bernoulli::new(cfg.population.mask_rate)?,
            infection: Bernoulli::new(cfg.disease.infection_prob)?,
            cure: Bernoulli::new(cfg.disease.cure_prob)?,
            disease_death: Bernoulli::new(cfg.disease.disease_death_prob)?,
            reproduction: Bernoulli::new(cfg.population.reproduction_prob)?,
            anti_vaccine: Bernoulli::new(cfg.population.anti_vaccine_fraction)?,
            fearful: Bernoulli::new(cfg.population.fearful_fraction)?,
        })
    }
}

impl Engine {
    /// Create a new `Engine` with the given configuration and a random
    /// initial population.
    ///
    /// Agents start at uniformly random positions, `Susceptible` unless the
    /// initial-infected draw promotes them, with behavioral flags rolled
    /// independently per agent.
    pub fn new(cfg: Config, rng: ChaCha12Rng) -> Result<Self> {
        let mut engine = Self {
            agents: Vec::with_capacity(cfg.run.n_agents),
            day: 0,
            vaccinated_today: 0,
            rng,
            cfg,
        };

        let draws = Draws::new(&engine.cfg, engine.cfg.movement.max_speed)
            .context("failed to construct distributions")?;
        let x_dist = Uniform::new_inclusive(0.0, engine.cfg.world.width)?;
        let y_dist = Uniform::new_inclusive(0.0, engine.cfg.world.height)?;
        let infected_dist = Bernoulli::new(engine.cfg.disease.initial_infected_fraction)?;

        for _ in 0..engine.cfg.run.n_agents {
            let x = x_dist.sample(&mut engine.rng);
            let y = y_dist.sample(&mut engine.rng);
            let mut agent = engine.spawn_agent(x, y, &draws);
            if infected_dist.sample(&mut engine.rng) {
                agent.status = Status::Infected;
            }
            engine.agents.push(agent);
        }

        Ok(engine)
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// The live population, in stable iteration order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Run the full simulation and return the daily time series.
    ///
    /// Day 0 is recorded before any stepping, with a vaccination count of 0.
    /// The loop always runs to `max_days`, even if the population goes
    /// extinct along the way.
    pub fn run(&mut self) -> Result<TimeSeries> {
        let mut series = TimeSeries::new();
        series.push(self.snapshot());

        for _ in 0..self.cfg.run.max_days {
            let snapshot = self.advance_day().context("failed to advance day")?;
            log::debug!(
                "day {:04}: susceptible {} infected {} recovered {} vaccinated {}",
                snapshot.day,
                snapshot.susceptible,
                snapshot.infected,
                snapshot.recovered,
                snapshot.vaccinated
            );
            series.push(snapshot);
        }

        Ok(series)
    }

    /// Advance the population by exactly one day and return the post-update
    /// snapshot.
    ///
    /// Every live agent is moved and stepped once, in order. Deaths remove
    /// the agent at the cursor without advancing it; births are pushed to
    /// the back of the live vector, so agents processed later in the same
    /// pass can already see them, and the newborns themselves are stepped
    /// at the end of the pass.
    pub fn advance_day(&mut self) -> Result<StatsSnapshot> {
        let modifier = self.cfg.movement.weekly_speed_mod[(self.day % 7) as usize];
        let speed = self.cfg.movement.max_speed * modifier;
        let draws =
            Draws::new(&self.cfg, speed).context("failed to construct distributions")?;

        self.vaccinated_today = 0;

        let mut i = 0;
        while i < self.agents.len() {
            self.move_agent(i, &draws);
            match self.step_agent(i, &draws) {
                StepOutcome::Continue => i += 1,
                StepOutcome::Died => {
                    self.agents.remove(i);
                }
                StepOutcome::Born(child) => {
                    self.agents.push(child);
                    i += 1;
                }
            }
        }

        self.day += 1;
        Ok(self.snapshot())
    }

    /// Aggregate counts over the current population.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot::tally(self.day, &self.agents, self.vaccinated_today)
    }

    /// Move one agent for the day.
    ///
    /// With the no-move probability the agent stays in place and keeps its
    /// velocity; otherwise the velocity is resampled uniformly on both axes
    /// (halved for fearful agents) and the position reflects elastically off
    /// the world bounds.
    fn move_agent(&mut self, i: usize, draws: &Draws) {
        if draws.no_move.sample(&mut self.rng) {
            return;
        }

        let mut vx = draws.velocity.sample(&mut self.rng);
        let mut vy = draws.velocity.sample(&mut self.rng);
        if self.agents[i].fearful {
            vx /= 2.0;
            vy /= 2.0;
        }

        let agent = &mut self.agents[i];
        agent.vx = vx;
        agent.vy = vy;
        agent.x += vx;
        agent.y += vy;
        agent.reflect(self.cfg.world.width, self.cfg.world.height);
    }

    /// Apply one agent's daily state transitions, in fixed order: aging and
    /// natural death, vaccination or immunity waning, disease death,
    /// transmission, cure, and finally a reproduction attempt.
    fn step_agent(&mut self, i: usize, draws: &Draws) -> StepOutcome {
        // Aging; natural death is only possible past the minimum lifespan.
        let agent = &mut self.agents[i];
        agent.age_days += 1;
        if agent.age_days >= self.cfg.population.min_lifespan_days
            && draws.natural_death.sample(&mut self.rng)
        {
            return StepOutcome::Died;
        }

        // Vaccination for willing susceptibles; immunity waning for the
        // recovered. Vaccination grants the same immunity as a cure.
        let agent = &mut self.agents[i];
        match agent.status {
            Status::Susceptible if !agent.anti_vaccine => {
                if draws.vaccination.sample(&mut self.rng) {
                    agent.status = Status::Recovered;
                    agent.immune_days = 0;
                    self.vaccinated_today += 1;
                }
            }
            Status::Recovered => {
                agent.immune_days += 1;
                if agent.immune_days >= self.cfg.disease.immunity_days {
                    agent.status = Status::Susceptible;
                }
            }
            _ => {}
        }

        if self.agents[i].status == Status::Infected {
            if draws.disease_death.sample(&mut self.rng) {
                return StepOutcome::Died;
            }

            self.spread_infection(i, draws);

            let agent = &mut self.agents[i];
            agent.infected_days += 1;
            if agent.infected_days >= self.cfg.disease.min_infectious_days
                && draws.cure.sample(&mut self.rng)
            {
                agent.status = Status::Recovered;
                agent.immune_days = 0;
            }
        }

        // Reproduction with the first qualifying candidate, at most one
        // birth per agent per day.
        let radius_sq = self.cfg.population.reproduction_radius.powi(2);
        for j in 0..self.agents.len() {
            if j == i {
                continue;
            }
            if self.agents[i].dist_squared(&self.agents[j]) < radius_sq
                && draws.reproduction.sample(&mut self.rng)
            {
                let x = (self.agents[i].x + self.agents[j].x) / 2.0;
                let y = (self.agents[i].y + self.agents[j].y) / 2.0;
                let child = self.spawn_agent(x, y, draws);
                return StepOutcome::Born(child);
            }
        }

        StepOutcome::Continue
    }

    /// Attempt to infect every currently-live susceptible agent.
    ///
    /// The effective radius is halved per trial with the mask probability;
    /// exposure within the radius becomes an infection with the infection
    /// probability.
    fn spread_infection(&mut self, i: usize, draws: &Draws) {
        let radius = self.cfg.disease.infection_radius;

        for j in 0..self.agents.len() {
            if j == i || self.agents[j].status != Status::Susceptible {
                continue;
            }

            let dist_sq = self.agents[i].dist_squared(&self.agents[j]);
            let trial_radius = if draws.mask.sample(&mut self.rng) {
                radius / 2.0
            } else {
                radius
            };

            if dist_sq < trial_radius * trial_radius && draws.infection.sample(&mut self.rng) {
                let other = &mut self.agents[j];
                other.status = Status::Infected;
                other.infected_days = 0;
            }
        }
    }

    /// Create a susceptible agent at the given position, with a freshly
    /// sampled velocity and independently rolled behavioral flags.
    fn spawn_agent(&mut self, x: f64, y: f64, draws: &Draws) -> Agent {
        let vx = draws.velocity.sample(&mut self.rng);
        let vy = draws.velocity.sample(&mut self.rng);
        let mut agent = Agent::new(x, y, Status::Susceptible, vx, vy);
        agent.anti_vaccine = draws.anti_vaccine.sample(&mut self.rng);
        agent.fearful = draws.fearful.sample(&mut self.rng);
        agent
    }
}
