use crate::model::{Agent, Status};
use serde::{Deserialize, Serialize};

/// Aggregate counts for one simulated day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub day: u32,
    pub susceptible: usize,
    pub infected: usize,
    pub recovered: usize,
    /// Number of vaccinations that occurred on this day.
    pub vaccinated: usize,
}

impl StatsSnapshot {
    /// Count agents by status over the given population.
    pub fn tally(day: u32, agents: &[Agent], vaccinated: usize) -> Self {
        let mut susceptible = 0;
        let mut infected = 0;
        let mut recovered = 0;

        for agent in agents {
            match agent.status {
                Status::Susceptible => susceptible += 1,
                Status::Infected => infected += 1,
                Status::Recovered => recovered += 1,
            }
        }

        Self {
            day,
            susceptible,
            infected,
            recovered,
            vaccinated,
        }
    }

    /// Total number of live agents on this day.
    pub fn population(&self) -> usize {
        self.susceptible + self.infected + self.recovered
    }
}

/// Append-only series of daily snapshots, starting at day 0.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimeSeries {
    snapshots: Vec<StatsSnapshot>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, snapshot: StatsSnapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn snapshots(&self) -> &[StatsSnapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
