//! Simulation data types.

use serde::{Deserialize, Serialize};

/// Health status of an agent.
///
/// `Recovered` doubles as "immune", whether the immunity came from curing
/// or from vaccination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Susceptible,
    Infected,
    Recovered,
}

/// Agent of the simulation.
///
/// Each agent has a position and velocity inside the world bounds, a health
/// status with its day counters, and two behavioral flags fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,

    pub status: Status,
    /// Days since becoming infected; reset to 0 on (re)infection.
    pub infected_days: u32,
    /// Days since becoming recovered; reset to 0 on entering `Recovered`.
    pub immune_days: u32,
    /// Days since creation; never reset.
    pub age_days: u32,

    /// Never receives automatic vaccination.
    pub anti_vaccine: bool,
    /// Moves at half the configured speed.
    pub fearful: bool,
}

/// Result of one agent's daily step, applied by the owning population.
pub enum StepOutcome {
    Continue,
    Died,
    Born(Agent),
}

impl Agent {
    pub fn new(x: f64, y: f64, status: Status, vx: f64, vy: f64) -> Self {
        Self {
            x,
            y,
            vx,
            vy,
            status,
            infected_days: 0,
            immune_days: 0,
            age_days: 0,
            anti_vaccine: false,
            fearful: false,
        }
    }

    /// Squared Euclidean distance to another agent.
    pub fn dist_squared(&self, other: &Agent) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }

    /// Clamp the position into `[0, width] x [0, height]`, negating the
    /// corresponding velocity component on each crossed boundary.
    pub fn reflect(&mut self, width: f64, height: f64) {
        if self.x < 0.0 {
            self.x = 0.0;
            self.vx = -self.vx;
        } else if self.x > width {
            self.x = width;
            self.vx = -self.vx;
        }

        if self.y < 0.0 {
            self.y = 0.0;
            self.vy = -self.vy;
        } else if self.y > height {
            self.y = height;
            self.vy = -self.vy;
        }
    }

    /// Human-readable field values, one line per field.
    ///
    /// Consumed by the display collaborator for on-demand agent inspection.
    pub fn info_lines(&self) -> Vec<String> {
        vec![
            format!("Coords: ({:.2}, {:.2})", self.x, self.y),
            format!("Status: {:?}", self.status),
            format!("Days old: {}", self.age_days),
            format!("Infected days: {}", self.infected_days),
            format!("Immune days: {}", self.immune_days),
            format!("Anti vaccine: {}", self.anti_vaccine),
            format!("Fearful: {}", self.fearful),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflects_past_upper_bounds() {
        let mut agent = Agent::new(1205.0, 1003.0, Status::Susceptible, 8.0, 6.0);
        agent.reflect(1200.0, 1000.0);
        assert_eq!(agent.x, 1200.0);
        assert_eq!(agent.vx, -8.0);
        assert_eq!(agent.y, 1000.0);
        assert_eq!(agent.vy, -6.0);
    }

    #[test]
    fn reflects_past_lower_bounds() {
        let mut agent = Agent::new(-3.0, -0.5, Status::Susceptible, -4.0, -2.0);
        agent.reflect(1200.0, 1000.0);
        assert_eq!(agent.x, 0.0);
        assert_eq!(agent.vx, 4.0);
        assert_eq!(agent.y, 0.0);
        assert_eq!(agent.vy, 2.0);
    }

    #[test]
    fn interior_position_unchanged() {
        let mut agent = Agent::new(100.0, 200.0, Status::Susceptible, 3.0, -3.0);
        agent.reflect(1200.0, 1000.0);
        assert_eq!((agent.x, agent.y), (100.0, 200.0));
        assert_eq!((agent.vx, agent.vy), (3.0, -3.0));
    }

    #[test]
    fn dist_squared_is_symmetric() {
        let a = Agent::new(0.0, 0.0, Status::Susceptible, 0.0, 0.0);
        let b = Agent::new(3.0, 4.0, Status::Infected, 0.0, 0.0);
        assert_eq!(a.dist_squared(&b), 25.0);
        assert_eq!(b.dist_squared(&a), 25.0);
    }

    #[test]
    fn info_lines_report_all_fields() {
        let agent = Agent::new(1.0, 2.0, Status::Infected, 0.0, 0.0);
        let lines = agent.info_lines();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "Coords: (1.00, 2.00)");
        assert_eq!(lines[1], "Status: Infected");
    }
}
