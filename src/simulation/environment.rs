use crate::simulation::params::{
    COMET_COUNT, COMET_SIZE_MAX, COMET_SIZE_MIN, OBSERVATION_HEIGHT, OBSERVATION_TOP, SCALING,
    SCREEN_WIDTH, SCROLL_SPEED,
};
use crate::simulation::error::GridError;
use crate::simulation::perception::OccupancyGrid;
use rand::Rng;

/// A square obstacle scrolling up the screen.
///
/// Position is the top-left corner in screen pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Comet {
    pub x: f64,
    pub y: f64,
    pub size: usize,
}

impl Comet {
    /// Creates a comet at a random column with its top edge in `y_min..y_max`.
    fn random<R: Rng>(width: usize, y_min: f64, y_max: f64, rng: &mut R) -> Self {
        Self {
            x: rng.random_range(0.0..width as f64),
            y: rng.random_range(y_min..y_max),
            size: rng.random_range(COMET_SIZE_MIN..=COMET_SIZE_MAX),
        }
    }
}

/// Minimal scrolling obstacle field that feeds the planner.
///
/// Comets move upward by `speed * scaling` per step and sideways with the
/// agent's steering plus drift. Once a comet leaves the top of the screen it
/// respawns below the observed window. Only the window starting at `top` is
/// visible to the planner.
pub struct ObstacleField {
    pub width: usize,
    pub top: usize,
    pub height: usize,
    pub speed: f64,
    pub scaling: f64,
    /// Constant sideways push added to the steering input.
    pub drift: f64,
    pub comets: Vec<Comet>,
}

impl ObstacleField {
    /// Creates a field with the default screen geometry and randomly placed comets.
    #[must_use]
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let top = OBSERVATION_TOP as f64;
        let bottom = (OBSERVATION_TOP + OBSERVATION_HEIGHT) as f64;
        let comets = (0..COMET_COUNT)
            .map(|_| Comet::random(SCREEN_WIDTH, top, bottom, rng))
            .collect();

        Self {
            width: SCREEN_WIDTH,
            top: OBSERVATION_TOP,
            height: OBSERVATION_HEIGHT,
            speed: SCROLL_SPEED,
            scaling: SCALING,
            drift: 0.0,
            comets,
        }
    }

    #[must_use]
    pub fn with_drift(mut self, drift: f64) -> Self {
        self.drift = drift;
        self
    }

    /// Screen position of the observed window's origin.
    #[must_use]
    pub fn reference(&self) -> (f64, f64) {
        (0.0, self.top as f64)
    }

    /// Advances every comet by one step and returns the sideways displacement applied.
    pub fn update<R: Rng>(&mut self, horizontal_movement: f64, rng: &mut R) -> f64 {
        let dy = self.scaling * self.speed;
        let dx = horizontal_movement * self.scaling * self.speed;
        let width = self.width as f64;
        let bottom = (self.top + self.height) as f64;

        for comet in &mut self.comets {
            comet.y -= dy;
            comet.x = (comet.x + dx).rem_euclid(width);

            // Respawn
            if comet.y + (comet.size as f64) < 0.0 {
                *comet = Comet::random(self.width, bottom, bottom + self.height as f64 / 2.0, rng);
            }
        }
        dx
    }

    /// Rasterizes the observed window into an occupancy grid.
    ///
    /// # Errors
    ///
    /// `GridError::Empty` if the window has no area.
    pub fn observe(&self) -> Result<OccupancyGrid, GridError> {
        let mut grid = OccupancyGrid::new(self.width, self.height)?;
        let top = self.top as f64;
        for comet in &self.comets {
            let upper = comet.y - top;
            let lower = upper + comet.size as f64;
            if lower <= 0.0 || upper >= self.height as f64 {
                continue;
            }
            let first_row = upper.max(0.0).floor() as usize;
            let rows = (lower.ceil() as usize).saturating_sub(first_row);
            grid.fill_rect(first_row, comet.x.floor() as usize, rows, comet.size);
        }
        Ok(grid)
    }
}
