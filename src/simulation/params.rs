//! Fixed constants of the planner and the synthetic field.

// === Belief / prediction error ===
/// Standard deviation (px) of the step-size likelihood.
pub const VISUAL_ACUITY: f64 = 3.0;
/// Divergence above which a prediction error counts as surprising.
pub const PE_THRESHOLD: f64 = 0.0001;
/// Gain applied to a surprising divergence before it is subtracted from `LL_SoC`.
pub const LL_SOC_LOSS_GAIN: f64 = 1000.0;
/// `HL_SoC` loses `HL_SoC / HL_SOC_EROSION_DIVISOR` when `LL_SoC` drops under the CCL threshold.
pub const HL_SOC_EROSION_DIVISOR: f64 = 5.0;
/// Initial value of both confidence scalars.
pub const INITIAL_SOC: f64 = 1.0;

// === Goal lifecycle ===
/// Foveal radius (px) used when assessing whether a goal was reached.
pub const GOAL_RADIUS: f64 = 12.0;
/// Dead zone (px) around the goal in which no key is pressed.
pub const TARGET_RADIUS: f64 = 5.0;
/// Screen-space y a goal has to cross to count as arrived (bottom of the agent sprite).
pub const ARRIVAL_LINE: f64 = 236.0;

// === Goal selection ===
/// Standard deviation (in rows) of the decision-row bias.
pub const ROW_BIAS_SIGMA: f64 = 1.0;
/// Top-down goal precision as a fraction of the kernel size.
pub const GOAL_PRECISION_FRACTION: f64 = 0.25;
/// Conscious broadcast latency range (ms).
pub const BROADCAST_TIME_MIN: f64 = 200.0;
pub const BROADCAST_TIME_MAX: f64 = 280.0;
/// Action selection latency range (ms).
pub const SELECTION_TIME_MIN: f64 = 60.0;
pub const SELECTION_TIME_MAX: f64 = 110.0;

// === Synthetic field ===
pub const SCREEN_WIDTH: usize = 300;
/// Top of the observed sub-window in screen coordinates.
pub const OBSERVATION_TOP: usize = 250;
pub const OBSERVATION_HEIGHT: usize = 200;
/// The agent is kept horizontally centred on screen.
pub const AGENT_X: f64 = 150.0;
pub const SCROLL_SPEED: f64 = 2.0;
pub const SCALING: f64 = 1.0;
pub const COMET_COUNT: usize = 6;
pub const COMET_SIZE_MIN: usize = 12;
pub const COMET_SIZE_MAX: usize = 30;
/// Magnitude of the sideways drift the field may impose.
pub const DRIFT_MAGNITUDE: f64 = 0.5;
