/// Turns variable frame times into a whole number of fixed ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedTimestep {
    step: f32,
    accumulator: f32,
    max_substeps: u32,
    substeps: u32,
}

impl FixedTimestep {
    /// `step` seconds per tick, at most `max_substeps` ticks per frame.
    pub fn new(step: f32, max_substeps: u32) -> Self {
        Self {
            step,
            accumulator: 0.0,
            max_substeps: max_substeps.max(1),
            substeps: 0,
        }
    }

    /// Seconds per tick.
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Adds a frame's worth of wall-clock time and starts a new substep budget.
    pub fn accumulate(&mut self, frame_dt: f32) {
        self.accumulator += frame_dt.max(0.0);
        self.substeps = 0;
    }

    /// Takes one fixed step if enough time has built up.
    ///
    /// Once the frame's budget is spent, the remaining whole steps are
    /// dropped so a slow frame can't snowball into slower ones.
    pub fn consume(&mut self) -> bool {
        if self.accumulator < self.step {
            return false;
        }
        if self.substeps >= self.max_substeps {
            self.accumulator %= self.step;
            return false;
        }
        self.accumulator -= self.step;
        self.substeps += 1;
        true
    }
}
