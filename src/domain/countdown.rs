/// Default number of one-second ticks a user gets to pick an item.
pub const DEFAULT_COUNTDOWN_BUDGET: u32 = 30;

/// Result of advancing a running countdown by one tick.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Tick {
    Remaining(u32),
    Expired,
}

/// Bounds how long a session may wait for an item selection.
///
/// The countdown is a plain counter; whoever owns it decides when a tick
/// happens. Once expired or cancelled it ignores further ticks until it is
/// started again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    budget: u32,
    remaining: u32,
    running: bool,
}

impl Countdown {
    /// Creates a stopped countdown. A zero budget is raised to one tick.
    pub fn new(budget: u32) -> Self {
        let budget = budget.max(1);
        Self {
            budget,
            remaining: budget,
            running: false,
        }
    }

    /// Resets the counter to the full budget and starts it.
    pub fn start(&mut self) -> u32 {
        self.remaining = self.budget;
        self.running = true;
        self.remaining
    }

    /// Advances by one tick. Returns `None` when the countdown is not running.
    pub fn tick(&mut self) -> Option<Tick> {
        if !self.running {
            return None;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            Some(Tick::Expired)
        } else {
            Some(Tick::Remaining(self.remaining))
        }
    }

    /// Stops the countdown. Returns `true` only if it was running.
    pub fn cancel(&mut self) -> bool {
        std::mem::replace(&mut self.running, false)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTDOWN_BUDGET)
    }
}
