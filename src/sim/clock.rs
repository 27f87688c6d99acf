/// A step clock over a fixed number of script steps.
///
/// # Examples
///
/// ```
/// use netsim_base::sim::clock::Clock;
///
/// let mut clock = Clock::new(3);
/// let mut steps = Vec::new();
///
/// clock.run(|step| steps.push(step));
/// assert_eq!(steps, vec![0, 1, 2]);
/// assert!(clock.is_done());
/// ```
#[derive(Debug, Clone)]
pub struct Clock {
    /// Next step to hand out
    current: usize,
    /// Total steps
    total: usize,
}

impl Clock {
    pub fn new(total: usize) -> Self {
        Self { current: 0, total }
    }

    /// Returns the next step (starting from 0), or `None` once all steps
    /// have been handed out.
    pub fn tick(&mut self) -> Option<usize> {
        if self.current < self.total {
            let step = self.current;
            self.current += 1;
            Some(step)
        } else {
            None
        }
    }

    /// Steps not yet handed out.
    pub fn remaining(&self) -> usize {
        self.total - self.current
    }

    pub fn is_done(&self) -> bool {
        self.current >= self.total
    }

    /// Runs `f` for each remaining step.
    pub fn run(&mut self, mut f: impl FnMut(usize)) {
        while let Some(step) = self.tick() {
            f(step);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick() {
        let mut clock = Clock::new(2);
        assert_eq!(clock.tick(), Some(0));
        assert_eq!(clock.remaining(), 1);
        assert_eq!(clock.tick(), Some(1));
        assert_eq!(clock.tick(), None);
        assert!(clock.is_done());
    }

    #[test]
    fn test_empty_clock() {
        let mut clock = Clock::new(0);
        assert_eq!(clock.tick(), None);

        let mut was_called = false;
        clock.run(|_| was_called = true);
        assert!(!was_called);
    }
}
