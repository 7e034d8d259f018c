/// Linear warmup/decay learning rate scheduler

/// Linear schedule configuration
#[derive(Debug, Clone)]
pub struct LinearScheduleConfig {
    /// Peak learning rate
    pub lr_init: f64,
    /// Number of warmup steps
    pub warmup_steps: usize,
    /// Total number of training steps
    pub total_steps: usize,
}

impl Default for LinearScheduleConfig {
    fn default() -> Self {
        Self {
            lr_init: 1e-4,
            warmup_steps: 100,
            total_steps: 1000,
        }
    }
}

/// Linear learning rate scheduler
///
/// - Linear warmup from 0 to lr_init over warmup_steps
/// - Linear decay from lr_init to 0 over the remaining steps
pub struct LinearScheduler {
    config: LinearScheduleConfig,
    current_step: usize,
}

impl LinearScheduler {
    /// Create new linear scheduler
    pub fn new(config: LinearScheduleConfig) -> Self {
        Self {
            config,
            current_step: 0,
        }
    }

    /// Get learning rate for current step
    pub fn lr(&self) -> f64 {
        self.lr_at_step(self.current_step)
    }

    /// Get learning rate for a specific step
    pub fn lr_at_step(&self, step: usize) -> f64 {
        if step < self.config.warmup_steps {
            // Linear warmup: lr = lr_init * (step / warmup_steps)
            self.config.lr_init * (step as f64 / self.config.warmup_steps as f64)
        } else {
            if self.config.total_steps <= self.config.warmup_steps {
                return 0.0;
            }

            // Linear decay: lr = lr_init * (remaining / decay window)
            let remaining = self.config.total_steps.saturating_sub(step) as f64;
            let window = (self.config.total_steps - self.config.warmup_steps) as f64;
            self.config.lr_init * (remaining / window).clamp(0.0, 1.0)
        }
    }

    /// Step the scheduler (increment step counter)
    pub fn step(&mut self) {
        self.current_step += 1;
    }

    /// Get current step
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Reset scheduler to initial state
    pub fn reset(&mut self) {
        self.current_step = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warmup_phase() {
        let scheduler = LinearScheduler::new(LinearScheduleConfig {
            lr_init: 1.0,
            warmup_steps: 100,
            total_steps: 1000,
        });

        // At step 0, lr should be 0
        assert!((scheduler.lr_at_step(0) - 0.0).abs() < 1e-9);

        // At step 50 (halfway through warmup), lr should be 0.5
        assert!((scheduler.lr_at_step(50) - 0.5).abs() < 1e-9);

        // At step 100 (end of warmup), lr should be 1.0
        assert!((scheduler.lr_at_step(100) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_linear_decay() {
        let scheduler = LinearScheduler::new(LinearScheduleConfig {
            lr_init: 1.0,
            warmup_steps: 0,
            total_steps: 1000,
        });

        // With no warmup, step 0 is the peak
        assert!((scheduler.lr_at_step(0) - 1.0).abs() < 1e-9);

        // At step 500 (halfway), lr should be 0.5
        assert!((scheduler.lr_at_step(500) - 0.5).abs() < 1e-9);

        // At step 1000 (end), lr should be 0
        assert!((scheduler.lr_at_step(1000) - 0.0).abs() < 1e-9);

        // Past the end, lr stays at 0
        assert!((scheduler.lr_at_step(1500) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_scheduler_stepping() {
        let mut scheduler = LinearScheduler::new(LinearScheduleConfig {
            lr_init: 1.0,
            warmup_steps: 10,
            total_steps: 100,
        });

        assert_eq!(scheduler.current_step(), 0);

        scheduler.step();
        assert_eq!(scheduler.current_step(), 1);

        scheduler.step();
        assert_eq!(scheduler.current_step(), 2);

        // LR should be increasing during warmup
        let lr1 = scheduler.lr_at_step(5);
        let lr2 = scheduler.lr_at_step(8);
        assert!(lr2 > lr1);
    }

    #[test]
    fn test_reset() {
        let mut scheduler = LinearScheduler::new(LinearScheduleConfig::default());

        scheduler.step();
        scheduler.step();
        assert_eq!(scheduler.current_step(), 2);

        scheduler.reset();
        assert_eq!(scheduler.current_step(), 0);
    }

    #[test]
    fn test_lr_never_exceeds_init() {
        let config = LinearScheduleConfig {
            lr_init: 1.0,
            warmup_steps: 100,
            total_steps: 1000,
        };
        let scheduler = LinearScheduler::new(config.clone());

        for step in 0..=config.total_steps {
            let lr = scheduler.lr_at_step(step);
            assert!(
                (0.0..=config.lr_init + 1e-9).contains(&lr),
                "LR {} out of range at step {}",
                lr,
                step
            );
        }
    }

    #[test]
    fn test_degenerate_schedule_has_no_division_by_zero() {
        // Empty training stream: total_steps == warmup_steps == 0
        let scheduler = LinearScheduler::new(LinearScheduleConfig {
            lr_init: 1.0,
            warmup_steps: 0,
            total_steps: 0,
        });
        assert_eq!(scheduler.lr_at_step(0), 0.0);
        assert_eq!(scheduler.lr_at_step(10), 0.0);
    }
}
