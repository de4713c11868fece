//! Early stopping on average validation loss

/// Stops training after `patience` epochs without validation improvement
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    best_loss: f64,
    epochs_without_improvement: usize,
}

impl EarlyStopping {
    /// Create a new early-stopping monitor
    ///
    /// `patience` of 0 disables early stopping.
    pub fn new(patience: usize) -> Self {
        Self {
            patience,
            best_loss: f64::INFINITY,
            epochs_without_improvement: 0,
        }
    }

    /// Report this epoch's validation loss
    ///
    /// Returns true when training should stop. Best-loss tracking runs
    /// even with patience 0 so checkpoint-on-improvement keeps working.
    pub fn step(&mut self, val_loss: f64) -> bool {
        if val_loss < self.best_loss {
            self.best_loss = val_loss;
            self.epochs_without_improvement = 0;
        } else {
            self.epochs_without_improvement += 1;
        }

        self.patience > 0 && self.epochs_without_improvement >= self.patience
    }

    /// Best validation loss observed so far
    pub fn best_loss(&self) -> f64 {
        self.best_loss
    }

    /// Whether the last reported loss was a new best
    pub fn improved(&self) -> bool {
        self.epochs_without_improvement == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stops_after_patience() {
        let mut es = EarlyStopping::new(2);

        assert!(!es.step(1.0));
        assert!(!es.step(1.5)); // 1 epoch without improvement
        assert!(es.step(1.4)); // 2 epochs, stop
    }

    #[test]
    fn test_improvement_resets_counter() {
        let mut es = EarlyStopping::new(2);

        assert!(!es.step(1.0));
        assert!(!es.step(1.5));
        assert!(!es.step(0.9)); // new best resets the counter
        assert!(es.improved());
        assert_eq!(es.best_loss(), 0.9);
    }

    #[test]
    fn test_zero_patience_disables() {
        let mut es = EarlyStopping::new(0);
        for _ in 0..100 {
            assert!(!es.step(5.0));
        }
    }
}
