//! Action-signal classifier
//!
//! Translates the fuzzy sub-signals into one discrete code with a color
//! and icon the front-end renders directly. Rules apply in order; panic
//! always wins.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionSignal {
    pub code: String,
    pub color: String,
    pub icon: String,
}

impl ActionSignal {
    fn new(code: &str, color: &str, icon: &str) -> Self {
        Self {
            code: code.to_string(),
            color: color.to_string(),
            icon: icon.to_string(),
        }
    }

    /// Fetch produced nothing at all
    pub fn no_signal() -> Self {
        Self::new("NO SIGNAL", "#64748B", "cloud-off")
    }
}

/// First matching rule wins:
/// 1. panic -> abort
/// 2. high conflict with artificial positivity -> trap
/// 3. organic consensus with positive mood -> strong buy
/// 4. anything else -> hold
pub fn classify_action(conflict: f64, sentiment: f64, is_panic: bool) -> ActionSignal {
    if is_panic {
        return ActionSignal::new("ABORT / CRASH", "#FF0000", "skull");
    }

    if conflict > 0.70 && sentiment > 0.4 {
        return ActionSignal::new("TRAP / FAKE PUMP", "#FACC15", "eye");
    }

    if conflict < 0.4 && sentiment > 0.3 {
        return ActionSignal::new("STRONG BUY", "#22C55E", "rocket");
    }

    ActionSignal::new("HODL / WAIT", "#A855F7", "shield")
}

/// Panic predicate shared by both pipeline variants
pub fn is_panic(mean_sentiment: f64, conflict: f64) -> bool {
    mean_sentiment < -0.35 && conflict > 0.65
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_dominates_every_other_rule() {
        // Inputs that would otherwise satisfy trap and strong-buy still abort
        for (conflict, sentiment) in [(0.9, 0.9), (0.1, 0.9), (0.5, 0.0)] {
            let signal = classify_action(conflict, sentiment, true);
            assert_eq!(signal.code, "ABORT / CRASH");
            assert_eq!(signal.color, "#FF0000");
            assert_eq!(signal.icon, "skull");
        }
    }

    #[test]
    fn test_trap_rule() {
        let signal = classify_action(0.8, 0.6, false);
        assert_eq!(signal.code, "TRAP / FAKE PUMP");
        assert_eq!(signal.color, "#FACC15");
        assert_eq!(signal.icon, "eye");
    }

    #[test]
    fn test_strong_buy_rule() {
        let signal = classify_action(0.2, 0.5, false);
        assert_eq!(signal.code, "STRONG BUY");
        assert_eq!(signal.color, "#22C55E");
        assert_eq!(signal.icon, "rocket");
    }

    #[test]
    fn test_hold_fallback() {
        // Moderate conflict, positive sentiment: neither trap nor strong buy
        let signal = classify_action(0.5, 0.5, false);
        assert_eq!(signal.code, "HODL / WAIT");

        // Negative sentiment without panic
        let signal = classify_action(0.3, -0.2, false);
        assert_eq!(signal.code, "HODL / WAIT");
        assert_eq!(signal.icon, "shield");
    }

    #[test]
    fn test_no_signal_shape() {
        let signal = ActionSignal::no_signal();
        assert_eq!(signal.code, "NO SIGNAL");
        assert_eq!(signal.color, "#64748B");
        assert_eq!(signal.icon, "cloud-off");
    }

    #[test]
    fn test_panic_predicate_thresholds() {
        assert!(is_panic(-0.5, 0.72));
        assert!(!is_panic(-0.5, 0.65));
        assert!(!is_panic(-0.35, 0.9));
        assert!(!is_panic(0.1, 0.9));
    }
}
