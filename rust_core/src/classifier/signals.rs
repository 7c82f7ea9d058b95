//! Strategic signal interpretation for unusual contracts.
//!
//! The signal label is assembled from an ordered table of independent
//! predicate -> label rules. Rules are evaluated in a fixed sequence and
//! every label that fires is joined with `" | "`, so identical inputs always
//! produce an identical label. When nothing fires the contract is tagged as
//! plain call/put flow.

use crate::types::{Moneyness, OptionType};

/// Premium floor for the smart-money rule
pub const SMART_MONEY_PREMIUM: f64 = 100_000.0;
/// Ratio floor for the smart-money rule
pub const SMART_MONEY_RATIO: f64 = 6.0;
/// Premium floor for the conviction-trade rule
pub const CONVICTION_PREMIUM: f64 = 50_000.0;
/// Ratio floor for the lottery-ticket rule
const LOTTERY_RATIO: f64 = 8.0;
/// DTE ceiling for gamma-squeeze setups
const GAMMA_SQUEEZE_MAX_DTE: i64 = 14;
/// DTE ceiling and ratio floor for short-term directional flow
const SHORT_TERM_MAX_DTE: i64 = 7;
const SHORT_TERM_RATIO: f64 = 5.0;
/// DTE floor for long-term directional flow
const LONG_TERM_MIN_DTE: i64 = 30;

/// Everything a signal rule is allowed to look at.
#[derive(Clone, Copy, Debug)]
pub struct SignalContext {
    pub option_type: OptionType,
    pub moneyness: Moneyness,
    pub volume_to_oi_ratio: f64,
    pub days_to_expiration: i64,
    pub premium_spent: f64,
}

struct SignalRule {
    label: &'static str,
    applies: fn(&SignalContext) -> bool,
}

/// Rule table. Order is the concatenation order of the final label and must
/// stay fixed.
const RULES: &[SignalRule] = &[
    SignalRule {
        label: "SMART MONEY",
        applies: |c| c.premium_spent >= SMART_MONEY_PREMIUM && c.volume_to_oi_ratio >= SMART_MONEY_RATIO,
    },
    SignalRule {
        label: "GAMMA SQUEEZE SETUP",
        applies: |c| {
            c.moneyness == Moneyness::AtTheMoney && c.days_to_expiration <= GAMMA_SQUEEZE_MAX_DTE
        },
    },
    SignalRule {
        label: "LOTTERY TICKET PLAY",
        applies: |c| {
            c.moneyness == Moneyness::DeepOutOfTheMoney && c.volume_to_oi_ratio >= LOTTERY_RATIO
        },
    },
    SignalRule {
        label: "CONVICTION TRADE",
        applies: |c| c.moneyness == Moneyness::InTheMoney && c.premium_spent >= CONVICTION_PREMIUM,
    },
    SignalRule {
        label: "SHORT-TERM BULLISH",
        applies: |c| {
            c.option_type == OptionType::Call
                && c.days_to_expiration <= SHORT_TERM_MAX_DTE
                && c.volume_to_oi_ratio >= SHORT_TERM_RATIO
        },
    },
    SignalRule {
        label: "LONG-TERM BULLISH",
        applies: |c| c.option_type == OptionType::Call && c.days_to_expiration >= LONG_TERM_MIN_DTE,
    },
    SignalRule {
        label: "SHORT-TERM BEARISH",
        applies: |c| {
            c.option_type == OptionType::Put
                && c.days_to_expiration <= SHORT_TERM_MAX_DTE
                && c.volume_to_oi_ratio >= SHORT_TERM_RATIO
        },
    },
    SignalRule {
        label: "LONG-TERM BEARISH",
        applies: |c| c.option_type == OptionType::Put && c.days_to_expiration >= LONG_TERM_MIN_DTE,
    },
];

/// Compose the strategic signal label for one contract.
pub fn strategic_signal(ctx: &SignalContext) -> String {
    let labels: Vec<&str> = RULES
        .iter()
        .filter(|rule| (rule.applies)(ctx))
        .map(|rule| rule.label)
        .collect();

    if labels.is_empty() {
        ctx.option_type.flow_label().to_string()
    } else {
        labels.join(" | ")
    }
}
