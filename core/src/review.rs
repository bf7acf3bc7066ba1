//! Shift review — the end-of-day summary of a finite run.
//!
//! On each DayEnded: salary bonus from filth time, a reputation star when
//! the floor stayed clean, and on the promotion day the final verdict.

use crate::{
    collaborator::RewardSink,
    config::ReviewConfig,
    event::SimEvent,
    reputation::ReputationTrack,
    types::Seconds,
    wallet::CoinWallet,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftReport {
    pub day: u32,
    pub filth_seconds: Seconds,
    pub spills_cleaned: u32,
    pub salary_bonus: u32,
    pub earned_star: bool,
    /// Set only on the promotion day.
    pub promoted: Option<bool>,
}

/// Full bonus up to the grace period, then one coin lost per whole
/// second of filth past it.
pub fn salary_bonus(config: &ReviewConfig, filth_seconds: Seconds) -> u32 {
    let max = config.max_salary_bonus;
    if !(filth_seconds > config.salary_grace_seconds) {
        return max;
    }
    let deduction = (filth_seconds - config.salary_grace_seconds).floor();
    (max as f64 - deduction).clamp(0.0, max as f64) as u32
}

pub struct ShiftReview {
    config: ReviewConfig,
    spills_cleaned_today: u32,
    last_report: Option<ShiftReport>,
}

impl ShiftReview {
    pub fn new(config: &ReviewConfig) -> Self {
        Self { config: config.clone(), spills_cleaned_today: 0, last_report: None }
    }

    pub fn record_clean(&mut self) {
        self.spills_cleaned_today += 1;
    }

    pub fn on_day_started(&mut self) {
        self.spills_cleaned_today = 0;
    }

    pub fn review(
        &mut self,
        day: u32,
        is_final_day: bool,
        filth_seconds: Seconds,
        reputation: &mut ReputationTrack,
        wallet: &mut CoinWallet,
        out: &mut Vec<SimEvent>,
    ) -> ShiftReport {
        let bonus = salary_bonus(&self.config, filth_seconds);
        if bonus > 0 {
            wallet.credit(bonus, out);
        }

        let earned_star = filth_seconds < self.config.star_filth_below_seconds;
        if earned_star {
            reputation.try_increase(out);
        }

        log::info!(
            "day={day} review: filth={filth_seconds:.1}s cleaned={} bonus={bonus} star={earned_star}",
            self.spills_cleaned_today
        );
        out.push(SimEvent::ShiftReviewed {
            day,
            filth_seconds,
            spills_cleaned: self.spills_cleaned_today,
            salary_bonus: bonus,
            earned_star,
        });

        let promoted = (is_final_day && self.config.promotion_day != 0 && day == self.config.promotion_day)
            .then(|| {
                let required = self.config.coins_required_to_promote;
                let promoted = wallet.coins() >= required;
                log::info!("day={day} promotion: coins={} required={required} promoted={promoted}", wallet.coins());
                out.push(SimEvent::PromotionDecided { day, coins: wallet.coins(), required, promoted });
                promoted
            });

        let report = ShiftReport {
            day,
            filth_seconds,
            spills_cleaned: self.spills_cleaned_today,
            salary_bonus: bonus,
            earned_star,
            promoted,
        };
        self.last_report = Some(report.clone());
        report
    }

    pub fn spills_cleaned_today(&self) -> u32 {
        self.spills_cleaned_today
    }

    pub fn last_report(&self) -> Option<&ShiftReport> {
        self.last_report.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salary_table() {
        let config = ReviewConfig::default();
        assert_eq!(salary_bonus(&config, 0.0), 5);
        assert_eq!(salary_bonus(&config, 5.0), 5);
        assert_eq!(salary_bonus(&config, 5.9), 5);
        assert_eq!(salary_bonus(&config, 6.0), 4);
        assert_eq!(salary_bonus(&config, 8.5), 2);
        assert_eq!(salary_bonus(&config, 10.0), 0);
        assert_eq!(salary_bonus(&config, 300.0), 0);
    }
}
