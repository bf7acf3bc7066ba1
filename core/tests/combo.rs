//! Combo reward meter tests.

use spillshift_core::{
    combo::ComboRewardMeter,
    config::ComboConfig,
    event::{DirtinessTier, SimEvent},
};

fn meter() -> ComboRewardMeter {
    ComboRewardMeter::new(&ComboConfig::default())
}

fn reward(meter: &mut ComboRewardMeter, base: i64) -> u32 {
    let mut out = Vec::new();
    meter.register_reward(base, &mut out)
}

#[test]
fn streak_continues_inside_timeout_and_breaks_after() {
    let mut m = meter();
    reward(&mut m, 1);
    assert!(m.tick(2.9, DirtinessTier::Clean).is_empty());

    let mut out = Vec::new();
    m.register_reward(1, &mut out);
    assert_eq!(m.streak(), 2);
    assert_eq!(m.multiplier(), 1.25);
    assert_eq!(out, vec![SimEvent::ComboChanged { streak: 2, multiplier: 1.25 }]);

    let broken = m.tick(3.1, DirtinessTier::Clean);
    assert_eq!(broken, vec![SimEvent::ComboChanged { streak: 0, multiplier: 1.0 }]);
    assert_eq!(m.streak(), 0);
}

#[test]
fn rewards_round_and_never_drop_below_one() {
    let mut m = meter();
    assert_eq!(reward(&mut m, 1), 1);
    assert_eq!(reward(&mut m, 1), 1, "1 × 1.25 rounds to 1");
    assert_eq!(reward(&mut m, 4), 6, "4 × 1.5");
    assert_eq!(reward(&mut m, 2), 4, "2 × 1.75 rounds to 4");
}

#[test]
fn non_positive_base_pays_nothing() {
    let mut m = meter();
    reward(&mut m, 1);
    let mut out = Vec::new();
    assert_eq!(m.register_reward(0, &mut out), 0);
    assert_eq!(m.register_reward(-3, &mut out), 0);
    assert!(out.is_empty());
    assert_eq!(m.streak(), 1, "streak untouched");
}

#[test]
fn multiplier_is_clamped_to_max() {
    let mut m = meter();
    for _ in 0..20 {
        reward(&mut m, 1);
    }
    assert_eq!(m.streak(), 20);
    assert_eq!(m.multiplier(), 3.0);
    assert_eq!(reward(&mut m, 2), 6);
}

#[test]
fn dirty_floor_breaks_the_streak_at_the_configured_tier() {
    let mut m = meter();
    reward(&mut m, 1);
    assert!(m.tick(0.1, DirtinessTier::Dirty).is_empty());
    assert_eq!(m.streak(), 1);

    let events = m.tick(0.1, DirtinessTier::VeryDirty);
    assert_eq!(events.len(), 1);
    assert_eq!(m.streak(), 0);

    let mut lenient = ComboRewardMeter::new(&ComboConfig { break_at_or_above: None, ..ComboConfig::default() });
    reward(&mut lenient, 1);
    lenient.tick(0.1, DirtinessTier::Filthy);
    assert_eq!(lenient.streak(), 1);
}

#[test]
fn remaining_seconds_counts_down() {
    let mut m = meter();
    assert_eq!(m.remaining_seconds(), 0.0);
    reward(&mut m, 1);
    m.tick(1.0, DirtinessTier::Clean);
    assert!((m.remaining_seconds() - 2.0).abs() < 1e-9);
}

#[test]
fn new_day_resets_when_configured() {
    let mut m = meter();
    let mut out = Vec::new();
    m.reset_on_new_day(&mut out);
    assert!(out.is_empty(), "nothing to reset");

    reward(&mut m, 1);
    m.reset_on_new_day(&mut out);
    assert_eq!(m.streak(), 0);
    assert_eq!(out.len(), 1);

    let mut keeps = ComboRewardMeter::new(&ComboConfig { reset_on_new_day: false, ..ComboConfig::default() });
    reward(&mut keeps, 1);
    keeps.reset_on_new_day(&mut out);
    assert_eq!(keeps.streak(), 1);
}
