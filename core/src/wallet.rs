//! Coin wallet — the reward sink. Coins never go negative.

use crate::{collaborator::RewardSink, event::SimEvent};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletState {
    pub coins: u32,
}

pub struct CoinWallet {
    state: WalletState,
}

impl CoinWallet {
    pub fn new(starting_coins: u32) -> Self {
        Self { state: WalletState { coins: starting_coins } }
    }

    /// Non-positive amounts are ignored.
    pub fn add_coins(&mut self, amount: i64, out: &mut Vec<SimEvent>) {
        if amount <= 0 {
            return;
        }
        let amount = amount.min(u32::MAX as i64) as u32;
        self.state.coins = self.state.coins.saturating_add(amount);
        out.push(SimEvent::CoinsChanged { total: self.state.coins });
    }

    pub fn can_afford(&self, amount: u32) -> bool {
        self.state.coins >= amount
    }

    /// Spend `amount`. Returns false, and changes nothing, when short.
    pub fn try_spend(&mut self, amount: u32, out: &mut Vec<SimEvent>) -> bool {
        if amount == 0 {
            return true;
        }
        if !self.can_afford(amount) {
            return false;
        }
        self.state.coins -= amount;
        out.push(SimEvent::CoinsChanged { total: self.state.coins });
        true
    }

    pub fn coins(&self) -> u32 {
        self.state.coins
    }

    pub fn state(&self) -> &WalletState {
        &self.state
    }
}

impl RewardSink for CoinWallet {
    fn credit(&mut self, amount: u32, out: &mut Vec<SimEvent>) {
        self.add_coins(amount as i64, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spending_more_than_held_changes_nothing() {
        let mut out = Vec::new();
        let mut wallet = CoinWallet::new(3);
        assert!(!wallet.try_spend(4, &mut out));
        assert_eq!(wallet.coins(), 3);
        assert!(out.is_empty());

        assert!(wallet.try_spend(3, &mut out));
        assert_eq!(wallet.coins(), 0);
        assert_eq!(out, vec![SimEvent::CoinsChanged { total: 0 }]);
    }

    #[test]
    fn non_positive_credit_is_ignored() {
        let mut out = Vec::new();
        let mut wallet = CoinWallet::new(0);
        wallet.add_coins(0, &mut out);
        wallet.add_coins(-4, &mut out);
        assert_eq!(wallet.coins(), 0);
        assert!(out.is_empty());
    }
}
