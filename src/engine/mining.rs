//! Mining minigame state.

use serde::{Deserialize, Serialize};

use crate::domain::{Decimal, Symbol};

/// Cash cost per unit of mining power when upgrading.
const COST_PER_POWER: i64 = 1000;

pub fn initial_power() -> Decimal {
    Decimal::one()
}

/// Power added by one upgrade (0.5).
pub fn upgrade_step() -> Decimal {
    Decimal::from_parts(5, 1)
}

/// Bounds of the per-tick reward factor, [0.0001, 0.0005].
pub fn reward_range() -> (Decimal, Decimal) {
    (Decimal::from_parts(1, 4), Decimal::from_parts(5, 4))
}

/// Power level and earnings of the mining rig.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiningRig {
    power: Decimal,
    active: bool,
    total_earned: Decimal,
    /// Identifies the current run; bumped on every start.
    epoch: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiningStatus {
    pub active: bool,
    pub power: Decimal,
    pub total_earned: Decimal,
    pub base_symbol: Symbol,
    pub upgrade_cost: Decimal,
    pub next_power: Decimal,
}

impl MiningRig {
    pub fn new() -> Self {
        Self {
            power: initial_power(),
            active: false,
            total_earned: Decimal::zero(),
            epoch: 0,
        }
    }

    /// Mark the rig active and return the epoch of the new run.
    pub fn activate(&mut self) -> u64 {
        self.active = true;
        self.epoch += 1;
        self.epoch
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// True while `epoch` names the run that is currently active.
    pub fn is_current_run(&self, epoch: u64) -> bool {
        self.active && self.epoch == epoch
    }

    pub fn power(&self) -> Decimal {
        self.power
    }

    pub fn total_earned(&self) -> Decimal {
        self.total_earned
    }

    /// Coins minted for one tick given a factor drawn from `reward_range()`.
    pub fn reward(&self, factor: Decimal) -> Decimal {
        self.power * factor
    }

    pub fn add_earned(&mut self, value: Decimal) {
        self.total_earned += value;
    }

    /// floor(power * 1000).
    pub fn upgrade_cost(&self) -> Decimal {
        (self.power * Decimal::from(COST_PER_POWER)).floor()
    }

    pub fn upgrade(&mut self) {
        self.power += upgrade_step();
    }

    pub fn status(&self, base_symbol: &Symbol) -> MiningStatus {
        MiningStatus {
            active: self.active,
            power: self.power,
            total_earned: self.total_earned,
            base_symbol: base_symbol.clone(),
            upgrade_cost: self.upgrade_cost(),
            next_power: self.power + upgrade_step(),
        }
    }

    /// Carry the run counter over from a previous rig.
    pub(crate) fn resume_epoch(&mut self, epoch: u64) {
        self.epoch = epoch;
    }
}

impl Default for MiningRig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_new_rig_defaults() {
        let rig = MiningRig::new();
        assert_eq!(rig.power(), d("1"));
        assert!(!rig.is_active());
        assert_eq!(rig.total_earned(), Decimal::zero());
        assert_eq!(rig.upgrade_cost(), d("1000"));
    }

    #[test]
    fn test_upgrade_cost_floors() {
        let mut rig = MiningRig::new();
        rig.upgrade();
        assert_eq!(rig.power(), d("1.5"));
        assert_eq!(rig.upgrade_cost(), d("1500"));

        rig.upgrade();
        rig.upgrade();
        assert_eq!(rig.power(), d("2.5"));
        assert_eq!(rig.upgrade_cost(), d("2500"));
    }

    #[test]
    fn test_reward_scales_with_power() {
        let mut rig = MiningRig::new();
        let (low, high) = reward_range();
        assert_eq!(rig.reward(low), d("0.0001"));
        assert_eq!(rig.reward(high), d("0.0005"));

        rig.upgrade();
        assert_eq!(rig.reward(d("0.0002")), d("0.0003"));
    }

    #[test]
    fn test_epochs_identify_runs() {
        let mut rig = MiningRig::new();
        let first = rig.activate();
        assert!(rig.is_current_run(first));

        rig.deactivate();
        assert!(!rig.is_current_run(first));

        let second = rig.activate();
        assert_ne!(first, second);
        assert!(!rig.is_current_run(first));
        assert!(rig.is_current_run(second));
    }

    #[test]
    fn test_status() {
        let rig = MiningRig::new();
        let status = rig.status(&Symbol::new("BTC"));
        assert_eq!(status.next_power, d("1.5"));
        assert_eq!(status.upgrade_cost, d("1000"));
        assert_eq!(status.base_symbol, Symbol::new("BTC"));
    }
}
