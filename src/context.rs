//! Situational combat state that modifier conditions evaluate against

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Standard target armor used when a request does not override it.
pub const DEFAULT_TARGET_ARMOR: f64 = 2597.0;

/// Boons the player can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boon {
    Might,
    Fury,
    Quickness,
    Alacrity,
    Protection,
    Regeneration,
    Resolution,
    Vigor,
    Swiftness,
    Stability,
    Aegis,
}

impl Boon {
    /// Intensity-stacking boons cap at 25; the rest stack in duration and
    /// are tracked as a single stack.
    pub fn max_stacks(self) -> u32 {
        match self {
            Boon::Might | Boon::Stability => 25,
            _ => 1,
        }
    }
}

/// Conditions (debuffs) the target can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    Bleeding,
    Burning,
    Poison,
    Torment,
    Confusion,
    Vulnerability,
    Weakness,
    Cripple,
    Chill,
    Immobilize,
}

impl ConditionKind {
    pub fn max_stacks(self) -> u32 {
        match self {
            ConditionKind::Bleeding
            | ConditionKind::Burning
            | ConditionKind::Poison
            | ConditionKind::Torment
            | ConditionKind::Confusion
            | ConditionKind::Vulnerability => 25,
            _ => 1,
        }
    }

    /// Base damage per tick per stack, before condition damage scaling.
    /// Non-damaging conditions return None.
    pub fn tick_base(self) -> Option<f64> {
        match self {
            ConditionKind::Bleeding => Some(22.0),
            ConditionKind::Burning => Some(131.0),
            ConditionKind::Poison => Some(33.5),
            ConditionKind::Torment => Some(31.8),
            ConditionKind::Confusion => Some(18.0),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<ConditionKind> {
        match name.to_lowercase().as_str() {
            "bleeding" | "bleed" => Some(ConditionKind::Bleeding),
            "burning" | "burn" => Some(ConditionKind::Burning),
            "poison" => Some(ConditionKind::Poison),
            "torment" => Some(ConditionKind::Torment),
            "confusion" => Some(ConditionKind::Confusion),
            "vulnerability" | "vuln" => Some(ConditionKind::Vulnerability),
            "weakness" => Some(ConditionKind::Weakness),
            "cripple" => Some(ConditionKind::Cripple),
            "chill" => Some(ConditionKind::Chill),
            "immobilize" | "immob" => Some(ConditionKind::Immobilize),
            _ => None,
        }
    }
}

/// Mutable fight state: boon stacks on the player, condition stacks on the
/// target, positioning, and the clock. Stack mutation goes through the
/// add/remove operations so per-effect caps hold. During a candidate search
/// one context is built up front and scored against read-only.
#[derive(Debug, Clone)]
pub struct CombatContext {
    boons: HashMap<Boon, u32>,
    target_conditions: HashMap<ConditionKind, u32>,
    pub target_armor: f64,
    pub target_has_resistance: bool,
    /// Player health as a fraction of maximum, 0.0..=1.0.
    pub player_health_pct: f64,
    pub target_health_pct: f64,
    /// Distance to the target in game units.
    pub distance: f64,
    pub flanking: bool,
    pub behind_target: bool,
    /// Seconds since the fight started.
    pub elapsed: f64,
    recent_actions: Vec<(String, f64)>,
}

impl Default for CombatContext {
    fn default() -> Self {
        CombatContext {
            boons: HashMap::new(),
            target_conditions: HashMap::new(),
            target_armor: DEFAULT_TARGET_ARMOR,
            target_has_resistance: false,
            player_health_pct: 1.0,
            target_health_pct: 1.0,
            distance: 300.0,
            flanking: false,
            behind_target: false,
            elapsed: 0.0,
            recent_actions: Vec::new(),
        }
    }
}

impl CombatContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_boon(&mut self, boon: Boon, stacks: u32) {
        let entry = self.boons.entry(boon).or_insert(0);
        *entry = (*entry + stacks).min(boon.max_stacks());
    }

    pub fn remove_boon(&mut self, boon: Boon, stacks: u32) {
        if let Some(entry) = self.boons.get_mut(&boon) {
            *entry = entry.saturating_sub(stacks);
            if *entry == 0 {
                self.boons.remove(&boon);
            }
        }
    }

    pub fn boon_stacks(&self, boon: Boon) -> u32 {
        self.boons.get(&boon).copied().unwrap_or(0)
    }

    pub fn has_boon(&self, boon: Boon) -> bool {
        self.boon_stacks(boon) > 0
    }

    /// Boons currently present, in no particular order.
    pub fn active_boons(&self) -> impl Iterator<Item = (Boon, u32)> + '_ {
        self.boons.iter().map(|(b, s)| (*b, *s))
    }

    pub fn add_target_condition(&mut self, kind: ConditionKind, stacks: u32) {
        let entry = self.target_conditions.entry(kind).or_insert(0);
        *entry = (*entry + stacks).min(kind.max_stacks());
    }

    pub fn remove_target_condition(&mut self, kind: ConditionKind, stacks: u32) {
        if let Some(entry) = self.target_conditions.get_mut(&kind) {
            *entry = entry.saturating_sub(stacks);
            if *entry == 0 {
                self.target_conditions.remove(&kind);
            }
        }
    }

    pub fn target_condition_stacks(&self, kind: ConditionKind) -> u32 {
        self.target_conditions.get(&kind).copied().unwrap_or(0)
    }

    pub fn target_has_condition(&self, kind: ConditionKind) -> bool {
        self.target_condition_stacks(kind) > 0
    }

    pub fn vulnerability_stacks(&self) -> u32 {
        self.target_condition_stacks(ConditionKind::Vulnerability)
    }

    /// Record an action (skill use, dodge, weapon swap) at the current clock.
    pub fn record_action(&mut self, name: &str) {
        let at = self.elapsed;
        self.recent_actions.push((name.to_string(), at));
    }

    /// True when `name` was recorded within the last `window` seconds.
    pub fn action_within(&self, name: &str, window: f64) -> bool {
        self.recent_actions
            .iter()
            .rev()
            .any(|(n, t)| n == name && self.elapsed - t <= window)
    }

    // Builder-style helpers for assembling a scoring context.

    pub fn with_boon(mut self, boon: Boon, stacks: u32) -> Self {
        self.add_boon(boon, stacks);
        self
    }

    pub fn with_target_condition(mut self, kind: ConditionKind, stacks: u32) -> Self {
        self.add_target_condition(kind, stacks);
        self
    }

    pub fn with_target_armor(mut self, armor: f64) -> Self {
        self.target_armor = armor;
        self
    }

    pub fn with_flanking(mut self, flanking: bool) -> Self {
        self.flanking = flanking;
        self
    }

    pub fn with_action(mut self, name: &str) -> Self {
        self.record_action(name);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boon_stacks_respect_caps() {
        let mut ctx = CombatContext::new();
        ctx.add_boon(Boon::Might, 30);
        assert_eq!(ctx.boon_stacks(Boon::Might), 25);
        ctx.add_boon(Boon::Fury, 5);
        assert_eq!(ctx.boon_stacks(Boon::Fury), 1);
    }

    #[test]
    fn condition_stacks_respect_caps() {
        let mut ctx = CombatContext::new();
        ctx.add_target_condition(ConditionKind::Vulnerability, 10);
        ctx.add_target_condition(ConditionKind::Vulnerability, 20);
        assert_eq!(ctx.vulnerability_stacks(), 25);
        ctx.add_target_condition(ConditionKind::Chill, 4);
        assert_eq!(ctx.target_condition_stacks(ConditionKind::Chill), 1);
    }

    #[test]
    fn remove_floors_at_zero_and_clears_entry() {
        let mut ctx = CombatContext::new();
        ctx.add_boon(Boon::Might, 5);
        ctx.remove_boon(Boon::Might, 10);
        assert_eq!(ctx.boon_stacks(Boon::Might), 0);
        assert!(!ctx.has_boon(Boon::Might));
    }

    #[test]
    fn recent_actions_window() {
        let mut ctx = CombatContext::new();
        ctx.record_action("weapon_swap");
        ctx.elapsed = 4.0;
        assert!(ctx.action_within("weapon_swap", 5.0));
        assert!(!ctx.action_within("weapon_swap", 3.0));
        assert!(!ctx.action_within("dodge", 10.0));
    }
}
