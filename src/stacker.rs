//! Aggregation of active modifiers into flat bonuses and multipliers

use std::collections::HashMap;

use crate::attributes::Attribute;
use crate::context::CombatContext;
use crate::modifier::{DamageScope, EffectKind, Modifier, StackingRule};

/// An on-hit or on-crit proc that survived condition filtering, ready for
/// the pricing layers. Damage is per activation; the simulator applies the
/// chance and internal cooldown.
#[derive(Debug, Clone)]
pub struct ProcEffect {
    pub name: String,
    pub damage: f64,
    pub chance: f64,
    pub cooldown: Option<f64>,
    pub on_crit: bool,
}

/// Everything the stacker produces from one pass over a modifier list.
/// Multipliers are total factors (1.0 means no change).
#[derive(Debug, Clone)]
pub struct StackedBonuses {
    pub flat: HashMap<Attribute, f64>,
    pub stat_multipliers: HashMap<Attribute, f64>,
    pub strike_multiplier: f64,
    pub condition_multiplier: f64,
    pub all_multiplier: f64,
    pub incoming_multiplier: f64,
    pub crit_chance_bonus: f64,
    pub crit_damage_bonus: f64,
    pub condition_duration_bonus: f64,
    pub boon_duration_bonus: f64,
    pub outgoing_heal_multiplier: f64,
    pub incoming_heal_multiplier: f64,
    pub procs: Vec<ProcEffect>,
    /// Names of the modifiers that contributed, in input order.
    pub active: Vec<String>,
}

impl Default for StackedBonuses {
    fn default() -> Self {
        StackedBonuses {
            flat: HashMap::new(),
            stat_multipliers: HashMap::new(),
            strike_multiplier: 1.0,
            condition_multiplier: 1.0,
            all_multiplier: 1.0,
            incoming_multiplier: 1.0,
            crit_chance_bonus: 0.0,
            crit_damage_bonus: 0.0,
            condition_duration_bonus: 0.0,
            boon_duration_bonus: 0.0,
            outgoing_heal_multiplier: 1.0,
            incoming_heal_multiplier: 1.0,
            procs: Vec::new(),
            active: Vec::new(),
        }
    }
}

impl StackedBonuses {
    pub fn flat_bonus(&self, attr: Attribute) -> f64 {
        self.flat.get(&attr).copied().unwrap_or(0.0)
    }

    pub fn stat_multiplier(&self, attr: Attribute) -> f64 {
        self.stat_multipliers.get(&attr).copied().unwrap_or(1.0)
    }
}

/// One damage-multiplier lane: a running multiplicative factor plus the
/// additive groups that resolve to one factor each at the end.
#[derive(Debug)]
struct MultiplierLane {
    factor: f64,
    groups: HashMap<String, f64>,
}

impl MultiplierLane {
    fn new() -> Self {
        MultiplierLane {
            factor: 1.0,
            groups: HashMap::new(),
        }
    }

    fn add(&mut self, rule: &StackingRule, value: f64) {
        match rule {
            StackingRule::Multiplicative => self.factor *= 1.0 + value,
            StackingRule::AdditiveGroup(group) => {
                *self.groups.entry(group.clone()).or_insert(0.0) += value;
            }
        }
    }

    fn resolve(self) -> f64 {
        let mut total = self.factor;
        for (_, sum) in self.groups {
            total *= 1.0 + sum;
        }
        total
    }
}

/// Aggregate a modifier list against a context. Only modifiers whose
/// condition evaluates true contribute; stacked modifiers scale their value
/// by stack count. Percent-stat bonuses sum per attribute before becoming a
/// single multiplier; damage multipliers resolve per scope through their
/// stacking rules; incoming damage runs through the same machinery in its
/// own lane.
pub fn stack_modifiers(modifiers: &[Modifier], ctx: &CombatContext) -> StackedBonuses {
    let mut out = StackedBonuses::default();
    let mut percent: HashMap<Attribute, f64> = HashMap::new();
    let mut strike = MultiplierLane::new();
    let mut condition = MultiplierLane::new();
    let mut all = MultiplierLane::new();
    let mut incoming = MultiplierLane::new();

    for m in modifiers {
        if !m.is_active(ctx) {
            continue;
        }
        let value = m.stacked_value();
        match m.kind {
            EffectKind::FlatStat => {
                if let Some(attr) = m.target {
                    *out.flat.entry(attr).or_insert(0.0) += value;
                }
            }
            EffectKind::PercentStat => {
                if let Some(attr) = m.target {
                    *percent.entry(attr).or_insert(0.0) += value;
                }
            }
            EffectKind::DamageMultiplier(scope) => {
                let lane = match scope {
                    DamageScope::Strike => &mut strike,
                    DamageScope::Condition => &mut condition,
                    DamageScope::All => &mut all,
                    DamageScope::Incoming => &mut incoming,
                };
                lane.add(&m.stacking, value);
            }
            EffectKind::ConditionDuration => out.condition_duration_bonus += value,
            EffectKind::BoonDuration => out.boon_duration_bonus += value,
            EffectKind::CritChance => out.crit_chance_bonus += value,
            EffectKind::CritDamage => out.crit_damage_bonus += value,
            EffectKind::OutgoingHealing => out.outgoing_heal_multiplier += value,
            EffectKind::IncomingHealing => out.incoming_heal_multiplier += value,
            EffectKind::OnHitProc | EffectKind::OnCritProc => {
                out.procs.push(ProcEffect {
                    name: m.name.clone(),
                    damage: value,
                    chance: m.proc_chance.unwrap_or(1.0),
                    cooldown: m.cooldown,
                    on_crit: m.kind == EffectKind::OnCritProc,
                });
            }
        }
        out.active.push(m.name.clone());
    }

    for (attr, sum) in percent {
        out.stat_multipliers.insert(attr, 1.0 + sum);
    }
    out.strike_multiplier = strike.resolve();
    out.condition_multiplier = condition.resolve();
    out.all_multiplier = all.resolve();
    out.incoming_multiplier = incoming.resolve();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Boon;
    use crate::modifier::Condition;

    #[test]
    fn flat_modifiers_sum_per_attribute() {
        let mods = vec![
            Modifier::flat("steak", "food", Attribute::Power, 100.0),
            Modifier::flat("stone", "utility", Attribute::Power, 60.0),
            Modifier::flat("steak-ferocity", "food", Attribute::Ferocity, 70.0),
        ];
        let bonuses = stack_modifiers(&mods, &CombatContext::new());
        assert_eq!(bonuses.flat_bonus(Attribute::Power), 160.0);
        assert_eq!(bonuses.flat_bonus(Attribute::Ferocity), 70.0);
        assert_eq!(bonuses.flat_bonus(Attribute::Vitality), 0.0);
    }

    #[test]
    fn percent_modifiers_sum_then_multiply() {
        let mods = vec![
            Modifier::percent("a", "trait", Attribute::Vitality, 0.10),
            Modifier::percent("b", "trait", Attribute::Vitality, 0.05),
        ];
        let bonuses = stack_modifiers(&mods, &CombatContext::new());
        assert!((bonuses.stat_multiplier(Attribute::Vitality) - 1.15).abs() < 1e-12);
        assert_eq!(bonuses.stat_multiplier(Attribute::Power), 1.0);
    }

    #[test]
    fn multiplicative_and_additive_groups_resolve_separately() {
        // Two additive 10% bonuses in one group sum to +20% before
        // multiplying; the independent 5% multiplies on its own.
        let mods = vec![
            Modifier::damage("t1", "trait", DamageScope::Strike, 0.10).additive("trait-line"),
            Modifier::damage("t2", "trait", DamageScope::Strike, 0.10).additive("trait-line"),
            Modifier::damage("force", "sigil", DamageScope::Strike, 0.05),
        ];
        let bonuses = stack_modifiers(&mods, &CombatContext::new());
        assert!((bonuses.strike_multiplier - 1.20 * 1.05).abs() < 1e-12);
        assert_eq!(bonuses.condition_multiplier, 1.0);
    }

    #[test]
    fn scopes_do_not_bleed_into_each_other() {
        let mods = vec![
            Modifier::damage("s", "x", DamageScope::Strike, 0.10),
            Modifier::damage("c", "x", DamageScope::Condition, 0.20),
            Modifier::damage("a", "x", DamageScope::All, 0.05),
            Modifier::damage("in", "x", DamageScope::Incoming, -0.10),
        ];
        let bonuses = stack_modifiers(&mods, &CombatContext::new());
        assert!((bonuses.strike_multiplier - 1.10).abs() < 1e-12);
        assert!((bonuses.condition_multiplier - 1.20).abs() < 1e-12);
        assert!((bonuses.all_multiplier - 1.05).abs() < 1e-12);
        assert!((bonuses.incoming_multiplier - 0.90).abs() < 1e-12);
    }

    #[test]
    fn inactive_modifiers_contribute_nothing() {
        let mods = vec![
            Modifier::damage("gated", "trait", DamageScope::Strike, 0.25).with_condition(
                Condition::PlayerHasBoon {
                    boon: Boon::Quickness,
                    min_stacks: 1,
                },
            ),
        ];
        let bonuses = stack_modifiers(&mods, &CombatContext::new());
        assert_eq!(bonuses.strike_multiplier, 1.0);
        assert!(bonuses.active.is_empty());
    }

    #[test]
    fn stacked_modifier_scales_by_stack_count() {
        let mods = vec![
            Modifier::flat("bloodlust", "sigil", Attribute::Power, 10.0).with_stacks(25, 25),
        ];
        let bonuses = stack_modifiers(&mods, &CombatContext::new());
        assert_eq!(bonuses.flat_bonus(Attribute::Power), 250.0);
    }

    #[test]
    fn procs_are_collected_with_their_gating() {
        let mut m = Modifier::new("thief", "relic", EffectKind::OnHitProc, 80.0);
        m = m.with_proc(0.8, Some(1.0));
        let bonuses = stack_modifiers(&[m], &CombatContext::new());
        assert_eq!(bonuses.procs.len(), 1);
        let p = &bonuses.procs[0];
        assert_eq!(p.damage, 80.0);
        assert_eq!(p.chance, 0.8);
        assert_eq!(p.cooldown, Some(1.0));
        assert!(!p.on_crit);
    }

    #[test]
    fn active_names_preserve_input_order() {
        let mods = vec![
            Modifier::damage("first", "x", DamageScope::All, 0.01),
            Modifier::damage("second", "x", DamageScope::All, 0.01),
        ];
        let bonuses = stack_modifiers(&mods, &CombatContext::new());
        assert_eq!(bonuses.active, vec!["first", "second"]);
    }
}
