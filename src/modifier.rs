//! The modifier model: one uniform shape for every stat and damage effect

use crate::attributes::Attribute;
use crate::context::{Boon, CombatContext, ConditionKind};

/// Which damage a multiplier applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageScope {
    All,
    Strike,
    Condition,
    /// Damage taken by the player rather than dealt.
    Incoming,
}

/// What a modifier does when it is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectKind {
    /// Flat points added to the target attribute.
    FlatStat,
    /// Fraction of the target attribute, summed with peers before applying.
    PercentStat,
    /// Fractional damage bonus for the given scope.
    DamageMultiplier(DamageScope),
    ConditionDuration,
    BoonDuration,
    CritChance,
    CritDamage,
    OutgoingHealing,
    IncomingHealing,
    /// Flat bonus damage on every hit; value is the damage per activation.
    OnHitProc,
    /// As OnHitProc, but only critical hits can trigger it.
    OnCritProc,
}

/// How a damage multiplier combines with its peers. Multiplicative factors
/// multiply the running total directly; additive ones sum inside their named
/// group, and the group total multiplies once. Getting this split wrong on a
/// single effect shifts totals by double-digit percentages, so every damage
/// modifier declares it explicitly.
#[derive(Debug, Clone, PartialEq)]
pub enum StackingRule {
    Multiplicative,
    AdditiveGroup(String),
}

/// A single stat or damage effect from gear, traits, food, or a converted
/// boon. The optimizer deals exclusively in these.
#[derive(Debug, Clone)]
pub struct Modifier {
    pub name: String,
    /// Where the effect comes from (item name, trait line, boon).
    pub source: String,
    pub kind: EffectKind,
    pub value: f64,
    pub target: Option<Attribute>,
    pub condition: Option<Condition>,
    pub stacks: u32,
    pub max_stacks: u32,
    /// Minimum seconds between proc activations.
    pub cooldown: Option<f64>,
    pub proc_chance: Option<f64>,
    pub stacking: StackingRule,
}

impl Modifier {
    pub fn new(name: &str, source: &str, kind: EffectKind, value: f64) -> Self {
        Modifier {
            name: name.to_string(),
            source: source.to_string(),
            kind,
            value,
            target: None,
            condition: None,
            stacks: 1,
            max_stacks: 1,
            cooldown: None,
            proc_chance: None,
            stacking: StackingRule::Multiplicative,
        }
    }

    /// Flat attribute bonus.
    pub fn flat(name: &str, source: &str, attr: Attribute, value: f64) -> Self {
        let mut m = Modifier::new(name, source, EffectKind::FlatStat, value);
        m.target = Some(attr);
        m
    }

    /// Percent attribute bonus, as a fraction.
    pub fn percent(name: &str, source: &str, attr: Attribute, value: f64) -> Self {
        let mut m = Modifier::new(name, source, EffectKind::PercentStat, value);
        m.target = Some(attr);
        m
    }

    /// Damage multiplier for the given scope, as a fractional bonus.
    pub fn damage(name: &str, source: &str, scope: DamageScope, value: f64) -> Self {
        Modifier::new(name, source, EffectKind::DamageMultiplier(scope), value)
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Set current and maximum stacks. Current is clamped to the maximum.
    pub fn with_stacks(mut self, stacks: u32, max_stacks: u32) -> Self {
        self.max_stacks = max_stacks.max(1);
        self.stacks = stacks.min(self.max_stacks);
        self
    }

    /// Mark as additive within the named group.
    pub fn additive(mut self, group: &str) -> Self {
        self.stacking = StackingRule::AdditiveGroup(group.to_string());
        self
    }

    pub fn with_proc(mut self, chance: f64, cooldown: Option<f64>) -> Self {
        self.proc_chance = Some(chance.clamp(0.0, 1.0));
        self.cooldown = cooldown;
        self
    }

    /// A conditionless modifier is always active.
    pub fn is_active(&self, ctx: &CombatContext) -> bool {
        match &self.condition {
            Some(c) => c.evaluate(ctx),
            None => true,
        }
    }

    /// Effect value scaled by current stacks.
    pub fn stacked_value(&self) -> f64 {
        self.value * self.stacks.max(1) as f64
    }
}

/// Activation predicates over the combat context. A closed set so evaluation
/// stays exhaustively checked.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Player health strictly below the fraction.
    PlayerHealthBelow(f64),
    PlayerHealthAbove(f64),
    TargetHealthBelow(f64),
    TargetHealthAbove(f64),
    TargetHasCondition {
        kind: ConditionKind,
        min_stacks: u32,
    },
    PlayerHasBoon {
        boon: Boon,
        min_stacks: u32,
    },
    DistanceBelow(f64),
    DistanceAbove(f64),
    Flanking,
    BehindTarget,
    /// The named action happened within the last `within` seconds.
    RecentAction {
        action: String,
        within: f64,
    },
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

impl Condition {
    pub fn evaluate(&self, ctx: &CombatContext) -> bool {
        match self {
            Condition::PlayerHealthBelow(pct) => ctx.player_health_pct < *pct,
            Condition::PlayerHealthAbove(pct) => ctx.player_health_pct > *pct,
            Condition::TargetHealthBelow(pct) => ctx.target_health_pct < *pct,
            Condition::TargetHealthAbove(pct) => ctx.target_health_pct > *pct,
            Condition::TargetHasCondition { kind, min_stacks } => {
                ctx.target_condition_stacks(*kind) >= *min_stacks
            }
            Condition::PlayerHasBoon { boon, min_stacks } => {
                ctx.boon_stacks(*boon) >= *min_stacks
            }
            Condition::DistanceBelow(d) => ctx.distance < *d,
            Condition::DistanceAbove(d) => ctx.distance > *d,
            Condition::Flanking => ctx.flanking,
            Condition::BehindTarget => ctx.behind_target,
            Condition::RecentAction { action, within } => ctx.action_within(action, *within),
            Condition::All(conds) => conds.iter().all(|c| c.evaluate(ctx)),
            Condition::Any(conds) => conds.iter().any(|c| c.evaluate(ctx)),
        }
    }
}
