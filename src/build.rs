//! Build calculator: merge gear, traits, and boons into effective stats and
//! price individual skills

use crate::attributes::{
    calculate_all_derived_stats, Attribute, AttributeSet, DerivedStats, ProfessionHealthTier,
    FURY_CRIT_BONUS,
};
use crate::calculators::{average_strike_damage, condition_total_damage, healing};
use crate::context::{Boon, CombatContext};
use crate::error::SimError;
use crate::modifier::{DamageScope, EffectKind, Modifier};
use crate::rotation::Skill;
use crate::stacker::{stack_modifiers, ProcEffect};

/// Incoming damage reduction from protection at full uptime.
pub const PROTECTION_REDUCTION: f64 = 0.33;
/// Incoming damage reduction from resolution at full uptime, folded down
/// from its condition-only reduction.
pub const RESOLUTION_REDUCTION: f64 = 0.15;

/// Knobs that are per-evaluation rather than per-candidate.
#[derive(Debug, Clone, Copy)]
pub struct BuildSettings {
    /// Fraction of the fight each boon is assumed present, 0.0..=1.0.
    /// Might is exempt: its stacks are read from the context directly.
    pub boon_uptime: f64,
    pub health_tier: ProfessionHealthTier,
    pub weapon_strength: f64,
}

impl Default for BuildSettings {
    fn default() -> Self {
        BuildSettings {
            boon_uptime: 1.0,
            health_tier: ProfessionHealthTier::Medium,
            weapon_strength: 1000.0,
        }
    }
}

/// Final character sheet for one candidate: attributes after bonuses,
/// derived stats, and the damage/heal multipliers attached by the stacker.
#[derive(Debug, Clone)]
pub struct EffectiveStats {
    pub attributes: AttributeSet,
    pub derived: DerivedStats,
    pub strike_multiplier: f64,
    pub condition_multiplier: f64,
    pub all_multiplier: f64,
    pub incoming_multiplier: f64,
    pub outgoing_heal_multiplier: f64,
    pub incoming_heal_multiplier: f64,
    pub procs: Vec<ProcEffect>,
    pub active_modifiers: Vec<String>,
}

/// Convert the boons in the context into transient modifiers, scaled by
/// uptime. Might is excluded here (it is baked into the derived stats) and
/// quickness/alacrity are consumed by the rotation scheduler instead.
/// This partition is a fixed contract; moving might onto the modifier path
/// (or fury onto the baked path) changes every damage number downstream.
fn boon_modifiers(ctx: &CombatContext, uptime: f64) -> Vec<Modifier> {
    let uptime = uptime.clamp(0.0, 1.0);
    let mut mods = Vec::new();
    for (boon, _stacks) in ctx.active_boons() {
        match boon {
            Boon::Fury => {
                mods.push(Modifier::new(
                    "fury",
                    "boon",
                    EffectKind::CritChance,
                    FURY_CRIT_BONUS * uptime,
                ));
            }
            Boon::Protection => {
                mods.push(Modifier::damage(
                    "protection",
                    "boon",
                    DamageScope::Incoming,
                    -PROTECTION_REDUCTION * uptime,
                ));
            }
            Boon::Resolution => {
                mods.push(Modifier::damage(
                    "resolution",
                    "boon",
                    DamageScope::Incoming,
                    -RESOLUTION_REDUCTION * uptime,
                ));
            }
            // Might is baked into the derived stats; quickness and alacrity
            // act on the scheduler; the rest carry no priced effect.
            _ => {}
        }
    }
    mods
}

/// Merge base attributes with gear/trait modifiers and the context's boons,
/// run the stacker, and derive the final sheet. Pure: identical inputs and
/// an unmutated context give identical output.
pub fn calculate_effective_stats(
    base: &AttributeSet,
    modifiers: &[Modifier],
    ctx: &CombatContext,
    settings: &BuildSettings,
) -> EffectiveStats {
    let mut all_mods = boon_modifiers(ctx, settings.boon_uptime);
    all_mods.extend_from_slice(modifiers);
    let bonuses = stack_modifiers(&all_mods, ctx);

    let mut attrs = *base;
    for attr in Attribute::ALL {
        let flat = bonuses.flat_bonus(attr);
        let mult = bonuses.stat_multiplier(attr);
        let value = (attrs.get(attr) as f64 + flat) * mult;
        attrs.set(attr, value.round() as i32);
    }

    let might = ctx.boon_stacks(Boon::Might);
    let mut derived = calculate_all_derived_stats(&attrs, settings.health_tier, might, false);
    derived.crit_chance = (derived.crit_chance + bonuses.crit_chance_bonus).clamp(0.0, 1.0);
    derived.crit_damage += bonuses.crit_damage_bonus;
    derived.condition_duration_bonus =
        (derived.condition_duration_bonus + bonuses.condition_duration_bonus).min(1.0);
    derived.boon_duration_bonus =
        (derived.boon_duration_bonus + bonuses.boon_duration_bonus).min(1.0);

    EffectiveStats {
        attributes: attrs,
        derived,
        strike_multiplier: bonuses.strike_multiplier,
        condition_multiplier: bonuses.condition_multiplier,
        all_multiplier: bonuses.all_multiplier,
        incoming_multiplier: bonuses.incoming_multiplier,
        outgoing_heal_multiplier: bonuses.outgoing_heal_multiplier,
        incoming_heal_multiplier: bonuses.incoming_heal_multiplier,
        procs: bonuses.procs,
        active_modifiers: bonuses.active,
    }
}

/// Priced output of one skill cast against the context's target.
#[derive(Debug, Clone)]
pub struct SkillDamage {
    pub skill: String,
    pub strike: f64,
    pub condition: f64,
    /// Expected on-hit/on-crit proc damage, ungated by internal cooldowns.
    pub procs: f64,
    pub total: f64,
    pub effective_power: f64,
    pub crit_chance: f64,
    pub crit_damage: f64,
}

/// Expected damage of one cast: averaged strike damage through the target's
/// armor and vulnerability, plus declared condition applications.
pub fn calculate_skill_damage(
    skill: &Skill,
    stats: &EffectiveStats,
    ctx: &CombatContext,
    settings: &BuildSettings,
) -> Result<SkillDamage, SimError> {
    let derived = &stats.derived;
    let strike = average_strike_damage(
        settings.weapon_strength,
        derived.effective_power,
        skill.coefficient,
        ctx.target_armor,
        derived.crit_chance,
        derived.crit_damage,
        ctx.vulnerability_stacks(),
        &[stats.strike_multiplier, stats.all_multiplier],
    )?;

    let mut procs = 0.0;
    for p in &stats.procs {
        let gate = if p.on_crit { derived.crit_chance } else { 1.0 };
        procs += p.damage * p.chance * gate;
    }

    let condition = match &skill.condition_application {
        Some(app) => condition_total_damage(
            app.kind,
            derived.effective_condition_damage,
            app.stacks,
            app.base_duration,
            derived.condition_duration_bonus,
            ctx.target_has_resistance,
            &[stats.condition_multiplier, stats.all_multiplier],
        )?,
        None => 0.0,
    };

    Ok(SkillDamage {
        skill: skill.name.clone(),
        strike,
        condition,
        procs,
        total: strike + condition + procs,
        effective_power: derived.effective_power,
        crit_chance: derived.crit_chance,
        crit_damage: derived.crit_damage,
    })
}

/// Healing of one cast of the skill, zero when it has no heal profile.
pub fn calculate_skill_healing(
    skill: &Skill,
    stats: &EffectiveStats,
) -> Result<f64, SimError> {
    match &skill.heal {
        Some(profile) => healing(
            profile.base,
            stats.attributes.healing_power as f64,
            profile.coefficient,
            stats.outgoing_heal_multiplier,
            stats.incoming_heal_multiplier,
        ),
        None => Ok(0.0),
    }
}
