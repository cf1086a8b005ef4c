//! Deterministic discrete-event rotation scheduler

use crate::build::{
    calculate_skill_damage, calculate_skill_healing, BuildSettings, EffectiveStats,
};
use crate::context::{Boon, CombatContext, ConditionKind};
use crate::error::SimError;

/// Default simulation window in seconds.
pub const DEFAULT_WINDOW: f64 = 30.0;
/// Instant casts still occupy a minimum frame so zero-cost skills cannot
/// wedge the scheduler.
const MIN_CAST_TIME: f64 = 0.05;
/// Cast-time factor while quickness is up.
const QUICKNESS_CAST_FACTOR: f64 = 1.0 / 1.5;
/// Cooldown factor while alacrity is up.
const ALACRITY_COOLDOWN_FACTOR: f64 = 0.8;
const TIME_EPS: f64 = 1e-9;

/// Conditions one cast applies to the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConditionApplication {
    pub kind: ConditionKind,
    pub stacks: u32,
    pub base_duration: f64,
}

/// Healing profile of a skill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealProfile {
    pub base: f64,
    pub coefficient: f64,
}

/// One castable skill. Priority is a rank, lowest first; ties break by
/// declaration order.
#[derive(Debug, Clone)]
pub struct Skill {
    pub name: String,
    pub coefficient: f64,
    pub condition_application: Option<ConditionApplication>,
    pub heal: Option<HealProfile>,
    pub cast_time: f64,
    pub cooldown: f64,
    pub priority: i32,
}

impl Skill {
    pub fn strike(name: &str, coefficient: f64, cast_time: f64, cooldown: f64, priority: i32) -> Self {
        Skill {
            name: name.to_string(),
            coefficient,
            condition_application: None,
            heal: None,
            cast_time,
            cooldown,
            priority,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RotationConfig {
    pub duration: f64,
    pub track_healing: bool,
}

impl Default for RotationConfig {
    fn default() -> Self {
        RotationConfig {
            duration: DEFAULT_WINDOW,
            track_healing: true,
        }
    }
}

/// Per-skill accounting over the window.
#[derive(Debug, Clone)]
pub struct SkillTally {
    pub name: String,
    pub casts: u32,
    pub damage: f64,
    pub healing: f64,
}

#[derive(Debug, Clone)]
pub struct RotationResult {
    pub duration: f64,
    pub total_damage: f64,
    pub total_healing: f64,
    pub dps: f64,
    pub hps: f64,
    pub skills: Vec<SkillTally>,
}

/// Play the rotation across a fixed window. Among ready skills the lowest
/// priority rank casts, ties by declaration order; the clock advances by the
/// cast time and the skill recharges from the cast's end. Quickness in the
/// context compresses cast times, alacrity shortens cooldowns. Fully
/// deterministic: every chance is pre-averaged, and procs with an internal
/// cooldown credit their expected damage at most once per cooldown window.
pub fn simulate_rotation(
    skills: &[Skill],
    stats: &EffectiveStats,
    ctx: &CombatContext,
    settings: &BuildSettings,
    cfg: &RotationConfig,
) -> Result<RotationResult, SimError> {
    if skills.is_empty() {
        return Err(SimError::EmptyRotation);
    }

    let cast_factor = if ctx.has_boon(Boon::Quickness) {
        QUICKNESS_CAST_FACTOR
    } else {
        1.0
    };
    let cooldown_factor = if ctx.has_boon(Boon::Alacrity) {
        ALACRITY_COOLDOWN_FACTOR
    } else {
        1.0
    };

    // Stats and context are constant across the window, so each skill is
    // priced once. Ungated proc damage is handled separately below.
    let mut priced = Vec::with_capacity(skills.len());
    for skill in skills {
        let damage = calculate_skill_damage(skill, stats, ctx, settings)?;
        let heal = if cfg.track_healing {
            calculate_skill_healing(skill, stats)?
        } else {
            0.0
        };
        priced.push((damage.strike + damage.condition, heal));
    }

    let mut tallies: Vec<SkillTally> = skills
        .iter()
        .map(|s| SkillTally {
            name: s.name.clone(),
            casts: 0,
            damage: 0.0,
            healing: 0.0,
        })
        .collect();
    let mut next_ready = vec![0.0f64; skills.len()];
    let mut proc_last_fired: Vec<Option<f64>> = vec![None; stats.procs.len()];
    let mut proc_damage_total = 0.0;
    let mut now = 0.0f64;

    while now + TIME_EPS < cfg.duration {
        let mut choice: Option<usize> = None;
        for (i, skill) in skills.iter().enumerate() {
            if next_ready[i] <= now + TIME_EPS {
                match choice {
                    None => choice = Some(i),
                    Some(j) if skill.priority < skills[j].priority => choice = Some(i),
                    _ => {}
                }
            }
        }

        let i = match choice {
            Some(i) => i,
            None => {
                // Everything is recharging; jump to the soonest skill or
                // stop if nothing comes back inside the window.
                let soonest = next_ready
                    .iter()
                    .copied()
                    .fold(f64::INFINITY, f64::min);
                if soonest + TIME_EPS >= cfg.duration {
                    break;
                }
                now = soonest;
                continue;
            }
        };

        let (damage, heal) = priced[i];
        tallies[i].casts += 1;
        tallies[i].damage += damage;
        tallies[i].healing += heal;

        for (p_idx, effect) in stats.procs.iter().enumerate() {
            let off_cooldown = match (effect.cooldown, proc_last_fired[p_idx]) {
                (Some(icd), Some(last)) => now - last + TIME_EPS >= icd,
                _ => true,
            };
            if !off_cooldown {
                continue;
            }
            let gate = if effect.on_crit {
                stats.derived.crit_chance
            } else {
                1.0
            };
            proc_damage_total += effect.damage * effect.chance * gate;
            proc_last_fired[p_idx] = Some(now);
        }

        let cast = skills[i].cast_time.max(MIN_CAST_TIME) * cast_factor;
        now += cast;
        next_ready[i] = now + skills[i].cooldown * cooldown_factor;
    }

    let total_damage: f64 = tallies.iter().map(|t| t.damage).sum::<f64>() + proc_damage_total;
    let total_healing: f64 = tallies.iter().map(|t| t.healing).sum();
    let duration = cfg.duration.max(TIME_EPS);
    Ok(RotationResult {
        duration: cfg.duration,
        total_damage,
        total_healing,
        dps: total_damage / duration,
        hps: total_healing / duration,
        skills: tallies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeSet;
    use crate::build::calculate_effective_stats;
    use crate::modifier::{EffectKind, Modifier};

    fn stats_for(attrs: AttributeSet, mods: &[Modifier]) -> EffectiveStats {
        calculate_effective_stats(&attrs, mods, &CombatContext::new(), &BuildSettings::default())
    }

    fn plain_stats() -> EffectiveStats {
        stats_for(
            AttributeSet {
                power: 1000,
                precision: 1000,
                ..AttributeSet::default()
            },
            &[],
        )
    }

    #[test]
    fn one_second_cast_fills_a_ten_second_window_exactly() {
        let skills = vec![Skill::strike("auto", 1.0, 1.0, 0.0, 1)];
        let cfg = RotationConfig {
            duration: 10.0,
            track_healing: false,
        };
        let result = simulate_rotation(
            &skills,
            &plain_stats(),
            &CombatContext::new(),
            &BuildSettings::default(),
            &cfg,
        )
        .unwrap();
        assert_eq!(result.skills[0].casts, 10);
        assert!((result.dps - result.total_damage / 10.0).abs() < 1e-9);
    }

    #[test]
    fn lowest_priority_rank_casts_first() {
        let skills = vec![
            Skill::strike("filler", 1.0, 1.0, 0.0, 2),
            Skill::strike("burst", 2.0, 1.0, 4.0, 1),
        ];
        let cfg = RotationConfig {
            duration: 10.0,
            track_healing: false,
        };
        let result = simulate_rotation(
            &skills,
            &plain_stats(),
            &CombatContext::new(),
            &BuildSettings::default(),
            &cfg,
        )
        .unwrap();
        // Burst goes at t=0 and t=5; filler covers the gaps.
        assert_eq!(result.skills[1].casts, 2);
        assert_eq!(result.skills[0].casts, 8);
    }

    #[test]
    fn declaration_order_breaks_priority_ties() {
        let skills = vec![
            Skill::strike("first", 1.0, 1.0, 100.0, 1),
            Skill::strike("second", 1.0, 1.0, 100.0, 1),
        ];
        let cfg = RotationConfig {
            duration: 5.0,
            track_healing: false,
        };
        let result = simulate_rotation(
            &skills,
            &plain_stats(),
            &CombatContext::new(),
            &BuildSettings::default(),
            &cfg,
        )
        .unwrap();
        assert_eq!(result.skills[0].casts, 1);
        assert_eq!(result.skills[1].casts, 1);
    }

    #[test]
    fn stops_when_nothing_comes_back_inside_the_window() {
        let skills = vec![Skill::strike("opener", 1.0, 1.0, 100.0, 1)];
        let cfg = RotationConfig {
            duration: 10.0,
            track_healing: false,
        };
        let result = simulate_rotation(
            &skills,
            &plain_stats(),
            &CombatContext::new(),
            &BuildSettings::default(),
            &cfg,
        )
        .unwrap();
        assert_eq!(result.skills[0].casts, 1);
    }

    #[test]
    fn quickness_compresses_cast_times() {
        let skills = vec![Skill::strike("auto", 1.0, 1.5, 0.0, 1)];
        let cfg = RotationConfig {
            duration: 9.0,
            track_healing: false,
        };
        let slow = simulate_rotation(
            &skills,
            &plain_stats(),
            &CombatContext::new(),
            &BuildSettings::default(),
            &cfg,
        )
        .unwrap();
        let quick_ctx = CombatContext::new().with_boon(Boon::Quickness, 1);
        let quick_stats = calculate_effective_stats(
            &AttributeSet {
                power: 1000,
                precision: 1000,
                ..AttributeSet::default()
            },
            &[],
            &quick_ctx,
            &BuildSettings::default(),
        );
        let quick = simulate_rotation(
            &skills,
            &quick_stats,
            &quick_ctx,
            &BuildSettings::default(),
            &cfg,
        )
        .unwrap();
        assert_eq!(slow.skills[0].casts, 6);
        assert_eq!(quick.skills[0].casts, 9);
    }

    #[test]
    fn healing_skills_accumulate_hps() {
        let mut heal_skill = Skill::strike("mend", 0.0, 1.0, 0.0, 1);
        heal_skill.heal = Some(HealProfile {
            base: 500.0,
            coefficient: 0.0,
        });
        let cfg = RotationConfig {
            duration: 10.0,
            track_healing: true,
        };
        let result = simulate_rotation(
            &[heal_skill],
            &plain_stats(),
            &CombatContext::new(),
            &BuildSettings::default(),
            &cfg,
        )
        .unwrap();
        assert!((result.total_healing - 5000.0).abs() < 1e-9);
        assert!((result.hps - 500.0).abs() < 1e-9);
    }

    #[test]
    fn proc_internal_cooldown_limits_activations() {
        let attrs = AttributeSet {
            power: 1000,
            precision: 1000,
            ..AttributeSet::default()
        };
        let relic_strike = Modifier::new("relic-strike", "relic", EffectKind::OnHitProc, 100.0)
            .with_proc(1.0, Some(2.0));
        let with_proc = stats_for(attrs, &[relic_strike]);
        let without = stats_for(attrs, &[]);
        let skills = vec![Skill::strike("auto", 1.0, 1.0, 0.0, 1)];
        let cfg = RotationConfig {
            duration: 10.0,
            track_healing: false,
        };
        let a = simulate_rotation(
            &skills,
            &with_proc,
            &CombatContext::new(),
            &BuildSettings::default(),
            &cfg,
        )
        .unwrap();
        let b = simulate_rotation(
            &skills,
            &without,
            &CombatContext::new(),
            &BuildSettings::default(),
            &cfg,
        )
        .unwrap();
        // Ten hits, but the 2s cooldown lets it fire only at t=0,2,4,6,8.
        assert!((a.total_damage - b.total_damage - 500.0).abs() < 1e-6);
    }

    #[test]
    fn empty_rotation_is_an_error() {
        let result = simulate_rotation(
            &[],
            &plain_stats(),
            &CombatContext::new(),
            &BuildSettings::default(),
            &RotationConfig::default(),
        );
        assert!(matches!(result, Err(SimError::EmptyRotation)));
    }
}
