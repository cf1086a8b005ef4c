//! Pure damage and healing formulas

use crate::context::ConditionKind;
use crate::error::SimError;

/// Vulnerability stack cap for the damage bonus.
pub const VULNERABILITY_MAX_STACKS: u32 = 25;
/// Damage bonus per vulnerability stack.
pub const VULNERABILITY_PER_STACK: f64 = 0.01;
/// Condition damage contribution per point, per tick.
pub const CONDITION_DAMAGE_COEFFICIENT: f64 = 0.05;
/// Outgoing condition damage factor against a target with resistance.
pub const RESISTANCE_FACTOR: f64 = 0.5;

fn check_strike_inputs(
    weapon_strength: f64,
    coefficient: f64,
    target_armor: f64,
) -> Result<(), SimError> {
    if target_armor <= 0.0 {
        return Err(SimError::InvalidArmor(target_armor));
    }
    if weapon_strength <= 0.0 {
        return Err(SimError::InvalidWeaponStrength(weapon_strength));
    }
    if coefficient < 0.0 {
        return Err(SimError::NegativeCoefficient(coefficient));
    }
    Ok(())
}

/// One direct hit. Order matters: base hit, crit multiplier, vulnerability,
/// then each extra multiplier in the order given.
pub fn strike_damage(
    weapon_strength: f64,
    power: f64,
    coefficient: f64,
    target_armor: f64,
    crit_multiplier: Option<f64>,
    vulnerability_stacks: u32,
    extra_multipliers: &[f64],
) -> Result<f64, SimError> {
    check_strike_inputs(weapon_strength, coefficient, target_armor)?;
    let mut damage = weapon_strength * power * coefficient / target_armor;
    if let Some(mult) = crit_multiplier {
        damage *= mult;
    }
    let vuln = vulnerability_stacks.min(VULNERABILITY_MAX_STACKS) as f64;
    damage *= 1.0 + VULNERABILITY_PER_STACK * vuln;
    for mult in extra_multipliers {
        damage *= mult;
    }
    Ok(damage)
}

/// Expected hit damage: non-crit and crit blended by crit chance.
#[allow(clippy::too_many_arguments)]
pub fn average_strike_damage(
    weapon_strength: f64,
    power: f64,
    coefficient: f64,
    target_armor: f64,
    crit_chance: f64,
    crit_multiplier: f64,
    vulnerability_stacks: u32,
    extra_multipliers: &[f64],
) -> Result<f64, SimError> {
    let chance = crit_chance.clamp(0.0, 1.0);
    let normal = strike_damage(
        weapon_strength,
        power,
        coefficient,
        target_armor,
        None,
        vulnerability_stacks,
        extra_multipliers,
    )?;
    let critical = strike_damage(
        weapon_strength,
        power,
        coefficient,
        target_armor,
        Some(crit_multiplier),
        vulnerability_stacks,
        extra_multipliers,
    )?;
    Ok(normal * (1.0 - chance) + critical * chance)
}

/// Damage of one tick of a damaging condition at the given stack count.
/// Non-damaging kinds tick for zero.
pub fn condition_tick_damage(kind: ConditionKind, condition_damage: f64, stacks: u32) -> f64 {
    let Some(base) = kind.tick_base() else {
        return 0.0;
    };
    let stacks = stacks.min(kind.max_stacks());
    (base + CONDITION_DAMAGE_COEFFICIENT * condition_damage) * stacks as f64
}

/// Duration after the total duration bonus (expertise plus modifiers,
/// already summed and capped by the caller's derivation).
pub fn effective_condition_duration(base_duration: f64, duration_bonus: f64) -> Result<f64, SimError> {
    if base_duration < 0.0 {
        return Err(SimError::NegativeDuration(base_duration));
    }
    Ok(base_duration * (1.0 + duration_bonus.clamp(0.0, 1.0)))
}

/// Total damage of one condition application over its effective duration.
/// Halved when the target has resistance, then scaled by each extra
/// multiplier in order.
#[allow(clippy::too_many_arguments)]
pub fn condition_total_damage(
    kind: ConditionKind,
    condition_damage: f64,
    stacks: u32,
    base_duration: f64,
    duration_bonus: f64,
    target_has_resistance: bool,
    extra_multipliers: &[f64],
) -> Result<f64, SimError> {
    let tick = condition_tick_damage(kind, condition_damage, stacks);
    let duration = effective_condition_duration(base_duration, duration_bonus)?;
    let mut total = tick * duration;
    if target_has_resistance {
        total *= RESISTANCE_FACTOR;
    }
    for mult in extra_multipliers {
        total *= mult;
    }
    Ok(total)
}

/// Healing of one cast: base plus healing power scaling, through outgoing
/// and incoming multipliers.
pub fn healing(
    base_heal: f64,
    healing_power: f64,
    coefficient: f64,
    outgoing_multiplier: f64,
    incoming_multiplier: f64,
) -> Result<f64, SimError> {
    if coefficient < 0.0 {
        return Err(SimError::NegativeHealCoefficient(coefficient));
    }
    Ok((base_heal + healing_power * coefficient) * outgoing_multiplier * incoming_multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_strike_scenario() {
        // 1000 power against the standard golem armor with a 1.0 coefficient.
        let damage = strike_damage(1000.0, 1000.0, 1.0, 2597.0, None, 0, &[]).unwrap();
        assert!((damage - 385.0).abs() < 0.5, "got {damage}");
    }

    #[test]
    fn strike_damage_is_linear_in_coefficient() {
        let one = strike_damage(1000.0, 2000.0, 1.0, 2597.0, None, 0, &[]).unwrap();
        let two = strike_damage(1000.0, 2000.0, 2.0, 2597.0, None, 0, &[]).unwrap();
        assert!((two - 2.0 * one).abs() < 1e-9);
    }

    #[test]
    fn vulnerability_caps_at_25_stacks() {
        let at_cap = strike_damage(1000.0, 1000.0, 1.0, 2597.0, None, 25, &[]).unwrap();
        let over = strike_damage(1000.0, 1000.0, 1.0, 2597.0, None, 40, &[]).unwrap();
        assert_eq!(at_cap, over);
        let none = strike_damage(1000.0, 1000.0, 1.0, 2597.0, None, 0, &[]).unwrap();
        assert!((at_cap / none - 1.25).abs() < 1e-9);
    }

    #[test]
    fn extra_multipliers_apply_in_order() {
        let base = strike_damage(1000.0, 1000.0, 1.0, 2597.0, None, 0, &[]).unwrap();
        let boosted =
            strike_damage(1000.0, 1000.0, 1.0, 2597.0, None, 0, &[1.05, 1.10]).unwrap();
        assert!((boosted / base - 1.05 * 1.10).abs() < 1e-9);
    }

    #[test]
    fn average_blends_by_crit_chance() {
        let normal = strike_damage(1000.0, 1000.0, 1.0, 2597.0, None, 0, &[]).unwrap();
        let avg =
            average_strike_damage(1000.0, 1000.0, 1.0, 2597.0, 0.5, 2.0, 0, &[]).unwrap();
        // Half the hits at 1x, half at 2x.
        assert!((avg - normal * 1.5).abs() < 1e-9);
    }

    #[test]
    fn invalid_inputs_are_domain_errors() {
        assert!(matches!(
            strike_damage(1000.0, 1000.0, 1.0, 0.0, None, 0, &[]),
            Err(SimError::InvalidArmor(_))
        ));
        assert!(matches!(
            strike_damage(-5.0, 1000.0, 1.0, 2597.0, None, 0, &[]),
            Err(SimError::InvalidWeaponStrength(_))
        ));
        assert!(matches!(
            strike_damage(1000.0, 1000.0, -0.1, 2597.0, None, 0, &[]),
            Err(SimError::NegativeCoefficient(_))
        ));
        assert!(matches!(
            healing(100.0, 1000.0, -1.0, 1.0, 1.0),
            Err(SimError::NegativeHealCoefficient(_))
        ));
    }

    #[test]
    fn bleeding_tick_formula() {
        // 22 base + 5% of condition damage, per stack.
        let tick = condition_tick_damage(ConditionKind::Bleeding, 1500.0, 3);
        assert!((tick - (22.0 + 75.0) * 3.0).abs() < 1e-9);
        assert_eq!(condition_tick_damage(ConditionKind::Chill, 1500.0, 1), 0.0);
    }

    #[test]
    fn condition_duration_scales_and_resistance_halves() {
        let plain = condition_total_damage(
            ConditionKind::Burning,
            1000.0,
            2,
            4.0,
            0.5,
            false,
            &[],
        )
        .unwrap();
        let tick = condition_tick_damage(ConditionKind::Burning, 1000.0, 2);
        assert!((plain - tick * 6.0).abs() < 1e-9);

        let resisted = condition_total_damage(
            ConditionKind::Burning,
            1000.0,
            2,
            4.0,
            0.5,
            true,
            &[],
        )
        .unwrap();
        assert!((resisted - plain * 0.5).abs() < 1e-9);
    }

    #[test]
    fn negative_duration_is_rejected() {
        assert!(matches!(
            effective_condition_duration(-1.0, 0.0),
            Err(SimError::NegativeDuration(_))
        ));
    }

    #[test]
    fn healing_scales_with_healing_power() {
        let h = healing(1000.0, 1500.0, 0.5, 1.1, 1.0).unwrap();
        assert!((h - (1000.0 + 750.0) * 1.1).abs() < 1e-9);
    }
}
