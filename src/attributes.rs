//! Character attributes and derived combat stats

use serde::{Deserialize, Serialize};

/// Crit chance at 1000 precision.
pub const BASE_CRIT_CHANCE: f64 = 0.05;
/// Precision baseline the crit curve is anchored to.
pub const BASE_PRECISION: f64 = 1000.0;
/// Precision points per 1% crit chance.
pub const PRECISION_PER_CRIT_PERCENT: f64 = 21.0;
/// Crit damage multiplier at 0 ferocity.
pub const BASE_CRIT_DAMAGE: f64 = 1.5;
/// Ferocity points per +100% crit damage.
pub const FEROCITY_DIVISOR: f64 = 1500.0;
/// Expertise points per +100% condition duration.
pub const EXPERTISE_DIVISOR: f64 = 1500.0;
/// Concentration points per +100% boon duration.
pub const CONCENTRATION_DIVISOR: f64 = 1500.0;
/// Health per point of vitality.
pub const HEALTH_PER_VITALITY: f64 = 10.0;
/// Crit chance bonus while fury is up.
pub const FURY_CRIT_BONUS: f64 = 0.20;
/// Power and condition damage added per stack of might.
pub const MIGHT_PER_STACK: f64 = 30.0;
/// Might stack cap.
pub const MIGHT_MAX_STACKS: u32 = 25;

/// The nine gear attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Power,
    Precision,
    Ferocity,
    ConditionDamage,
    Expertise,
    Concentration,
    Toughness,
    Vitality,
    HealingPower,
}

impl Attribute {
    pub const ALL: [Attribute; 9] = [
        Attribute::Power,
        Attribute::Precision,
        Attribute::Ferocity,
        Attribute::ConditionDamage,
        Attribute::Expertise,
        Attribute::Concentration,
        Attribute::Toughness,
        Attribute::Vitality,
        Attribute::HealingPower,
    ];

    /// Parse a request-file attribute key.
    pub fn from_name(name: &str) -> Option<Attribute> {
        match name.to_lowercase().as_str() {
            "power" => Some(Attribute::Power),
            "precision" => Some(Attribute::Precision),
            "ferocity" => Some(Attribute::Ferocity),
            "condition_damage" | "condition damage" => Some(Attribute::ConditionDamage),
            "expertise" => Some(Attribute::Expertise),
            "concentration" => Some(Attribute::Concentration),
            "toughness" => Some(Attribute::Toughness),
            "vitality" => Some(Attribute::Vitality),
            "healing_power" | "healing power" => Some(Attribute::HealingPower),
            _ => None,
        }
    }
}

/// A full attribute distribution. Presets, gear contributions, and merged
/// character sheets are all the same shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeSet {
    pub power: i32,
    pub precision: i32,
    pub ferocity: i32,
    pub condition_damage: i32,
    pub expertise: i32,
    pub concentration: i32,
    pub toughness: i32,
    pub vitality: i32,
    pub healing_power: i32,
}

impl AttributeSet {
    pub fn get(&self, attr: Attribute) -> i32 {
        match attr {
            Attribute::Power => self.power,
            Attribute::Precision => self.precision,
            Attribute::Ferocity => self.ferocity,
            Attribute::ConditionDamage => self.condition_damage,
            Attribute::Expertise => self.expertise,
            Attribute::Concentration => self.concentration,
            Attribute::Toughness => self.toughness,
            Attribute::Vitality => self.vitality,
            Attribute::HealingPower => self.healing_power,
        }
    }

    pub fn set(&mut self, attr: Attribute, value: i32) {
        match attr {
            Attribute::Power => self.power = value,
            Attribute::Precision => self.precision = value,
            Attribute::Ferocity => self.ferocity = value,
            Attribute::ConditionDamage => self.condition_damage = value,
            Attribute::Expertise => self.expertise = value,
            Attribute::Concentration => self.concentration = value,
            Attribute::Toughness => self.toughness = value,
            Attribute::Vitality => self.vitality = value,
            Attribute::HealingPower => self.healing_power = value,
        }
    }

    pub fn add(&mut self, attr: Attribute, delta: i32) {
        self.set(attr, self.get(attr) + delta);
    }

    /// Naked level-80 character: 1000 in the four core attributes.
    pub fn character_base() -> AttributeSet {
        AttributeSet {
            power: 1000,
            precision: 1000,
            toughness: 1000,
            vitality: 1000,
            ..AttributeSet::default()
        }
    }

    /// Sum of two attribute sets.
    pub fn merge(&self, other: &AttributeSet) -> AttributeSet {
        let mut out = *self;
        for attr in Attribute::ALL {
            out.add(attr, other.get(attr));
        }
        out
    }
}

/// Base health pools at level 80, before vitality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfessionHealthTier {
    Low,
    Medium,
    High,
}

impl ProfessionHealthTier {
    pub fn base_pool(self) -> f64 {
        match self {
            ProfessionHealthTier::Low => 1645.0,
            ProfessionHealthTier::Medium => 5922.0,
            ProfessionHealthTier::High => 9212.0,
        }
    }
}

/// Stats derived from an attribute set, ready for the damage formulas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedStats {
    pub effective_power: f64,
    pub effective_condition_damage: f64,
    pub crit_chance: f64,
    pub crit_damage: f64,
    pub condition_duration_bonus: f64,
    pub boon_duration_bonus: f64,
    pub max_health: f64,
}

/// Crit chance from precision, clamped to [0, 1]. Inputs below the baseline
/// degrade toward zero instead of erroring.
pub fn crit_chance(precision: i32, fury_active: bool) -> f64 {
    let mut chance =
        BASE_CRIT_CHANCE + (precision as f64 - BASE_PRECISION) / (PRECISION_PER_CRIT_PERCENT * 100.0);
    if fury_active {
        chance += FURY_CRIT_BONUS;
    }
    chance.clamp(0.0, 1.0)
}

/// Crit damage multiplier from ferocity.
pub fn crit_damage_multiplier(ferocity: i32) -> f64 {
    BASE_CRIT_DAMAGE + ferocity.max(0) as f64 / FEROCITY_DIVISOR
}

/// Condition duration bonus from expertise, capped at +100%.
pub fn condition_duration_bonus(expertise: i32) -> f64 {
    (expertise.max(0) as f64 / EXPERTISE_DIVISOR).min(1.0)
}

/// Boon duration bonus from concentration, capped at +100%.
pub fn boon_duration_bonus(concentration: i32) -> f64 {
    (concentration.max(0) as f64 / CONCENTRATION_DIVISOR).min(1.0)
}

/// Maximum health from the profession pool and vitality.
pub fn max_health(tier: ProfessionHealthTier, vitality: i32) -> f64 {
    tier.base_pool() + vitality.max(0) as f64 * HEALTH_PER_VITALITY
}

/// Power or condition damage gained from might, clamped at the stack cap.
pub fn might_bonus(stacks: u32) -> f64 {
    stacks.min(MIGHT_MAX_STACKS) as f64 * MIGHT_PER_STACK
}

/// Derive every combat stat from an attribute set. Might is folded directly
/// into effective power and effective condition damage here; all other buffs
/// reach the numbers through modifiers.
pub fn calculate_all_derived_stats(
    attrs: &AttributeSet,
    tier: ProfessionHealthTier,
    might_stacks: u32,
    fury_active: bool,
) -> DerivedStats {
    let might = might_bonus(might_stacks);
    DerivedStats {
        effective_power: attrs.power.max(0) as f64 + might,
        effective_condition_damage: attrs.condition_damage.max(0) as f64 + might,
        crit_chance: crit_chance(attrs.precision, fury_active),
        crit_damage: crit_damage_multiplier(attrs.ferocity),
        condition_duration_bonus: condition_duration_bonus(attrs.expertise),
        boon_duration_bonus: boon_duration_bonus(attrs.concentration),
        max_health: max_health(tier, attrs.vitality),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(power: i32, precision: i32) -> AttributeSet {
        AttributeSet {
            power,
            precision,
            ..AttributeSet::default()
        }
    }

    #[test]
    fn might_adds_thirty_per_stack_up_to_cap() {
        let base = attrs(1000, 1000);
        for stacks in 0..=25u32 {
            let derived =
                calculate_all_derived_stats(&base, ProfessionHealthTier::Medium, stacks, false);
            assert_eq!(derived.effective_power, 1000.0 + 30.0 * stacks as f64);
            assert_eq!(
                derived.effective_condition_damage,
                0.0 + 30.0 * stacks as f64
            );
        }
        let over = calculate_all_derived_stats(&base, ProfessionHealthTier::Medium, 40, false);
        assert_eq!(over.effective_power, 1000.0 + 30.0 * 25.0);
    }

    #[test]
    fn full_might_raises_power_and_condition_damage_to_1750() {
        let base = AttributeSet {
            power: 1000,
            condition_damage: 1000,
            ..AttributeSet::default()
        };
        let derived = calculate_all_derived_stats(&base, ProfessionHealthTier::Medium, 25, false);
        assert_eq!(derived.effective_power, 1750.0);
        assert_eq!(derived.effective_condition_damage, 1750.0);
    }

    #[test]
    fn crit_chance_is_monotone_and_capped() {
        let mut last = 0.0;
        for precision in (0..6000).step_by(100) {
            let c = crit_chance(precision, false);
            assert!(c >= last, "crit chance decreased at precision {}", precision);
            assert!(c <= 1.0);
            last = c;
        }
        assert_eq!(crit_chance(1000, false), 0.05);
        assert_eq!(crit_chance(10_000, true), 1.0);
    }

    #[test]
    fn fury_adds_twenty_percent() {
        let without = crit_chance(2000, false);
        let with = crit_chance(2000, true);
        assert!((with - without - FURY_CRIT_BONUS).abs() < 1e-12);
    }

    #[test]
    fn duration_bonuses_cap_at_one() {
        assert!((condition_duration_bonus(750) - 0.5).abs() < 1e-12);
        assert_eq!(condition_duration_bonus(3000), 1.0);
        assert_eq!(boon_duration_bonus(2000), 1.0);
    }

    #[test]
    fn health_tiers() {
        assert_eq!(max_health(ProfessionHealthTier::Low, 1000), 11_645.0);
        assert_eq!(max_health(ProfessionHealthTier::Medium, 1000), 15_922.0);
        assert_eq!(max_health(ProfessionHealthTier::High, 1000), 19_212.0);
    }

    #[test]
    fn merge_sums_every_attribute() {
        let mut a = AttributeSet::default();
        a.power = 1000;
        a.toughness = 200;
        let mut b = AttributeSet::default();
        b.power = 381;
        b.healing_power = 100;
        let merged = a.merge(&b);
        assert_eq!(merged.power, 1381);
        assert_eq!(merged.toughness, 200);
        assert_eq!(merged.healing_power, 100);
    }
}
