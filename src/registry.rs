//! Read-only game-data tables: enhancement items, stat presets, and
//! canonical rotations. Built explicitly and passed in so tests can
//! substitute minimal fixtures.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::attributes::Attribute;
use crate::attributes::AttributeSet;
use crate::context::{Boon, ConditionKind};
use crate::modifier::{Condition, DamageScope, EffectKind, Modifier};
use crate::rotation::{ConditionApplication, HealProfile, Skill};

/// The role vocabulary driving shortlists, constraints, and scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Damage,
    Healer,
    BoonSupport,
    Tank,
    Hybrid,
}

// Case-insensitive matching with the spellings players actually type.
impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_lowercase().as_str() {
            "damage" | "dps" => Ok(Role::Damage),
            "healer" | "heal" => Ok(Role::Healer),
            "boon-support" | "boon_support" | "boonsupport" | "support" => Ok(Role::BoonSupport),
            "tank" => Ok(Role::Tank),
            "hybrid" => Ok(Role::Hybrid),
            _ => Err(serde::de::Error::unknown_variant(
                &s,
                &["damage", "healer", "boon-support", "tank", "hybrid"],
            )),
        }
    }
}

/// Weapon types used for sigil affinity ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponType {
    Sword,
    Axe,
    Mace,
    Greatsword,
    Hammer,
    Dagger,
    Scepter,
    Staff,
    Longbow,
    ShortBow,
    Rifle,
    Pistol,
    Focus,
    Shield,
    Torch,
    Warhorn,
}

impl WeaponType {
    pub fn from_name(name: &str) -> Option<WeaponType> {
        match name.to_lowercase().replace([' ', '-'], "_").as_str() {
            "sword" => Some(WeaponType::Sword),
            "axe" => Some(WeaponType::Axe),
            "mace" => Some(WeaponType::Mace),
            "greatsword" => Some(WeaponType::Greatsword),
            "hammer" => Some(WeaponType::Hammer),
            "dagger" => Some(WeaponType::Dagger),
            "scepter" => Some(WeaponType::Scepter),
            "staff" => Some(WeaponType::Staff),
            "longbow" => Some(WeaponType::Longbow),
            "short_bow" | "shortbow" => Some(WeaponType::ShortBow),
            "rifle" => Some(WeaponType::Rifle),
            "pistol" => Some(WeaponType::Pistol),
            "focus" => Some(WeaponType::Focus),
            "shield" => Some(WeaponType::Shield),
            "torch" => Some(WeaponType::Torch),
            "warhorn" => Some(WeaponType::Warhorn),
            _ => None,
        }
    }
}

/// The three enhancement slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Relic,
    Sigil,
    Consumable,
}

/// One registry entry: what the item is, who it serves, and the factory
/// that turns it into modifiers. Stackable items read the stack argument;
/// the rest ignore it.
#[derive(Debug, Clone)]
pub struct ItemSpec {
    pub name: String,
    pub kind: ItemKind,
    pub roles: Vec<Role>,
    pub weapon_affinity: Option<WeaponType>,
    pub stackable: bool,
    pub factory: fn(u32) -> Vec<Modifier>,
}

/// Canonical item name -> modifier factory. Immutable once built; the
/// optimizer receives it by reference.
#[derive(Debug, Clone, Default)]
pub struct ItemRegistry {
    items: HashMap<String, ItemSpec>,
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, spec: ItemSpec) {
        self.items.insert(spec.name.clone(), spec);
    }

    pub fn get(&self, name: &str) -> Option<&ItemSpec> {
        self.items.get(name)
    }

    /// Resolve an item to its modifiers. A missing entry contributes
    /// nothing rather than failing the candidate.
    pub fn resolve(&self, name: &str, stacks: u32) -> Vec<Modifier> {
        match self.items.get(name) {
            Some(spec) => {
                let stacks = if spec.stackable { stacks } else { 1 };
                (spec.factory)(stacks)
            }
            None => Vec::new(),
        }
    }

    /// Items of a kind serving a role, name-sorted for deterministic
    /// candidate ordering. Hybrid requests accept everything of the kind.
    pub fn shortlist(&self, kind: ItemKind, role: Role) -> Vec<&ItemSpec> {
        let mut out: Vec<&ItemSpec> = self
            .items
            .values()
            .filter(|spec| spec.kind == kind)
            .filter(|spec| role == Role::Hybrid || spec.roles.contains(&role))
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// The built-in WvW item table.
    pub fn standard() -> Self {
        let mut registry = ItemRegistry::new();
        for spec in standard_items() {
            registry.insert(spec);
        }
        registry
    }
}

// === Standard item factories ===

fn sigil_of_force(_stacks: u32) -> Vec<Modifier> {
    vec![Modifier::damage(
        "force",
        "Superior Sigil of Force",
        DamageScope::Strike,
        0.05,
    )]
}

fn sigil_of_impact(_stacks: u32) -> Vec<Modifier> {
    // Bonus applies against disabled targets only.
    vec![Modifier::damage(
        "impact",
        "Superior Sigil of Impact",
        DamageScope::Strike,
        0.07,
    )
    .with_condition(Condition::TargetHasCondition {
        kind: ConditionKind::Immobilize,
        min_stacks: 1,
    })]
}

fn sigil_of_accuracy(_stacks: u32) -> Vec<Modifier> {
    vec![Modifier::new(
        "accuracy",
        "Superior Sigil of Accuracy",
        EffectKind::CritChance,
        0.07,
    )]
}

fn sigil_of_bloodlust(stacks: u32) -> Vec<Modifier> {
    vec![
        Modifier::flat("bloodlust", "Superior Sigil of Bloodlust", Attribute::Power, 10.0)
            .with_stacks(stacks, 25),
    ]
}

fn sigil_of_corruption(stacks: u32) -> Vec<Modifier> {
    vec![Modifier::flat(
        "corruption",
        "Superior Sigil of Corruption",
        Attribute::ConditionDamage,
        10.0,
    )
    .with_stacks(stacks, 25)]
}

fn sigil_of_bursting(_stacks: u32) -> Vec<Modifier> {
    vec![Modifier::damage(
        "bursting",
        "Superior Sigil of Bursting",
        DamageScope::Condition,
        0.05,
    )]
}

fn sigil_of_agony(_stacks: u32) -> Vec<Modifier> {
    vec![Modifier::new(
        "agony",
        "Superior Sigil of Agony",
        EffectKind::ConditionDuration,
        0.10,
    )]
}

fn sigil_of_transference(_stacks: u32) -> Vec<Modifier> {
    vec![Modifier::new(
        "transference",
        "Superior Sigil of Transference",
        EffectKind::OutgoingHealing,
        0.10,
    )]
}

fn sigil_of_concentration(_stacks: u32) -> Vec<Modifier> {
    vec![Modifier::new(
        "concentration",
        "Superior Sigil of Concentration",
        EffectKind::BoonDuration,
        0.10,
    )]
}

fn sigil_of_life(stacks: u32) -> Vec<Modifier> {
    vec![Modifier::flat(
        "life",
        "Superior Sigil of Life",
        Attribute::HealingPower,
        10.0,
    )
    .with_stacks(stacks, 25)]
}

fn sigil_of_momentum(stacks: u32) -> Vec<Modifier> {
    vec![Modifier::flat(
        "momentum",
        "Superior Sigil of Momentum",
        Attribute::Toughness,
        10.0,
    )
    .with_stacks(stacks, 25)]
}

fn relic_of_fireworks(_stacks: u32) -> Vec<Modifier> {
    vec![Modifier::damage(
        "fireworks",
        "Relic of Fireworks",
        DamageScope::Strike,
        0.07,
    )
    .with_condition(Condition::RecentAction {
        action: "weapon_skill".to_string(),
        within: 6.0,
    })]
}

fn relic_of_the_thief(_stacks: u32) -> Vec<Modifier> {
    vec![
        Modifier::new("thief-strike", "Relic of the Thief", EffectKind::OnHitProc, 80.0)
            .with_proc(0.8, Some(1.0)),
    ]
}

fn relic_of_the_aristocracy(_stacks: u32) -> Vec<Modifier> {
    vec![Modifier::damage(
        "aristocracy",
        "Relic of the Aristocracy",
        DamageScope::Condition,
        0.10,
    )
    .with_condition(Condition::PlayerHasBoon {
        boon: Boon::Might,
        min_stacks: 10,
    })]
}

fn relic_of_the_monk(_stacks: u32) -> Vec<Modifier> {
    vec![Modifier::new(
        "monk",
        "Relic of the Monk",
        EffectKind::OutgoingHealing,
        0.10,
    )]
}

fn relic_of_the_flock(_stacks: u32) -> Vec<Modifier> {
    vec![
        Modifier::new("flock", "Relic of the Flock", EffectKind::OutgoingHealing, 0.05),
        Modifier::flat("flock-concentration", "Relic of the Flock", Attribute::Concentration, 80.0),
    ]
}

fn relic_of_durability(_stacks: u32) -> Vec<Modifier> {
    vec![Modifier::damage(
        "durability",
        "Relic of Durability",
        DamageScope::Incoming,
        -0.07,
    )]
}

fn relic_of_the_defender(_stacks: u32) -> Vec<Modifier> {
    vec![Modifier::new(
        "defender",
        "Relic of the Defender",
        EffectKind::IncomingHealing,
        0.10,
    )]
}

fn steak_food(_stacks: u32) -> Vec<Modifier> {
    vec![
        Modifier::flat("steak-power", "Cilantro Lime Sous-Vide Steak", Attribute::Power, 100.0),
        Modifier::flat(
            "steak-ferocity",
            "Cilantro Lime Sous-Vide Steak",
            Attribute::Ferocity,
            70.0,
        ),
    ]
}

fn saobosa_food(_stacks: u32) -> Vec<Modifier> {
    vec![
        Modifier::flat(
            "saobosa-condition",
            "Red-Lentil Saobosa",
            Attribute::ConditionDamage,
            100.0,
        ),
        Modifier::flat("saobosa-expertise", "Red-Lentil Saobosa", Attribute::Expertise, 70.0),
    ]
}

fn fruit_salad_food(_stacks: u32) -> Vec<Modifier> {
    vec![
        Modifier::flat(
            "salad-healing",
            "Bowl of Fruit Salad with Mint Garnish",
            Attribute::HealingPower,
            100.0,
        ),
        Modifier::flat(
            "salad-concentration",
            "Bowl of Fruit Salad with Mint Garnish",
            Attribute::Concentration,
            70.0,
        ),
    ]
}

fn cornbread_food(_stacks: u32) -> Vec<Modifier> {
    vec![
        Modifier::flat(
            "cornbread-vitality",
            "Loaf of Candy Cactus Cornbread",
            Attribute::Vitality,
            100.0,
        ),
        Modifier::flat(
            "cornbread-toughness",
            "Loaf of Candy Cactus Cornbread",
            Attribute::Toughness,
            70.0,
        ),
    ]
}

fn standard_items() -> Vec<ItemSpec> {
    use ItemKind::*;
    use Role::*;
    let spec = |name: &str,
                kind: ItemKind,
                roles: &[Role],
                weapon_affinity: Option<WeaponType>,
                stackable: bool,
                factory: fn(u32) -> Vec<Modifier>| ItemSpec {
        name: name.to_string(),
        kind,
        roles: roles.to_vec(),
        weapon_affinity,
        stackable,
        factory,
    };
    vec![
        // Sigils
        spec("Superior Sigil of Force", Sigil, &[Damage], Some(WeaponType::Greatsword), false, sigil_of_force),
        spec("Superior Sigil of Impact", Sigil, &[Damage], Some(WeaponType::Hammer), false, sigil_of_impact),
        spec("Superior Sigil of Accuracy", Sigil, &[Damage], None, false, sigil_of_accuracy),
        spec("Superior Sigil of Bloodlust", Sigil, &[Damage], None, true, sigil_of_bloodlust),
        spec("Superior Sigil of Corruption", Sigil, &[Damage], Some(WeaponType::Scepter), true, sigil_of_corruption),
        spec("Superior Sigil of Bursting", Sigil, &[Damage], Some(WeaponType::Scepter), false, sigil_of_bursting),
        spec("Superior Sigil of Agony", Sigil, &[Damage], Some(WeaponType::ShortBow), false, sigil_of_agony),
        spec("Superior Sigil of Transference", Sigil, &[Healer, BoonSupport], Some(WeaponType::Staff), false, sigil_of_transference),
        spec("Superior Sigil of Concentration", Sigil, &[BoonSupport, Healer], None, false, sigil_of_concentration),
        spec("Superior Sigil of Life", Sigil, &[Healer], Some(WeaponType::Staff), true, sigil_of_life),
        spec("Superior Sigil of Momentum", Sigil, &[Tank], Some(WeaponType::Shield), true, sigil_of_momentum),
        // Relics
        spec("Relic of Fireworks", Relic, &[Damage], None, false, relic_of_fireworks),
        spec("Relic of the Thief", Relic, &[Damage], None, false, relic_of_the_thief),
        spec("Relic of the Aristocracy", Relic, &[Damage], None, false, relic_of_the_aristocracy),
        spec("Relic of the Monk", Relic, &[Healer, BoonSupport], None, false, relic_of_the_monk),
        spec("Relic of the Flock", Relic, &[Healer, BoonSupport], None, false, relic_of_the_flock),
        spec("Relic of Durability", Relic, &[Tank], None, false, relic_of_durability),
        spec("Relic of the Defender", Relic, &[Tank], None, false, relic_of_the_defender),
        // Consumables
        spec("Cilantro Lime Sous-Vide Steak", Consumable, &[Damage], None, false, steak_food),
        spec("Red-Lentil Saobosa", Consumable, &[Damage, Hybrid], None, false, saobosa_food),
        spec("Bowl of Fruit Salad with Mint Garnish", Consumable, &[Healer, BoonSupport], None, false, fruit_salad_food),
        spec("Loaf of Candy Cactus Cornbread", Consumable, &[Tank], None, false, cornbread_food),
    ]
}

/// Preset name -> full-set attribute distribution.
#[derive(Debug, Clone, Default)]
pub struct PresetTable {
    presets: HashMap<String, AttributeSet>,
}

impl PresetTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, set: AttributeSet) {
        self.presets.insert(name.to_string(), set);
    }

    pub fn get(&self, name: &str) -> Option<&AttributeSet> {
        self.presets.get(name)
    }

    /// All preset names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.presets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeSet)> {
        self.presets.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Full-set totals for the usual WvW affixes.
    pub fn standard() -> Self {
        let mut table = PresetTable::new();
        let triple = |major: Attribute, minor_a: Attribute, minor_b: Attribute| {
            let mut set = AttributeSet::default();
            set.set(major, 1381);
            set.set(minor_a, 961);
            set.set(minor_b, 961);
            set
        };
        let quad = |major_a: Attribute,
                    major_b: Attribute,
                    minor_a: Attribute,
                    minor_b: Attribute| {
            let mut set = AttributeSet::default();
            set.set(major_a, 1173);
            set.set(major_b, 1173);
            set.set(minor_a, 648);
            set.set(minor_b, 648);
            set
        };
        table.insert(
            "Berserker",
            triple(Attribute::Power, Attribute::Precision, Attribute::Ferocity),
        );
        table.insert(
            "Assassin",
            triple(Attribute::Precision, Attribute::Power, Attribute::Ferocity),
        );
        table.insert(
            "Marauder",
            quad(
                Attribute::Power,
                Attribute::Precision,
                Attribute::Vitality,
                Attribute::Ferocity,
            ),
        );
        table.insert(
            "Dragon",
            quad(
                Attribute::Power,
                Attribute::Ferocity,
                Attribute::Precision,
                Attribute::Vitality,
            ),
        );
        table.insert(
            "Viper",
            quad(
                Attribute::Power,
                Attribute::ConditionDamage,
                Attribute::Precision,
                Attribute::Expertise,
            ),
        );
        table.insert(
            "Dire",
            triple(
                Attribute::ConditionDamage,
                Attribute::Toughness,
                Attribute::Vitality,
            ),
        );
        table.insert(
            "Trailblazer",
            quad(
                Attribute::Toughness,
                Attribute::ConditionDamage,
                Attribute::Vitality,
                Attribute::Expertise,
            ),
        );
        table.insert(
            "Minstrel",
            quad(
                Attribute::Toughness,
                Attribute::HealingPower,
                Attribute::Vitality,
                Attribute::Concentration,
            ),
        );
        table.insert(
            "Harrier",
            triple(
                Attribute::Power,
                Attribute::HealingPower,
                Attribute::Concentration,
            ),
        );
        table.insert(
            "Magi",
            triple(
                Attribute::HealingPower,
                Attribute::Vitality,
                Attribute::Precision,
            ),
        );
        table.insert(
            "Diviner",
            quad(
                Attribute::Power,
                Attribute::Concentration,
                Attribute::Precision,
                Attribute::Ferocity,
            ),
        );
        table.insert(
            "Plaguedoctor",
            quad(
                Attribute::Vitality,
                Attribute::ConditionDamage,
                Attribute::HealingPower,
                Attribute::Concentration,
            ),
        );
        table.insert(
            "Soldier",
            triple(Attribute::Power, Attribute::Toughness, Attribute::Vitality),
        );
        let mut celestial = AttributeSet::default();
        for attr in Attribute::ALL {
            celestial.set(attr, 740);
        }
        table.insert("Celestial", celestial);
        table
    }
}

/// The three read-only tables the optimizer consumes, bundled for passing
/// by reference into a search.
#[derive(Debug, Clone, Copy)]
pub struct GameData<'a> {
    pub registry: &'a ItemRegistry,
    pub presets: &'a PresetTable,
    pub rotations: &'a RotationTable,
}

/// (profession, elite spec, role) -> authored rotation for timed simulation.
#[derive(Debug, Clone, Default)]
pub struct RotationTable {
    rotations: HashMap<(String, String, Role), Vec<Skill>>,
}

impl RotationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, profession: &str, elite_spec: &str, role: Role, skills: Vec<Skill>) {
        self.rotations.insert(
            (profession.to_lowercase(), elite_spec.to_lowercase(), role),
            skills,
        );
    }

    pub fn lookup(&self, profession: &str, elite_spec: &str, role: Role) -> Option<&[Skill]> {
        self.rotations
            .get(&(profession.to_lowercase(), elite_spec.to_lowercase(), role))
            .map(Vec::as_slice)
    }

    /// Authored rotations for the archetypes the tool recognizes.
    pub fn standard() -> Self {
        let mut table = RotationTable::new();
        table.insert(
            "warrior",
            "spellbreaker",
            Role::Damage,
            vec![
                Skill::strike("Breaching Strike", 1.25, 0.5, 8.0, 1),
                Skill::strike("Earthshaker", 1.5, 0.75, 10.0, 2),
                Skill::strike("Hammer Chain", 0.95, 0.85, 0.0, 5),
            ],
        );
        table.insert(
            "necromancer",
            "scourge",
            Role::Damage,
            vec![
                Skill {
                    name: "Devouring Darkness".to_string(),
                    coefficient: 0.4,
                    condition_application: Some(ConditionApplication {
                        kind: ConditionKind::Torment,
                        stacks: 3,
                        base_duration: 7.0,
                    }),
                    heal: None,
                    cast_time: 0.75,
                    cooldown: 6.0,
                    priority: 1,
                },
                Skill {
                    name: "Nefarious Favor".to_string(),
                    coefficient: 0.3,
                    condition_application: Some(ConditionApplication {
                        kind: ConditionKind::Torment,
                        stacks: 2,
                        base_duration: 5.0,
                    }),
                    heal: None,
                    cast_time: 0.5,
                    cooldown: 4.0,
                    priority: 2,
                },
                Skill {
                    name: "Scepter Chain".to_string(),
                    coefficient: 0.45,
                    condition_application: Some(ConditionApplication {
                        kind: ConditionKind::Bleeding,
                        stacks: 2,
                        base_duration: 6.0,
                    }),
                    heal: None,
                    cast_time: 0.9,
                    cooldown: 0.0,
                    priority: 5,
                },
            ],
        );
        table.insert(
            "guardian",
            "firebrand",
            Role::Healer,
            vec![
                Skill {
                    name: "Mantra of Solace".to_string(),
                    coefficient: 0.0,
                    condition_application: None,
                    heal: Some(HealProfile {
                        base: 1940.0,
                        coefficient: 0.75,
                    }),
                    cast_time: 0.25,
                    cooldown: 9.0,
                    priority: 1,
                },
                Skill {
                    name: "Bow of Truth".to_string(),
                    coefficient: 0.0,
                    condition_application: None,
                    heal: Some(HealProfile {
                        base: 1320.0,
                        coefficient: 0.6,
                    }),
                    cast_time: 0.5,
                    cooldown: 18.0,
                    priority: 2,
                },
                Skill {
                    name: "Staff Chain".to_string(),
                    coefficient: 0.55,
                    condition_application: None,
                    heal: Some(HealProfile {
                        base: 325.0,
                        coefficient: 0.2,
                    }),
                    cast_time: 0.8,
                    cooldown: 0.0,
                    priority: 5,
                },
            ],
        );
        table
    }
}
