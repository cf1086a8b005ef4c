//! Request structures for loading build files (YAML or JSON)

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::attributes::{Attribute, AttributeSet, ProfessionHealthTier};
use crate::build::BuildSettings;
use crate::context::{Boon, CombatContext, ConditionKind};
use crate::error::SimError;
use crate::optimizer::{Experience, GameMode, OptimizeRequest, SearchConstraints};
use crate::registry::{Role, WeaponType};
use crate::rotation::{ConditionApplication, HealProfile, Skill};

/// A skill as written in a request file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillConfig {
    pub name: String,
    #[serde(default)]
    pub coefficient: f64,
    #[serde(default = "default_cast_time")]
    pub cast_time: f64,
    #[serde(default)]
    pub cooldown: f64,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub condition: Option<SkillConditionConfig>,
    #[serde(default)]
    pub heal: Option<SkillHealConfig>,
}

fn default_cast_time() -> f64 {
    0.75
}

fn default_priority() -> i32 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillConditionConfig {
    pub kind: String,
    pub stacks: u32,
    pub duration: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillHealConfig {
    #[serde(default)]
    pub base: f64,
    #[serde(default)]
    pub coefficient: f64,
}

impl SkillConfig {
    pub fn to_skill(&self) -> Result<Skill, SimError> {
        let condition_application = match &self.condition {
            Some(c) => Some(ConditionApplication {
                kind: ConditionKind::from_name(&c.kind)
                    .ok_or_else(|| SimError::UnknownConditionKind(c.kind.clone()))?,
                stacks: c.stacks,
                base_duration: c.duration,
            }),
            None => None,
        };
        Ok(Skill {
            name: self.name.clone(),
            coefficient: self.coefficient,
            condition_application,
            heal: self.heal.as_ref().map(|h| HealProfile {
                base: h.base,
                coefficient: h.coefficient,
            }),
            cast_time: self.cast_time,
            cooldown: self.cooldown,
            priority: self.priority,
        })
    }
}

/// Free-form search constraints as written in a request file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintConfig {
    pub mode: Option<String>,
    pub weapon: Option<String>,
    pub experience: Option<String>,
    pub sigil_stacks: Option<u32>,
    pub top_k: Option<usize>,
    pub presets: Vec<String>,
}

/// Fight assumptions the candidates are scored under.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SituationConfig {
    pub might: u32,
    pub fury: bool,
    pub vulnerability: u32,
    pub target_armor: f64,
    pub flanking: bool,
    pub boon_uptime: f64,
    pub health_tier: ProfessionHealthTier,
    pub weapon_strength: f64,
}

impl Default for SituationConfig {
    fn default() -> Self {
        SituationConfig {
            might: 25,
            fury: true,
            vulnerability: 25,
            target_armor: crate::context::DEFAULT_TARGET_ARMOR,
            flanking: false,
            boon_uptime: 1.0,
            health_tier: ProfessionHealthTier::Medium,
            weapon_strength: 1000.0,
        }
    }
}

/// Full request loaded from a YAML or JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    pub role: Role,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub elite_spec: Option<String>,
    /// Attribute name -> points, on top of the naked character base.
    #[serde(default)]
    pub attributes: HashMap<String, i32>,
    #[serde(default)]
    pub skills: Vec<SkillConfig>,
    #[serde(default)]
    pub constraints: ConstraintConfig,
    #[serde(default)]
    pub situation: SituationConfig,
}

impl RequestConfig {
    /// Load a request from a file, sniffing JSON vs YAML by extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SimError> {
        let content = fs::read_to_string(&path)?;
        let path_str = path.as_ref().to_string_lossy().to_lowercase();
        if path_str.ends_with(".json") {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(serde_yaml::from_str(&content)?)
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Character base plus the named attribute entries. Unrecognized keys
    /// are logged and skipped.
    pub fn base_attributes(&self) -> AttributeSet {
        let mut attrs = AttributeSet::character_base();
        for (name, value) in &self.attributes {
            match Attribute::from_name(name) {
                Some(attr) => attrs.add(attr, *value),
                None => warn!(attribute = %name, "ignoring unknown attribute in request"),
            }
        }
        attrs
    }

    pub fn skills(&self) -> Result<Vec<Skill>, SimError> {
        self.skills.iter().map(SkillConfig::to_skill).collect()
    }

    pub fn search_constraints(&self) -> Result<SearchConstraints, SimError> {
        let defaults = SearchConstraints::default();
        let mode = match &self.constraints.mode {
            Some(s) => {
                GameMode::from_name(s).ok_or_else(|| SimError::UnknownGameMode(s.clone()))?
            }
            None => defaults.mode,
        };
        let weapon = match &self.constraints.weapon {
            Some(s) => Some(
                WeaponType::from_name(s).ok_or_else(|| SimError::UnknownWeaponType(s.clone()))?,
            ),
            None => None,
        };
        let experience = match &self.constraints.experience {
            Some(s) => {
                Experience::from_name(s).ok_or_else(|| SimError::UnknownExperience(s.clone()))?
            }
            None => defaults.experience,
        };
        Ok(SearchConstraints {
            mode,
            weapon,
            experience,
            sigil_stacks: self.constraints.sigil_stacks.unwrap_or(defaults.sigil_stacks),
            top_k: self.constraints.top_k.unwrap_or(defaults.top_k),
            presets: self.constraints.presets.clone(),
            parallel: false,
        })
    }

    /// The scoring context described by the situation block.
    pub fn context(&self) -> CombatContext {
        let mut ctx = CombatContext::new().with_target_armor(self.situation.target_armor);
        if self.situation.might > 0 {
            ctx.add_boon(Boon::Might, self.situation.might);
        }
        if self.situation.fury {
            ctx.add_boon(Boon::Fury, 1);
        }
        if self.situation.vulnerability > 0 {
            ctx.add_target_condition(ConditionKind::Vulnerability, self.situation.vulnerability);
        }
        ctx.flanking = self.situation.flanking;
        ctx.record_action("weapon_skill");
        ctx
    }

    pub fn settings(&self) -> BuildSettings {
        BuildSettings {
            boon_uptime: self.situation.boon_uptime,
            health_tier: self.situation.health_tier,
            weapon_strength: self.situation.weapon_strength,
        }
    }

    /// Assemble the optimizer request.
    pub fn to_request(&self) -> Result<OptimizeRequest, SimError> {
        Ok(OptimizeRequest {
            base: self.base_attributes(),
            skills: self.skills()?,
            role: self.role,
            profession: self.profession.clone(),
            elite_spec: self.elite_spec.clone(),
            constraints: self.search_constraints()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_YAML: &str = r#"
role: dps
profession: warrior
elite_spec: spellbreaker
attributes:
  power: 1200
  precision: 800
skills:
  - name: Breaching Strike
    coefficient: 1.25
    cast_time: 0.5
    cooldown: 8
    priority: 1
  - name: Scepter Bleed
    coefficient: 0.4
    condition:
      kind: bleeding
      stacks: 2
      duration: 6
constraints:
  mode: zerg
  weapon: hammer
  experience: veteran
  top_k: 3
"#;

    #[test]
    fn yaml_request_round_trip() {
        let config: RequestConfig = serde_yaml::from_str(SAMPLE_YAML).unwrap();
        assert_eq!(config.role, Role::Damage);
        let attrs = config.base_attributes();
        assert_eq!(attrs.power, 2200);
        assert_eq!(attrs.precision, 1800);

        let skills = config.skills().unwrap();
        assert_eq!(skills.len(), 2);
        assert_eq!(
            skills[1].condition_application.unwrap().kind,
            ConditionKind::Bleeding
        );

        let constraints = config.search_constraints().unwrap();
        assert_eq!(constraints.mode, GameMode::Zerg);
        assert_eq!(constraints.weapon, Some(WeaponType::Hammer));
        assert_eq!(constraints.experience, Experience::Veteran);
        assert_eq!(constraints.top_k, 3);
    }

    #[test]
    fn role_parsing_accepts_common_spellings() {
        for (spelling, expected) in [
            ("\"DPS\"", Role::Damage),
            ("\"heal\"", Role::Healer),
            ("\"boon-support\"", Role::BoonSupport),
            ("\"support\"", Role::BoonSupport),
        ] {
            let role: Role = serde_yaml::from_str(spelling).unwrap();
            assert_eq!(role, expected, "spelling {spelling}");
        }
        assert!(serde_yaml::from_str::<Role>("\"carry\"").is_err());
    }

    #[test]
    fn unknown_condition_kind_is_an_error() {
        let config = SkillConfig {
            name: "broken".to_string(),
            coefficient: 1.0,
            cast_time: 1.0,
            cooldown: 0.0,
            priority: 1,
            condition: Some(SkillConditionConfig {
                kind: "charm".to_string(),
                stacks: 1,
                duration: 3.0,
            }),
            heal: None,
        };
        assert!(matches!(
            config.to_skill(),
            Err(SimError::UnknownConditionKind(_))
        ));
    }

    #[test]
    fn unknown_mode_is_an_error() {
        let mut config: RequestConfig = serde_yaml::from_str(SAMPLE_YAML).unwrap();
        config.constraints.mode = Some("raiding".to_string());
        assert!(matches!(
            config.search_constraints(),
            Err(SimError::UnknownGameMode(_))
        ));
    }

    #[test]
    fn situation_defaults_describe_a_buffed_fight() {
        let config: RequestConfig = serde_yaml::from_str(SAMPLE_YAML).unwrap();
        let ctx = config.context();
        assert_eq!(ctx.boon_stacks(Boon::Might), 25);
        assert!(ctx.has_boon(Boon::Fury));
        assert_eq!(ctx.vulnerability_stacks(), 25);
        assert_eq!(ctx.target_armor, crate::context::DEFAULT_TARGET_ARMOR);
    }
}
