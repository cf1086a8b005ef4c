//! Equipment search: enumerate enhancement-item combinations across stat
//! presets and rank them for a role

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::attributes::AttributeSet;
use crate::build::{
    calculate_effective_stats, calculate_skill_damage, BuildSettings, EffectiveStats,
};
use crate::context::CombatContext;
use crate::error::SimError;
use crate::registry::{GameData, ItemKind, Role, WeaponType};
use crate::rotation::{simulate_rotation, RotationConfig, Skill, DEFAULT_WINDOW};

/// Fallback relic shortlist for roles with no tagged relics in the registry.
pub const DEFAULT_RELIC_SHORTLIST: [&str; 3] = [
    "Relic of Fireworks",
    "Relic of the Thief",
    "Relic of the Monk",
];

/// WvW sub-mode the build is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Zerg,
    Havoc,
    Roaming,
}

impl GameMode {
    pub fn from_name(name: &str) -> Option<GameMode> {
        match name.to_lowercase().as_str() {
            "zerg" | "squad" => Some(GameMode::Zerg),
            "havoc" | "smallscale" | "small_scale" => Some(GameMode::Havoc),
            "roaming" | "solo" => Some(GameMode::Roaming),
            _ => None,
        }
    }
}

/// How practiced the requester is; nudges stat floors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Experience {
    Beginner,
    Intermediate,
    Veteran,
}

impl Experience {
    pub fn from_name(name: &str) -> Option<Experience> {
        match name.to_lowercase().as_str() {
            "beginner" | "new" => Some(Experience::Beginner),
            "intermediate" => Some(Experience::Intermediate),
            "veteran" | "experienced" => Some(Experience::Veteran),
            _ => None,
        }
    }
}

/// Free-form knobs shaping the candidate space.
#[derive(Debug, Clone)]
pub struct SearchConstraints {
    pub mode: GameMode,
    pub weapon: Option<WeaponType>,
    pub experience: Experience,
    /// Stack count handed to stackable items (bloodlust-style sigils).
    pub sigil_stacks: u32,
    pub top_k: usize,
    /// Explicit preset shortlist; empty means the role defaults.
    pub presets: Vec<String>,
    pub parallel: bool,
}

impl Default for SearchConstraints {
    fn default() -> Self {
        SearchConstraints {
            mode: GameMode::Zerg,
            weapon: None,
            experience: Experience::Intermediate,
            sigil_stacks: 25,
            top_k: 5,
            presets: Vec::new(),
            parallel: false,
        }
    }
}

/// One search request: the partial build plus what to optimize for.
#[derive(Debug, Clone)]
pub struct OptimizeRequest {
    pub base: AttributeSet,
    pub skills: Vec<Skill>,
    pub role: Role,
    pub profession: Option<String>,
    pub elite_spec: Option<String>,
    pub constraints: SearchConstraints,
}

/// One point in the candidate space.
#[derive(Debug, Clone, Serialize)]
pub struct EquipmentCandidate {
    pub preset: String,
    pub relic: Option<String>,
    pub sigils: Vec<String>,
    pub consumable: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    pub effective_power: f64,
    pub crit_chance: f64,
    pub crit_damage: f64,
    /// One cast of each requested skill.
    pub burst_damage: f64,
    pub rotation_dps: f64,
    pub rotation_hps: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    pub candidate: EquipmentCandidate,
    pub damage_score: f64,
    pub survivability: f64,
    pub overall: f64,
    pub breakdown: ScoreBreakdown,
}

fn role_default_presets(role: Role) -> &'static [&'static str] {
    match role {
        Role::Damage => &["Berserker", "Marauder", "Dragon", "Viper"],
        Role::Healer => &["Harrier", "Magi", "Minstrel"],
        Role::BoonSupport => &["Diviner", "Minstrel", "Celestial"],
        Role::Tank => &["Minstrel", "Trailblazer", "Soldier"],
        Role::Hybrid => &["Celestial", "Marauder", "Viper"],
    }
}

/// Survivability: toughness and healing contributions in thousandths plus a
/// soft-capped health score, scaled by the inverse incoming multiplier.
/// Builds that stack neither toughness nor health pay a glass-cannon
/// penalty on top.
pub fn survivability_score(stats: &EffectiveStats) -> f64 {
    let toughness = stats.attributes.toughness as f64 / 1000.0;
    let health = stats.derived.max_health / 20_000.0;
    let health_score = if health > 1.0 {
        1.0 + (health - 1.0) * 0.5
    } else {
        health
    };
    let healing = stats.attributes.healing_power as f64 / 1000.0;
    let mut score =
        (toughness + health_score + healing) / stats.incoming_multiplier.max(0.1);
    if stats.attributes.toughness < 1000 && stats.derived.max_health < 15_000.0 {
        score *= 0.8;
    }
    score
}

/// Role scoring: every role maps to one pure function of the same shape
/// (dps, burst, hps, boon duration bonus, survivability) -> overall.
pub fn overall_score(
    role: Role,
    dps: f64,
    burst: f64,
    hps: f64,
    boon_duration_bonus: f64,
    survivability: f64,
) -> f64 {
    match role {
        Role::Damage => dps + 0.05 * burst + 20.0 * survivability,
        Role::Healer => hps + 1000.0 * boon_duration_bonus + 50.0 * survivability,
        Role::BoonSupport => {
            2000.0 * boon_duration_bonus + 0.5 * hps + 0.25 * dps + 50.0 * survivability
        }
        Role::Tank => 1000.0 * survivability + 0.25 * dps,
        Role::Hybrid => {
            0.5 * dps + 0.5 * hps + 200.0 * boon_duration_bonus + 100.0 * survivability
        }
    }
}

fn relic_shortlist(req: &OptimizeRequest, data: &GameData) -> Vec<Option<String>> {
    let tagged = data.registry.shortlist(ItemKind::Relic, req.role);
    if !tagged.is_empty() {
        return tagged.iter().map(|s| Some(s.name.clone())).collect();
    }
    // Nothing tagged for this role: fall back to the default shortlist
    // rather than collapsing the candidate space.
    let fallback: Vec<Option<String>> = DEFAULT_RELIC_SHORTLIST
        .iter()
        .filter(|name| data.registry.get(name).is_some())
        .map(|name| Some(name.to_string()))
        .collect();
    if fallback.is_empty() {
        vec![None]
    } else {
        fallback
    }
}

fn sigil_combinations(req: &OptimizeRequest, data: &GameData) -> Vec<Vec<String>> {
    let mut sigils = data.registry.shortlist(ItemKind::Sigil, req.role);
    if let Some(weapon) = req.constraints.weapon {
        // Stable partition: matching-affinity sigils first.
        sigils.sort_by_key(|s| s.weapon_affinity != Some(weapon));
    }
    let names: Vec<String> = sigils.iter().map(|s| s.name.clone()).collect();
    if names.is_empty() {
        return vec![Vec::new()];
    }
    let mut combos = Vec::new();
    for i in 0..names.len() {
        combos.push(vec![names[i].clone()]);
    }
    for i in 0..names.len() {
        for j in (i + 1)..names.len() {
            combos.push(vec![names[i].clone(), names[j].clone()]);
        }
    }
    combos
}

fn best_fit_consumable(req: &OptimizeRequest, data: &GameData) -> Option<String> {
    data.registry
        .shortlist(ItemKind::Consumable, req.role)
        .first()
        .map(|s| s.name.clone())
}

fn score_candidate(
    candidate: &EquipmentCandidate,
    req: &OptimizeRequest,
    data: &GameData,
    burst_skills: &[Skill],
    timed_skills: &[Skill],
    ctx: &CombatContext,
    settings: &BuildSettings,
) -> Result<OptimizationResult, SimError> {
    let preset = data
        .presets
        .get(&candidate.preset)
        .ok_or_else(|| SimError::UnknownPreset(candidate.preset.clone()))?;
    let attrs = req.base.merge(preset);

    let stacks = req.constraints.sigil_stacks;
    let mut modifiers = Vec::new();
    if let Some(relic) = &candidate.relic {
        modifiers.extend(data.registry.resolve(relic, stacks));
    }
    for sigil in &candidate.sigils {
        modifiers.extend(data.registry.resolve(sigil, stacks));
    }
    if let Some(consumable) = &candidate.consumable {
        modifiers.extend(data.registry.resolve(consumable, stacks));
    }

    let stats = calculate_effective_stats(&attrs, &modifiers, ctx, settings);

    let mut burst = 0.0;
    for skill in burst_skills {
        burst += calculate_skill_damage(skill, &stats, ctx, settings)?.total;
    }

    let rotation = simulate_rotation(
        timed_skills,
        &stats,
        ctx,
        settings,
        &RotationConfig {
            duration: DEFAULT_WINDOW,
            track_healing: true,
        },
    )?;

    let survivability = survivability_score(&stats);
    let overall = overall_score(
        req.role,
        rotation.dps,
        burst,
        rotation.hps,
        stats.derived.boon_duration_bonus,
        survivability,
    );

    Ok(OptimizationResult {
        candidate: candidate.clone(),
        damage_score: rotation.dps,
        survivability,
        overall,
        breakdown: ScoreBreakdown {
            effective_power: stats.derived.effective_power,
            crit_chance: stats.derived.crit_chance,
            crit_damage: stats.derived.crit_damage,
            burst_damage: burst,
            rotation_dps: rotation.dps,
            rotation_hps: rotation.hps,
        },
    })
}

/// Enumerate the candidate space and rank it. Candidate-level failures are
/// logged and excluded; an empty final set is an error. Scoring is pure
/// against a read-only context and registry, so the parallel path needs no
/// locking.
pub fn optimize_equipment(
    req: &OptimizeRequest,
    data: &GameData,
    ctx: &CombatContext,
    settings: &BuildSettings,
) -> Result<Vec<OptimizationResult>, SimError> {
    let canonical = match (req.profession.as_deref(), req.elite_spec.as_deref()) {
        (Some(profession), Some(spec)) => data.rotations.lookup(profession, spec, req.role),
        _ => None,
    };
    let timed_skills: &[Skill] = canonical.unwrap_or(&req.skills);
    let burst_skills: &[Skill] = if req.skills.is_empty() {
        timed_skills
    } else {
        &req.skills
    };
    if timed_skills.is_empty() {
        return Err(SimError::EmptyRotation);
    }

    let relics = relic_shortlist(req, data);
    let sigil_combos = sigil_combinations(req, data);
    let consumable = best_fit_consumable(req, data);
    let preset_names: Vec<String> = if req.constraints.presets.is_empty() {
        role_default_presets(req.role)
            .iter()
            .map(|s| s.to_string())
            .collect()
    } else {
        req.constraints.presets.clone()
    };

    let mut candidates = Vec::new();
    for preset in &preset_names {
        for relic in &relics {
            for sigils in &sigil_combos {
                candidates.push(EquipmentCandidate {
                    preset: preset.clone(),
                    relic: relic.clone(),
                    sigils: sigils.clone(),
                    consumable: consumable.clone(),
                });
            }
        }
    }
    debug!(
        candidates = candidates.len(),
        role = ?req.role,
        "enumerated equipment candidates"
    );

    let score = |candidate: &EquipmentCandidate| {
        score_candidate(candidate, req, data, burst_skills, timed_skills, ctx, settings)
    };
    let scored: Vec<Result<OptimizationResult, SimError>> = if req.constraints.parallel {
        candidates.par_iter().map(score).collect()
    } else {
        candidates.iter().map(score).collect()
    };

    let mut excluded = 0usize;
    let mut results = Vec::with_capacity(scored.len());
    for (candidate, outcome) in candidates.iter().zip(scored) {
        match outcome {
            Ok(result) => results.push(result),
            Err(err) => {
                excluded += 1;
                warn!(
                    preset = %candidate.preset,
                    relic = ?candidate.relic,
                    %err,
                    "candidate excluded from search"
                );
            }
        }
    }

    if results.is_empty() {
        return Err(SimError::NoViableCandidates { excluded });
    }

    // Stable sort keeps enumeration order on exact ties.
    results.sort_by(|a, b| {
        b.overall
            .partial_cmp(&a.overall)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(req.constraints.top_k.max(1));
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Boon;
    use crate::context::ConditionKind;
    use crate::registry::{ItemRegistry, ItemSpec, PresetTable, RotationTable};

    fn request(role: Role) -> OptimizeRequest {
        OptimizeRequest {
            base: AttributeSet::character_base(),
            skills: vec![
                Skill::strike("opener", 2.0, 0.75, 10.0, 1),
                Skill::strike("filler", 1.0, 0.85, 0.0, 5),
            ],
            role,
            profession: None,
            elite_spec: None,
            constraints: SearchConstraints::default(),
        }
    }

    fn scoring_context() -> CombatContext {
        CombatContext::new()
            .with_boon(Boon::Might, 25)
            .with_boon(Boon::Fury, 1)
            .with_target_condition(ConditionKind::Vulnerability, 25)
            .with_action("weapon_skill")
    }

    #[test]
    fn damage_search_returns_ranked_results() {
        let registry = ItemRegistry::standard();
        let presets = PresetTable::standard();
        let rotations = RotationTable::standard();
        let data = GameData {
            registry: &registry,
            presets: &presets,
            rotations: &rotations,
        };
        let results = optimize_equipment(
            &request(Role::Damage),
            &data,
            &scoring_context(),
            &BuildSettings::default(),
        )
        .unwrap();
        assert!(!results.is_empty());
        assert!(results.len() <= 5);
        for pair in results.windows(2) {
            assert!(pair[0].overall >= pair[1].overall);
        }
        assert!(results[0].breakdown.rotation_dps > 0.0);
    }

    #[test]
    fn role_without_tagged_relics_uses_the_default_shortlist() {
        let mut registry = ItemRegistry::new();
        // Only a damage relic exists; a tank search must still find it via
        // the fallback list instead of searching an empty relic space.
        registry.insert(ItemSpec {
            name: "Relic of Fireworks".to_string(),
            kind: ItemKind::Relic,
            roles: vec![Role::Damage],
            weapon_affinity: None,
            stackable: false,
            factory: |_| Vec::new(),
        });
        let presets = PresetTable::standard();
        let rotations = RotationTable::new();
        let data = GameData {
            registry: &registry,
            presets: &presets,
            rotations: &rotations,
        };
        let results = optimize_equipment(
            &request(Role::Tank),
            &data,
            &scoring_context(),
            &BuildSettings::default(),
        )
        .unwrap();
        assert!(results
            .iter()
            .all(|r| r.candidate.relic.as_deref() == Some("Relic of Fireworks")));
    }

    #[test]
    fn unknown_presets_exclude_every_candidate() {
        let registry = ItemRegistry::standard();
        let presets = PresetTable::standard();
        let rotations = RotationTable::new();
        let data = GameData {
            registry: &registry,
            presets: &presets,
            rotations: &rotations,
        };
        let mut req = request(Role::Damage);
        req.constraints.presets = vec!["Mist Walker".to_string()];
        let result = optimize_equipment(
            &req,
            &data,
            &scoring_context(),
            &BuildSettings::default(),
        );
        assert!(matches!(
            result,
            Err(SimError::NoViableCandidates { excluded }) if excluded > 0
        ));
    }

    #[test]
    fn canonical_rotation_is_used_for_recognized_archetypes() {
        let registry = ItemRegistry::standard();
        let presets = PresetTable::standard();
        let rotations = RotationTable::standard();
        let data = GameData {
            registry: &registry,
            presets: &presets,
            rotations: &rotations,
        };
        let mut req = request(Role::Damage);
        req.profession = Some("warrior".to_string());
        req.elite_spec = Some("spellbreaker".to_string());
        let with_canonical = optimize_equipment(
            &req,
            &data,
            &scoring_context(),
            &BuildSettings::default(),
        )
        .unwrap();
        let without = optimize_equipment(
            &request(Role::Damage),
            &data,
            &scoring_context(),
            &BuildSettings::default(),
        )
        .unwrap();
        // Different rotations price to different dps.
        assert!(
            (with_canonical[0].breakdown.rotation_dps - without[0].breakdown.rotation_dps).abs()
                > 1e-6
        );
    }

    #[test]
    fn tank_ranking_prefers_defensive_presets() {
        let registry = ItemRegistry::standard();
        let presets = PresetTable::standard();
        let rotations = RotationTable::new();
        let data = GameData {
            registry: &registry,
            presets: &presets,
            rotations: &rotations,
        };
        let results = optimize_equipment(
            &request(Role::Tank),
            &data,
            &scoring_context(),
            &BuildSettings::default(),
        )
        .unwrap();
        let defensive = ["Minstrel", "Trailblazer", "Soldier"];
        assert!(defensive.contains(&results[0].candidate.preset.as_str()));
        assert!(results[0].survivability > 1.0);
    }
}
