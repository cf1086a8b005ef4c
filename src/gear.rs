//! Greedy per-slot gear search under minimum-stat floors

use serde::Serialize;
use tracing::debug;

use crate::attributes::{Attribute, AttributeSet};
use crate::error::SimError;
use crate::optimizer::{Experience, GameMode};
use crate::registry::{PresetTable, Role};

/// The six armor slots the search assigns presets to.
pub const ARMOR_SLOTS: [&str; 6] = ["Helm", "Shoulders", "Coat", "Gloves", "Leggings", "Boots"];

/// Pass cap: four full scans per slot.
pub const PASS_CAP: usize = 4 * ARMOR_SLOTS.len();

/// Penalty weight per point of stat-floor shortfall. Large enough that no
/// offense gain can buy an unmet floor, while the per-point gradient still
/// steers the hill climb toward meeting it.
pub const FLOOR_PENALTY: f64 = 100.0;

/// Presets considered per search.
pub const SHORTLIST_LIMIT: usize = 12;

/// A minimum an aggregate build must reach.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatFloor {
    pub attribute: Attribute,
    pub minimum: i32,
}

/// One slot's assignment in the final plan.
#[derive(Debug, Clone, Serialize)]
pub struct SlotAssignment {
    pub slot: String,
    pub preset: String,
}

/// Outcome of the greedy search.
#[derive(Debug, Clone, Serialize)]
pub struct GearPlan {
    pub slots: Vec<SlotAssignment>,
    pub totals: AttributeSet,
    pub offense: f64,
    pub score: f64,
    pub passes: u32,
    /// Score after each applied improvement, starting from the initial
    /// assignment. Non-decreasing by construction.
    pub score_trace: Vec<f64>,
    pub floors: Vec<StatFloor>,
    pub unmet_floors: usize,
}

/// Offense weights per role, used both to align the preset shortlist and to
/// score aggregates. A healer's "offense" is its healing output axes.
fn role_weights(role: Role) -> Vec<(Attribute, f64)> {
    match role {
        Role::Damage => vec![
            (Attribute::Power, 1.0),
            (Attribute::Precision, 0.8),
            (Attribute::Ferocity, 0.65),
            (Attribute::ConditionDamage, 0.9),
            (Attribute::Expertise, 0.5),
        ],
        Role::Healer => vec![
            (Attribute::HealingPower, 1.2),
            (Attribute::Concentration, 0.8),
            (Attribute::Vitality, 0.3),
        ],
        Role::BoonSupport => vec![
            (Attribute::Concentration, 1.2),
            (Attribute::HealingPower, 0.6),
            (Attribute::Power, 0.4),
            (Attribute::Vitality, 0.3),
        ],
        Role::Tank => vec![
            (Attribute::Toughness, 1.0),
            (Attribute::Vitality, 0.9),
            (Attribute::HealingPower, 0.4),
            (Attribute::Power, 0.2),
        ],
        Role::Hybrid => vec![
            (Attribute::Power, 0.6),
            (Attribute::ConditionDamage, 0.6),
            (Attribute::HealingPower, 0.4),
            (Attribute::Concentration, 0.4),
            (Attribute::Vitality, 0.4),
            (Attribute::Toughness, 0.4),
        ],
    }
}

fn raise_floor(floors: &mut Vec<StatFloor>, attribute: Attribute, minimum: i32) {
    for floor in floors.iter_mut() {
        if floor.attribute == attribute {
            floor.minimum = floor.minimum.max(minimum);
            return;
        }
    }
    floors.push(StatFloor { attribute, minimum });
}

/// Stat floors by role, nudged by sub-mode and experience. Roaming adds a
/// vitality floor for everyone; zerg play raises toughness expectations on
/// the support roles; beginners get extra health, veterans run 10% leaner.
pub fn derive_constraints(role: Role, mode: GameMode, experience: Experience) -> Vec<StatFloor> {
    let mut floors = Vec::new();
    match role {
        Role::Damage => {
            raise_floor(&mut floors, Attribute::Power, 2000);
            raise_floor(&mut floors, Attribute::Precision, 1700);
        }
        Role::Healer => {
            raise_floor(&mut floors, Attribute::HealingPower, 1400);
        }
        Role::BoonSupport => {
            raise_floor(&mut floors, Attribute::Concentration, 1100);
        }
        Role::Tank => {
            raise_floor(&mut floors, Attribute::Toughness, 1500);
            raise_floor(&mut floors, Attribute::Vitality, 1200);
        }
        Role::Hybrid => {
            raise_floor(&mut floors, Attribute::Power, 1400);
            raise_floor(&mut floors, Attribute::Vitality, 1100);
        }
    }
    match mode {
        GameMode::Roaming => raise_floor(&mut floors, Attribute::Vitality, 1100),
        GameMode::Zerg => {
            if matches!(role, Role::Healer | Role::BoonSupport) {
                raise_floor(&mut floors, Attribute::Toughness, 1000);
            }
        }
        GameMode::Havoc => {}
    }
    match experience {
        Experience::Beginner => raise_floor(&mut floors, Attribute::Vitality, 1300),
        Experience::Intermediate => {}
        Experience::Veteran => {
            for floor in floors.iter_mut() {
                floor.minimum = (floor.minimum as f64 * 0.9).round() as i32;
            }
        }
    }
    floors
}

fn offense_score(attrs: &AttributeSet, weights: &[(Attribute, f64)]) -> f64 {
    weights
        .iter()
        .map(|(attr, w)| attrs.get(*attr) as f64 * w)
        .sum()
}

/// Up to twelve presets, best role alignment first.
pub fn shortlist_presets<'a>(
    table: &'a PresetTable,
    role: Role,
) -> Vec<(&'a str, &'a AttributeSet)> {
    let weights = role_weights(role);
    let mut entries: Vec<(&str, &AttributeSet)> = table.iter().collect();
    entries.sort_by(|a, b| {
        offense_score(b.1, &weights)
            .partial_cmp(&offense_score(a.1, &weights))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    entries.truncate(SHORTLIST_LIMIT);
    entries
}

/// Each slot contributes one sixth of a preset's full-set values, rounded.
fn slot_share(set: &AttributeSet) -> AttributeSet {
    let mut share = AttributeSet::default();
    for attr in Attribute::ALL {
        share.set(attr, (set.get(attr) as f64 / 6.0).round() as i32);
    }
    share
}

/// Penalized score: offense minus the weighted sum of point shortfalls
/// against unmet floors.
fn constrained_score(attrs: &AttributeSet, weights: &[(Attribute, f64)], floors: &[StatFloor]) -> f64 {
    let mut shortfall = 0.0;
    for floor in floors {
        let value = attrs.get(floor.attribute);
        if value < floor.minimum {
            shortfall += (floor.minimum - value) as f64;
        }
    }
    offense_score(attrs, weights) - FLOOR_PENALTY * shortfall
}

/// Result of one full slot-by-preset scan.
enum PassOutcome {
    Improved { slot: usize, preset: usize, score: f64 },
    NoImprovement,
}

fn scan_for_improvement(
    assignment: &[usize; 6],
    shares: &[AttributeSet],
    base: &AttributeSet,
    weights: &[(Attribute, f64)],
    floors: &[StatFloor],
    current_score: f64,
) -> PassOutcome {
    let mut best: Option<(usize, usize, f64)> = None;
    for slot in 0..ARMOR_SLOTS.len() {
        for preset in 0..shares.len() {
            if preset == assignment[slot] {
                continue;
            }
            let mut trial = *assignment;
            trial[slot] = preset;
            let totals = aggregate(base, &trial, shares);
            let score = constrained_score(&totals, weights, floors);
            if score > current_score && best.map_or(true, |(_, _, s)| score > s) {
                best = Some((slot, preset, score));
            }
        }
    }
    match best {
        Some((slot, preset, score)) => PassOutcome::Improved { slot, preset, score },
        None => PassOutcome::NoImprovement,
    }
}

fn aggregate(base: &AttributeSet, assignment: &[usize; 6], shares: &[AttributeSet]) -> AttributeSet {
    let mut totals = *base;
    for &preset in assignment {
        totals = totals.merge(&shares[preset]);
    }
    totals
}

/// Assign one preset per armor slot to satisfy the derived floors while
/// maximizing the role's offense score. Hill climbing: every pass applies
/// the single best strictly-improving slot change, stopping at a local
/// optimum or the pass cap. The score trace is monotone non-decreasing.
pub fn optimize_gear(
    role: Role,
    mode: GameMode,
    experience: Experience,
    base: &AttributeSet,
    table: &PresetTable,
) -> Result<GearPlan, SimError> {
    let shortlist = shortlist_presets(table, role);
    if shortlist.is_empty() {
        return Err(SimError::EmptyPresetTable);
    }
    let floors = derive_constraints(role, mode, experience);
    let weights = role_weights(role);
    let shares: Vec<AttributeSet> = shortlist.iter().map(|(_, set)| slot_share(set)).collect();

    // Start every slot on the best-aligned preset.
    let mut assignment = [0usize; 6];
    let mut totals = aggregate(base, &assignment, &shares);
    let mut score = constrained_score(&totals, &weights, &floors);
    let mut trace = vec![score];
    let mut passes = 0u32;

    while (passes as usize) < PASS_CAP {
        passes += 1;
        match scan_for_improvement(&assignment, &shares, base, &weights, &floors, score) {
            PassOutcome::Improved {
                slot,
                preset,
                score: new_score,
            } => {
                assignment[slot] = preset;
                score = new_score;
                totals = aggregate(base, &assignment, &shares);
                trace.push(score);
                debug!(
                    slot = ARMOR_SLOTS[slot],
                    preset = shortlist[preset].0,
                    score,
                    "applied gear improvement"
                );
            }
            PassOutcome::NoImprovement => break,
        }
    }

    let unmet = floors
        .iter()
        .filter(|f| totals.get(f.attribute) < f.minimum)
        .count();
    Ok(GearPlan {
        slots: ARMOR_SLOTS
            .iter()
            .zip(assignment.iter())
            .map(|(slot, &preset)| SlotAssignment {
                slot: slot.to_string(),
                preset: shortlist[preset].0.to_string(),
            })
            .collect(),
        totals,
        offense: offense_score(&totals, &weights),
        score,
        passes,
        score_trace: trace,
        floors,
        unmet_floors: unmet,
    })
}
