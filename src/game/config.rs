//! Arena Configuration
//!
//! Static configuration loaded once at session start. Values are authored
//! as floats (JSON) and converted to fixed-point when the arena is built;
//! nothing float-valued reaches the simulation.

use std::collections::BTreeSet;
use std::path::Path;
use serde::{Serialize, Deserialize};

use crate::core::color::{Rgb, TintRange};
use crate::core::fixed::{Fixed, MAX_COMBATANT_SPEED, WORLD_BOUND, to_fixed, to_float};
use crate::core::vec2::FixedVec2;
use crate::game::collision::ColliderKind;
use crate::game::combatant::{CombatantSetup, MovementTuning};
use crate::game::goal::{GoalPolicy, GoalRegion, Goals};
use crate::game::input::InputBindings;
use crate::game::terrain::{Aabb, Surface, Terrain};

/// Longest round the fixed-point clock can hold comfortably.
const MAX_ROUND_SECONDS: f64 = 30_000.0;

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn is_inside_world(point: [f64; 2]) -> bool {
    let bound = f64::from(to_float(WORLD_BOUND));
    point.iter().all(|c| c.is_finite() && c.abs() <= bound)
}

/// Configuration errors. All of these are raised at bootstrap, never mid-round.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// The roster would be empty
    #[error("No combatants configured")]
    NoCombatants,

    /// More combatants than ids
    #[error("Too many combatants: {0}")]
    TooManyCombatants(usize),

    /// A combatant has an empty name
    #[error("Combatant name must not be empty")]
    UnnamedCombatant,

    /// Two combatants share a name
    #[error("Duplicate combatant name: {0}")]
    DuplicateCombatant(String),

    /// A combatant has no spawn point
    #[error("Combatant {0} has no spawn point")]
    MissingSpawn(String),

    /// Max health is zero or negative
    #[error("Combatant {0} must have positive max health")]
    InvalidMaxHealth(String),

    /// Collision box is empty
    #[error("Combatant {0} must have positive half extents")]
    InvalidExtents(String),

    /// Round length out of range
    #[error("Round duration must be positive and at most 30000 seconds")]
    InvalidRoundDuration,

    /// A speed, lifetime or similar value is negative
    #[error("{0} must not be negative")]
    NegativeValue(String),

    /// A point lies outside the world, or a speed exceeds the movement cap
    #[error("{0} is outside the world bounds")]
    OutOfBounds(String),

    /// A color component is outside [0, 1]
    #[error("Invalid color for {0}")]
    InvalidColor(String),

    /// Config JSON did not parse
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file could not be read
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying error
        source: std::io::Error,
    },
}

// =============================================================================
// SECTIONS
// =============================================================================

/// Projectile tuning as authored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Speed (units/s)
    pub speed: f64,
    /// Damage per hit
    pub damage: f64,
    /// Time-to-live (seconds)
    pub ttl_seconds: f64,
    /// Collision radius
    pub radius: f64,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 20.0,
            damage: 0.1,
            ttl_seconds: 5.0,
            radius: 0.1,
        }
    }
}

/// Projectile tuning in simulation units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProjectileTuning {
    /// Speed (units/s)
    pub speed: Fixed,
    /// Damage per hit
    pub damage: Fixed,
    /// Time-to-live (seconds)
    pub ttl: Fixed,
    /// Collision radius
    pub radius: Fixed,
}

impl From<&ProjectileConfig> for ProjectileTuning {
    fn from(config: &ProjectileConfig) -> Self {
        Self {
            speed: to_fixed(config.speed),
            damage: to_fixed(config.damage),
            ttl: to_fixed(config.ttl_seconds),
            radius: to_fixed(config.radius),
        }
    }
}

/// One combatant as authored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatantConfig {
    /// Display name
    pub name: String,
    /// Spawn position (box center)
    pub spawn: Option<[f64; 2]>,
    /// Aim direction at spawn
    pub facing: [f64; 2],
    /// Box half extents
    pub half_extents: [f64; 2],
    /// Movement speed
    pub speed: f64,
    /// Jump velocity
    pub jump_velocity: f64,
    /// Gravity multiplier (0 = free movement)
    pub gravity_scale: f64,
    /// Maximum health
    pub max_health: f64,
    /// Solid or sensor body
    pub collider: ColliderKind,
    /// Input bindings
    pub bindings: InputBindings,
    /// Tint at full health
    pub full_health_color: Rgb,
    /// Tint at zero health
    pub zero_health_color: Rgb,
}

impl Default for CombatantConfig {
    fn default() -> Self {
        let tint = TintRange::default();
        Self {
            name: String::new(),
            spawn: None,
            facing: [1.0, 0.0],
            half_extents: [0.5, 0.5],
            speed: 5.0,
            jump_velocity: 12.0,
            gravity_scale: 1.0,
            max_health: 1.0,
            collider: ColliderKind::Solid,
            bindings: InputBindings::default(),
            full_health_color: tint.full_health,
            zero_health_color: tint.zero_health,
        }
    }
}

impl CombatantConfig {
    fn validate(&self) -> Result<(), SetupError> {
        if self.name.trim().is_empty() {
            return Err(SetupError::UnnamedCombatant);
        }
        if self.spawn.is_none() {
            return Err(SetupError::MissingSpawn(self.name.clone()));
        }
        if !is_positive(self.max_health) {
            return Err(SetupError::InvalidMaxHealth(self.name.clone()));
        }
        if !(is_positive(self.half_extents[0]) && is_positive(self.half_extents[1])) {
            return Err(SetupError::InvalidExtents(self.name.clone()));
        }
        for (field, value) in [
            ("speed", self.speed),
            ("jump_velocity", self.jump_velocity),
            ("gravity_scale", self.gravity_scale),
        ] {
            if !is_non_negative(value) {
                return Err(SetupError::NegativeValue(format!("{}.{}", self.name, field)));
            }
        }
        let max_speed = f64::from(to_float(MAX_COMBATANT_SPEED));
        if self.speed > max_speed || self.jump_velocity > max_speed {
            return Err(SetupError::OutOfBounds(format!("{} speed", self.name)));
        }
        if self.spawn.is_some_and(|spawn| !is_inside_world(spawn)) {
            return Err(SetupError::OutOfBounds(format!("{} spawn", self.name)));
        }
        if !self.full_health_color.is_valid() || !self.zero_health_color.is_valid() {
            return Err(SetupError::InvalidColor(self.name.clone()));
        }
        Ok(())
    }

    /// Convert to a runtime setup. Fails if the spawn point is missing.
    pub fn to_setup(&self) -> Result<CombatantSetup, SetupError> {
        let spawn = self
            .spawn
            .ok_or_else(|| SetupError::MissingSpawn(self.name.clone()))?;

        let facing = FixedVec2::from_config(self.facing).normalize();

        Ok(CombatantSetup {
            name: self.name.clone(),
            spawn_position: FixedVec2::from_config(spawn),
            spawn_facing: if facing == FixedVec2::ZERO { FixedVec2::RIGHT } else { facing },
            half_extents: FixedVec2::from_config(self.half_extents),
            max_health: to_fixed(self.max_health),
            tuning: MovementTuning {
                speed: to_fixed(self.speed),
                jump_velocity: to_fixed(self.jump_velocity),
                gravity_scale: to_fixed(self.gravity_scale),
            },
            bindings: self.bindings.clone().normalized(),
            collider: self.collider,
            tint: TintRange {
                full_health: self.full_health_color,
                zero_health: self.zero_health_color,
            },
        })
    }
}

/// A goal region as authored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoalConfig {
    /// Name
    pub name: String,
    /// Center
    pub center: [f64; 2],
    /// Half extents
    pub half_extents: [f64; 2],
}

/// A terrain surface as authored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// First endpoint
    pub start: [f64; 2],
    /// Second endpoint
    pub end: [f64; 2],
}

// =============================================================================
// ARENA CONFIG
// =============================================================================

/// Full arena configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Round length (seconds)
    pub round_seconds: f64,
    /// Gravity (units/s²)
    pub gravity: f64,
    /// Menu shown at bootstrap
    pub start_menu: String,
    /// Menu shown when a round ends
    pub win_menu: String,
    /// How goal contacts resolve
    pub goal_policy: GoalPolicy,
    /// End the round when one (or no) combatant is left standing
    pub end_on_elimination: bool,
    /// Projectile tuning
    pub projectile: ProjectileConfig,
    /// Combatants, in id order
    pub combatants: Vec<CombatantConfig>,
    /// Goal regions
    pub goals: Vec<GoalConfig>,
    /// Terrain surfaces
    pub surfaces: Vec<SurfaceConfig>,
}

impl Default for ArenaConfig {
    /// A two-player duel on a flat floor with a flag overhead.
    fn default() -> Self {
        Self {
            round_seconds: f64::from(crate::DEFAULT_ROUND_SECONDS),
            gravity: 30.0,
            start_menu: "StartMenu".to_string(),
            win_menu: "WinMenu".to_string(),
            goal_policy: GoalPolicy::SolidNamed,
            end_on_elimination: true,
            projectile: ProjectileConfig::default(),
            combatants: vec![
                CombatantConfig {
                    name: "Red".to_string(),
                    spawn: Some([-6.0, 0.5]),
                    facing: [1.0, 0.0],
                    bindings: InputBindings::platformer("P1 Horizontal", "P1 Jump").with_shoot("P1 Fire"),
                    full_health_color: Rgb::new(1.0, 0.25, 0.2),
                    ..CombatantConfig::default()
                },
                CombatantConfig {
                    name: "Blue".to_string(),
                    spawn: Some([6.0, 0.5]),
                    facing: [-1.0, 0.0],
                    bindings: InputBindings::platformer("P2 Horizontal", "P2 Jump").with_shoot("P2 Fire"),
                    ..CombatantConfig::default()
                },
            ],
            goals: vec![GoalConfig {
                name: "Flag".to_string(),
                center: [0.0, 3.0],
                half_extents: [0.75, 0.5],
            }],
            surfaces: vec![SurfaceConfig {
                start: [-12.0, 0.0],
                end: [12.0, 0.0],
            }],
        }
    }
}

impl ArenaConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, SetupError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SetupError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Check everything the simulation relies on.
    pub fn validate(&self) -> Result<(), SetupError> {
        if !is_positive(self.round_seconds) || self.round_seconds > MAX_ROUND_SECONDS {
            return Err(SetupError::InvalidRoundDuration);
        }
        if !is_non_negative(self.gravity) {
            return Err(SetupError::NegativeValue("gravity".to_string()));
        }
        for (field, value) in [
            ("projectile.speed", self.projectile.speed),
            ("projectile.damage", self.projectile.damage),
            ("projectile.ttl_seconds", self.projectile.ttl_seconds),
            ("projectile.radius", self.projectile.radius),
        ] {
            if !is_non_negative(value) {
                return Err(SetupError::NegativeValue(field.to_string()));
            }
        }

        if self.combatants.is_empty() {
            return Err(SetupError::NoCombatants);
        }
        if self.combatants.len() > u16::MAX as usize {
            return Err(SetupError::TooManyCombatants(self.combatants.len()));
        }

        let mut names = BTreeSet::new();
        for combatant in &self.combatants {
            combatant.validate()?;
            if !names.insert(combatant.name.as_str()) {
                return Err(SetupError::DuplicateCombatant(combatant.name.clone()));
            }
        }

        for goal in &self.goals {
            if !is_inside_world(goal.center) {
                return Err(SetupError::OutOfBounds(format!("Goal {}", goal.name)));
            }
        }
        for surface in &self.surfaces {
            if !is_inside_world(surface.start) || !is_inside_world(surface.end) {
                return Err(SetupError::OutOfBounds("Surface".to_string()));
            }
        }

        Ok(())
    }

    /// Round length in simulation units.
    pub fn round_duration(&self) -> Fixed {
        to_fixed(self.round_seconds)
    }

    /// Gravity in simulation units.
    pub fn gravity_fixed(&self) -> Fixed {
        to_fixed(self.gravity)
    }

    /// Projectile tuning in simulation units.
    pub fn projectile_tuning(&self) -> ProjectileTuning {
        ProjectileTuning::from(&self.projectile)
    }

    /// Runtime combatant setups, in configuration order.
    pub fn combatant_setups(&self) -> Result<Vec<CombatantSetup>, SetupError> {
        self.combatants.iter().map(CombatantConfig::to_setup).collect()
    }

    /// Build the terrain.
    pub fn terrain(&self) -> Terrain {
        Terrain::new(
            self.surfaces
                .iter()
                .map(|s| Surface::new(FixedVec2::from_config(s.start), FixedVec2::from_config(s.end)))
                .collect(),
        )
    }

    /// Build the goal regions.
    pub fn goal_regions(&self) -> Goals {
        Goals::new(
            self.goals
                .iter()
                .map(|g| {
                    GoalRegion::new(
                        &g.name,
                        Aabb::new(FixedVec2::from_config(g.center), FixedVec2::from_config(g.half_extents)),
                    )
                })
                .collect(),
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================
