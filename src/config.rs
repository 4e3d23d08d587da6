//! Game configuration.
//!
//! Every tunable number of the simulation lives here. Configs deserialize
//! from JSON with per-field defaults, so a file only needs the values it
//! changes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::Building;

/// Largest map `validate` accepts.
pub const MAX_NODE_COUNT: usize = 10_000;
/// Longest edge `validate` accepts.
pub const MAX_EDGE_LENGTH: f64 = 1_000.0;
/// Widest `[min_distance, max_distance]` window `validate` accepts.
pub const MAX_DISTANCE_SPAN: f64 = 64.0;
pub const MAX_DEGREE: usize = 16;
pub const MAX_MULTIPLIER: f64 = 100.0;

/// Errors that can occur while loading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Map generation constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapParams {
    /// Target number of nodes.
    pub node_count: usize,
    /// Minimum distance between nodes, and minimum edge length.
    pub min_distance: f64,
    /// Maximum edge length.
    pub max_distance: f64,
    /// Maximum number of neighbors per node.
    pub max_degree: usize,
}

impl Default for MapParams {
    fn default() -> Self {
        MapParams {
            node_count: 48,
            min_distance: 4.0,
            max_distance: 9.0,
            max_degree: 4,
        }
    }
}

/// Combat, production, and command tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub factory_cost: u32,
    pub power_plant_cost: u32,
    pub fort_cost: u32,
    pub artillery_cost: u32,
    /// Fraction of a troop pool lost per combat round before modifiers.
    pub loss_rate: f64,
    /// Half-width of the uniform roll applied to the loss rate.
    pub loss_spread: f64,
    /// Multiplier on losses taken by a node defended by a fort.
    pub fort_multiplier: f64,
    /// Multiplier on losses inflicted by artillery in node combat.
    pub artillery_multiplier: f64,
    /// Multiplier on losses inflicted by artillery-backed armies in field combat.
    pub army_artillery_multiplier: f64,
    /// Standing orders dispatch on ticks that are multiples of this.
    pub standing_order_interval: u64,
    /// Neutral nodes grow on ticks that are multiples of this.
    pub neutral_growth_interval: u64,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            factory_cost: 200,
            power_plant_cost: 1000,
            fort_cost: 500,
            artillery_cost: 2000,
            loss_rate: 1.0 / 80.0,
            loss_spread: 0.1,
            fort_multiplier: 0.5,
            artillery_multiplier: 2.0,
            army_artillery_multiplier: 2.0,
            standing_order_interval: 8,
            neutral_growth_interval: 8,
        }
    }
}

impl Rules {
    /// Returns the troop cost of a building, or `None` for `Building::None`.
    pub fn building_cost(&self, building: Building) -> Option<u32> {
        match building {
            Building::None => None,
            Building::Factory => Some(self.factory_cost),
            Building::PowerPlant => Some(self.power_plant_cost),
            Building::Fort => Some(self.fort_cost),
            Building::Artillery => Some(self.artillery_cost),
        }
    }
}

/// Initial placement of teams and neutral garrisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupParams {
    /// Troops on each team's starting node.
    pub start_troops: u32,
    /// Lower bound of the random garrison on neutral nodes.
    pub neutral_troops_min: u32,
    /// Upper bound (inclusive) of the random garrison on neutral nodes.
    pub neutral_troops_max: u32,
}

impl Default for SetupParams {
    fn default() -> Self {
        SetupParams {
            start_troops: 50,
            neutral_troops_min: 0,
            neutral_troops_max: 10,
        }
    }
}

/// Complete configuration for one game.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub map: MapParams,
    pub rules: Rules,
    pub setup: SetupParams,
}

impl GameConfig {
    /// Parses a config from a JSON string.
    pub fn from_json_str(s: &str) -> Result<GameConfig, ConfigError> {
        let config: GameConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<GameConfig, ConfigError> {
        let text = fs::read_to_string(path)?;
        GameConfig::from_json_str(&text)
    }

    /// Checks the values the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.map;
        if !m.min_distance.is_finite() || !m.max_distance.is_finite() {
            return Err(ConfigError::Invalid("distances must be finite".into()));
        }
        if m.min_distance < 1.0 {
            return Err(ConfigError::Invalid("min_distance must be at least 1".into()));
        }
        if m.max_distance <= m.min_distance {
            return Err(ConfigError::Invalid(
                "max_distance must exceed min_distance".into(),
            ));
        }
        if m.max_distance > MAX_EDGE_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "max_distance must be at most {}",
                MAX_EDGE_LENGTH
            )));
        }
        if m.max_distance - m.min_distance > MAX_DISTANCE_SPAN {
            return Err(ConfigError::Invalid(format!(
                "max_distance may exceed min_distance by at most {}",
                MAX_DISTANCE_SPAN
            )));
        }
        if m.max_degree == 0 || m.max_degree > MAX_DEGREE {
            return Err(ConfigError::Invalid(format!(
                "max_degree must be in 1..={}",
                MAX_DEGREE
            )));
        }
        if m.node_count == 0 || m.node_count > MAX_NODE_COUNT {
            return Err(ConfigError::Invalid(format!(
                "node_count must be in 1..={}",
                MAX_NODE_COUNT
            )));
        }

        let r = &self.rules;
        if r.standing_order_interval == 0 || r.neutral_growth_interval == 0 {
            return Err(ConfigError::Invalid("intervals must be positive".into()));
        }
        if !(r.loss_rate.is_finite() && r.loss_rate > 0.0 && r.loss_rate <= 1.0) {
            return Err(ConfigError::Invalid("loss_rate must be in (0, 1]".into()));
        }
        if !(r.loss_spread.is_finite() && (0.0..1.0).contains(&r.loss_spread)) {
            return Err(ConfigError::Invalid("loss_spread must be in [0, 1)".into()));
        }
        let multipliers = [
            ("fort_multiplier", r.fort_multiplier),
            ("artillery_multiplier", r.artillery_multiplier),
            ("army_artillery_multiplier", r.army_artillery_multiplier),
        ];
        for (name, value) in multipliers {
            if !(value.is_finite() && value > 0.0 && value <= MAX_MULTIPLIER) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be in (0, {}]",
                    name, MAX_MULTIPLIER
                )));
            }
        }

        let s = &self.setup;
        if s.neutral_troops_min > s.neutral_troops_max {
            return Err(ConfigError::Invalid(
                "neutral_troops_min exceeds neutral_troops_max".into(),
            ));
        }
        Ok(())
    }

    /// Applies a single named option, as sent by `setoption`.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        fn parse<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
            value
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("bad value for {}: '{}'", name, value)))
        }

        let mut next = self.clone();
        match name {
            "NodeCount" => next.map.node_count = parse(name, value)?,
            "MinDistance" => next.map.min_distance = parse(name, value)?,
            "MaxDistance" => next.map.max_distance = parse(name, value)?,
            "MaxDegree" => next.map.max_degree = parse(name, value)?,
            "StartTroops" => next.setup.start_troops = parse(name, value)?,
            "LossRate" => next.rules.loss_rate = parse(name, value)?,
            "LossSpread" => next.rules.loss_spread = parse(name, value)?,
            "FortMultiplier" => next.rules.fort_multiplier = parse(name, value)?,
            "ArtilleryMultiplier" => next.rules.artillery_multiplier = parse(name, value)?,
            "ArmyArtilleryMultiplier" => next.rules.army_artillery_multiplier = parse(name, value)?,
            other => return Err(ConfigError::Invalid(format!("unknown option '{}'", other))),
        }
        next.validate()?;
        *self = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = GameConfig::from_json_str(r#"{"map": {"node_count": 12}}"#).unwrap();
        assert_eq!(config.map.node_count, 12);
        assert_eq!(config.map.max_degree, 4);
        assert_eq!(config.rules.factory_cost, 200);
    }

    #[test]
    fn invalid_distances_rejected() {
        let err = GameConfig::from_json_str(r#"{"map": {"min_distance": 5, "max_distance": 5}}"#);
        assert!(matches!(err, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(
            GameConfig::from_json_str("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn building_costs() {
        let rules = Rules::default();
        assert_eq!(rules.building_cost(Building::Factory), Some(200));
        assert_eq!(rules.building_cost(Building::PowerPlant), Some(1000));
        assert_eq!(rules.building_cost(Building::Fort), Some(500));
        assert_eq!(rules.building_cost(Building::Artillery), Some(2000));
        assert_eq!(rules.building_cost(Building::None), None);
    }

    #[test]
    fn set_option_updates_and_validates() {
        let mut config = GameConfig::default();
        config.set_option("NodeCount", "20").unwrap();
        assert_eq!(config.map.node_count, 20);
        assert!(config.set_option("MaxDistance", "1").is_err());
        assert_eq!(config.map.max_distance, 9.0);
        assert!(config.set_option("Bogus", "1").is_err());
        assert!(config.set_option("NodeCount", "many").is_err());
    }

    fn rejected(f: impl FnOnce(&mut GameConfig)) -> bool {
        let mut config = GameConfig::default();
        f(&mut config);
        matches!(config.validate(), Err(ConfigError::Invalid(_)))
    }

    #[test]
    fn non_finite_distances_rejected() {
        assert!(rejected(|c| c.map.max_distance = f64::INFINITY));
        assert!(rejected(|c| c.map.max_distance = f64::NAN));
        assert!(rejected(|c| c.map.min_distance = f64::NAN));
        assert!(rejected(|c| c.map.min_distance = f64::NEG_INFINITY));
    }

    #[test]
    fn unbounded_map_rejected() {
        assert!(rejected(|c| c.map.max_distance = MAX_EDGE_LENGTH + 1.0));
        assert!(rejected(|c| c.map.max_distance = c.map.min_distance + MAX_DISTANCE_SPAN + 1.0));
        assert!(rejected(|c| c.map.node_count = MAX_NODE_COUNT + 1));
        assert!(rejected(|c| c.map.max_degree = MAX_DEGREE + 1));
        assert!(!rejected(|c| c.map.node_count = MAX_NODE_COUNT));
    }

    #[test]
    fn non_finite_rules_rejected() {
        assert!(rejected(|c| c.rules.loss_rate = f64::NAN));
        assert!(rejected(|c| c.rules.loss_rate = f64::INFINITY));
        assert!(rejected(|c| c.rules.loss_rate = 0.0));
        assert!(rejected(|c| c.rules.loss_spread = f64::NAN));
        assert!(rejected(|c| c.rules.fort_multiplier = f64::NAN));
        assert!(rejected(|c| c.rules.fort_multiplier = 0.0));
        assert!(rejected(|c| c.rules.artillery_multiplier = f64::INFINITY));
        assert!(rejected(|c| c.rules.army_artillery_multiplier = -1.0));
    }

    #[test]
    fn set_option_refuses_infinite_and_nan() {
        let mut config = GameConfig::default();
        for (name, value) in [
            ("MaxDistance", "inf"),
            ("MaxDistance", "NaN"),
            ("MinDistance", "NaN"),
            ("LossRate", "inf"),
            ("LossSpread", "NaN"),
            ("FortMultiplier", "inf"),
            ("ArtilleryMultiplier", "NaN"),
            ("ArmyArtilleryMultiplier", "inf"),
        ] {
            assert!(config.set_option(name, value).is_err(), "{} {}", name, value);
        }
        assert_eq!(config, GameConfig::default());
    }
}
