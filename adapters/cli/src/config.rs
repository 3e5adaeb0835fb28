//! Session configuration loaded from TOML.

use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use maze_chase_system_clock::Config as ClockSettings;
use maze_chase_system_pursuit::Config as PursuitSettings;
use maze_chase_world::{AdversaryProfile, Level, LevelError, Rules};
use serde::Deserialize;

pub(crate) const DEFAULT_LAYOUT: &str = "\
###################
#o.......#.......o#
#.##.###.#.###.##.#
#.................#
#.##.#.#####.#.##.#
#....#...#...#....#
####.### # ###.####
####.#   G   #.####
####.# ##_## #.####
    .  #GGG#  .    
####.# ##### #.####
####.#       #.####
####.# ##### #.####
#........#........#
#.##.###.#.###.##.#
#o.#.....P.....#.o#
##.#.#.#####.#.#.##
#....#...#...#....#
#.######.#.######.#
#.................#
###################";

/// Everything needed to set up a session, with every section optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SessionConfig {
    pub(crate) level: LevelConfig,
    pub(crate) adversaries: Vec<AdversaryProfile>,
    pub(crate) rules: Rules,
    pub(crate) clock: ClockConfig,
    pub(crate) pursuit: PursuitConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LevelConfig {
    pub(crate) layout: String,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            layout: DEFAULT_LAYOUT.to_owned(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ClockConfig {
    pub(crate) tick_micros: u64,
    pub(crate) player_period: u32,
    pub(crate) adversary_period: u32,
    pub(crate) player_floor: u32,
    pub(crate) adversary_floor: u32,
    pub(crate) speedup_per_level: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_micros: 16_667,
            player_period: 8,
            adversary_period: 10,
            player_floor: 4,
            adversary_floor: 5,
            speedup_per_level: 1,
        }
    }
}

impl ClockConfig {
    pub(crate) fn tick(&self) -> Duration {
        Duration::from_micros(self.tick_micros)
    }

    pub(crate) fn settings(&self) -> ClockSettings {
        ClockSettings::new(self.tick())
            .with_periods(self.player_period, self.adversary_period)
            .with_floors(self.player_floor, self.adversary_floor)
            .with_speedup_per_level(self.speedup_per_level)
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PursuitConfig {
    pub(crate) seed: u64,
    pub(crate) ambush_lookahead: u32,
    pub(crate) patrol_chase_probability: f64,
}

impl Default for PursuitConfig {
    fn default() -> Self {
        Self {
            seed: 0x00c0_ffee,
            ambush_lookahead: 4,
            patrol_chase_probability: 0.3,
        }
    }
}

impl PursuitConfig {
    pub(crate) fn settings(&self) -> PursuitSettings {
        PursuitSettings::new(self.seed)
            .with_ambush_lookahead(self.ambush_lookahead)
            .with_patrol_chase_probability(self.patrol_chase_probability)
    }
}

impl SessionConfig {
    /// Reads the configuration at `path`, falling back to defaults when absent.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read session config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid session config at {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse session config toml contents")?;
        if config.clock.tick_micros == 0 {
            bail!("clock tick_micros must be positive");
        }
        if !(0.0..=1.0).contains(&config.pursuit.patrol_chase_probability) {
            bail!(
                "pursuit patrol_chase_probability {} is outside 0..=1",
                config.pursuit.patrol_chase_probability
            );
        }
        Ok(config)
    }

    /// Replaces every random seed with `seed`.
    pub(crate) fn reseed(&mut self, seed: u64) {
        self.pursuit.seed = seed;
        self.rules.shift_seed = seed;
    }

    pub(crate) fn level(&self) -> Result<Level, LevelError> {
        Level::with_adversaries(&self.level.layout, &self.adversaries)
    }
}
