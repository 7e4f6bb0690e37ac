//! Block configurations and the move transition.
//!
//! A [`Configuration`] is the search-space node. Equality and hashing look
//! only at the `on` mapping, so two arrangements that stack the same blocks
//! on the same supports are the same node regardless of the stored
//! `clear`/`on_table` sets.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

/// Block identifier
pub type Block = String;

/// Rendering of [`Location::Table`] in move labels and facts
pub const TABLE: &str = "TABLE";

/// Where a block rests
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    Table,
    Block(Block),
}

impl Location {
    /// The supporting block, if this location is not the table
    pub fn as_block(&self) -> Option<&str> {
        match self {
            Location::Table => None,
            Location::Block(b) => Some(b),
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self, Location::Table)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Table => f.write_str(TABLE),
            Location::Block(b) => f.write_str(b),
        }
    }
}

fn default_hand_empty() -> bool {
    true
}

/// One arrangement of blocks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Configuration {
    /// Blocks with nothing stacked on them
    #[serde(default)]
    pub clear: BTreeSet<Block>,
    /// Blocks resting directly on the table
    #[serde(default, rename = "onTable")]
    pub on_table: BTreeSet<Block>,
    /// Block -> the block it rests on
    #[serde(default)]
    pub on: BTreeMap<Block, Block>,
    #[serde(default = "default_hand_empty", rename = "handEmpty")]
    pub hand_empty: bool,
    /// Label of the move that produced this configuration
    #[serde(default, rename = "lastAction", skip_serializing_if = "Option::is_none")]
    pub last_action: Option<String>,
}

impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        self.on == other.on
    }
}

impl Eq for Configuration {}

impl Hash for Configuration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.on.hash(state);
    }
}

impl Configuration {
    /// Build a configuration from towers listed bottom to top.
    ///
    /// `&[&["C", "B", "A"], &["D"]]` puts C on the table, B on C, A on B and
    /// D alone on the table.
    pub fn from_towers(towers: &[&[&str]]) -> Self {
        let mut config = Self {
            hand_empty: true,
            ..Self::default()
        };
        for tower in towers {
            let mut below: Option<&str> = None;
            for &block in tower.iter() {
                match below {
                    None => {
                        config.on_table.insert(block.to_string());
                    }
                    Some(support) => {
                        config.on.insert(block.to_string(), support.to_string());
                    }
                }
                below = Some(block);
            }
            if let Some(top) = below {
                config.clear.insert(top.to_string());
            }
        }
        config
    }

    /// Build a configuration from facts such as `CLEAR A`, `ONTABLE B`,
    /// `ON A B` or `HANDEMPTY`. Predicates are case-insensitive.
    ///
    /// No invariant checking happens here; see [`Configuration::validate`].
    pub fn from_facts<S: AsRef<str>>(facts: &[S]) -> Result<Self> {
        let mut config = Self {
            hand_empty: true,
            ..Self::default()
        };
        for fact in facts {
            let fact = fact.as_ref();
            let tokens: Vec<&str> = fact.split_whitespace().collect();
            let Some((predicate, args)) = tokens.split_first() else {
                return Err(PlannerError::MalformedInput("empty fact".to_string()));
            };
            let predicate = predicate.to_ascii_uppercase();
            match (predicate.as_str(), args) {
                ("CLEAR", [b]) => {
                    config.clear.insert(b.to_string());
                }
                ("ONTABLE", [b]) => {
                    config.on_table.insert(b.to_string());
                }
                ("ON", [b, support]) => {
                    if let Some(prev) = config.on.insert(b.to_string(), support.to_string()) {
                        if prev != *support {
                            return Err(PlannerError::MalformedInput(format!(
                                "{b} is stated to rest on both {prev} and {support}"
                            )));
                        }
                    }
                }
                ("HANDEMPTY", []) => config.hand_empty = true,
                ("CLEAR" | "ONTABLE" | "ON" | "HANDEMPTY", _) => {
                    return Err(PlannerError::MalformedInput(format!(
                        "wrong number of arguments in fact '{fact}'"
                    )));
                }
                _ => {
                    return Err(PlannerError::MalformedInput(format!(
                        "unknown predicate in fact '{fact}'"
                    )));
                }
            }
        }
        Ok(config)
    }

    /// Every block mentioned anywhere in the configuration
    pub fn blocks(&self) -> BTreeSet<&Block> {
        self.on_table
            .iter()
            .chain(self.clear.iter())
            .chain(self.on.keys())
            .chain(self.on.values())
            .collect()
    }

    /// Current support of `block`, or `None` if the block is unplaced
    pub fn location_of(&self, block: &str) -> Option<Location> {
        if let Some(support) = self.on.get(block) {
            Some(Location::Block(support.clone()))
        } else if self.on_table.contains(block) {
            Some(Location::Table)
        } else {
            None
        }
    }

    /// Move `block` from `from` to `to`, returning the resulting configuration.
    ///
    /// `block` must be clear and `to`, when it is a block, must be clear and
    /// different from `block`. The neighbor generator only ever calls this
    /// with legal arguments; violations trip debug assertions.
    pub fn apply(&self, block: &str, from: &Location, to: &Location) -> Configuration {
        debug_assert!(self.clear.contains(block), "{block} is not clear");
        debug_assert!(to.as_block() != Some(block), "{block} cannot move onto itself");
        debug_assert!(
            to.as_block().map_or(true, |target| self.clear.contains(target)),
            "destination {to} is not clear"
        );

        let mut next = self.clone();

        match from {
            Location::Table => {
                next.on_table.remove(block);
            }
            Location::Block(support) => {
                next.on.remove(block);
                next.clear.insert(support.clone());
            }
        }

        match to {
            Location::Table => {
                next.on_table.insert(block.to_string());
            }
            Location::Block(target) => {
                next.on.insert(block.to_string(), target.clone());
                next.clear.remove(target);
            }
        }

        next.clear.insert(block.to_string());
        next.last_action = Some(format!("Move {block} from {from} to {to}"));
        next
    }

    /// Check the well-formedness invariants of a complete configuration.
    ///
    /// With a non-empty `objects` list every object must be placed and no
    /// other block may appear. With an empty list the blocks mentioned in
    /// the configuration are taken as the universe.
    pub fn validate(&self, objects: &[Block]) -> Result<()> {
        let universe = self.universe(objects)?;

        for block in &universe {
            match (self.on_table.contains(*block), self.on.contains_key(*block)) {
                (true, true) => {
                    return Err(PlannerError::MalformedInput(format!(
                        "{block} rests both on the table and on {}",
                        self.on[*block]
                    )))
                }
                (false, false) => {
                    return Err(PlannerError::MalformedInput(format!(
                        "{block} rests neither on the table nor on a block"
                    )))
                }
                _ => {}
            }
        }

        self.check_single_stacking()?;

        let supports: BTreeSet<&Block> = self.on.values().collect();
        for block in &universe {
            let covered = supports.contains(*block);
            let clear = self.clear.contains(*block);
            if covered == clear {
                return Err(PlannerError::MalformedInput(if clear {
                    format!("{block} is listed as clear but has a block on it")
                } else {
                    format!("{block} has nothing on it but is not listed as clear")
                }));
            }
        }

        self.check_acyclic()
    }

    /// Check a goal description, which may name only some `on` facts.
    pub fn validate_goal(&self, objects: &[Block]) -> Result<()> {
        self.universe(objects)?;
        if let Some(block) = self.on_table.iter().find(|b| self.on.contains_key(*b)) {
            return Err(PlannerError::MalformedInput(format!(
                "goal puts {block} both on the table and on {}",
                self.on[block]
            )));
        }
        self.check_single_stacking()?;
        self.check_acyclic()
    }

    fn universe<'a>(&'a self, objects: &'a [Block]) -> Result<BTreeSet<&'a Block>> {
        let mentioned = self.blocks();
        if objects.is_empty() {
            return Ok(mentioned);
        }
        let universe: BTreeSet<&Block> = objects.iter().collect();
        if let Some(unknown) = mentioned.iter().find(|b| !universe.contains(*b)) {
            return Err(PlannerError::MalformedInput(format!(
                "{unknown} is not a declared object"
            )));
        }
        Ok(universe)
    }

    fn check_single_stacking(&self) -> Result<()> {
        let mut seen: BTreeMap<&Block, &Block> = BTreeMap::new();
        for (block, support) in &self.on {
            if let Some(other) = seen.insert(support, block) {
                return Err(PlannerError::MalformedInput(format!(
                    "both {other} and {block} rest on {support}"
                )));
            }
        }
        Ok(())
    }

    fn check_acyclic(&self) -> Result<()> {
        for start in self.on.keys() {
            let mut current = start;
            // A chain longer than the mapping itself must revisit a block.
            for _ in 0..=self.on.len() {
                match self.on.get(current) {
                    Some(next) if next == start => {
                        return Err(PlannerError::MalformedInput(format!(
                            "{start} transitively rests on itself"
                        )))
                    }
                    Some(next) => current = next,
                    None => break,
                }
            }
        }
        Ok(())
    }
}
