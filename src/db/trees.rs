use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};

use super::{clean_name, garden, parse_datetime, Database};
use crate::error::{Result, TrackerError};
use crate::growth::Thresholds;
use crate::models::{Garden, PlantTreeInput, Tree, TreeSlot};

struct TreeRow {
    index: u32,
    name: String,
    water: f64,
    thresholds: String,
    created_at: String,
    last_watered: Option<String>,
}

impl TreeRow {
    fn into_tree(self) -> Result<Tree> {
        let thresholds: Thresholds = serde_json::from_str(&self.thresholds)?;
        Ok(Tree::new(
            self.index,
            self.name,
            self.water,
            thresholds,
            parse_datetime(&self.created_at)?,
            self.last_watered.as_deref().map(parse_datetime).transpose()?,
        ))
    }
}

const TREE_COLUMNS: &str = "idx, name, water, thresholds, created_at, last_watered";

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TreeRow> {
    Ok(TreeRow {
        index: row.get(0)?,
        name: row.get(1)?,
        water: row.get(2)?,
        thresholds: row.get(3)?,
        created_at: row.get(4)?,
        last_watered: row.get(5)?,
    })
}

impl Database {
    /// All planted trees in planting order.
    pub fn list_trees(&self) -> Result<Vec<Tree>> {
        let conn = self.lock()?;
        list_trees(&conn)
    }

    pub fn get_tree(&self, index: u32) -> Result<Tree> {
        let conn = self.lock()?;
        fetch_tree(&conn, index)?.ok_or_else(|| tree_not_found(index))
    }

    /// Add `amount` water to a tree and return it with its stage recomputed.
    ///
    /// Water is clamped to the configured maximum. Watering with zero leaves
    /// the tree untouched.
    pub fn water_tree(&self, index: u32, amount: f64) -> Result<Tree> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(TrackerError::validation(
                "Water amount must be a non-negative number",
            ));
        }

        let now = self.clock.now();
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let tree = fetch_tree(&tx, index)?.ok_or_else(|| tree_not_found(index))?;
        let watered = apply_water(&tx, tree, amount, self.config.max_water, now)?;
        tx.commit()?;

        Ok(watered)
    }

    pub fn rename_tree(&self, index: u32, new_name: &str) -> Result<Tree> {
        let name = clean_name(new_name, "Tree")?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let mut tree = fetch_tree(&tx, index)?.ok_or_else(|| tree_not_found(index))?;
        tx.execute("UPDATE trees SET name = ? WHERE idx = ?", (name, index))?;
        tx.commit()?;

        tracing::debug!("Renamed tree {} from '{}' to '{}'", index, tree.name, name);
        tree.name = name.to_string();
        Ok(tree)
    }

    /// Plant a tree in the next free slot, if the garden level unlocks it.
    pub fn plant_tree(&self, input: PlantTreeInput) -> Result<Tree> {
        let name = match input.name.as_deref() {
            Some(name) => clean_name(name, "Tree")?.to_string(),
            None => self.config.default_tree_name.clone(),
        };

        let now = self.clock.now();
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let planted = count_trees(&tx)?;
        let slot_levels = &self.config.tree_slot_levels;
        let Some(&required_level) = slot_levels.get(planted as usize) else {
            return Err(TrackerError::validation(
                "All tree slots are already planted",
            ));
        };

        let garden = garden::load_garden(&tx)?;
        if garden.unlocked_slots(slot_levels) <= planted as usize {
            return Err(TrackerError::validation(format!(
                "Garden level {} is required to plant another tree (current level {})",
                required_level, garden.level
            )));
        }

        let tree = insert_tree(&tx, planted, &name, &self.config.thresholds()?, now)?;
        tx.commit()?;

        tracing::info!("Planted tree {} '{}'", tree.index, tree.name);
        Ok(tree)
    }

    /// Every tree slot, whether planted and whether unlocked.
    pub fn tree_slots(&self) -> Result<Vec<TreeSlot>> {
        let conn = self.lock()?;
        let garden = garden::load_garden(&conn)?;
        tree_slots(&conn, &garden, &self.config.tree_slot_levels)
    }
}

/// Slots `0..slot_levels.len()`, the leading ones unlocked by `garden`'s level.
pub(super) fn tree_slots(
    conn: &Connection,
    garden: &Garden,
    slot_levels: &[u32],
) -> Result<Vec<TreeSlot>> {
    let unlocked = garden.unlocked_slots(slot_levels);
    let mut trees = list_trees(conn)?.into_iter();

    Ok(slot_levels
        .iter()
        .enumerate()
        .map(|(slot, &required_level)| TreeSlot {
            slot: slot as u32,
            required_level,
            unlocked: slot < unlocked,
            tree: trees.next(),
        })
        .collect())
}

fn tree_not_found(index: u32) -> TrackerError {
    TrackerError::not_found(format!("Tree {} not found", index))
}

pub(super) fn count_trees(conn: &Connection) -> Result<u32> {
    let count = conn.query_row("SELECT COUNT(*) FROM trees", [], |row| row.get(0))?;
    Ok(count)
}

pub(super) fn list_trees(conn: &Connection) -> Result<Vec<Tree>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM trees ORDER BY idx", TREE_COLUMNS))?;
    let rows = stmt
        .query_map([], read_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(TreeRow::into_tree).collect()
}

pub(super) fn fetch_tree(conn: &Connection, index: u32) -> Result<Option<Tree>> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM trees WHERE idx = ?", TREE_COLUMNS),
            [index],
            read_row,
        )
        .optional()?;
    row.map(TreeRow::into_tree).transpose()
}

pub(super) fn insert_tree(
    conn: &Connection,
    index: u32,
    name: &str,
    thresholds: &Thresholds,
    now: DateTime<Utc>,
) -> Result<Tree> {
    conn.execute(
        "INSERT INTO trees (idx, name, water, thresholds, created_at, last_watered)
         VALUES (?, ?, 0, ?, ?, NULL)",
        (
            index,
            name,
            serde_json::to_string(thresholds)?,
            now.to_rfc3339(),
        ),
    )?;
    Ok(Tree::new(
        index,
        name.to_string(),
        0.0,
        thresholds.clone(),
        now,
        None,
    ))
}

/// Store `tree.water + amount` (clamped to `max_water`) and return the
/// updated tree. Zero amounts are a no-op.
pub(super) fn apply_water(
    conn: &Connection,
    tree: Tree,
    amount: f64,
    max_water: f64,
    now: DateTime<Utc>,
) -> Result<Tree> {
    if amount == 0.0 {
        return Ok(tree);
    }

    let previous_stage = tree.stage;
    let water = (tree.water + amount).clamp(0.0, max_water.max(tree.water));
    conn.execute(
        "UPDATE trees SET water = ?, last_watered = ? WHERE idx = ?",
        (water, now.to_rfc3339(), tree.index),
    )?;

    let watered = Tree::new(
        tree.index,
        tree.name,
        water,
        tree.thresholds,
        tree.created_at,
        Some(now),
    );
    if watered.stage > previous_stage {
        tracing::info!(
            "Tree {} '{}' grew to stage {}/{}",
            watered.index,
            watered.name,
            watered.stage,
            watered.max_stage
        );
    }
    Ok(watered)
}
