//! Player combat stats, turn-limited buffs, and the pre-combat snapshot

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::action::ItemId;

/// Stat a buff modifies
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum BuffStat {
    Attack,
    Defense,
}

/// A temporary stat change measured in enemy turns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buff {
    pub stat: BuffStat,
    pub amount: i32,
    /// Enemy turns left to survive before the buff wears off (0 = expired)
    pub turns_remaining: u32,
    /// What granted the buff (e.g., "Iron Skin", "Whetstone")
    pub source: String,
}

impl Buff {
    pub fn new(stat: BuffStat, amount: i32, turns: u32, source: impl Into<String>) -> Self {
        Self {
            stat,
            amount,
            turns_remaining: turns,
            source: source.into(),
        }
    }

    pub const fn is_expired(&self) -> bool {
        self.turns_remaining == 0
    }
}

/// Active buffs on the player
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuffTracker {
    buffs: Vec<Buff>,
}

impl BuffTracker {
    pub const fn new() -> Self {
        Self { buffs: Vec::new() }
    }

    /// Add a buff; one from the same source is replaced if the new one is stronger or longer
    pub fn add(&mut self, buff: Buff) {
        if buff.is_expired() {
            return;
        }
        if let Some(existing) = self
            .buffs
            .iter_mut()
            .find(|b| b.source == buff.source && b.stat == buff.stat)
        {
            if buff.amount > existing.amount
                || (buff.amount == existing.amount && buff.turns_remaining > existing.turns_remaining)
            {
                *existing = buff;
            }
        } else {
            self.buffs.push(buff);
        }
    }

    /// Sum of all active modifiers for a stat
    pub fn total(&self, stat: BuffStat) -> i32 {
        self.active().filter(|b| b.stat == stat).map(|b| b.amount).sum()
    }

    pub fn active(&self) -> impl Iterator<Item = &Buff> {
        self.buffs.iter().filter(|b| !b.is_expired())
    }

    pub fn len(&self) -> usize {
        self.buffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffs.is_empty()
    }

    /// One enemy turn survived: count every buff down and return the ones that ran out
    pub fn tick_turn(&mut self) -> Vec<Buff> {
        for buff in &mut self.buffs {
            buff.turns_remaining = buff.turns_remaining.saturating_sub(1);
        }
        let (expired, kept) = std::mem::take(&mut self.buffs)
            .into_iter()
            .partition(Buff::is_expired);
        self.buffs = kept;
        expired
    }

    pub fn clear(&mut self) {
        self.buffs.clear();
    }
}

/// Consumable counts owned by the player
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: HashMap<ItemId, u32>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, item: ItemId, count: u32) -> Self {
        self.add(item, count);
        self
    }

    pub fn add(&mut self, item: ItemId, count: u32) {
        if count > 0 {
            *self.items.entry(item).or_insert(0) += count;
        }
    }

    pub fn count(&self, item: ItemId) -> u32 {
        self.items.get(&item).copied().unwrap_or(0)
    }

    /// Remove up to `count`; returns how many were actually taken
    pub fn take(&mut self, item: ItemId, count: u32) -> u32 {
        let Some(have) = self.items.get_mut(&item) else {
            return 0;
        };
        let taken = count.min(*have);
        *have -= taken;
        if *have == 0 {
            self.items.remove(&item);
        }
        taken
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, u32)> + '_ {
        self.items.iter().map(|(k, v)| (*k, *v))
    }
}

/// The player as seen by the combat core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub mp: i32,
    pub max_mp: i32,
    pub attack: i32,
    pub defense: i32,
    pub gold: u32,
    pub experience: u32,
    pub buffs: BuffTracker,
    pub inventory: Inventory,
    /// Whether a Death Defiance charm is equipped
    pub death_defiance: bool,
}

impl PlayerStats {
    pub fn new(name: impl Into<String>, max_hp: i32, max_mp: i32, attack: i32, defense: i32) -> Self {
        Self {
            name: name.into(),
            hp: max_hp,
            max_hp,
            mp: max_mp,
            max_mp,
            attack,
            defense,
            gold: 0,
            experience: 0,
            buffs: BuffTracker::new(),
            inventory: Inventory::new(),
            death_defiance: false,
        }
    }

    pub fn with_inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = inventory;
        self
    }

    pub fn with_death_defiance(mut self, equipped: bool) -> Self {
        self.death_defiance = equipped;
        self
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn effective_attack(&self) -> i32 {
        self.attack + self.buffs.total(BuffStat::Attack)
    }

    pub fn effective_defense(&self) -> i32 {
        self.defense + self.buffs.total(BuffStat::Defense)
    }

    /// Heal up to max HP; returns the amount actually restored
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp + amount.max(0)).min(self.max_hp);
        self.hp - before
    }

    pub fn restore_mp(&mut self, amount: i32) -> i32 {
        let before = self.mp;
        self.mp = (self.mp + amount.max(0)).min(self.max_mp);
        self.mp - before
    }
}

/// Value copy of the player taken when combat starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    stats: PlayerStats,
}

impl PlayerSnapshot {
    pub fn capture(player: &PlayerStats) -> Self {
        Self {
            stats: player.clone(),
        }
    }

    pub fn stats(&self) -> &PlayerStats {
        &self.stats
    }

    /// Put the player back exactly as captured
    pub fn restore(self, player: &mut PlayerStats) {
        *player = self.stats;
    }
}
