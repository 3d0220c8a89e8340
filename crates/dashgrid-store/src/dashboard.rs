//! Compacting dashboard session.
//!
//! [`Dashboard`] is the explicit state object that sits between a UI and the
//! compactor. It owns the current layout, re-compacts after every toggle,
//! drag, resize, or column change, and persists each result through a
//! [`LayoutStore`]. The compactor itself stays a pure function.

use dashgrid_layout::{
    Compactor, GridRect, Layout, LayoutError, LayoutItem, PlacementTable, merge_visible, reflow,
};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::snapshot::{LayoutSnapshot, StoreKey};
use crate::store::LayoutStore;

/// How a dashboard is seeded.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub placements: PlacementTable,
    /// Card catalogue. Empty means "every card in `placements`".
    pub cards: Vec<String>,
    pub columns: u16,
    pub compactor: Compactor,
}

impl DashboardConfig {
    #[must_use]
    pub fn new(placements: PlacementTable, columns: u16) -> Self {
        Self {
            placements,
            cards: Vec::new(),
            columns,
            compactor: Compactor::new(),
        }
    }

    #[must_use]
    pub fn cards<I, S>(mut self, cards: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cards = cards.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn compactor(mut self, compactor: Compactor) -> Self {
        self.compactor = compactor;
        self
    }

    fn catalogue(&self) -> Vec<String> {
        if self.cards.is_empty() {
            return self.placements.card_ids();
        }
        let mut seen = FxHashSet::default();
        self.cards
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect()
    }
}

#[derive(Debug)]
pub struct Dashboard<S: LayoutStore> {
    store: S,
    key: StoreKey,
    placements: PlacementTable,
    cards: Vec<String>,
    compactor: Compactor,
    columns: u16,
    layout: Layout,
}

impl<S: LayoutStore> Dashboard<S> {
    /// Open the dashboard saved under `key`, or seed it from defaults.
    ///
    /// A saved layout is merged with the current catalogue: cards that no
    /// longer exist are dropped and the layout is reflowed onto
    /// `config.columns`. With nothing saved, every catalogue card is shown at
    /// its default placement. The opened layout is saved straight back.
    pub fn open(store: S, key: StoreKey, config: DashboardConfig) -> Result<Self> {
        if config.columns == 0 {
            return Err(LayoutError::ZeroColumns.into());
        }
        let cards = config.catalogue();
        let layout = match store.load(&key)? {
            Some(snapshot) => {
                let known: FxHashSet<&str> = cards.iter().map(String::as_str).collect();
                let visible: Vec<&str> = snapshot
                    .items
                    .ids()
                    .filter(|id| known.contains(id))
                    .collect();
                debug!(key = %key, saved = snapshot.items.len(), visible = visible.len(), "restoring dashboard");
                merge_visible(
                    &snapshot.items,
                    &visible,
                    &config.placements,
                    config.columns,
                    &config.compactor,
                )?
            }
            None => {
                debug!(key = %key, cards = cards.len(), "seeding dashboard from defaults");
                let seed = config
                    .placements
                    .default_layout(config.columns, cards.iter().map(String::as_str));
                config.compactor.run(&seed, config.columns)?.layout
            }
        };

        let mut dashboard = Self {
            store,
            key,
            placements: config.placements,
            cards,
            compactor: config.compactor,
            columns: config.columns,
            layout,
        };
        dashboard.save()?;
        Ok(dashboard)
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn columns(&self) -> u16 {
        self.columns
    }

    pub fn key(&self) -> &StoreKey {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every card the dashboard knows about, visible or not.
    pub fn cards(&self) -> &[String] {
        &self.cards
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.layout.contains(id)
    }

    /// Show or hide a card. Returns whether anything changed.
    pub fn set_visible(&mut self, id: &str, visible: bool) -> Result<bool> {
        if !self.cards.iter().any(|card| card == id) {
            return Err(StoreError::UnknownCard { id: id.to_string() });
        }
        if visible == self.is_visible(id) {
            return Ok(false);
        }
        if visible {
            let mut ids: Vec<&str> = self.layout.ids().collect();
            ids.push(id);
            let merged = merge_visible(
                &self.layout,
                &ids,
                &self.placements,
                self.columns,
                &self.compactor,
            )?;
            self.layout = merged;
            self.save()?;
        } else {
            let mut layout = self.layout.clone();
            layout.remove(id);
            self.commit(layout)?;
        }
        debug!(id, visible, "card visibility changed");
        Ok(true)
    }

    /// Drop a card at `(x, y)`.
    ///
    /// Cards under the drop target are pushed below it first, so the moved
    /// card keeps the spot it was dropped on unless there is room above.
    pub fn move_card(&mut self, id: &str, x: i32, y: i32) -> Result<()> {
        let mut layout = self.layout.clone();
        let target = {
            let item = visible_item(&mut layout, id)?;
            item.x = x;
            item.y = y;
            item.rect()
        };
        push_below(&mut layout, id, target);
        self.commit(layout)?;
        debug!(id, x, y, "card moved");
        Ok(())
    }

    /// Resize a card. Width is clamped to its `minW`/`maxW` and the grid.
    pub fn resize_card(&mut self, id: &str, w: i32, h: i32) -> Result<()> {
        let columns = i32::from(self.columns);
        let mut layout = self.layout.clone();
        let target = {
            let item = visible_item(&mut layout, id)?;
            let mut width = w;
            if let Some(max) = item.max_w {
                width = width.min(max);
            }
            if let Some(min) = item.min_w {
                width = width.max(min);
            }
            item.w = width.clamp(1, columns);
            item.h = h.max(1);
            item.x = item.x.clamp(0, columns - item.w);
            item.rect()
        };
        push_below(&mut layout, id, target);
        self.commit(layout)?;
        debug!(id, w, h, "card resized");
        Ok(())
    }

    /// Switch to a new column count, reflowing widths to fit.
    pub fn set_columns(&mut self, columns: u16) -> Result<()> {
        if columns == 0 {
            return Err(LayoutError::ZeroColumns.into());
        }
        let layout = reflow(&self.layout, columns);
        self.columns = columns;
        self.commit(layout)?;
        debug!(columns, "column count changed");
        Ok(())
    }

    /// Put every visible card back at its default placement.
    pub fn reset(&mut self) -> Result<()> {
        let ids: Vec<String> = self.layout.ids().map(str::to_string).collect();
        let seed = self
            .placements
            .default_layout(self.columns, ids.iter().map(String::as_str));
        self.commit(seed)
    }

    fn commit(&mut self, layout: Layout) -> Result<()> {
        self.layout = self.compactor.run(&layout, self.columns)?.layout;
        self.save()
    }

    fn save(&mut self) -> Result<()> {
        let snapshot = LayoutSnapshot::new(&self.key, self.columns, self.layout.clone());
        self.store.save(&self.key, &snapshot)
    }
}

fn visible_item<'a>(layout: &'a mut Layout, id: &str) -> Result<&'a mut LayoutItem> {
    layout
        .get_mut(id)
        .ok_or_else(|| StoreError::UnknownCard { id: id.to_string() })
}

/// Move every card other than `id` that intersects `target` to just below it.
fn push_below(layout: &mut Layout, id: &str, target: GridRect) {
    let ids: Vec<String> = layout
        .iter()
        .filter(|item| item.id != id && item.rect().intersects(&target))
        .map(|item| item.id.clone())
        .collect();
    let below = target.y.saturating_add(target.h);
    for other in ids {
        if let Some(item) = layout.get_mut(&other) {
            item.y = below;
        }
    }
}
