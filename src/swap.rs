//! Tileset hot-swap protocol: generation-tagged load tickets so only the
//! most recently requested load can ever be adopted.

use log::{info, warn};
use std::time::{SystemTime, UNIX_EPOCH};

/// A pending tileset load issued by [`TilesetSwap::begin`].
#[derive(Debug, Clone)]
pub struct SwapTicket {
    /// Unique key the image should be loaded under.
    pub key: String,
    generation: u64,
}

impl SwapTicket {
    /// Generation this ticket was issued at.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Result of completing a tileset load.
#[derive(Debug, PartialEq, Eq)]
pub enum SwapOutcome {
    /// The ticket was current: its key is now the active tileset.
    Adopted {
        /// Previous key, handed back for release when disposal is on;
        /// `None` means the resource stays loaded (the default).
        replaced: Option<String>,
    },
    /// A newer swap superseded this ticket; the key was never adopted and
    /// the host should discard whatever it loaded under it.
    Stale {
        /// The never-adopted key.
        key: String,
    },
}

/// Tracks the active tileset key across hot-swaps.
///
/// Every [`begin`](TilesetSwap::begin) bumps a generation counter and mints
/// a fresh key, so a replacement image never overwrites the previous
/// resource. Whether the previous resource is released on adoption is a
/// policy choice: the default retains it, which keeps switching back to an
/// earlier tileset possible.
#[derive(Debug)]
pub struct TilesetSwap {
    current: String,
    generation: u64,
    dispose_replaced: bool,
}

impl TilesetSwap {
    /// Swap manager starting at `initial`.
    pub fn new(initial: impl Into<String>) -> Self {
        TilesetSwap {
            current: initial.into(),
            generation: 0,
            dispose_replaced: false,
        }
    }

    /// Hands replaced keys back for release on adoption instead of
    /// retaining them.
    pub fn dispose_replaced(mut self, dispose: bool) -> Self {
        self.dispose_replaced = dispose;
        self
    }

    /// Currently adopted tileset key.
    pub fn current_key(&self) -> &str {
        &self.current
    }

    /// Starts a swap: mints a unique key and invalidates earlier tickets.
    pub fn begin(&mut self) -> SwapTicket {
        self.generation += 1;
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let key = format!("tileset-{}-{}", self.generation, nanos);
        info!("tileset swap {} started under key '{key}'", self.generation);
        SwapTicket {
            key,
            generation: self.generation,
        }
    }

    /// Completes a load: adopts the ticket's key if it is still the latest.
    pub fn complete(&mut self, ticket: SwapTicket) -> SwapOutcome {
        if ticket.generation != self.generation {
            warn!(
                "discarding stale tileset load '{}' (generation {} superseded by {})",
                ticket.key, ticket.generation, self.generation
            );
            return SwapOutcome::Stale { key: ticket.key };
        }
        let replaced = std::mem::replace(&mut self.current, ticket.key);
        info!("tileset '{}' adopted, replacing '{replaced}'", self.current);
        SwapOutcome::Adopted {
            replaced: self.dispose_replaced.then_some(replaced),
        }
    }
}
