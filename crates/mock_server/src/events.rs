//! Synthetic server events for driving plugin listeners in tests
//!
//! Two small hierarchies are provided. [`PlayerEvent`] is the parent of
//! [`PlayerInteractEvent`] and [`PlayerJoinEvent`], and [`BlockEvent`] is the
//! parent of [`BlockBreakEvent`] and [`BlockPlaceEvent`]. A handler declared
//! for a parent also receives its children.

use harness_event_system::impl_event;
use std::fmt;

/// Integer block coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPosition {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for BlockPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// How a player interacted with the world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    LeftClickBlock,
    RightClickBlock,
    LeftClickAir,
    RightClickAir,
    /// Stepping onto or into something, such as a pressure plate
    Physical,
}

impl Action {
    pub fn is_left_click(self) -> bool {
        matches!(self, Self::LeftClickBlock | Self::LeftClickAir)
    }

    pub fn is_right_click(self) -> bool {
        matches!(self, Self::RightClickBlock | Self::RightClickAir)
    }
}

// ============================================================================
// Player Events
// ============================================================================

/// Base of every event caused by a player
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerEvent {
    pub player: String,
}

/// A player interacted with a block, with the air or physically
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerInteractEvent {
    pub player_event: PlayerEvent,
    pub action: Action,
    pub clicked_block: Option<BlockPosition>,
}

impl PlayerInteractEvent {
    pub fn new(player: impl Into<String>, action: Action) -> Self {
        Self {
            player_event: PlayerEvent {
                player: player.into(),
            },
            action,
            clicked_block: None,
        }
    }

    pub fn with_block(mut self, block: BlockPosition) -> Self {
        self.clicked_block = Some(block);
        self
    }

    pub fn player(&self) -> &str {
        &self.player_event.player
    }
}

/// A player joined the server
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerJoinEvent {
    pub player_event: PlayerEvent,
    pub join_message: Option<String>,
}

impl PlayerJoinEvent {
    pub fn new(player: impl Into<String>) -> Self {
        let player = player.into();
        Self {
            join_message: Some(format!("{player} joined the game")),
            player_event: PlayerEvent { player },
        }
    }

    pub fn player(&self) -> &str {
        &self.player_event.player
    }
}

// ============================================================================
// Block Events
// ============================================================================

/// Base of every event concerning a single block
#[derive(Debug, Clone, PartialEq)]
pub struct BlockEvent {
    pub position: BlockPosition,
    pub material: String,
}

/// A player broke a block
#[derive(Debug, Clone, PartialEq)]
pub struct BlockBreakEvent {
    pub block_event: BlockEvent,
    pub player: String,
    pub drop_items: bool,
}

impl BlockBreakEvent {
    pub fn new(player: impl Into<String>, position: BlockPosition, material: impl Into<String>) -> Self {
        Self {
            block_event: BlockEvent {
                position,
                material: material.into(),
            },
            player: player.into(),
            drop_items: true,
        }
    }
}

/// A player placed a block
#[derive(Debug, Clone, PartialEq)]
pub struct BlockPlaceEvent {
    pub block_event: BlockEvent,
    pub player: String,
    /// Block the new one was placed against
    pub placed_against: BlockPosition,
}

impl BlockPlaceEvent {
    pub fn new(
        player: impl Into<String>,
        position: BlockPosition,
        material: impl Into<String>,
        placed_against: BlockPosition,
    ) -> Self {
        Self {
            block_event: BlockEvent {
                position,
                material: material.into(),
            },
            player: player.into(),
            placed_against,
        }
    }
}

impl_event!(PlayerEvent);
impl_event!(PlayerInteractEvent: PlayerEvent => player_event);
impl_event!(PlayerJoinEvent: PlayerEvent => player_event);
impl_event!(BlockEvent);
impl_event!(BlockBreakEvent: BlockEvent => block_event);
impl_event!(BlockPlaceEvent: BlockEvent => block_event);
