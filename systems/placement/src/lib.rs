#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure placement system that turns player input into outline and commit commands.

use arrehab_core::{Command, Event, SurfacePoint};

/// Input snapshot distilled from the player tracker and placement controls.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlacementInput {
    /// Surface-space position the player currently stands on, if tracked.
    pub player_position: Option<SurfacePoint>,
    /// Indicates whether the player asked to rotate the board this frame.
    pub rotate_action: bool,
    /// Indicates whether the player confirmed the placement this frame.
    pub confirm_action: bool,
    /// Indicates whether the player cancelled the placement this frame.
    pub cancel_action: bool,
}

impl PlacementInput {
    /// Creates an input descriptor carrying only a player position.
    #[must_use]
    pub const fn at(player_position: Option<SurfacePoint>) -> Self {
        Self {
            player_position,
            rotate_action: false,
            confirm_action: false,
            cancel_action: false,
        }
    }
}

/// Placement system that translates tracked input into world commands.
///
/// Position reports are forwarded only when they change, so adapters may
/// poll the player tracker at any cadence. Commits are emitted only while
/// the most recent outline event reports a visible outline.
#[derive(Debug, Clone, Default)]
pub struct Placement {
    grid_ready: bool,
    outline_visible: bool,
    committed: bool,
    last_position: Option<SurfacePoint>,
}

impl Placement {
    /// Creates a new placement system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            grid_ready: false,
            outline_visible: false,
            committed: false,
            last_position: None,
        }
    }

    /// Reports whether the placement UI should offer the commit action.
    #[must_use]
    pub const fn can_commit(&self) -> bool {
        self.outline_visible && !self.committed
    }

    /// Reports whether a tile grid has been generated.
    #[must_use]
    pub const fn grid_ready(&self) -> bool {
        self.grid_ready
    }

    /// Reports whether the board was committed.
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        self.committed
    }

    /// Consumes world events and player input to emit placement commands.
    pub fn handle(&mut self, events: &[Event], input: PlacementInput, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::GridBuilt { .. } => self.grid_ready = true,
                Event::OutlineResolved { .. } => self.outline_visible = true,
                Event::OutlineCleared | Event::OutlineRejected { .. } => {
                    self.outline_visible = false;
                }
                Event::PlacementCommitted { .. } => self.committed = true,
                _ => {}
            }
        }

        if self.committed {
            return;
        }

        if input.cancel_action {
            self.last_position = None;
            out.push(Command::ClearOutline);
            return;
        }

        if input.player_position != self.last_position {
            self.last_position = input.player_position;
            out.push(Command::OccupyTile {
                position: input.player_position,
            });
        }

        if input.rotate_action {
            out.push(Command::RotateBoard);
        }

        if input.confirm_action && self.outline_visible && !input.rotate_action {
            out.push(Command::CommitPlacement);
        }
    }
}
