use arrehab_core::{Command, Event, Facing, OutlineError, SurfaceExtent, SurfacePoint, TileIndex};
use arrehab_system_placement::{Placement, PlacementInput};
use arrehab_world::{self as world, query, Phase, World};

fn resolved() -> Event {
    Event::OutlineResolved {
        center: TileIndex::new(4, 4),
        facing: Facing::North,
        tiles: vec![TileIndex::new(3, 2)],
    }
}

#[test]
fn position_changes_emit_occupy_commands() {
    let mut placement = Placement::default();
    let mut commands = Vec::new();
    let position = Some(SurfacePoint::new(0.25, 0.25));

    placement.handle(&[], PlacementInput::at(position), &mut commands);
    placement.handle(&[], PlacementInput::at(position), &mut commands);

    assert_eq!(
        commands,
        vec![Command::OccupyTile { position }],
        "unchanged positions must not be forwarded twice",
    );
}

#[test]
fn leaving_the_grid_forwards_missing_position() {
    let mut placement = Placement::default();
    let mut commands = Vec::new();

    placement.handle(
        &[],
        PlacementInput::at(Some(SurfacePoint::new(0.25, 0.25))),
        &mut commands,
    );
    commands.clear();
    placement.handle(&[], PlacementInput::at(None), &mut commands);

    assert_eq!(commands, vec![Command::OccupyTile { position: None }]);
}

#[test]
fn confirm_emits_commit_when_outline_visible() {
    let mut placement = Placement::default();
    let mut commands = Vec::new();

    placement.handle(
        &[resolved()],
        PlacementInput {
            confirm_action: true,
            ..PlacementInput::default()
        },
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![Command::CommitPlacement],
        "placement should commit a visible outline",
    );
}

#[test]
fn confirm_ignored_after_outline_rejected() {
    let mut placement = Placement::default();
    let mut commands = Vec::new();

    placement.handle(
        &[
            resolved(),
            Event::OutlineRejected {
                reason: OutlineError::InvalidCenter,
            },
        ],
        PlacementInput {
            confirm_action: true,
            ..PlacementInput::default()
        },
        &mut commands,
    );

    assert!(commands.is_empty(), "rejected outline must not be committed");
    assert!(!placement.can_commit());
}

#[test]
fn rotate_emits_rotation_command() {
    let mut placement = Placement::default();
    let mut commands = Vec::new();

    placement.handle(
        &[resolved()],
        PlacementInput {
            rotate_action: true,
            confirm_action: true,
            ..PlacementInput::default()
        },
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![Command::RotateBoard],
        "a rotation supersedes a commit issued in the same frame",
    );
}

#[test]
fn cancel_clears_outline_and_resets_position() {
    let mut placement = Placement::default();
    let mut commands = Vec::new();
    let position = Some(SurfacePoint::new(0.25, 0.25));
    placement.handle(&[], PlacementInput::at(position), &mut commands);
    commands.clear();

    placement.handle(
        &[],
        PlacementInput {
            player_position: position,
            cancel_action: true,
            ..PlacementInput::default()
        },
        &mut commands,
    );
    placement.handle(&[], PlacementInput::at(position), &mut commands);

    assert_eq!(
        commands,
        vec![Command::ClearOutline, Command::OccupyTile { position }]
    );
}

#[test]
fn system_goes_quiet_after_commit() {
    let mut world = World::default();
    let mut placement = Placement::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ReportSurface {
            extent: SurfaceExtent::new(5.0, 5.0),
            center: SurfacePoint::ORIGIN,
        },
        &mut events,
    );

    let frames = [
        PlacementInput::at(Some(SurfacePoint::new(0.25, 0.25))),
        PlacementInput {
            player_position: Some(SurfacePoint::new(0.25, 0.25)),
            confirm_action: true,
            ..PlacementInput::default()
        },
        PlacementInput {
            player_position: Some(SurfacePoint::new(-1.25, 0.75)),
            rotate_action: true,
            ..PlacementInput::default()
        },
    ];

    for input in frames {
        let mut commands = Vec::new();
        placement.handle(&events, input, &mut commands);
        events.clear();
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
    }
    placement.handle(&events, PlacementInput::default(), &mut Vec::new());

    assert!(placement.grid_ready());
    assert!(placement.is_committed());
    assert_eq!(query::phase(&world), Phase::Committed);
    let committed = query::placement(&world).expect("placement committed");
    assert_eq!(committed.facing, Facing::North);
    assert_eq!(committed.tiles.len(), 12);
}
