#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the ARrehab placement engine.
//!
//! The adapter scripts a scanning session: it reports a growing floor surface,
//! walks the player across the resulting grid, optionally rotates and commits
//! the board, and prints a text rendering of the tiles after every step.

mod config;
mod placement_transfer;

use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use arrehab_core::{
    BoardDimensions, CellSize, Command, Event, Facing, Placement, PlacementConfig, SurfaceExtent,
    SurfacePoint, TileAppearance,
};
use arrehab_rendering::{Color, Palette, TileRenderer, TileScene};
use arrehab_system_board::{BoardConstruction, GameBoard, Minigame};
use arrehab_system_placement::{Placement as PlacementSystem, PlacementInput};
use arrehab_world::{self as world, query, World};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::{info, warn};
use placement_transfer::PlacementSnapshot;

/// Scripted scanning session for the ARrehab board placement engine.
#[derive(Debug, Parser)]
#[command(name = "arrehab", version)]
struct CliArgs {
    /// TOML or JSON file providing the placement configuration.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Overrides the tile edge length in meters.
    #[arg(long, value_name = "METERS")]
    cell_size: Option<f32>,

    /// Overrides the board size in tiles.
    #[arg(long, value_name = "WIDTHxDEPTH", value_parser = parse_board)]
    board: Option<BoardDimensions>,

    /// Surface extents reported in order, simulating a growing scan.
    #[arg(
        long = "surface",
        value_name = "WIDTHxDEPTH",
        value_parser = parse_extent,
        default_value = "5x5"
    )]
    surfaces: Vec<SurfaceExtent>,

    /// World-space anchor of the scanned surface.
    #[arg(long, value_name = "X,Z", value_parser = parse_point, default_value = "0,0")]
    anchor: SurfacePoint,

    /// Facing the board starts with.
    #[arg(long, value_enum, default_value_t = FacingArg::North)]
    facing: FacingArg,

    /// Player positions visited in order, relative to the surface anchor.
    #[arg(long = "walk", value_name = "X,Z", value_parser = parse_point)]
    walk: Vec<SurfacePoint>,

    /// Number of quarter turns applied after the walk.
    #[arg(long, default_value_t = 0)]
    rotate: u32,

    /// Confirms the final outline as the game board.
    #[arg(long)]
    commit: bool,

    /// Minigames assigned to the board corners.
    #[arg(long, value_enum, value_delimiter = ',', default_value = "trace")]
    games: Vec<GameArg>,

    /// Shuffles the minigame order with the provided seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Rebuilds a board from a previously exported placement string instead of scanning.
    #[arg(long, value_name = "STRING")]
    import: Option<String>,

    /// Enables debug logging.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FacingArg {
    North,
    East,
    South,
    West,
}

impl From<FacingArg> for Facing {
    fn from(value: FacingArg) -> Self {
        match value {
            FacingArg::North => Facing::North,
            FacingArg::East => Facing::East,
            FacingArg::South => Facing::South,
            FacingArg::West => Facing::West,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum GameArg {
    Movement,
    Trace,
}

impl From<GameArg> for Minigame {
    fn from(value: GameArg) -> Self {
        match value {
            GameArg::Movement => Minigame::Movement,
            GameArg::Trace => Minigame::Trace,
        }
    }
}

/// Entry point for the ARrehab command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    let games: Vec<Minigame> = args.games.iter().copied().map(Minigame::from).collect();
    let mut construction = BoardConstruction::new(games);
    if let Some(seed) = args.seed {
        construction = construction.with_seed(seed);
    }

    let stdout = io::stdout();
    let mut renderer = TextRenderer::new(stdout.lock());

    if let Some(encoded) = &args.import {
        let placement = PlacementSnapshot::decode(encoded)
            .context("failed to import placement")?
            .into_placement();
        let board = construction
            .handle(&[Event::PlacementCommitted { placement }])
            .context("imported placement did not produce a board")?;
        return renderer.describe_board(board);
    }

    let config = resolve_config(&args)?;
    let mut session = Session::new(config, construction)?;
    let palette = Palette::default();

    for extent in &args.surfaces {
        session.dispatch(Command::ReportSurface {
            extent: *extent,
            center: args.anchor,
        })?;
        session.frame(PlacementInput::at(session.position))?;
        renderer.heading(&format!(
            "surface {}x{} m",
            extent.width(),
            extent.depth()
        ))?;
        renderer.present(&session.scene, &palette)?;
    }

    let facing = Facing::from(args.facing);
    if facing != query::facing(&session.world) {
        session.dispatch(Command::SetFacing { facing })?;
    }

    for point in &args.walk {
        session.frame(PlacementInput::at(Some(*point)))?;
        renderer.heading(&format!("player at ({}, {})", point.x(), point.z()))?;
        renderer.present(&session.scene, &palette)?;
    }

    for _ in 0..args.rotate {
        session.frame(PlacementInput {
            player_position: session.position,
            rotate_action: true,
            ..PlacementInput::default()
        })?;
        renderer.heading(&format!("facing {:?}", query::facing(&session.world)))?;
        renderer.present(&session.scene, &palette)?;
    }

    if args.commit {
        session.frame(PlacementInput {
            player_position: session.position,
            confirm_action: true,
            ..PlacementInput::default()
        })?;
        // Deliver the commit outcome to the placement system.
        session.frame(PlacementInput::at(session.position))?;

        match query::placement(&session.world) {
            Some(placement) => {
                renderer.heading("committed board")?;
                renderer.present(&session.scene, &palette)?;
                renderer.export(placement)?;
                if let Some(board) = session.construction.board() {
                    renderer.describe_board(board)?;
                }
            }
            None => warn!("no outline was visible; the board was not committed"),
        }
    }

    Ok(())
}

fn resolve_config(args: &CliArgs) -> Result<PlacementConfig> {
    let mut config = match &args.config {
        Some(path) => config::load(path)?,
        None => PlacementConfig::default(),
    };
    if let Some(size) = args.cell_size {
        config.cell_size = CellSize::new(size, size);
    }
    if let Some(board) = args.board {
        config.board = board;
    }
    config.validate().context("invalid placement configuration")?;
    Ok(config)
}

/// Scripted session wiring the world to its systems and the scene.
struct Session {
    world: World,
    placement: PlacementSystem,
    construction: BoardConstruction,
    scene: TileScene,
    pending: Vec<Event>,
    position: Option<SurfacePoint>,
}

impl Session {
    fn new(config: PlacementConfig, construction: BoardConstruction) -> Result<Self> {
        let world = World::new(config).context("invalid placement configuration")?;
        info!(
            "placing a {}x{} board on {}x{} m tiles",
            config.board.width(),
            config.board.depth(),
            config.cell_size.width(),
            config.cell_size.depth()
        );
        Ok(Self {
            world,
            placement: PlacementSystem::new(),
            construction,
            scene: TileScene::new(),
            pending: Vec::new(),
            position: None,
        })
    }

    fn dispatch(&mut self, command: Command) -> Result<()> {
        let mut emitted = Vec::new();
        world::apply(&mut self.world, command, &mut emitted);
        self.scene
            .apply(&emitted)
            .context("scene fell out of sync with the world")?;
        let _ = self.construction.handle(&emitted);
        self.pending.extend(emitted);
        Ok(())
    }

    fn frame(&mut self, input: PlacementInput) -> Result<()> {
        self.position = input.player_position;
        let events = std::mem::take(&mut self.pending);
        let mut commands = Vec::new();
        self.placement.handle(&events, input, &mut commands);
        for command in commands {
            self.dispatch(command)?;
        }
        Ok(())
    }
}

/// Renders the tile scene as text, one glyph per tile.
struct TextRenderer<W> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    fn new(out: W) -> Self {
        Self { out }
    }

    fn heading(&mut self, title: &str) -> Result<()> {
        writeln!(self.out, "== {title}")?;
        Ok(())
    }

    fn export(&mut self, placement: &Placement) -> Result<()> {
        let encoded = PlacementSnapshot::capture(placement)
            .encode()
            .context("failed to export placement")?;
        writeln!(self.out, "export: {encoded}")?;
        Ok(())
    }

    fn describe_board(&mut self, board: &GameBoard) -> Result<()> {
        writeln!(
            self.out,
            "board of {} tiles facing {:?}, centered on tile ({}, {})",
            board.tiles().count(),
            board.facing(),
            board.center().tile.column(),
            board.center().tile.row()
        )?;
        for corner in board.corners() {
            let game = board
                .game_at(corner)
                .map_or_else(|| "none".to_owned(), |game| format!("{game:?}"));
            writeln!(
                self.out,
                "  corner ({}, {}): {game}",
                corner.column(),
                corner.row()
            )?;
        }
        Ok(())
    }
}

impl<W: Write> TileRenderer for TextRenderer<W> {
    fn present(&mut self, scene: &TileScene, palette: &Palette) -> Result<()> {
        let (columns, rows) = scene.dimensions();
        if scene.tiles().next().is_none() {
            writeln!(self.out, "(no grid)")?;
            return Ok(());
        }

        // Column 0 lies on the +x edge, so columns are drawn right to left.
        for row in 0..rows {
            let line: String = (0..columns)
                .rev()
                .map(|column| {
                    scene
                        .tile(arrehab_core::TileIndex::new(column, row))
                        .map_or(' ', |tile| glyph(tile.appearance))
                })
                .collect();
            writeln!(self.out, "{line}")?;
        }

        for appearance in [
            TileAppearance::Plain,
            TileAppearance::Outline,
            TileAppearance::Placed,
        ] {
            let count = scene.count(appearance);
            if count > 0 {
                writeln!(
                    self.out,
                    "  {} {:?} x{count} {}",
                    glyph(appearance),
                    appearance,
                    hex(palette.color_for(appearance))
                )?;
            }
        }
        Ok(())
    }
}

const fn glyph(appearance: TileAppearance) -> char {
    match appearance {
        TileAppearance::Plain => '.',
        TileAppearance::Outline => '#',
        TileAppearance::Placed => '@',
    }
}

fn hex(color: Color) -> String {
    let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}{:02x}",
        channel(color.red),
        channel(color.green),
        channel(color.blue),
        channel(color.alpha)
    )
}

fn parse_pair(value: &str, separators: &[char]) -> Result<(f32, f32), String> {
    let (first, second) = value
        .split_once(separators)
        .ok_or_else(|| format!("expected two numbers, got '{value}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f32>()
            .map_err(|error| format!("'{part}' is not a number: {error}"))
    };
    Ok((parse(first)?, parse(second)?))
}

fn parse_extent(value: &str) -> Result<SurfaceExtent, String> {
    let (width, depth) = parse_pair(value, &['x', 'X'])?;
    if width < 0.0 || depth < 0.0 {
        return Err(format!("surface extent '{value}' must not be negative"));
    }
    Ok(SurfaceExtent::new(width, depth))
}

fn parse_point(value: &str) -> Result<SurfacePoint, String> {
    let (x, z) = parse_pair(value, &[','])?;
    Ok(SurfacePoint::new(x, z))
}

fn parse_board(value: &str) -> Result<BoardDimensions, String> {
    let (width, depth) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxDEPTH, got '{value}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<u32>()
            .map_err(|error| format!("'{part}' is not a tile count: {error}"))
    };
    Ok(BoardDimensions::new(parse(width)?, parse(depth)?))
}
