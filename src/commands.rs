use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use digsite_core::BlockType;
use digsite_world::{MiningCursor, MiningInput, MiningOutcome, World};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CommandError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MineAction {
    Enter { wx: f32, wy: f32 },
    Left,
    Right,
    Dig { strength: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorldCommand {
    Help,
    /// Center the camera on a world-space point.
    Camera {
        x: f32,
        y: f32,
    },
    Select {
        player: String,
        tx: i32,
        ty: i32,
    },
    Dig {
        player: String,
        damage: f32,
    },
    Destroy {
        player: String,
    },
    Deselect {
        player: String,
    },
    Repair {
        tx: i32,
        ty: i32,
        amount: f32,
    },
    Spawn {
        x: Option<f32>,
    },
    Status {
        player: String,
    },
    InsertLayer {
        index: usize,
        block: BlockType,
        thickness: i32,
    },
    Mine {
        player: String,
        action: MineAction,
    },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub lines: Vec<String>,
}

/// World plus the per-player mining cursors driven by `mine` commands.
pub struct CommandSession {
    pub world: World,
    cursors: BTreeMap<String, MiningCursor>,
}

impl CommandSession {
    pub fn new(world: World) -> Self {
        Self {
            world,
            cursors: BTreeMap::new(),
        }
    }

    pub fn cursor(&self, player: &str) -> Option<&MiningCursor> {
        self.cursors.get(player)
    }
}

pub fn execute_command(session: &mut CommandSession, command: WorldCommand) -> CommandOutput {
    let mut out = CommandOutput::default();
    let world = &mut session.world;
    match command {
        WorldCommand::Help => {
            out.lines.push("Commands:".to_string());
            out.lines.push("  camera <x> <y>".to_string());
            out.lines.push("  select <player> <tx> <ty>".to_string());
            out.lines.push("  dig <player> <damage>".to_string());
            out.lines.push("  destroy <player> | deselect <player>".to_string());
            out.lines.push("  repair <tx> <ty> <amount>".to_string());
            out.lines.push("  spawn [x] | status <player>".to_string());
            out.lines.push("  layer <index> <block> <thickness>".to_string());
            out.lines
                .push("  mine <player> enter <wx> <wy> | left | right | dig <strength>".to_string());
        }
        WorldCommand::Camera { x, y } => {
            world.camera_mut().center_on(x, y);
            let camera = world.camera();
            out.lines.push(format!(
                "Camera scrolled to {:.1} {:.1}",
                camera.scroll_x, camera.scroll_y
            ));
        }
        WorldCommand::Select { player, tx, ty } => match world.select_tile(tx, ty, &player) {
            Some(tile) => out
                .lines
                .push(format!("{player} selected {} at {tx},{ty}", tile.block)),
            None => out.lines.push(format!("{player}: nothing to select at {tx},{ty}")),
        },
        WorldCommand::Dig { player, damage } => {
            let target = world.get_selected_tile(&player).copied();
            let done = world.dig_tile(&player, damage, false);
            out.lines.push(match (target, done) {
                (None, _) => format!("{player}: no tile selected"),
                (Some(tile), true) => format!("{player} broke {} at {}", tile.block, tile.pos()),
                (Some(tile), false) => {
                    let percent = world.mine().damage().damage_percent(tile.x, tile.y);
                    format!("{player} hit {} at {} ({percent:.0}%)", tile.block, tile.pos())
                }
            });
        }
        WorldCommand::Destroy { player } => {
            match world.get_selected_tile(&player).copied() {
                Some(tile) => {
                    world.dig_tile(&player, 0.0, true);
                    out.lines
                        .push(format!("{player} removed {} at {}", tile.block, tile.pos()));
                }
                None => out.lines.push(format!("{player}: no tile selected")),
            }
        }
        WorldCommand::Deselect { player } => {
            world.deselect_tile(&player);
            session.cursors.remove(&player);
            out.lines.push(format!("{player} deselected"));
        }
        WorldCommand::Repair { tx, ty, amount } => {
            if world.repair_tile(tx, ty, amount) {
                out.lines.push(format!("Repaired {tx},{ty} by {amount}"));
            } else {
                out.lines.push(format!("Tile {tx},{ty} is not damaged"));
            }
        }
        WorldCommand::Spawn { x } => {
            let (sx, sy) = world.get_valid_spawn_position(x);
            out.lines.push(format!("Spawn position {sx:.1} {sy:.1}"));
        }
        WorldCommand::Status { player } => {
            match world.get_selected_tile(&player) {
                Some(tile) => out
                    .lines
                    .push(format!("{player} has {} selected at {}", tile.block, tile.pos())),
                None => out.lines.push(format!("{player} has nothing selected")),
            }
            let totals = format!(
                "{} chunks loaded, {} damaged tiles",
                world.loaded_chunks().len(),
                world.mine().damage().len()
            );
            if let Some(cursor) = session.cursor(&player) {
                out.lines.push(format!(
                    "{player} is mining at {} (entered at {})",
                    cursor.position(),
                    cursor.origin()
                ));
            }
            out.lines.push(totals);
        }
        WorldCommand::InsertLayer {
            index,
            block,
            thickness,
        } => {
            if world.add_depth_layer_by_index(index, block, thickness) {
                out.lines
                    .push(format!("Inserted {thickness}-row {block} layer at index {index}"));
            } else {
                out.lines.push("Error: depth layer not inserted".to_string());
            }
        }
        WorldCommand::Mine { player, action } => {
            run_mine_action(session, &player, action, &mut out);
        }
    }
    out
}

fn run_mine_action(
    session: &mut CommandSession,
    player: &str,
    action: MineAction,
    out: &mut CommandOutput,
) {
    let world = &mut session.world;
    if let MineAction::Enter { wx, wy } = action {
        match MiningCursor::enter(world, player, wx, wy) {
            Some(cursor) => {
                out.lines
                    .push(format!("{player} started mining at {}", cursor.origin()));
                session.cursors.insert(player.to_string(), cursor);
            }
            None => {
                session.cursors.remove(player);
                out.lines
                    .push(format!("{player}: no ground under {wx:.1},{wy:.1}"));
            }
        }
        return;
    }

    let Some(cursor) = session.cursors.get_mut(player) else {
        out.lines.push(format!("{player} is not mining"));
        return;
    };
    let (input, strength) = match action {
        MineAction::Left => (MiningInput::Left, 0.0),
        MineAction::Right => (MiningInput::Right, 0.0),
        MineAction::Dig { strength } => (MiningInput::Dig, strength),
        MineAction::Enter { .. } => return,
    };
    match cursor.step(world, input, strength) {
        MiningOutcome::Hit => out.lines.push(format!("{player} hit {}", cursor.position())),
        MiningOutcome::Finished => {
            out.lines
                .push(format!("{player} finished mining at {}", cursor.position()));
            session.cursors.remove(player);
        }
        MiningOutcome::Moved(Some(tile)) => out
            .lines
            .push(format!("{player} moved to {} ({})", tile.pos(), tile.block)),
        MiningOutcome::Moved(None) => out
            .lines
            .push(format!("{player} moved to {} (empty)", cursor.position())),
        MiningOutcome::Blocked => out.lines.push(format!("{player} cannot reach further")),
    }
}

pub fn parse_command(input: &str) -> Result<WorldCommand, CommandError> {
    let input = input.trim();
    let input = input.strip_prefix('/').unwrap_or(input).trim();
    if input.is_empty() {
        return Ok(WorldCommand::Help);
    }

    let mut parts = input.split_whitespace();
    let cmd = parts
        .next()
        .ok_or_else(|| CommandError::new("Missing command"))?
        .to_ascii_lowercase();
    let args: Vec<&str> = parts.collect();

    match cmd.as_str() {
        "help" | "?" => Ok(WorldCommand::Help),
        "camera" | "cam" => {
            if args.len() != 2 {
                return Err(CommandError::new("Usage: camera <x> <y>"));
            }
            Ok(WorldCommand::Camera {
                x: parse_coordinate(args[0], "x")?,
                y: parse_coordinate(args[1], "y")?,
            })
        }
        "select" => {
            if args.len() != 3 {
                return Err(CommandError::new("Usage: select <player> <tx> <ty>"));
            }
            Ok(WorldCommand::Select {
                player: args[0].to_string(),
                tx: parse_number(args[1], "tile x")?,
                ty: parse_number(args[2], "tile y")?,
            })
        }
        "dig" => {
            if args.len() != 2 {
                return Err(CommandError::new("Usage: dig <player> <damage>"));
            }
            Ok(WorldCommand::Dig {
                player: args[0].to_string(),
                damage: parse_amount(args[1], "damage")?,
            })
        }
        "destroy" => Ok(WorldCommand::Destroy {
            player: single_player(&args, "Usage: destroy <player>")?,
        }),
        "deselect" => Ok(WorldCommand::Deselect {
            player: single_player(&args, "Usage: deselect <player>")?,
        }),
        "repair" => {
            if args.len() != 3 {
                return Err(CommandError::new("Usage: repair <tx> <ty> <amount>"));
            }
            Ok(WorldCommand::Repair {
                tx: parse_number(args[0], "tile x")?,
                ty: parse_number(args[1], "tile y")?,
                amount: parse_amount(args[2], "repair amount")?,
            })
        }
        "spawn" => match args.as_slice() {
            [] => Ok(WorldCommand::Spawn { x: None }),
            [x] => Ok(WorldCommand::Spawn {
                x: Some(parse_coordinate(x, "x")?),
            }),
            _ => Err(CommandError::new("Usage: spawn [x]")),
        },
        "status" => Ok(WorldCommand::Status {
            player: single_player(&args, "Usage: status <player>")?,
        }),
        "layer" => {
            if args.len() != 3 {
                return Err(CommandError::new("Usage: layer <index> <block> <thickness>"));
            }
            let block = BlockType::from_str(args[1])
                .map_err(|err| CommandError::new(err.to_string()))?;
            Ok(WorldCommand::InsertLayer {
                index: parse_number(args[0], "layer index")?,
                block,
                thickness: parse_number(args[2], "thickness")?,
            })
        }
        "mine" => parse_mine_command(&args),
        _ => Err(CommandError::new(format!("Unknown command: {cmd}. Try help"))),
    }
}

fn parse_mine_command(args: &[&str]) -> Result<WorldCommand, CommandError> {
    const USAGE: &str = "Usage: mine <player> enter <wx> <wy> | left | right | dig <strength>";
    let (player, rest) = args
        .split_first()
        .ok_or_else(|| CommandError::new(USAGE))?;
    let action = match rest {
        [sub, wx, wy] if sub.eq_ignore_ascii_case("enter") => MineAction::Enter {
            wx: parse_coordinate(wx, "x")?,
            wy: parse_coordinate(wy, "y")?,
        },
        [sub] if sub.eq_ignore_ascii_case("left") => MineAction::Left,
        [sub] if sub.eq_ignore_ascii_case("right") => MineAction::Right,
        [sub, strength] if sub.eq_ignore_ascii_case("dig") => MineAction::Dig {
            strength: parse_amount(strength, "strength")?,
        },
        _ => return Err(CommandError::new(USAGE)),
    };
    Ok(WorldCommand::Mine {
        player: player.to_string(),
        action,
    })
}

fn single_player(args: &[&str], usage: &str) -> Result<String, CommandError> {
    match args {
        [player] => Ok(player.to_string()),
        _ => Err(CommandError::new(usage)),
    }
}

fn parse_number<T: FromStr>(s: &str, what: &str) -> Result<T, CommandError> {
    s.trim()
        .parse::<T>()
        .map_err(|_| CommandError::new(format!("Invalid {what}: {s}")))
}

fn parse_coordinate(s: &str, what: &str) -> Result<f32, CommandError> {
    let value: f32 = parse_number(s, what)?;
    if !value.is_finite() {
        return Err(CommandError::new(format!("{what} must be a finite number")));
    }
    Ok(value)
}

fn parse_amount(s: &str, what: &str) -> Result<f32, CommandError> {
    let value: f32 = parse_number(s, what)?;
    if !value.is_finite() || value < 0.0 {
        return Err(CommandError::new(format!("{what} must be a non-negative number")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use digsite_world::{DepthLayerConfig, TerrainConfig, WorldConfig};

    /// Flat dirt from row 5 down, no ores.
    fn session() -> CommandSession {
        CommandSession::new(World::new(WorldConfig {
            seed: Some("commands".into()),
            world_width_tiles: 32,
            world_height_tiles: 64,
            terrain: TerrainConfig {
                surface_level: 5,
                surface_variation: 0,
                layer_variation: 0,
                layers: vec![DepthLayerConfig::open_ended(0, BlockType::Dirt)],
                ore_layers: Vec::new(),
                ..TerrainConfig::default()
            },
            ..WorldConfig::default()
        }))
    }

    fn run(session: &mut CommandSession, line: &str) -> Vec<String> {
        let command = parse_command(line).expect("command should parse");
        execute_command(session, command).lines
    }

    #[test]
    fn parses_world_commands() {
        assert_eq!(parse_command("").unwrap(), WorldCommand::Help);
        assert_eq!(
            parse_command("/select p1 3 -2").unwrap(),
            WorldCommand::Select {
                player: "p1".into(),
                tx: 3,
                ty: -2
            }
        );
        assert_eq!(
            parse_command("MINE p2 enter 10.5 64").unwrap(),
            WorldCommand::Mine {
                player: "p2".into(),
                action: MineAction::Enter { wx: 10.5, wy: 64.0 }
            }
        );
        assert_eq!(
            parse_command("layer 1 ruby 3").unwrap(),
            WorldCommand::InsertLayer {
                index: 1,
                block: BlockType::Ruby,
                thickness: 3
            }
        );
    }

    #[test]
    fn rejects_bad_arguments() {
        let err = parse_command("dig p1 -4").unwrap_err();
        assert!(err.to_string().contains("non-negative"), "{err}");
        assert!(parse_command("select p1 x 2").is_err());
        assert!(parse_command("mine p1 up").is_err());
        assert!(parse_command("layer 0 lava 2").is_err());
        let err = parse_command("teleport 1 2").unwrap_err();
        assert!(err.to_string().starts_with("Unknown command"), "{err}");
    }

    #[test]
    fn far_camera_commands_keep_running() {
        let err = parse_command("camera inf 0").unwrap_err();
        assert!(err.to_string().contains("finite"), "{err}");
        assert!(parse_command("mine p1 enter NaN 0").is_err());
        assert!(parse_command("spawn -inf").is_err());

        let mut session = session();
        run(&mut session, "camera 1e12 0");
        let report = session.world.update(0.0, 300.0);
        assert!(!report.unloaded.is_empty());
        run(&mut session, "camera 512 384");
        assert!(!session.world.update(300.0, 300.0).loaded.is_empty());
        assert!(run(&mut session, "select p1 4 5")[0].contains("selected dirt"));
    }

    #[test]
    fn select_dig_and_break() {
        let mut session = session();
        assert!(run(&mut session, "select p1 4 5")[0].contains("selected dirt"));
        assert!(run(&mut session, "dig p1 10")[0].contains("hit dirt"));
        assert!(run(&mut session, "dig p1 25")[0].contains("broke dirt"));
        assert_eq!(session.world.mine().get_tile_at(4, 5), None);
        assert!(run(&mut session, "dig p1 5")[0].contains("no tile selected"));
    }

    #[test]
    fn repair_reports_undamaged_tiles() {
        let mut session = session();
        run(&mut session, "select p1 6 8");
        run(&mut session, "dig p1 12");
        assert!(run(&mut session, "repair 6 8 5")[0].starts_with("Repaired"));
        assert!(run(&mut session, "repair 7 8 5")[0].contains("not damaged"));
    }

    #[test]
    fn mine_cursor_lifecycle() {
        let mut session = session();
        assert!(run(&mut session, "mine p1 left")[0].contains("not mining"));

        let lines = run(&mut session, "mine p1 enter 328 320");
        assert!(lines[0].contains("started mining at 5,5"), "{lines:?}");
        assert!(session.cursor("p1").is_some());

        assert!(run(&mut session, "mine p1 right")[0].contains("moved to 6,5"));
        assert!(run(&mut session, "mine p1 right")[0].contains("cannot reach"));
        assert!(run(&mut session, "mine p1 dig 10")[0].contains("hit 6,5"));
        let lines = run(&mut session, "mine p1 dig 10");
        assert!(lines[0].contains("finished mining"), "{lines:?}");
        assert!(session.cursor("p1").is_none());
        assert_eq!(session.world.mine().get_tile_at(6, 5), None);
    }

    #[test]
    fn status_reports_selection_and_cursor() {
        let mut session = session();
        assert_eq!(run(&mut session, "status p1")[0], "p1 has nothing selected");
        run(&mut session, "mine p1 enter 200 320");
        let lines = run(&mut session, "status p1");
        assert_eq!(lines[0], "p1 has dirt selected at 3,5");
        assert_eq!(lines[1], "p1 is mining at 3,5 (entered at 3,5)");
    }

    #[test]
    fn spawn_lands_on_surface() {
        let mut session = session();
        let lines = run(&mut session, "spawn 640");
        // Two-tile box above the surface at row 5.
        assert_eq!(lines, vec!["Spawn position 640.0 192.0".to_string()]);
    }
}
