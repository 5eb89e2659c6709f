//! Demo driver: simulates a small flat world and prints the packets it emits.
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glam::DVec3;
use log::info;
use serde::Serialize;
use voxsim::items::{ToolKind, ToolMaterial};
use voxsim::{
    init_logging, BlockFace, BlockGrid, BlockPos, BlockType, ChunkCoord, ClientId, Entity,
    EntityId, EntityKind, EntityPacket, Equipment, Item, ItemStack, MinecartKind, NoHooks,
    PlayerState, SimConfig, SimContext, WorldEvents, WorldHandle,
};

/// Runs a scripted scenario in a flat world and prints every packet the
/// simulation emits as a JSON line.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML file overriding the simulation thresholds
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of 50 ms ticks to simulate
    #[arg(short, long, default_value_t = 100)]
    ticks: u64,
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

const TICK_MS: f64 = 50.0;
const FLOOR_Y: i32 = 63;
const ATTACK_EVERY: u64 = 20;

/// Collects the packets of one tick so they can be written out afterwards.
#[derive(Default)]
struct Outbox {
    age: u64,
    packets: Vec<(EntityPacket, Option<ClientId>)>,
}

impl WorldEvents for Outbox {
    fn world_age(&self) -> u64 {
        self.age
    }

    fn broadcast(&mut self, packet: EntityPacket, exclude: Option<ClientId>) {
        self.packets.push((packet, exclude));
    }

    fn spawn_item_pickups(&mut self, items: &[ItemStack], position: DVec3) {
        info!("{} item stacks dropped at {position}", items.len());
    }
}

#[derive(Serialize)]
struct Line<'a> {
    tick: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    exclude: Option<ClientId>,
    #[serde(flatten)]
    packet: &'a EntityPacket,
}

struct Scenario {
    world: WorldHandle,
    grid: BlockGrid,
    player: EntityId,
    mob: EntityId,
}

fn flat_world() -> BlockGrid {
    let mut grid = BlockGrid::new();
    for x in -1..=1 {
        for z in -1..=1 {
            let chunk = ChunkCoord::new(x, z);
            grid.load_chunk(chunk);
            grid.fill_layer(chunk, FLOOR_Y, BlockType::Stone);
        }
    }
    grid.set_block(BlockPos::new(2, FLOOR_Y + 1, 2), BlockType::Rail);
    grid
}

fn setup(ctx: &mut SimContext<'_>) -> Result<Scenario> {
    let grid = flat_world();
    let mut world = WorldHandle::new();

    let avatar = Entity::new(
        EntityKind::Player(PlayerState {
            client: Some(ClientId(1)),
            ..PlayerState::default()
        }),
        DVec3::new(0.5, f64::from(FLOOR_Y + 1), 0.5),
    )
    .with_equipment(Equipment {
        held: Some(ItemStack::single(Item::Tool {
            kind: ToolKind::Sword,
            material: ToolMaterial::Iron,
        })),
        ..Equipment::default()
    });
    let player = world.spawn(avatar, ctx)?;
    let mob = world.spawn(Entity::new(EntityKind::mob(), DVec3::new(3.5, 70.0, 3.5)), ctx)?;

    let placed = world.use_minecart_item(
        player,
        Item::Minecart(MinecartKind::Plain),
        BlockPos::new(2, FLOOR_Y + 1, 2),
        Some(BlockFace::Top),
        &grid,
        ctx,
    )?;
    info!("minecart placement: {placed:?}");

    Ok(Scenario {
        world,
        grid,
        player,
        mob,
    })
}

fn flush(out: &mut impl Write, outbox: &mut Outbox) -> Result<()> {
    for (packet, exclude) in outbox.packets.drain(..) {
        let line = Line {
            tick: outbox.age,
            exclude,
            packet: &packet,
        };
        writeln!(out, "{}", serde_json::to_string(&line)?)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = args.config.as_deref().map_or_else(
        || Ok(SimConfig::default()),
        |path| {
            SimConfig::load(path)
                .with_context(|| format!("loading config from {}", path.display()))
        },
    )?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut outbox = Outbox::default();
    let mut hooks = NoHooks;

    let mut scenario = {
        let mut ctx = SimContext::new(&mut outbox, &mut hooks, &config);
        setup(&mut ctx)?
    };
    flush(&mut out, &mut outbox)?;

    for tick in 1..=args.ticks {
        outbox.age = tick;
        {
            let mut ctx = SimContext::new(&mut outbox, &mut hooks, &config);
            scenario.world.tick(TICK_MS, &scenario.grid, &mut ctx);
            if tick % ATTACK_EVERY == 0 {
                let outcome = scenario
                    .world
                    .attack(scenario.player, scenario.mob, &mut ctx)?;
                info!("tick {tick}: attack on {} -> {outcome:?}", scenario.mob);
            }
            scenario.world.broadcast_movement_updates(&mut ctx);
        }
        flush(&mut out, &mut outbox)?;
    }

    {
        let mut ctx = SimContext::new(&mut outbox, &mut hooks, &config);
        let released = scenario.world.shutdown(&mut ctx);
        info!("released {released} entities");
    }
    flush(&mut out, &mut outbox)?;
    out.flush()?;
    Ok(())
}
