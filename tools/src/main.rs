//! shift-runner: headless runner for the restaurant floor simulation.
//!
//! Usage:
//!   shift-runner --seed 12345 --frames 10800 --fps 60
//!   shift-runner --seed 12345 --bot --auto-continue --db shift.db
//!   shift-runner --seed 12345 --ipc-mode

use anyhow::{Context, Result};
use spillshift_core::{
    command::PlayerCommand,
    engine::SimEngine,
    event::{DayPhase, DirtinessTier},
    store::SimStore,
    types::{Seconds, Tick},
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Tick {
        count: u64,
    },
    Command {
        command: PlayerCommand,
    },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    tick: Tick,
    paused: bool,
    day: u32,
    phase: DayPhase,
    waiting_for_continue: bool,
    game_over: bool,
    tier: DirtinessTier,
    spills: u32,
    strikes: u32,
    reputation: u32,
    active_customers: u32,
    combo_streak: u32,
    combo_multiplier: f64,
    coins: u32,
    broom_uses_left: u32,
}

/// Knobs for the non-interactive run.
struct RunOptions {
    frames: u64,
    frame_delta: Seconds,
    auto_continue: bool,
    bot: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let frames = parse_arg(&args, "--frames", 10_800u64);
    let fps = parse_arg(&args, "--fps", 60.0f64).max(1.0);
    let ipc_mode = has_flag(&args, "--ipc-mode");
    let db = str_arg(&args, "--db").unwrap_or(":memory:");
    let data_dir = str_arg(&args, "--data-dir").unwrap_or("./data");

    if !ipc_mode {
        println!("Spill Shift — shift-runner");
        println!("  seed:      {seed}");
        println!("  frames:    {frames} @ {fps} fps");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!();
    }

    let store = if db == ":memory:" { SimStore::in_memory()? } else { SimStore::open(db)? };
    store.migrate()?;

    let run_id = format!("run-{seed}-{}", chrono::Utc::now().format("%Y%m%dT%H%M%S"));
    store.insert_run(&run_id, seed, env!("CARGO_PKG_VERSION"))?;

    let mut engine = SimEngine::build(run_id.clone(), seed, store, data_dir)
        .with_context(|| format!("Cannot start session from {data_dir}"))?;

    if ipc_mode {
        run_ipc_loop(&mut engine, 1.0 / fps)?;
    } else {
        let options = RunOptions {
            frames,
            frame_delta: 1.0 / fps,
            auto_continue: has_flag(&args, "--auto-continue"),
            bot: has_flag(&args, "--bot"),
        };
        run_headless(&mut engine, &options)?;
        print_summary(&engine, &run_id)?;
    }

    Ok(())
}

/// Drive the session frame by frame. With `bot`, a janitor sweeps the
/// oldest spill every frame and buys a broom whenever it can.
fn run_headless(engine: &mut SimEngine, options: &RunOptions) -> Result<()> {
    engine.clock.resume();
    for _ in 0..options.frames {
        if engine.is_over() {
            log::info!("tick={} run over, stopping early", engine.clock.current_tick);
            break;
        }
        if engine.day_cycle().is_waiting_for_continue() {
            if !options.auto_continue {
                log::info!("tick={} waiting for continue, stopping", engine.clock.current_tick);
                break;
            }
            engine.continue_to_next_day()?;
        }

        engine.tick(options.frame_delta)?;

        if options.bot {
            if engine.wallet().can_afford(engine.broom().cost()) && engine.broom().can_use_today() {
                engine.buy_broom()?;
            }
            engine.sweep(None, options.frame_delta)?;
        }
    }
    engine.clock.pause();
    Ok(())
}

fn run_ipc_loop(engine: &mut SimEngine, frame_delta: Seconds) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Tick { count } => {
                if let Err(e) = engine.run_frames(count, frame_delta) {
                    writeln!(stdout, "{}", serde_json::json!({ "error": e.to_string() }))?;
                    stdout.flush()?;
                    continue;
                }
                writeln!(stdout, "{}", serde_json::to_string(&build_ui_state(engine))?)?;
            }
            IpcCommand::GetState => {
                writeln!(stdout, "{}", serde_json::to_string(&build_ui_state(engine))?)?;
            }
            IpcCommand::Command { command } => {
                let applied = engine.apply_command(command)?;
                let state = serde_json::to_value(build_ui_state(engine))?;
                writeln!(stdout, "{}", serde_json::json!({ "applied": applied, "state": state }))?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn build_ui_state(engine: &SimEngine) -> UiState {
    let day = engine.day_cycle();
    let dirt = engine.dirtiness();
    UiState {
        tick: engine.clock.current_tick,
        paused: engine.clock.paused,
        day: day.day_count(),
        phase: day.phase(),
        waiting_for_continue: day.is_waiting_for_continue(),
        game_over: engine.is_over(),
        tier: dirt.tier(),
        spills: engine.mess().count() as u32,
        strikes: dirt.strike_count(),
        reputation: engine.reputation().level(),
        active_customers: engine.scheduler().active_count(),
        combo_streak: engine.combo().streak(),
        combo_multiplier: engine.combo().multiplier(),
        coins: engine.wallet().coins(),
        broom_uses_left: engine.broom().uses_left_today(),
    }
}

fn print_summary(engine: &SimEngine, run_id: &str) -> Result<()> {
    let store = engine.store();
    let count = |event_type: &str| store.event_count_by_type(run_id, event_type);

    println!("=== SHIFT SUMMARY ===");
    println!("  run_id:          {run_id}");
    println!("  final tick:      {}", engine.clock.current_tick);
    println!("  sim seconds:     {:.1}", engine.clock.elapsed_seconds);
    println!("  day:             {} ({:?})", engine.day_cycle().day_count(), engine.day_cycle().phase());
    println!("  customers in:    {}", count("customer_spawned")?);
    println!("  spawn skips:     {}", count("spawn_skipped")?);
    println!("  spills made:     {}", count("mess_created")?);
    println!("  spills cleaned:  {}", count("spill_cleaned")?);
    println!("  spills on floor: {}", engine.mess().count());
    println!("  dirtiness:       {:?}", engine.dirtiness().tier());
    println!("  filth strikes:   {}/{}", engine.dirtiness().strike_count(), engine.dirtiness().strike_limit());
    println!("  reputation:      {}/{}", engine.reputation().level(), engine.reputation().max_level());
    println!("  coins:           {}", engine.wallet().coins());
    println!("  events logged:   {}", store.event_count(run_id)?);

    let reviews = store.events_of_type(run_id, "shift_reviewed")?;
    if !reviews.is_empty() {
        println!();
        println!("=== SHIFT REVIEWS ===");
        for entry in reviews {
            println!("  tick {:>6} | {}", entry.tick, entry.payload);
        }
    }
    for entry in store.events_of_type(run_id, "promotion_decided")? {
        println!();
        println!("  promotion: {}", entry.payload);
    }
    if engine.dirtiness().is_game_over() {
        println!();
        println!("  GAME OVER: the floor was filthy too often.");
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}
