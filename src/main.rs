use anyhow::{anyhow, Result};

use std::io::{stdin, stdout, BufRead, Write};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use connectn_ai::config::GameConfig;
use connectn_ai::difficulty::Difficulty;
use connectn_ai::engine::Engine;
use connectn_ai::game::{column_label, parse_column, Game, GameState};
use connectn_ai::worker::{request_move, AiWorker, Ticket};
use connectn_ai::{board::Settings, tournament};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("--tournament") {
        return run_tournament(&args[1..]);
    }

    println!("Welcome to Connect N\n");

    let config = GameConfig::prompt()?;
    let mut game = Game::new(config.settings, config.players, config.mode)?;

    // the engine on this thread only serves hints and the synchronous fallback
    let mut local_engine = Engine::new();
    let mut worker = match AiWorker::spawn() {
        Ok(worker) => Some(worker),
        Err(err) => {
            log::warn!("could not start the AI worker ({}), moves will be computed in place", err);
            None
        }
    };
    let input = spawn_input_reader()?;

    // ticket and session revision of the AI request in flight
    let mut in_flight: Option<(Ticket, u64)> = None;
    let mut redraw = true;

    // game loop
    loop {
        if redraw {
            game.display().expect("Failed to draw board!");
            redraw = false;
        }

        if game.state().is_over() {
            report_result(&game);
            print!("Play again? y/N: ");
            stdout().flush().expect("Failed to flush to stdout!");
            match input.recv() {
                Ok(answer) if answer.trim().eq_ignore_ascii_case("y") => {
                    if let Some(worker) = worker.as_mut() {
                        worker.abandon();
                    }
                    in_flight = None;
                    game.reset();
                    redraw = true;
                    continue;
                }
                _ => return Ok(()),
            }
        }

        let player = game.current_player().clone();
        if player.is_ai {
            let worker_ref = match worker.as_mut() {
                Some(worker_ref) => worker_ref,
                None => {
                    println!("{} ({}) is thinking...", player.name, player.difficulty);
                    let revision = game.revision();
                    let column = request_move(None, &mut local_engine, &game.move_request());
                    if game.apply_reply(revision, column)?.is_some() {
                        announce(&player.name, column);
                    }
                    redraw = true;
                    continue;
                }
            };

            if in_flight.is_none() {
                println!(
                    "{} ({}) is thinking... (u: undo, q: quit)",
                    player.name, player.difficulty
                );
                stdout().flush().expect("Failed to flush to stdout!");
                match worker_ref.submit(game.move_request()) {
                    Ok(ticket) => in_flight = Some((ticket, game.revision())),
                    Err(err) => {
                        log::warn!("{}, computing moves in place from now on", err);
                        worker = None;
                        continue;
                    }
                }
            }

            match worker_ref.try_reply() {
                Ok(Some(reply)) => {
                    let revision = match in_flight.take() {
                        Some((ticket, revision)) if ticket == reply.ticket => revision,
                        _ => continue,
                    };
                    if game.apply_reply(revision, reply.column)?.is_some() {
                        announce(&player.name, reply.column);
                        redraw = true;
                    }
                    continue;
                }
                Ok(None) => {}
                Err(err) => {
                    log::warn!("{}, computing moves in place from now on", err);
                    worker = None;
                    in_flight = None;
                    continue;
                }
            }

            // keep listening to the user while the AI thinks
            match input.recv_timeout(POLL_INTERVAL) {
                Ok(line) => match line.trim() {
                    "q" => return Ok(()),
                    "u" => {
                        worker_ref.abandon();
                        in_flight = None;
                        undo_to_human(&mut game);
                        redraw = true;
                    }
                    _ => println!("Please wait for {} to move", player.name),
                },
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return Ok(()),
            }

        // human player
        } else {
            print!("{}, move input (h: hint, u: undo, q: quit) > ", player.name);
            stdout().flush().expect("Failed to flush to stdout!");
            let input_str = match input.recv() {
                Ok(line) => line,
                Err(_) => return Ok(()),
            };

            match input_str.trim() {
                "q" => return Ok(()),
                "h" => match local_engine.hint(&game.move_request()) {
                    Some(column) => println!("Hint: try column {}", column_label(column + 1)),
                    None => println!("No moves left"),
                },
                "u" => {
                    undo_to_human(&mut game);
                    redraw = true;
                }
                input => match parse_column(input) {
                    None => println!("Invalid column: {}", input),
                    Some(column) => match game.play_checked(column) {
                        Ok(_) => redraw = true,
                        Err(err) => println!("{}", err),
                    },
                },
            }
        }
    }
}

/// Forwards stdin lines over a channel so the game loop can poll it
fn spawn_input_reader() -> Result<Receiver<String>> {
    let (tx, rx) = channel();
    thread::Builder::new()
        .name("connectn-input".to_string())
        .spawn(move || {
            let stdin = stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        })?;
    Ok(rx)
}

fn announce(name: &str, column: Option<usize>) {
    if let Some(column) = column {
        println!("{} plays column {}", name, column_label(column + 1));
    }
}

/// Takes back moves until it is a human's turn again
fn undo_to_human(game: &mut Game) {
    loop {
        if let Err(err) = game.undo() {
            println!("{}", err);
            break;
        }
        if !game.current_player().is_ai {
            break;
        }
    }
}

fn report_result(game: &Game) {
    match game.state() {
        GameState::Win { player, line } => {
            let name = game.player(*player).map_or("Unknown player", |p| p.name.as_str());
            if line.is_empty() {
                println!("{} wins on disc count!", name);
            } else {
                println!("{} wins!", name);
            }
        }
        GameState::Draw => println!("Draw!"),
        GameState::Playing => return,
    }

    let moves: Vec<String> = game
        .history()
        .iter()
        .map(|record| column_label(record.col + 1).to_string())
        .collect();
    println!("Moves ({}): {}", moves.len(), moves.join(" "));
}

/// `--tournament [games] [first tier] [second tier]`
fn run_tournament(args: &[String]) -> Result<()> {
    let games = match args.first() {
        Some(games) => games
            .parse::<usize>()
            .map_err(|_| anyhow!("could not parse '{}' as a number of games", games))?,
        None => 100,
    };
    let first = args
        .get(1)
        .map_or(Difficulty::Hard, |name| Difficulty::parse_or_default(name));
    let second = args
        .get(2)
        .map_or(Difficulty::Medium, |name| Difficulty::parse_or_default(name));

    let result = tournament::run(Settings::default(), first, second, games, rand::random(), true)?;
    println!(
        "{} (first): {} wins, {} (second): {} wins, {} draws",
        first, result.first_wins, second, result.second_wins, result.draws
    );
    Ok(())
}
