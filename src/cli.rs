//! Subcommand bodies and terminal rendering for the front-end commands.

use anyhow::Result;
use levelup::client::{ApiClient, Transport};
use levelup::db::{Database, Objective, Stats};
use levelup::pomodoro::Pomodoro;
use levelup::progression::{Category, StatCard};
use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

const EMPTY_OBJECTIVES: &str = "No objectives for today. Add some goals!";

pub async fn run_prune(database_url: &str) -> Result<()> {
    let db = Database::connect(database_url).await?;
    db.migrate().await?;
    let removed = db.clear_old_objectives().await?;
    info!(count = removed, "pruned objectives from previous days");
    println!("Removed {} objective(s) from previous days", removed);
    Ok(())
}

pub fn render_stats(stats: &Stats) -> String {
    let mut out = String::new();
    for card in stats.cards() {
        let _ = writeln!(out, "{}", card);
    }
    out
}

pub fn render_objectives(objectives: &[Objective]) -> String {
    let mut out = String::from("Daily Objectives (resets at 12 AM UK time)\n");
    if objectives.is_empty() {
        let _ = writeln!(out, "  {}", EMPTY_OBJECTIVES);
        return out;
    }
    for objective in objectives {
        let (mark, done) = if objective.completed {
            ("[x]", " ✔")
        } else {
            ("[ ]", "")
        };
        let _ = writeln!(
            out,
            "  {} #{:<4} {}{}",
            mark, objective.id, objective.text, done
        );
    }
    out
}

pub fn run_stats<T: Transport>(client: &ApiClient<T>) -> Result<()> {
    print!("{}", render_stats(&client.stats()?));
    Ok(())
}

pub fn run_xp<T: Transport>(client: &ApiClient<T>, category: Category, delta: i32) -> Result<()> {
    let stats = client.add_xp(category, delta)?;
    println!("{}", StatCard::new(category, stats.xp(category)));
    Ok(())
}

pub fn run_objectives<T: Transport>(client: &ApiClient<T>) -> Result<()> {
    print!("{}", render_objectives(&client.objectives()?));
    Ok(())
}

pub fn run_add<T: Transport>(client: &ApiClient<T>, text: &str) -> Result<()> {
    let text = text.trim();
    if text.is_empty() {
        anyhow::bail!("objective text must not be empty");
    }
    let objective = client.add_objective(text)?;
    println!("Objective added: #{} {}", objective.id, objective.text);
    print!("{}", render_objectives(&client.objectives()?));
    Ok(())
}

pub fn run_toggle<T: Transport>(client: &ApiClient<T>, id: i32) -> Result<()> {
    client.toggle_objective(id)?;
    print!("{}", render_objectives(&client.objectives()?));
    Ok(())
}

/// Drive a [`Pomodoro`] from the wall clock, reading commands from stdin.
///
/// If stdin closes the timer keeps running until the session completes.
pub fn run_pomodoro() -> Result<()> {
    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line.trim().to_ascii_lowercase()).is_err() {
                break;
            }
        }
    });

    let mut timer = Pomodoro::new();
    timer.toggle();
    let mut input_open = true;
    let mut next_tick = Instant::now() + Duration::from_secs(1);
    eprintln!("p + Enter = pause/resume, r + Enter = reset, q + Enter = quit");

    loop {
        draw(&timer)?;
        let wait = next_tick.saturating_duration_since(Instant::now());
        let command = if input_open {
            match rx.recv_timeout(wait) {
                Ok(cmd) => Some(cmd),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => {
                    input_open = false;
                    continue;
                }
            }
        } else {
            if !timer.is_running() {
                break;
            }
            thread::sleep(wait);
            None
        };

        match command.as_deref() {
            Some("p") => {
                timer.toggle();
                next_tick = Instant::now() + Duration::from_secs(1);
            }
            Some("r") => timer.reset(),
            Some("q") => break,
            Some(_) => {}
            None => {
                next_tick += Duration::from_secs(1);
                if timer.tick().is_some() {
                    println!("\nPomodoro Complete! Time to take a break.");
                    info!("pomodoro session complete");
                }
            }
        }
    }
    println!();
    Ok(())
}

const TIMER_BAR_WIDTH: usize = 20;

/// One status line: state, `M:SS`, and a bar of the time still left.
pub fn render_timer(timer: &Pomodoro) -> String {
    let state = if timer.is_running() { "running" } else { "paused " };
    let left = (timer.fraction_left() * TIMER_BAR_WIDTH as f64).round() as usize;
    let left = left.min(TIMER_BAR_WIDTH);
    format!(
        "{} {:>5} [{}{}]",
        state,
        timer.display(),
        "#".repeat(left),
        "-".repeat(TIMER_BAR_WIDTH - left)
    )
}

fn draw(timer: &Pomodoro) -> Result<()> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "\r{}", render_timer(timer))?;
    stdout.flush()?;
    Ok(())
}
