//! gesture_quiz — interactive entry point.

use std::time::Duration;

use anyhow::Context;
use gesture_quiz::app::{run, AppConfig};
use quiz_core::{JsonStore, MemoryStore, Quiz, QuizStore};

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Gestura — Gesture-Driven Multiple-Choice Quiz         ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "camera")]
    println!("  Mode: webcam + MediaPipe hand landmarker");
    #[cfg(not(feature = "camera"))]
    println!("  Mode: keyboard simulation  (use --features camera for hardware)");
    println!();

    let mut args = std::env::args().skip(1);
    let store_path = args.next();

    let mut cfg = AppConfig::default();
    if let Some(student) = args.next() {
        cfg.student_id = student
            .parse()
            .context("student id must be a number")?;
    }
    if let Ok(ms) = std::env::var("GESTURA_COOLDOWN_MS") {
        cfg.cooldown = Duration::from_millis(ms.parse().context("GESTURA_COOLDOWN_MS")?);
    }

    match store_path {
        Some(path) => {
            let mut store = JsonStore::open(&path)
                .with_context(|| format!("opening quiz store {}", path))?;
            if store.list().is_empty() {
                log::info!("store is empty, seeding the sample quiz");
                store.add_quiz(Quiz::sample())?;
            }
            cfg.quiz_id = pick_quiz(&store);
            run(store, cfg)
        }
        None => {
            println!("  No store file given — running the built-in sample quiz.\n");
            let store = MemoryStore::with_quiz(Quiz::sample())?;
            run(store, cfg)
        }
    }
}

fn pick_quiz<S: QuizStore>(store: &S) -> u32 {
    let quizzes = store.list();
    if quizzes.len() == 1 {
        return quizzes[0].0;
    }
    println!("  Available quizzes:");
    for (id, title) in &quizzes {
        println!("    {}. {}", id, title);
    }
    let choice = read_line("  Quiz id: ");
    choice
        .trim()
        .parse()
        .unwrap_or_else(|_| quizzes.first().map(|(id, _)| *id).unwrap_or(1))
}

fn read_line(prompt: &str) -> String {
    use std::io::{self, Write};
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
