mod board;
mod transcript;

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::process;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use board::TerminalBoard;
use luminus_core::config::{GameConfig, GameTiming};
use luminus_core::input::InputSnapshot;
use luminus_core::session::{Phase, Session, Step, run_with};
use luminus_core::telemetry::EventId;
use rand::{RngCore, SeedableRng};
use rand::rngs::SmallRng;
use transcript::TranscriptLogger;

const USAGE: &str = "Usage: luminus-emulator [--seed <u64>] [--fast] [--transcript <path>]";

#[derive(Debug, Default)]
struct Options {
    seed: Option<u64>,
    fast: bool,
    transcript: Option<PathBuf>,
    help: bool,
}

fn main() -> io::Result<()> {
    let options = parse_options(env::args().skip(1)).unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("{USAGE}");
        process::exit(2);
    });
    if options.help {
        println!("{USAGE}");
        return Ok(());
    }

    let seed = options.seed.unwrap_or_else(wall_clock_seed);
    let timing = if options.fast {
        GameTiming::standard().scaled(1, 4)
    } else {
        GameTiming::standard()
    };
    let config = GameConfig::new().with_timing(timing);
    let mut session = Session::new(config, SmallRng::seed_from_u64(seed));

    let mut transcript = match &options.transcript {
        Some(path) => Some(TranscriptLogger::create(
            path,
            &format!("Luminus Memory emulator transcript (seed {seed})"),
        )?),
        None => None,
    };

    let mut board = TerminalBoard::open(io::stdout())?;
    let quit = board.quit_flag();
    let sampled = board.last_sample();
    let started_at = Instant::now();
    let mut forwarded = session.events().next_id();
    let mut log_error = None;

    let flow = run_with(&mut session, &mut board, |session, step| {
        if let Some(log) = transcript.as_mut() {
            let input = sampled.get();
            if let Err(err) = log_step(log, started_at, &input, session, step, forwarded) {
                log_error = Some(err);
                return ControlFlow::Break(());
            }
        }
        forwarded = session.events().next_id();

        if quit.get() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });

    board.close()?;

    if let Some(err) = log_error {
        return Err(err);
    }

    let outcome = if flow.is_continue() && session.phase() == Phase::Finished {
        "finished"
    } else {
        "abandoned"
    };
    println!(
        "Session {outcome} with {} correct round(s). Seed was {seed}.",
        session.score()
    );
    Ok(())
}

fn log_step<R: RngCore>(
    log: &mut TranscriptLogger<BufWriter<File>>,
    started_at: Instant,
    input: &InputSnapshot,
    session: &Session<R>,
    step: &Step,
    forwarded: EventId,
) -> io::Result<()> {
    let elapsed = started_at.elapsed();
    log.log_input(elapsed, input)?;
    for message in step.messages() {
        log.log_message(elapsed, &message)?;
    }
    for record in session.events().since(forwarded) {
        log.log_event(elapsed, record)?;
    }
    Ok(())
}

fn wall_clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            u64::try_from(elapsed.as_nanos() & u128::from(u64::MAX)).unwrap_or_default()
        })
}

fn parse_options<I>(args: I) -> Result<Options, String>
where
    I: IntoIterator<Item = String>,
{
    let mut options = Options::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if let Some(value) = arg.strip_prefix("--seed=") {
            options.seed = Some(parse_seed(value)?);
        } else if arg == "--seed" {
            let value = args.next().ok_or("Expected value after --seed")?;
            options.seed = Some(parse_seed(&value)?);
        } else if let Some(value) = arg.strip_prefix("--transcript=") {
            options.transcript = Some(PathBuf::from(value));
        } else if arg == "--transcript" {
            let value = args.next().ok_or("Expected value after --transcript")?;
            options.transcript = Some(PathBuf::from(value));
        } else if arg == "--fast" {
            options.fast = true;
        } else if arg == "--help" || arg == "-h" {
            options.help = true;
        } else {
            return Err(format!("Unknown argument `{arg}`"));
        }
    }

    Ok(options)
}

fn parse_seed(value: &str) -> Result<u64, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid seed `{value}`; expected an unsigned integer"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Options, String> {
        parse_options(args.iter().map(|arg| (*arg).to_string()))
    }

    #[test]
    fn defaults_without_arguments() {
        let options = parse(&[]).expect("parse");
        assert_eq!(options.seed, None);
        assert!(!options.fast);
        assert!(options.transcript.is_none());
    }

    #[test]
    fn accepts_both_value_forms() {
        let options = parse(&["--seed", "17", "--fast", "--transcript=out/log.txt"]).expect("parse");
        assert_eq!(options.seed, Some(17));
        assert!(options.fast);
        assert_eq!(options.transcript, Some(PathBuf::from("out/log.txt")));

        assert_eq!(parse(&["--seed=9"]).expect("parse").seed, Some(9));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&["--seed"]).is_err());
        assert!(parse(&["--seed", "-3"]).is_err());
        assert!(parse(&["--colour"]).is_err());
    }
}
