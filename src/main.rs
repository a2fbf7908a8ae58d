//! Xenon CLI
//!
//! Small demonstrations of the launcher, timeouts and intervals.
//! Set `RUST_LOG=xenon=debug` to watch threads being spawned.

use std::env;
use std::process;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use xenon::{
    run, set_async_interval, set_async_timeout, set_sync_timeout, then, Clock, Diagnostic,
    Executor, TimeOrder, XenonError, XenonResult, VERSION,
};

/// Upper bound on how long the demos wait for background threads
const DEMO_WAIT: Duration = Duration::from_secs(30);

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() == 1 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    let result = match command {
        "--help" | "-h" => {
            print_help();
            return;
        }
        "--version" | "-V" => {
            println!("xenon {}", VERSION);
            return;
        }
        "timeout" => parse_number(rest, 0, "delay-ms").and_then(|ms| demo_timeout(ms as u64)),
        "chain" => parse_number(rest, 0, "delay-ms").and_then(|ms| demo_chain(ms as u64)),
        "interval" => parse_number(rest, 0, "period-ms").and_then(|period| {
            parse_number(rest, 1, "ticks").and_then(|ticks| demo_interval(period as u64, ticks))
        }),
        "burst" => parse_number(rest, 0, "count").and_then(demo_burst),
        _ if command.starts_with('-') => {
            eprintln!("Unknown flag: {}", command);
            print_usage();
            process::exit(1);
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprint!("{}", Diagnostic::with_context(e, &format!("running `{}`", command)));
        process::exit(1);
    }
}

fn print_usage() {
    eprintln!("Usage: xenon <COMMAND> [ARGS]");
    eprintln!("       xenon --help");
}

fn print_help() {
    println!("Xenon v{} - thread-per-task launcher and timers", VERSION);
    println!();
    println!("USAGE:");
    println!("    xenon <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    timeout <delay-ms>             Compare sync and async timeouts");
    println!("    chain <delay-ms>               Run a producer/consumer chain");
    println!("    interval <period-ms> <ticks>   Run, pause, resume and stop an interval");
    println!("    burst <count>                  Launch <count> tasks at once");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show this help message");
    println!("    -V, --version    Show the version");
    println!();
    println!("ENVIRONMENT:");
    println!("    XENON_THREAD_PREFIX   Prefix for spawned thread names");
    println!("    XENON_STACK_SIZE      Stack size in bytes for spawned threads");
    println!("    XENON_REPORT_PANICS   Log panics caught inside tasks (true/false)");
    println!("    RUST_LOG              Log filter, e.g. xenon=debug");
}

fn parse_number(args: &[String], index: usize, name: &str) -> XenonResult<usize> {
    let raw = args
        .get(index)
        .ok_or_else(|| XenonError::invalid_argument(format!("missing <{}>", name)))?;
    raw.parse::<usize>().map_err(|e| {
        XenonError::invalid_argument(format!("<{}> must be a number, got {:?}: {}", name, raw, e))
    })
}

fn header(title: &str) {
    println!("{}", title.cyan().bold());
    println!("{}", "=".repeat(60));
}

fn demo_timeout(delay_ms: u64) -> XenonResult<()> {
    let delay = Duration::from_millis(delay_ms);
    header(&format!("Timeouts ({}ms)", delay_ms));

    let mut clock = Clock::new();
    let label = set_sync_timeout(|who: &str| format!("{} fired", who), delay, ("sync",));
    clock.stop();
    println!(
        "{:8} {} after {:.1}ms (caller blocked)",
        "sync".green(),
        label,
        clock.get(TimeOrder::Milliseconds)
    );

    let (sender, receiver) = mpsc::channel();
    let clock = Clock::new();
    set_async_timeout(move || sender.send(()), delay, ());
    println!(
        "{:8} call returned after {:.3}ms",
        "async".green(),
        clock.get(TimeOrder::Milliseconds)
    );

    receiver
        .recv_timeout(delay + DEMO_WAIT)
        .map_err(|_| XenonError::timed_out("async timeout", delay + DEMO_WAIT))?;
    println!(
        "{:8} fired after {:.1}ms",
        "async".green(),
        clock.get(TimeOrder::Milliseconds)
    );
    Ok(())
}

fn demo_chain(delay_ms: u64) -> XenonResult<()> {
    let delay = Duration::from_millis(delay_ms);
    header(&format!("Chain (delay {}ms)", delay_ms));

    let (sender, receiver) = mpsc::channel();
    let clock = Clock::new();
    then(
        |n: u64| (1..=n).product::<u64>(),
        move |factorial: u64| sender.send(factorial),
        (10,),
        delay,
    );

    let factorial = receiver
        .recv_timeout(delay + DEMO_WAIT)
        .map_err(|_| XenonError::timed_out("chain", delay + DEMO_WAIT))?;
    println!(
        "consumer received 10! = {} after {:.1}ms",
        factorial.to_string().yellow(),
        clock.get(TimeOrder::Milliseconds)
    );
    Ok(())
}

fn demo_interval(period_ms: u64, ticks: usize) -> XenonResult<()> {
    let period = Duration::from_millis(period_ms);
    header(&format!("Interval ({}ms x {})", period_ms, ticks));

    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&count);
    let interval = set_async_interval(
        move || {
            let n = seen.fetch_add(1, Ordering::SeqCst) + 1;
            println!("  tick {}", n);
        },
        period,
    )?;

    let limit = wait_limit(period, ticks)?;
    let half = ticks / 2;
    wait_for(|| count.load(Ordering::SeqCst) >= half, limit)?;
    println!("{:?}", interval.pause());
    std::thread::sleep(period * 2);
    println!("{:?}", interval.resume());
    wait_for(|| count.load(Ordering::SeqCst) >= ticks, limit)?;
    println!("{:?} after {} ticks", interval.stop(), interval.ticks());
    Ok(())
}

fn demo_burst(count: usize) -> XenonResult<()> {
    header(&format!("Burst ({} tasks)", count));

    let values = Arc::new(Mutex::new(Vec::with_capacity(count)));
    let clock = Clock::new();
    for i in 0..count {
        let values = Arc::clone(&values);
        run(
            move |n: usize| {
                if let Ok(mut values) = values.lock() {
                    values.push(n);
                }
            },
            (i,),
        );
    }

    let executor = Executor::global();
    let done = wait_for(
        || values.lock().map(|v| v.len() == count).unwrap_or(false),
        DEMO_WAIT * 2,
    );
    let stats = executor.stats();
    println!(
        "spawned {} completed {} panicked {} in {:.1}ms",
        stats.spawned,
        stats.completed,
        stats.panicked,
        clock.get(TimeOrder::Milliseconds)
    );
    done
}

/// Time `ticks` periods take, rejected when it does not fit a `Duration`
fn wait_limit(period: Duration, ticks: usize) -> XenonResult<Duration> {
    u32::try_from(ticks)
        .ok()
        .and_then(|ticks| period.checked_mul(ticks))
        .and_then(|limit| limit.checked_add(DEMO_WAIT))
        .ok_or_else(|| {
            XenonError::invalid_argument(format!(
                "{} ticks of {:?} is too long to wait for",
                ticks, period
            ))
        })
}

fn wait_for(mut condition: impl FnMut() -> bool, limit: Duration) -> XenonResult<()> {
    let clock = Clock::new();
    while !condition() {
        if clock.elapsed() > limit {
            return Err(XenonError::timed_out("demo", limit));
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_wait_limit_adds_slack() {
        let limit = wait_limit(Duration::from_millis(10), 5).unwrap();
        assert_eq!(limit, Duration::from_millis(50) + DEMO_WAIT);
    }

    #[test]
    fn test_wait_limit_rejects_overflow() {
        let err = wait_limit(Duration::from_secs(u64::MAX / 2), 4).unwrap_err();
        assert_eq!(err.kind(), "Invalid Argument");

        let err = wait_limit(Duration::from_millis(1), usize::MAX).unwrap_err();
        assert_eq!(err.kind(), "Invalid Argument");
    }
}
