//! Interactive stdin loops over a window cache and a spotlight.

use std::io::Write;

use anyhow::Result;
use marquee_core::PageWindowCache;
use marquee_core::Spotlight;
use marquee_core::contracts::prelude::{Identified, PageSource};
use marquee_core::model::MovieSummary;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::render;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Next,
    Prev,
    Reload,
    Quit,
    Help,
    Unknown(String),
}

fn parse_step(line: &str) -> Step {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "n" | "next" => Step::Next,
        "p" | "prev" => Step::Prev,
        "r" | "reload" => Step::Reload,
        "q" | "quit" | "exit" => Step::Quit,
        "h" | "help" | "?" => Step::Help,
        other => Step::Unknown(other.to_string()),
    }
}

const HELP: &str = "n/next  p/prev  r/reload  q/quit";

/// Render the current window after every command until `q` or end of input.
/// The cache is torn down on the way out.
pub async fn run_window<S, R, W>(
    cache: &PageWindowCache<S>,
    title: &str,
    input: R,
    out: &mut W,
) -> Result<()>
where
    S: PageSource<Item = MovieSummary>,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    // Failures are already in the snapshot; the view shows them.
    let _ = cache.bootstrap().await;
    render_window(cache, title, out)?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        match parse_step(&line) {
            Step::Next => {
                // A failed fetch stays in the snapshot until the next success.
                let _ = cache.advance().await;
            }
            Step::Prev => {
                cache.retreat();
            }
            Step::Reload => {
                cache.reset();
                let _ = cache.bootstrap().await;
            }
            Step::Quit => break,
            Step::Help => {
                writeln!(out, "{HELP}")?;
                continue;
            }
            Step::Unknown(command) => {
                writeln!(out, "unknown command '{command}' ({HELP})")?;
                continue;
            }
        }
        render_window(cache, title, out)?;
    }

    cache.teardown();
    Ok(())
}

fn render_window<S, W>(
    cache: &PageWindowCache<S>,
    title: &str,
    out: &mut W,
) -> Result<()>
where
    S: PageSource<Item = MovieSummary>,
    W: Write,
{
    let snapshot = cache.snapshot();
    if snapshot.loading {
        writeln!(out, "== {title} ==\nLoading...")?;
        return Ok(());
    }
    if let Some(error) = &snapshot.error {
        writeln!(out, "== {title} ==\nError: {error} (r to retry)")?;
        return Ok(());
    }
    if snapshot.items.is_empty() {
        writeln!(out, "== {title} ==\nNo movies found.")?;
        return Ok(());
    }

    let first = snapshot.cursor + 1;
    let last = snapshot.cursor + snapshot.items.len();
    writeln!(out, "== {title} [{first}-{last} of {}] ==", snapshot.total)?;
    print_items(out, &snapshot.items, snapshot.cursor, render::movie_line)?;
    if let Some(error) = &snapshot.advance_error {
        writeln!(out, "(could not load more: {error})")?;
    }
    Ok(())
}

fn print_items<T, W>(
    out: &mut W,
    items: &[T],
    offset: usize,
    line: impl Fn(&T) -> String,
) -> Result<()>
where
    T: Identified,
    W: Write,
{
    for (i, item) in items.iter().enumerate() {
        writeln!(
            out,
            "{:>4}. {}  [{}]",
            offset + i + 1,
            line(item),
            item.item_id()
        )?;
    }
    Ok(())
}

/// Cycle a spotlight with the same commands; `r` reloads after a failure.
pub async fn run_spotlight<S, R, W>(
    spotlight: &Spotlight<S>,
    input: R,
    out: &mut W,
) -> Result<()>
where
    S: PageSource<Item = MovieSummary>,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let _ = spotlight.load().await;
    render_spotlight(spotlight, out)?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        match parse_step(&line) {
            Step::Next => {
                spotlight.next();
            }
            Step::Prev => {
                spotlight.prev();
            }
            Step::Reload => {
                let _ = spotlight.load().await;
            }
            Step::Quit => break,
            Step::Help => {
                writeln!(out, "{HELP}")?;
                continue;
            }
            Step::Unknown(command) => {
                writeln!(out, "unknown command '{command}' ({HELP})")?;
                continue;
            }
        }
        render_spotlight(spotlight, out)?;
    }

    spotlight.teardown();
    Ok(())
}

fn render_spotlight<S, W>(spotlight: &Spotlight<S>, out: &mut W) -> Result<()>
where
    S: PageSource<Item = MovieSummary>,
    W: Write,
{
    if let Some(error) = spotlight.phase().error() {
        writeln!(out, "Spotlight unavailable: {error}")?;
        return Ok(());
    }
    match spotlight.current() {
        Some(movie) => {
            let (position, count) = spotlight.position();
            writeln!(out, "({position}/{count}) {}", render::movie_line(&movie))?;
        }
        None => writeln!(out, "Spotlight is empty.")?,
    }
    Ok(())
}
