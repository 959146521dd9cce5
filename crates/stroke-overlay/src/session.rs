//! Line-driven overlay session.
//!
//! Each input line is `<variant> <word>` or a bare `<word>`. Every accepted
//! word replaces the running slideshow; a rejected word is reported and the
//! session goes on with whatever was showing.

use crate::{AppError, DisplaySurface, LayoutVariant, OverlayApp, SlideshowHost};
use std::io::{BufRead, Write};

/// One word request read from the session input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    pub variant: LayoutVariant,
    pub word: String,
}

impl Submission {
    /// Parse one input line. Blank lines give `None`.
    pub fn parse(line: &str, default_variant: LayoutVariant) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (variant, word) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => match variant_named(head) {
                Some(variant) => (variant, rest.trim()),
                None => (default_variant, line),
            },
            None => (default_variant, line),
        };
        Some(Self {
            variant,
            word: word.to_owned(),
        })
    }
}

fn variant_named(name: &str) -> Option<LayoutVariant> {
    LayoutVariant::ALL
        .into_iter()
        .find(|variant| variant.name() == name)
}

/// Counters for a finished session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub shown: usize,
    pub rejected: usize,
}

/// Read submissions from `input` until it ends, playing each accepted word
/// on `host` to its last frame.
///
/// Words that cannot be projected are written to `report` as `error: ...`
/// and do not end the session. Display and I/O failures do.
pub fn run_session<S, R, W>(
    app: &OverlayApp,
    host: &mut SlideshowHost<S>,
    input: R,
    mut report: W,
    default_variant: LayoutVariant,
) -> Result<SessionSummary, AppError>
where
    S: DisplaySurface,
    R: BufRead,
    W: Write,
{
    let mut summary = SessionSummary::default();
    for line in input.lines() {
        let Some(submission) = Submission::parse(&line?, default_variant) else {
            continue;
        };
        match app.show_word(submission.variant, &submission.word, host) {
            Ok(()) => {
                host.run_to_end()?;
                summary.shown += 1;
            }
            Err(AppError::Project(err)) => {
                log::debug!("rejected {:?}: {err}", submission.word);
                writeln!(report, "error: {err}")?;
                summary.rejected += 1;
            }
            Err(err) => return Err(err),
        }
    }
    host.close()?;
    log::info!(
        "session ended: {} shown, {} rejected",
        summary.shown,
        summary.rejected
    );
    Ok(summary)
}
