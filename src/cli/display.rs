//! Terminal rendering of correction results
//!
//! Features:
//! - Original vs corrected sentence, changed words highlighted
//! - Per-token predicted tag with its top-k distribution
//! - End-of-run tally

use crate::service::{CorrectionResponse, CorrectionTally, TokenDetail};
use crate::tags::Tag;
use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::error::Error;
use std::io::{stdout, Stdout, Write};

/// Writes results to any sink; colours are optional
pub struct Display<W: Write> {
    out: W,
    color: bool,
}

impl Display<Stdout> {
    /// Coloured output on stdout
    pub fn stdout() -> Self {
        Display::new(stdout(), true)
    }
}

fn tag_color(tag: &str) -> Color {
    match Tag::parse(tag) {
        Tag::Keep => Color::DarkGrey,
        Tag::Delete => Color::Red,
        Tag::Replace(_) => Color::Yellow,
        Tag::Insert(_) | Tag::Other(_) => Color::Magenta,
    }
}

impl<W: Write> Display<W> {
    pub fn new(out: W, color: bool) -> Self {
        Display { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&mut self, color: Color, text: &str) -> Result<(), Box<dyn Error>> {
        if self.color {
            queue!(self.out, SetForegroundColor(color), Print(text), ResetColor)?;
        } else {
            queue!(self.out, Print(text))?;
        }
        Ok(())
    }

    fn plain(&mut self, text: &str) -> Result<(), Box<dyn Error>> {
        queue!(self.out, Print(text))?;
        Ok(())
    }

    pub fn show_banner(&mut self, model_name: &str, ready: bool) -> Result<(), Box<dyn Error>> {
        self.paint(Color::Cyan, "Typo tagger")?;
        self.plain(&format!(" | model: {} | ", model_name))?;
        if ready {
            self.paint(Color::Green, "ready\n")?;
        } else {
            self.paint(Color::Red, "unavailable\n")?;
        }
        self.out.flush()?;
        Ok(())
    }

    /// Sentence pair plus one line per token
    pub fn show_result(&mut self, response: &CorrectionResponse) -> Result<(), Box<dyn Error>> {
        self.paint(Color::Blue, "Original:  ")?;
        self.plain(&format!("{}\n", response.original_sentence.trim()))?;
        self.paint(Color::Blue, "Corrected: ")?;
        self.show_corrected(response)?;
        self.plain("\n")?;

        for detail in &response.token_details {
            self.show_token(detail)?;
        }

        let status = if response.corrections_made {
            "corrections made"
        } else {
            "no changes"
        };
        self.paint(
            Color::DarkGrey,
            &format!("{} | {:.2} ms\n", status, response.processing_time_ms),
        )?;
        self.out.flush()?;
        Ok(())
    }

    /// Corrected sentence word by word, replacements highlighted
    fn show_corrected(&mut self, response: &CorrectionResponse) -> Result<(), Box<dyn Error>> {
        if response.token_details.is_empty() {
            return self.plain(&response.corrected_sentence);
        }

        let mut first = true;
        for detail in &response.token_details {
            let (word, color) = match Tag::parse(&detail.pred_tag) {
                Tag::Delete => continue,
                Tag::Replace(word) if word != detail.token => (word, Some(Color::Green)),
                Tag::Replace(word) => (word, None),
                _ => (detail.token.clone(), None),
            };
            if !first {
                self.plain(" ")?;
            }
            first = false;
            match color {
                Some(color) => self.paint(color, &word)?,
                None => self.plain(&word)?,
            }
        }
        Ok(())
    }

    fn show_token(&mut self, detail: &TokenDetail) -> Result<(), Box<dyn Error>> {
        self.plain(&format!("  {:<16} ", detail.token))?;
        self.paint(tag_color(&detail.pred_tag), &format!("{:<20}", detail.pred_tag))?;
        let probs: Vec<String> = detail
            .top_probs
            .iter()
            .map(|(tag, p)| format!("{}={:.3}", tag, p))
            .collect();
        self.plain(&format!(" {}\n", probs.join("  ")))
    }

    pub fn show_error(&mut self, message: &str) -> Result<(), Box<dyn Error>> {
        self.paint(Color::Red, &format!("error: {}\n", message))?;
        self.out.flush()?;
        Ok(())
    }

    /// Totals and most frequent fixes of a batch run
    pub fn show_tally(&mut self, tally: &CorrectionTally, top: usize) -> Result<(), Box<dyn Error>> {
        let summary = tally.summary();
        self.paint(Color::Blue, &format!("{}\n", "─".repeat(50)))?;
        self.plain(&format!(
            "Sentences: {} | Changed: {} | Corrections: {}\n",
            summary.sentences, summary.corrected_sentences, summary.total_corrections
        ))?;

        for ((original, replacement), count) in tally.top_replacements(top) {
            self.plain(&format!("  {} -> ", original))?;
            self.paint(Color::Green, &replacement)?;
            self.plain(&format!("  x{}\n", count))?;
        }
        for (word, count) in tally.top_deletions(top) {
            self.paint(Color::Red, &format!("  - {}", word))?;
            self.plain(&format!("  x{}\n", count))?;
        }
        if !summary.recurring.is_empty() {
            let pairs: Vec<String> = summary
                .recurring
                .iter()
                .map(|(o, r)| format!("{}->{}", o, r))
                .collect();
            self.paint(Color::Yellow, &format!("Recurring: {}\n", pairs.join(", ")))?;
        }
        self.out.flush()?;
        Ok(())
    }
}
