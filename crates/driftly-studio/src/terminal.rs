//! Terminal rendering for the `driftly` binary.

use std::io::{self, BufRead, Write};
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};

use driftly_studio::{ProgressSink, PromptPreview};

const BAR_TEMPLATE: &str = "{spinner:.cyan} [{bar:40.cyan/blue}] {pos:>3}% {msg}";

/// Progress sink drawing an indicatif bar on stderr.
///
/// A bar is created on the first update and cleared on `finish`, so one sink
/// serves several workflow steps.
#[derive(Default)]
pub struct TerminalProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };
        let bar = slot.get_or_insert_with(|| {
            let bar = ProgressBar::new(100);
            if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
                bar.set_style(style.progress_chars("=> "));
            }
            bar
        });
        f(bar);
    }
}

impl ProgressSink for TerminalProgress {
    fn set_percent(&self, percent: u8) {
        self.with_bar(|bar| bar.set_position(u64::from(percent.min(100))));
    }

    fn set_message(&self, message: &str) {
        let message = message.to_string();
        self.with_bar(|bar| bar.set_message(message));
    }

    fn finish(&self) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(bar) = slot.take() {
                bar.finish_and_clear();
            }
        }
    }
}

pub fn print_preview(preview: &PromptPreview) {
    println!();
    println!("Title:          {}", preview.title());
    println!("Camera work:    {}", preview.camera_work());
    println!("Lighting:       {}", preview.lighting());
    println!("Style keywords: {}", preview.style_keywords());
    println!();
    println!("Prompt:");
    println!("{}", preview.prompt());
    println!();
}

/// Ask a yes/no question on stdin. Anything but "y"/"yes" is a no.
pub fn confirm(question: &str) -> io::Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
