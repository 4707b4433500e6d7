mod decode;
mod encode;

pub use decode::run_decode;
pub use encode::run_encode;

use indicatif::{ProgressBar, ProgressStyle};

/// How many sectors each batch moves through the codec.
pub const BUFFER_SECTORS: usize = 100;

/// Builds the sector progress bar, or nothing in quiet mode.
pub fn progress_bar(
    total_sectors: u64,
    quiet: bool,
    message: &'static str,
) -> Option<ProgressBar> {
    if quiet {
        return None;
    }

    let bar = ProgressBar::new(total_sectors);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {pos}/{len} sectors ({eta}) {msg}\n[{bar:40}]")
            .unwrap()
            .progress_chars("#>-"),
    );
    bar.set_message(message);
    Some(bar)
}
