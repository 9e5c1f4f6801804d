use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use sampler::source::SceneDir;

/// Returns a progress bar whose length is learned from the first
/// loaded file.
pub fn bar(prefix: String) -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_prefix(prefix);
    pb.set_style(
        ProgressStyle::with_template("{prefix}...\n[{wide_bar:.cyan/blue}] {pos}/{len}")
            .expect("incorrect progress bar format string")
            .progress_chars("#>-"),
    );
    pb
}

/// Ticks a new bar, added to `bars`, for every scene `dir` loads.
pub fn track(dir: SceneDir, name: &str, bars: &MultiProgress) -> SceneDir {
    let pb = bars.add(bar(format!("loading {name} scenes from {}", dir.dir().display())));
    dir.on_load(move |_, total| {
        pb.set_length(total as u64);
        pb.inc(1);
        if pb.position() == total as u64 {
            pb.finish();
        }
    })
}
