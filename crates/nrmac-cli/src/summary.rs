use console::Style;
use nrmac_core::metadata::{TRANSFORMER_DESCRIPTION, TRANSFORMER_VERSION};
use nrmac_core::pipeline::config::RunConfig;
use nrmac_core::pipeline::result::{format_elapsed, BatchResult};

struct Styles {
    title: Style,
    label: Style,
    value: Style,
    good: Style,
    warn: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            good: Style::new().green(),
            warn: Style::new().yellow(),
            path: Style::new().underlined(),
        }
    }
}

/// Print a styled run summary to stderr, keeping stdout for the result JSON.
pub fn print_batch_summary(config: &RunConfig, result: &BatchResult) {
    let s = Styles::new();

    eprintln!();
    eprintln!(
        "  {} {}",
        s.title.apply_to(TRANSFORMER_DESCRIPTION),
        s.label.apply_to(format!("v{TRANSFORMER_VERSION}"))
    );
    eprintln!("  {}", s.title.apply_to("\u{2550}".repeat(16)));
    eprintln!();
    eprintln!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.working_folder.display())
    );

    let Some(summary) = result.processing_summary() else {
        eprintln!(
            "  {:<14}{}",
            s.label.apply_to("Status"),
            s.warn
                .apply_to(result.error.as_deref().unwrap_or("not started"))
        );
        eprintln!();
        return;
    };

    eprintln!(
        "  {:<14}{}",
        s.label.apply_to("Received"),
        s.value.apply_to(summary.num_files_received)
    );
    eprintln!(
        "  {:<14}{}",
        s.label.apply_to("Images"),
        s.value.apply_to(summary.num_image_files)
    );
    let processed = if summary.num_processed_files == summary.num_image_files {
        s.good.apply_to(summary.num_processed_files)
    } else {
        s.warn.apply_to(summary.num_processed_files)
    };
    eprintln!("  {:<14}{}", s.label.apply_to("Processed"), processed);
    eprintln!(
        "  {:<14}{}",
        s.label.apply_to("Time"),
        s.value.apply_to(format_elapsed(&summary.processing_time))
    );
    eprintln!();

    for file in &result.files {
        eprintln!(
            "    {:>14.6}  {}",
            s.value.apply_to(file.metadata.data.mac_score),
            s.path.apply_to(&file.path)
        );
    }
    if !result.files.is_empty() {
        eprintln!();
    }
}
