use console::Style;
use edgebench_core::bench::BenchmarkResult;
use edgebench_core::config::BenchmarkConfig;
use edgebench_core::quality::QualityScore;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    warn: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            warn: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_run_header(config: &BenchmarkConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Sobel Benchmark"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(15)));
    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(config.input.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Golden"),
        s.path.apply_to(config.golden.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Size"),
        s.value.apply_to(format!("{0}x{0}", config.side))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Device"),
        s.method.apply_to(&config.device)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Software"),
        s.method.apply_to(config.software)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Timeout"),
        s.value.apply_to(format!("{} ms", config.wait.timeout_ms))
    );
    println!();
}

fn score_line(s: &Styles, score: &QualityScore) -> String {
    match score {
        QualityScore::Decibels(db) => s.value.apply_to(format!("{db:.4} dB")).to_string(),
        QualityScore::Identical => s.method.apply_to("identical (infinite)").to_string(),
    }
}

pub fn print_benchmark_summary(result: &BenchmarkResult, config: &BenchmarkConfig) {
    let s = Styles::new();

    println!("  {}", s.header.apply_to("Timing"));
    println!(
        "    {:<28}{}",
        s.label.apply_to("Total time for software"),
        s.value.apply_to(format!("{:>10.6} seconds", result.software_secs))
    );
    println!(
        "    {:<28}{}",
        s.label.apply_to("Total time for hardware"),
        s.value.apply_to(format!("{:>10.6} seconds", result.hardware_secs))
    );
    match result.acceleration.value() {
        Some(ratio) => println!(
            "    {:<28}{}",
            s.label.apply_to("Acceleration ratio"),
            s.value.apply_to(format!("{ratio:.6}"))
        ),
        None => println!(
            "    {:<28}{}",
            s.label.apply_to("Acceleration ratio"),
            s.warn.apply_to("undefined (zero hardware time)")
        ),
    }
    println!();

    println!(
        "  {}",
        s.header.apply_to(format!(
            "Quality vs golden (peak^2 = {}, MSE / {})",
            config.psnr.peak_squared, config.psnr.divisor
        ))
    );
    println!(
        "    {:<28}{}",
        s.label.apply_to("PSNR software"),
        score_line(&s, &result.psnr_software)
    );
    println!(
        "    {:<28}{}",
        s.label.apply_to("PSNR hardware"),
        score_line(&s, &result.psnr_hardware)
    );
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Result image"),
        s.path.apply_to(config.output.display())
    );
    if let Some(ref png) = config.png {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Rendered"),
            s.path.apply_to(png.display())
        );
    }
    println!();
}
