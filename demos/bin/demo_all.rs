//! Runs every solver demo in sequence and prints a summary table.

use anyhow::Result;
use clap::Parser;
use console::style;
use vqls_demos::cli::DemoArgs;
use vqls_demos::runners::Demo;
use vqls_demos::{create_progress_bar, init_logging, print_header, present};

fn main() -> Result<()> {
    let args = DemoArgs::parse();
    init_logging(&args.log_level);
    let config = args.load_config()?;

    let pb = create_progress_bar(Demo::ALL.len() as u64, "demos");
    let mut reports = Vec::with_capacity(Demo::ALL.len());
    for demo in Demo::ALL {
        reports.push(pb.suspend(|| present(demo, &config))?);
        pb.inc(1);
    }
    pb.finish_and_clear();

    print_header("Summary");
    println!(
        "  {:<12} {:>12} {:>8} {:>12}",
        style("demo").dim(),
        style("cost").dim(),
        style("evals").dim(),
        style("max error").dim()
    );
    for report in &reports {
        println!(
            "  {:<12} {:>12.3e} {:>8} {:>12.3e}",
            report.demo, report.optimal_value, report.cost_function_evals, report.max_abs_error
        );
    }

    args.write_report(&reports)
}
