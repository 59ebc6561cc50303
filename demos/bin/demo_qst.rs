//! QST-VQLS on a random dense symmetric system.

use anyhow::Result;
use clap::Parser;
use vqls_demos::cli::DemoArgs;
use vqls_demos::runners::Demo;
use vqls_demos::{init_logging, present};

fn main() -> Result<()> {
    let args = DemoArgs::parse();
    init_logging(&args.log_level);
    let config = args.load_config()?;
    let report = present(Demo::Qst, &config)?;
    args.write_report(&report)
}
