//! Report the library version and the contents of every registered cut set

use clap::Parser;
use eyre::WrapErr;
use lax::{catalog, Configuration, Cut};

/// Print the lax version and the cut sets it provides
#[derive(Parser)]
#[command(name = "lax", version, about, long_about = None)]
struct Args {}

fn main() -> eyre::Result<()> {
    env_logger::init();
    let _args = Args::parse();

    // ### CONFIGURATION READOUT ###

    // The report is informational, so a broken configuration only gets logged
    let cfg = Configuration::from_env()
        .wrap_err("Failed to load the configuration, using defaults")
        .unwrap_or_else(|e| {
            log::error!("{e:?}");
            Configuration::default()
        });
    cfg.log();

    // ### CATALOG LISTING ###

    println!("lax version: {}", lax::VERSION);
    for entry in catalog::cut_sets() {
        // Building a cut set never touches event data, but a broken definition
        // should not hide the other sets from the report
        let set = match (entry.build)(&cfg) {
            Ok(set) => set,
            Err(e) => {
                log::error!("Failed to build {}/{}: {e}", entry.context, entry.name);
                continue;
            }
        };
        println!("{} {} version {}", entry.context, set.name(), set.version());
        for member in set.members() {
            println!("    {} version {}", member.name(), member.version());
        }
    }

    Ok(())
}
