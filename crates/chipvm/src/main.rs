use anyhow::Context;
use chipvm_core::MachineConfig;

/// Optional fixed seed for the `CXNN` random generator.
const SEED_ENV: &str = "CHIPVM_SEED";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let Some(rom_path) = std::env::args().nth(1) else {
        eprintln!("Usage: chipvm <program.ch8>");
        std::process::exit(1);
    };

    let rom = std::fs::read(&rom_path)
        .with_context(|| format!("Failed to read program '{}'", rom_path))?;
    log::info!("Playing program path: '{}'", rom_path);

    let config = match std::env::var(SEED_ENV) {
        Ok(seed) => {
            let seed = seed
                .parse::<u64>()
                .with_context(|| format!("{} must be an unsigned integer", SEED_ENV))?;
            MachineConfig::builder().seed(seed).build()
        }
        Err(_) => MachineConfig::default(),
    };

    chipvm::run(&rom, config)
}
