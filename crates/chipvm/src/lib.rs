use anyhow::Result;
use chipvm_core::{EmulatorApp, MachineConfig};
use chipvm_term::{App, TermContext, TermInitInfo};

/// Load `rom_data` into a fresh machine and run it in the terminal until the
/// user quits or the machine halts on an error.
pub fn run(rom_data: &[u8], config: MachineConfig) -> Result<()> {
    let mut app = EmulatorApp::with_config(config);
    app.machine.load_program(rom_data)?;
    let init_info = TermInitInfo::builder()
        .width(app.width())
        .height(app.height())
        .title(app.title())
        .build();
    TermContext::run(init_info, app)?;
    Ok(())
}
