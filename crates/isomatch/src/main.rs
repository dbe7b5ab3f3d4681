use std::process::ExitCode;

use isomatch::DemoConfig;

fn main() -> ExitCode {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();

    let config = match std::env::args().nth(1) {
        Some(path) => match DemoConfig::load(&path) {
            Ok(config) => {
                log::info!("loaded configuration from {path}");
                config
            }
            Err(err) => {
                log::error!("cannot load {path}: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => DemoConfig::default(),
    };

    match isomatch::run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
