use digenv::config::LOG_VAR;
use digenv::env::TokioExecEnv;
use digenv::{Config, ExitStatus, Pipeline, EXIT_ERROR};
use std::env;
use std::io::{stderr, Write};
use std::process::exit;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();

    let config = Config::from_env().unwrap_or_else(|e| {
        let _ = writeln!(stderr(), "digenv: {}", e);
        exit_with_status(EXIT_ERROR);
    });

    // Everything after argument zero goes to grep untouched.
    let args = env::args_os().skip(1).collect();

    let mut exec_env = TokioExecEnv::new(config.search_path.clone());
    let status = match Pipeline::new(&config, args)
        .run(&mut exec_env, None, None)
        .await
    {
        Ok(status) => status,
        Err(e) => {
            let _ = writeln!(stderr(), "digenv: {}", e);
            e.exit_status()
        }
    };

    exit_with_status(status);
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(stderr)
        .init();
}

fn exit_with_status(status: ExitStatus) -> ! {
    exit(status.exit_code());
}
