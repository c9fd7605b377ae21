use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use usageline::app;
use usageline::config::{Config, Settings};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Config::parse_args();

    // Setup logging
    setup_logging(cli.debug);

    // Load settings; a broken config file must not blank the status line
    let mut settings = Settings::load(cli.config.as_ref()).unwrap_or_else(|e| {
        tracing::warn!("Using default settings: {:#}", e);
        Settings::default()
    });
    settings.merge_env();
    settings.merge_cli(&cli);
    settings.validate();

    if cli.print_config {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    // Render; a panic still leaves the prompt with a line
    let rendered = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        app::run(&settings, std::io::stdin().lock())
    }));
    match rendered {
        Ok(text) => println!("{}", text),
        Err(_) => {
            tracing::warn!("Render panicked; printing empty status line");
            println!();
        }
    }

    Ok(())
}

fn setup_logging(debug: bool) {
    let default = if debug {
        "usageline=debug,usageline_core=debug"
    } else {
        "usageline=warn,usageline_core=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
