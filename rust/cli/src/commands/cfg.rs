//! `cfg`: print the resolved configuration as JSON, one `{value, source}`
//! pair per key.
//!
//! ```json
//! {
//!   "starting_stack": { "value": 1000, "source": "default" },
//!   "blinds": { "value": "5/10", "source": "env" },
//!   ...
//! }
//! ```

use std::io::Write;

use crate::config;
use crate::error::CliError;
use crate::ui;

pub fn handle_cfg_command(out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError> {
    let resolved = match config::load_with_sources() {
        Ok(r) => r,
        Err(e) => {
            ui::write_error(err, &format!("Invalid configuration: {}", e))?;
            return Err(CliError::Config(format!("Invalid configuration: {}", e)));
        }
    };

    let config::ConfigResolved { config, sources } = resolved;
    let display = serde_json::json!({
        "starting_stack": {
            "value": config.starting_stack,
            "source": sources.starting_stack,
        },
        "blinds": {
            "value": format!("{}/{}", config.small_blind, config.big_blind),
            "source": sources.blinds,
        },
        "seed": {
            "value": config.seed,
            "source": sources.seed,
        },
        "ai_timeout_ms": {
            "value": config.ai_timeout_ms,
            "source": sources.ai_timeout_ms,
        },
        "rollouts": {
            "value": config.rollouts,
            "source": sources.rollouts,
        },
        "refine_samples": {
            "value": config.refine_samples,
            "source": sources.refine_samples,
        }
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}
