//! Simulator run-script generation.
//!
//! The simulation script is rendered from a Tcl template carrying
//! `%$%{NAME}` placeholders (the delimiter is unusual on purpose, so it
//! cannot collide with Tcl's own `$` substitution). A small bash launcher
//! is rendered alongside it; it sources the simulator environment from the
//! build directory before starting the run.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::debug;

use crate::error::SimulatorError;

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r"%\$%\{([A-Za-z0-9_]+)\}").expect("placeholder regex must compile");
}

const LAUNCHER_TEMPLATE: &str = r#"#!/bin/bash

set -eo pipefail

BUILD_DIR=%$%{BUILD_DIR}
START_SCRIPT=%$%{START_SCRIPT}

[ -f $BUILD_DIR/environment ] || ([ -f $BUILD_DIR/make_environment.sh ] && pushd $BUILD_DIR && ./make_environment.sh && popd)
. $BUILD_DIR/environment

ns $START_SCRIPT
"#;

/// Values substituted into the simulation script template.
#[derive(Debug, Clone)]
pub struct ScriptParams {
    pub num_nodes: u16,
    pub run_time_secs: u64,
    pub protocol: String,
    pub host: String,
    pub control_port_base: u16,
    pub local_port_base: u16,
    pub position_port_base: u16,
}

/// Replaces every `%$%{NAME}` placeholder in `template` from `values`.
/// A placeholder without a value is an error.
pub fn render(template: &str, values: &HashMap<&str, String>) -> Result<String, SimulatorError> {
    let mut missing = None;
    let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures| {
        let name = &caps[1];
        match values.get(name) {
            Some(value) => value.clone(),
            None => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });
    match missing {
        Some(name) => Err(SimulatorError::Template(name)),
        None => Ok(rendered.into_owned()),
    }
}

/// Renders the simulation script from `template_path` into `script_path`.
pub fn generate_simulation_script(
    template_path: &Path,
    script_path: &Path,
    params: &ScriptParams,
) -> Result<(), SimulatorError> {
    let template = fs::read_to_string(template_path)?;
    let values = HashMap::from([
        ("TMPL_NO_SENDERS", params.num_nodes.to_string()),
        ("TMPL_STOPTIME", params.run_time_secs.to_string()),
        ("TMPL_PROTOCOL", params.protocol.clone()),
        ("TMPL_APP_SEND_HOST", params.host.clone()),
        ("TMPL_APP_PORT_BASE", params.control_port_base.to_string()),
        ("TMPL_APP_SEND_PORT_BASE", params.local_port_base.to_string()),
        ("TMPL_APP_POS_PORT_BASE", params.position_port_base.to_string()),
    ]);
    let script = render(&template, &values)?;
    debug!("Writing simulation script to {}", script_path.display());
    fs::write(script_path, script)?;
    Ok(())
}

/// Renders the bash launcher that sources the simulator environment and
/// starts `script_path`.
pub fn generate_launcher(
    launcher_path: &Path,
    build_dir: &Path,
    script_path: &Path,
) -> Result<(), SimulatorError> {
    let values = HashMap::from([
        ("BUILD_DIR", build_dir.display().to_string()),
        ("START_SCRIPT", script_path.display().to_string()),
    ]);
    let launcher = render(LAUNCHER_TEMPLATE, &values)?;
    debug!("Writing launcher to {}", launcher_path.display());
    fs::write(launcher_path, launcher)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_all_placeholders() {
        let template = "set opt(nn) %$%{TMPL_NO_SENDERS}\nset opt(stop) %$%{TMPL_STOPTIME}\n";
        let values = HashMap::from([
            ("TMPL_NO_SENDERS", "3".to_string()),
            ("TMPL_STOPTIME", "15".to_string()),
        ]);
        let rendered = render(template, &values).unwrap();
        assert_eq!(rendered, "set opt(nn) 3\nset opt(stop) 15\n");
    }

    #[test]
    fn tcl_dollar_variables_survive_rendering() {
        let template = "puts $node_(%$%{TMPL_NO_SENDERS})";
        let values = HashMap::from([("TMPL_NO_SENDERS", "2".to_string())]);
        assert_eq!(render(template, &values).unwrap(), "puts $node_(2)");
    }

    #[test]
    fn missing_value_is_an_error() {
        let err = render("port %$%{TMPL_UNSET}", &HashMap::new()).unwrap_err();
        match err {
            SimulatorError::Template(name) => assert_eq!(name, "TMPL_UNSET"),
            other => panic!("expected Template error, got {other:?}"),
        }
    }

    #[test]
    fn launcher_embeds_build_dir_and_script() {
        let values = HashMap::from([
            ("BUILD_DIR", "/opt/desert".to_string()),
            ("START_SCRIPT", "uwAppPos_UDP.tcl".to_string()),
        ]);
        let rendered = render(LAUNCHER_TEMPLATE, &values).unwrap();
        assert!(rendered.contains("BUILD_DIR=/opt/desert"));
        assert!(rendered.contains("ns $START_SCRIPT"));
        assert!(!rendered.contains("%$%"));
    }
}
