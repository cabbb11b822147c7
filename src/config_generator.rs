//! Generates an Icinga 2 `CheckCommand` definition from the plugin's own command line
//! definition, so the Icinga side never drifts from the options the binary accepts.

use std::fmt::Write;
use std::path::Path;

use clap::ArgAction;

/// Environment variable that switches the plugin into config generation mode.
pub const GENERATE_ENV: &str = "GENERATE_ICINGA_COMMAND";

#[derive(Debug, thiserror::Error)]
pub enum ConfigGeneratorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
    #[error("invalid executable path")]
    InvalidExecutablePath,
    #[error("argument {0:?} has no long name")]
    MissingLongArgument(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct IcingaArgument {
    /// Option as passed on the command line, short form preferred.
    key: String,
    /// Name of the custom variable holding the value, without `$`.
    var: String,
    description: Option<String>,
    is_flag: bool,
    required: bool,
    default_value: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IcingaCommand {
    arguments: Vec<IcingaArgument>,
}

impl IcingaCommand {
    /// Builds the description from a clap command. Custom variables are named
    /// `<var_prefix>_<long option>` with dashes turned into underscores.
    pub fn from_clap(
        cmd: &clap::Command,
        var_prefix: &str,
    ) -> Result<Self, ConfigGeneratorError> {
        let mut arguments = Vec::new();

        for arg in cmd.get_arguments() {
            if matches!(
                arg.get_action(),
                ArgAction::Help | ArgAction::HelpShort | ArgAction::HelpLong | ArgAction::Version
            ) {
                continue;
            }

            let long = arg.get_long().ok_or_else(|| {
                ConfigGeneratorError::MissingLongArgument(arg.get_id().to_string())
            })?;

            let key = match arg.get_short() {
                Some(short) => format!("-{}", short),
                None => format!("--{}", long),
            };

            arguments.push(IcingaArgument {
                key,
                var: format!("{}_{}", var_prefix, long.replace('-', "_")),
                description: arg.get_help().map(|s| s.to_string()),
                is_flag: matches!(arg.get_action(), ArgAction::SetTrue | ArgAction::Count),
                required: arg.is_required_set(),
                default_value: arg
                    .get_default_values()
                    .first()
                    .and_then(|v| v.to_str())
                    .map(|s| s.to_owned()),
            });
        }

        Ok(IcingaCommand { arguments })
    }

    /// Renders the `object CheckCommand` block for the executable at `exe`.
    pub fn render(&self, name: &str, exe: &Path) -> Result<String, ConfigGeneratorError> {
        let exe = exe.to_str().ok_or(ConfigGeneratorError::InvalidExecutablePath)?;

        let mut out = String::new();
        writeln!(out, "object CheckCommand \"{}\" {{", escape(name))?;
        writeln!(out, "  command = [ \"{}\" ]", escape(exe))?;
        out.push_str("  arguments = {\n");

        for arg in &self.arguments {
            writeln!(out, "    \"{}\" = {{", arg.key)?;
            if arg.is_flag {
                writeln!(out, "      set_if = \"${}$\"", arg.var)?;
            } else {
                writeln!(out, "      value = \"${}$\"", arg.var)?;
            }
            if arg.required {
                out.push_str("      required = true\n");
            }
            if let Some(ref description) = arg.description {
                writeln!(out, "      description = \"{}\"", escape(description))?;
            }
            out.push_str("    }\n");
        }
        out.push_str("  }\n");

        let defaults: Vec<_> = self
            .arguments
            .iter()
            .filter_map(|arg| arg.default_value.as_ref().map(|d| (&arg.var, d)))
            .collect();
        if !defaults.is_empty() {
            out.push('\n');
            for (var, default) in defaults {
                writeln!(out, "  vars.{} = \"{}\"", var, escape(default))?;
            }
        }

        out.push_str("}\n");
        Ok(out)
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "$$")
}

/// Prints the Icinga command configuration if [GENERATE_ENV] is set and exits the process.
pub fn print_icinga_command_if_env_and_exit(
    name: &str,
    var_prefix: &str,
    cmd: &clap::Command,
) -> Result<(), ConfigGeneratorError> {
    if std::env::var_os(GENERATE_ENV).is_none() {
        return Ok(());
    }

    let exe = std::env::current_exe()?;
    let out = IcingaCommand::from_clap(cmd, var_prefix)?.render(name, &exe)?;

    println!("{}", out.trim_end());
    std::process::exit(0);
}
