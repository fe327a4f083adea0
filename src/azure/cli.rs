//! Azure CLI command execution.

use crate::config;
use colored::Colorize;
use regex::Regex;
use std::error::Error;
use std::process::Command;
use std::sync::OnceLock;

/// Regex for splitting command strings while preserving quoted substrings.
static COMMAND_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_command_regex() -> &'static Regex {
    COMMAND_REGEX.get_or_init(|| {
        Regex::new(r#"'([^']*)'\s*|\"([^\"]*)\"\s*|([^'\s]*)\s*"#).expect("Invalid Regex")
    })
}

/// Run a shell command and return its stdout.
///
/// The command string is split on spaces, with quoted substrings kept
/// together so KQL queries survive the round trip through `az`.
///
/// # Returns
/// * `Ok(String)` - The stdout output on success
/// * `Err` - If the command fails, emits invalid UTF-8, or its output
///   exceeds [`config::MAX_CLI_OUTPUT_BYTES`]
pub fn run(cmd: &str) -> Result<String, Box<dyn Error>> {
    log::debug!("run({cmd})", cmd = cmd.on_blue());

    let args: Vec<&str> = split_and_strip(cmd);
    log::trace!("split args={:?}", args);

    let mut command = Command::new(args[0]);
    command.args(args.iter().skip(1));

    let output = command
        .output()
        .map_err(|e| format!("Failed to execute '{}': {e}", args[0]))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::trace!(
            "code={code:?}\n┎######\nstderr=\n{stderr}\n┖######",
            code = output.status.code(),
            stderr = stderr.red()
        );
        log::warn!(
            "{failed} to run {cmd}",
            failed = "failed".on_red(),
            cmd = cmd.on_blue()
        );
        return Err(format!("ERROR running: {stderr}").into());
    }

    log::debug!("Success cmd: {cmd} stdout.len()={}", output.stdout.len());
    if output.stdout.len() > config::MAX_CLI_OUTPUT_BYTES {
        return Err(format!(
            "Response too large: {} bytes for command: {:?}",
            output.stdout.len(),
            args
        )
        .into());
    }

    let stdout = String::from_utf8(output.stdout).map_err(|e| format!("Invalid UTF-8: {e}"))?;
    Ok(stdout)
}

/// Split a command string on spaces, preserving quoted substrings.
fn split_and_strip(input: &str) -> Vec<&str> {
    get_command_regex()
        .find_iter(input)
        .map(|m| m.as_str().trim().trim_matches('\'').trim_matches('"'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_and_strip_quoted_query() {
        let input = "az graph query -q 'resources | project id' --output json";
        let expected = vec![
            "az",
            "graph",
            "query",
            "-q",
            "resources | project id",
            "--output",
            "json",
        ];
        assert_eq!(split_and_strip(input), expected);
    }

    #[test]
    fn test_split_and_strip_nospaces() {
        assert_eq!(split_and_strip("NoSpacesHere"), vec!["NoSpacesHere"]);
    }

    #[test]
    fn test_split_and_strip_double_quotes() {
        let input = "curl \"https://mysite.com?\\$filter=name eq 'john'\"";
        let expected = vec!["curl", "https://mysite.com?\\$filter=name eq 'john'"];
        assert_eq!(split_and_strip(input), expected);
    }
}
