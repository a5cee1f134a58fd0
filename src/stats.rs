//! System statistics report for the `/stats` command.
//!
//! Shells out to `fastfetch` and scrubs the output for chat display.
//! Any failure collapses into a fixed error string.

use std::sync::LazyLock;

use regex::Regex;
use tokio::process::Command;
use tracing::error;

/// Fixed reply when stats collection fails for any reason.
const STATS_ERROR: &str = "Error getting system statistics";

static ANSI_ESCAPES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1B(?:[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])").expect("valid ANSI regex")
});

/// Collect system statistics. Total: returns the error string instead
/// of failing.
pub async fn system_stats() -> String {
    let output = match Command::new("fastfetch")
        .args(["-c", "/opt/fastfetch.jsonc"])
        .output()
        .await
    {
        Ok(output) => output,
        Err(e) => {
            error!(error = %e, "Failed to run fastfetch");
            return STATS_ERROR.to_string();
        }
    };

    if !output.status.success() {
        error!(status = ?output.status, "fastfetch exited with an error");
        return STATS_ERROR.to_string();
    }

    clean_output(&String::from_utf8_lossy(&output.stdout))
}

/// Strip ANSI escapes, non-ASCII glyphs and control characters from
/// terminal output so it renders cleanly in a chat message.
fn clean_output(text: &str) -> String {
    let text = ANSI_ESCAPES.replace_all(text, "");
    let text: String = text
        .chars()
        .filter(|c| c.is_ascii())
        .filter(|c| !c.is_control() || c.is_ascii_whitespace())
        .collect();
    // fastfetch labels the root disk with an OSC-8 hyperlink; stripping
    // the escapes leaves the link payload behind on that line.
    text.replace("Disk (8;;file:////8;;):", "Disk (/):")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_ansi_color_codes() {
        let colored = "\x1B[1;32mCPU:\x1B[0m AMD Ryzen";
        assert_eq!(clean_output(colored), "CPU: AMD Ryzen");
    }

    #[test]
    fn strips_non_ascii_glyphs() {
        assert_eq!(clean_output("Memory ▊▊▊ 8GiB"), "Memory  8GiB");
    }

    #[test]
    fn keeps_newlines_and_tabs() {
        assert_eq!(clean_output("OS: Linux\n\tKernel: 6.1"), "OS: Linux\n\tKernel: 6.1");
    }

    #[test]
    fn strips_bare_control_characters() {
        assert_eq!(clean_output("a\x07b\x00c"), "abc");
    }

    #[test]
    fn repairs_disk_hyperlink_residue() {
        let line = "Disk (\x1B]8;;file:///\x1B\\/\x1B]8;;\x1B\\): 100GB";
        assert_eq!(clean_output(line), "Disk (/): 100GB");
    }
}
